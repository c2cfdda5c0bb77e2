//! Layered and grid placement engines
//!
//! The layered engine is a compact Sugiyama-style pipeline: longest-path
//! rank assignment (bounded relaxation, so cycles terminate), barycenter
//! ordering sweeps within ranks, then spacing-based coordinates with each
//! rank centered on the flow axis. All output is deterministic: identical
//! graphs produce identical coordinates.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::graph::{FlowGraph, Point};
use crate::parser::ast::NodeKind;

use super::config::{Direction, LayoutConfig};

pub(crate) fn layered(graph: &mut FlowGraph, config: &LayoutConfig) {
    let ids: Vec<String> = graph
        .nodes
        .iter()
        .filter(|n| n.kind != NodeKind::Group)
        .map(|n| n.id.clone())
        .collect();
    if ids.is_empty() {
        position_groups(graph, config);
        return;
    }
    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let edges: Vec<(usize, usize)> = graph
        .edges
        .iter()
        .filter_map(|e| {
            let s = *index.get(e.source.as_str())?;
            let t = *index.get(e.target.as_str())?;
            (s != t).then_some((s, t))
        })
        .collect();

    // Rank assignment: longest path from sources. The pass count is capped
    // at the node count so cyclic inputs still terminate.
    let mut rank = vec![0usize; ids.len()];
    for _ in 0..ids.len() {
        let mut changed = false;
        for &(s, t) in &edges {
            if rank[t] < rank[s] + 1 {
                rank[t] = rank[s] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let max_rank = rank.iter().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (i, &r) in rank.iter().enumerate() {
        layers[r].push(i);
    }

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    for &(s, t) in &edges {
        preds[t].push(s);
    }

    // Two downward barycenter sweeps reduce crossings; stable tie-break on
    // the current position keeps the result reproducible.
    let mut pos: Vec<f64> = vec![0.0; ids.len()];
    for layer in &layers {
        for (p, &i) in layer.iter().enumerate() {
            pos[i] = p as f64;
        }
    }
    for _ in 0..2 {
        for r in 1..layers.len() {
            let mut keyed: Vec<(f64, usize, usize)> = layers[r]
                .iter()
                .enumerate()
                .map(|(p, &i)| {
                    let bary = if preds[i].is_empty() {
                        p as f64
                    } else {
                        preds[i].iter().map(|&q| pos[q]).sum::<f64>() / preds[i].len() as f64
                    };
                    (bary, p, i)
                })
                .collect();
            keyed.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });
            layers[r] = keyed.into_iter().map(|(_, _, i)| i).collect();
            for (p, &i) in layers[r].iter().enumerate() {
                pos[i] = p as f64;
            }
        }
    }

    let mut points = vec![Point::default(); ids.len()];
    for (r, layer) in layers.iter().enumerate() {
        let main = r as f64 * config.rank_spacing;
        for (p, &i) in layer.iter().enumerate() {
            let cross = (p as f64 - (layer.len() as f64 - 1.0) / 2.0) * config.node_spacing;
            points[i] = place(config.direction, main, cross);
        }
    }
    for node in &mut graph.nodes {
        if let Some(&i) = index.get(node.id.as_str()) {
            node.position = points[i];
        }
    }

    position_groups(graph, config);
}

/// Square grid in declaration order. Useful for dense sets with few edges
/// where ranks degenerate.
pub(crate) fn grid(graph: &mut FlowGraph, config: &LayoutConfig) {
    let count = graph
        .nodes
        .iter()
        .filter(|n| n.kind != NodeKind::Group)
        .count();
    if count == 0 {
        position_groups(graph, config);
        return;
    }
    let cols = (count as f64).sqrt().ceil().max(1.0) as usize;
    let mut slot = 0usize;
    for node in &mut graph.nodes {
        if node.kind == NodeKind::Group {
            continue;
        }
        let main = (slot / cols) as f64 * config.rank_spacing;
        let cross = (slot % cols) as f64 * config.node_spacing;
        node.position = place(config.direction, main, cross);
        slot += 1;
    }
    position_groups(graph, config);
}

fn place(direction: Direction, main: f64, cross: f64) -> Point {
    match direction {
        Direction::Down => Point { x: cross, y: main },
        Direction::Right => Point { x: main, y: cross },
    }
}

/// Set each group's position to the padded top-left corner of its members,
/// deepest groups first so nested groups see positioned children.
fn position_groups(graph: &mut FlowGraph, config: &LayoutConfig) {
    let parent_of: HashMap<String, Option<String>> = graph
        .nodes
        .iter()
        .map(|n| (n.id.clone(), n.parent_id.clone()))
        .collect();
    let depth = |id: &str| {
        let mut d = 0usize;
        let mut current = parent_of.get(id).and_then(|p| p.as_deref());
        while let Some(parent) = current {
            d += 1;
            // Parent chains are acyclic by construction (the group stack),
            // but cap the walk anyway.
            if d > graph.nodes.len() {
                break;
            }
            current = parent_of.get(parent).and_then(|p| p.as_deref());
        }
        d
    };

    let mut groups: Vec<(usize, String)> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Group)
        .map(|n| (depth(&n.id), n.id.clone()))
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    for (_, gid) in groups {
        let members: Vec<Point> = graph
            .nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(gid.as_str()))
            .map(|n| n.position)
            .collect();
        if members.is_empty() {
            continue;
        }
        let min_x = members.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = members.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        if let Some(group) = graph.nodes.iter_mut().find(|n| n.id == gid) {
            group.position = Point {
                x: min_x - config.group_padding,
                y: min_y - config.group_padding,
            };
        }
    }
}
