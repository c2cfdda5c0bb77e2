//! Heuristic structural checks over a resolved graph
//!
//! These findings are advisory: they feed the self-correction driver's
//! best-effort improvement pass and never block completion.

use std::collections::HashSet;

use crate::graph::FlowGraph;
use crate::parser::ast::NodeKind;

/// Attributes every substantive node is expected to carry.
const EXPECTED_ATTRS: [&str; 3] = ["icon", "color", "subLabel"];

/// Issues found in one pass over a graph, in human-readable form suitable
/// for embedding in a retry prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
    pub issues: Vec<String>,
}

impl QualityReport {
    pub fn is_acceptable(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run the quality heuristics over a resolved graph.
///
/// Substantive nodes exclude annotations. Graphs with five or more
/// substantive nodes are additionally expected to show kind diversity
/// (three distinct kinds among all nodes) and at least one branch (a node
/// with out-degree two or more).
pub fn assess(graph: &FlowGraph) -> QualityReport {
    let mut issues = Vec::new();
    let substantive: Vec<_> = graph
        .nodes
        .iter()
        .filter(|n| n.kind.is_substantive())
        .collect();

    if substantive.len() >= 5 {
        let distinct: HashSet<NodeKind> = graph.nodes.iter().map(|n| n.kind).collect();
        if distinct.len() < 3 {
            issues.push(format!(
                "low type diversity: only {} distinct node kind(s); use at least 3 \
                 (start, process, decision, end, ...)",
                distinct.len()
            ));
        }
        let has_branch = graph.nodes.iter().any(|n| graph.out_degree(&n.id) >= 2);
        if !has_branch {
            issues.push(
                "no branching: at least one node should have two or more outgoing edges"
                    .to_string(),
            );
        }
    }

    let incomplete: Vec<String> = substantive
        .iter()
        .filter_map(|n| {
            let missing: Vec<&str> = EXPECTED_ATTRS
                .iter()
                .copied()
                .filter(|key| !n.attributes.contains_key(*key))
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(format!("'{}' missing {}", n.id, missing.join(", ")))
            }
        })
        .collect();
    if !incomplete.is_empty() {
        issues.push(format!("incomplete node styling: {}", incomplete.join("; ")));
    }

    QualityReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::resolver::resolve;

    fn compile(source: &str) -> FlowGraph {
        resolve(parse_source(source))
    }

    /// Six process nodes in a straight chain: both structural checks fire.
    #[test]
    fn test_monoculture_chain_flagged_twice() {
        let src = "\
[process] a: A\n[process] b: B\n[process] c: C\n\
[process] d: D\n[process] e: E\n[process] f: F\n\
a -> b\nb -> c\nc -> d\nd -> e\ne -> f\n";
        let report = assess(&compile(src));
        assert!(report.issues.iter().any(|i| i.contains("type diversity")));
        assert!(report.issues.iter().any(|i| i.contains("no branching")));
    }

    #[test]
    fn test_small_graphs_skip_structural_checks() {
        let report = assess(&compile("[process] a: A\n[process] b: B\na -> b\n"));
        assert!(!report.issues.iter().any(|i| i.contains("type diversity")));
        assert!(!report.issues.iter().any(|i| i.contains("no branching")));
    }

    #[test]
    fn test_missing_attributes_named_per_node() {
        let src = "[start] a: A {icon: \"Play\", color: \"emerald\", subLabel: \"go\"}\n\
                   [process] b: B {icon: \"Zap\"}\n";
        let report = assess(&compile(src));
        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert!(issue.contains("'b' missing color, subLabel") || issue.contains("'b' missing"));
        assert!(!issue.contains("'a'"));
    }

    #[test]
    fn test_annotations_are_exempt() {
        let report = assess(&compile("[note] n: Remember this\n"));
        assert!(report.is_acceptable());
    }

    #[test]
    fn test_fully_styled_branching_graph_is_acceptable() {
        let attrs = "{icon: \"Zap\", color: \"blue\", subLabel: \"s\"}";
        let src = format!(
            "[start] a: A {attrs}\n[decision] b: B {attrs}\n[process] c: C {attrs}\n\
             [process] d: D {attrs}\n[end] e: E {attrs}\n\
             a -> b\nb ->|yes| c\nb ->|no| d\nc -> e\nd -> e\n"
        );
        let report = assess(&compile(&src));
        assert!(report.is_acceptable(), "issues: {:?}", report.issues);
    }
}
