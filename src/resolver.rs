//! Graph resolver: symbolic references to a final typed graph
//!
//! Resolution is the second pass over a parse: declared nodes become final
//! records verbatim, edge refs are looked up through a symbol table keyed
//! by both node id and label, and refs that match nothing synthesize an
//! implicit process node. The same unknown name always resolves to the
//! same synthesized node.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::graph::{FlowEdge, FlowGraph, FlowNode, Point};
use crate::parser::ast::{AttrValue, AttributeMap, NodeKind, ParsedSource};

/// Resolve a parsed source into the final graph.
///
/// Deterministic: identical input text produces identical node ids, edge
/// ids, and ordering. Existing node identity is preserved by label
/// matching across AI-assisted edits, which depends on this.
pub fn resolve(parsed: ParsedSource) -> FlowGraph {
    let ParsedSource {
        nodes: declared,
        edges: declared_edges,
        metadata,
        errors,
    } = parsed;

    let mut nodes: Vec<FlowNode> = Vec::with_capacity(declared.len());
    let mut symbols: HashMap<String, String> = HashMap::new();
    let mut ids: HashSet<String> = HashSet::new();

    for decl in declared {
        if !ids.insert(decl.id.clone()) {
            // First declaration wins; a duplicate id is dropped silently.
            debug!(id = %decl.id, "duplicate node id dropped");
            continue;
        }
        symbols.insert(decl.id.clone(), decl.id.clone());
        if !decl.label.is_empty() {
            symbols.insert(decl.label.clone(), decl.id.clone());
        }
        nodes.push(FlowNode {
            id: decl.id,
            kind: decl.kind,
            label: decl.label,
            parent_id: decl.parent_id,
            attributes: decl.attributes,
            position: Point::default(),
        });
    }

    let mut edges: Vec<FlowEdge> = Vec::with_capacity(declared_edges.len());
    for (idx, decl) in declared_edges.into_iter().enumerate() {
        let source = resolve_ref(&decl.source_ref, &mut symbols, &mut nodes);
        let target = resolve_ref(&decl.target_ref, &mut symbols, &mut nodes);

        let mut attributes = AttributeMap::new();
        if let Some(style) = decl.arrow.style_type() {
            attributes.insert("styleType".to_string(), AttrValue::String(style.to_string()));
        }
        // Explicit edge attributes override the arrow-derived mapping.
        attributes.extend(decl.attributes);

        edges.push(FlowEdge {
            id: format!("edge-{}", idx + 1),
            source,
            target,
            label: decl.label,
            attributes,
        });
    }

    FlowGraph {
        nodes,
        edges,
        metadata,
        errors: errors.iter().map(|e| e.to_string()).collect(),
    }
}

/// Look a reference up by id or label; synthesize an implicit process node
/// when it matches nothing. Synthesis registers the new node, so repeated
/// references to the same unknown name resolve to one node.
fn resolve_ref(
    reference: &str,
    symbols: &mut HashMap<String, String>,
    nodes: &mut Vec<FlowNode>,
) -> String {
    if let Some(id) = symbols.get(reference) {
        return id.clone();
    }
    debug!(%reference, "synthesizing implicit node");
    let id = reference.to_string();
    symbols.insert(reference.to_string(), id.clone());
    nodes.push(FlowNode {
        id: id.clone(),
        kind: NodeKind::Process,
        label: reference.to_string(),
        parent_id: None,
        attributes: AttributeMap::new(),
        position: Point::default(),
    });
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use pretty_assertions::assert_eq;

    fn compile(source: &str) -> FlowGraph {
        resolve(parse_source(source))
    }

    #[test]
    fn test_implicit_node_synthesis_is_idempotent() {
        let graph = compile("a -> X\nb -> X\n");
        let x_nodes: Vec<_> = graph.nodes.iter().filter(|n| n.label == "X").collect();
        assert_eq!(x_nodes.len(), 1);
        assert_eq!(x_nodes[0].kind, NodeKind::Process);
        assert_eq!(graph.edges[0].target, x_nodes[0].id);
        assert_eq!(graph.edges[1].target, x_nodes[0].id);
    }

    #[test]
    fn test_label_resolves_to_declared_id() {
        let graph = compile("[process] p1: Start {}\nStart -> p2\n");
        // Label lookup wins over implicit synthesis.
        assert_eq!(graph.edges[0].source, "p1");
        assert!(graph.node("Start").is_none());
        // p2 was synthesized.
        assert_eq!(graph.node("p2").unwrap().kind, NodeKind::Process);
    }

    #[test]
    fn test_duplicate_node_id_first_wins() {
        let graph = compile("[start] a: First\n[end] a: Second\n");
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].kind, NodeKind::Start);
        assert_eq!(graph.nodes[0].label, "First");
    }

    #[test]
    fn test_edge_ids_are_stable_ordinals() {
        let graph = compile("a -> b\nb -> c\n");
        let ids: Vec<_> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge-1", "edge-2"]);
    }

    #[test]
    fn test_arrow_style_attributes() {
        let graph = compile("a --> b\nc ..> d\ne ==> f\ng -> h\n");
        let styles: Vec<_> = graph
            .edges
            .iter()
            .map(|e| e.attributes.get("styleType").and_then(AttrValue::as_str))
            .collect();
        assert_eq!(styles, vec![Some("curved"), Some("dashed"), Some("thick"), None]);
    }

    #[test]
    fn test_explicit_style_overrides_arrow() {
        let graph = compile("a --> b {styleType: \"thick\"}\n");
        assert_eq!(
            graph.edges[0].attributes.get("styleType"),
            Some(&AttrValue::String("thick".into()))
        );
    }

    #[test]
    fn test_every_edge_endpoint_exists() {
        let graph = compile("a -> b\nx ..> y\ngroup \"G\" {\n[process] inner: I\n}\nI -> a\n");
        for edge in &graph.edges {
            assert!(graph.node(&edge.source).is_some(), "missing {}", edge.source);
            assert!(graph.node(&edge.target).is_some(), "missing {}", edge.target);
        }
    }

    #[test]
    fn test_group_addressable_by_label() {
        let graph = compile("group \"Backend\" {\n[process] svc: Service\n}\na -> Backend\n");
        assert_eq!(graph.edges[0].target, "group-1");
    }

    #[test]
    fn test_line_errors_carried_as_strings() {
        let graph = compile("}\n");
        assert_eq!(graph.errors.len(), 1);
        assert!(graph.errors[0].starts_with("line 1:"));
    }

    #[test]
    fn test_determinism_across_runs() {
        let src = "flow: \"T\"\n[start] a: Begin\na -> b\nb ->|ok| c\nc --> a\n";
        assert_eq!(compile(src), compile(src));
    }
}
