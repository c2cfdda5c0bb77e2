//! The resolved graph: the compiler's output contract
//!
//! Field names serialize in camelCase to match the editor-facing JSON
//! contract (`parentId`, `styleType`, ...).

use serde::{Deserialize, Serialize};

use crate::parser::ast::{AttrValue, AttributeMap, NodeKind};

/// 2D layout position, assigned by the layout adapter after resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A fully resolved node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Containment link for layout, set for nodes declared inside a group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub attributes: AttributeMap,
    #[serde(default)]
    pub position: Point,
}

/// A fully resolved edge. Source and target are guaranteed to name ids
/// present in the node set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub attributes: AttributeMap,
}

/// The parser's output contract.
///
/// `errors` is non-empty only when a structural line could not be
/// classified (stray or missing braces) - a non-fatal condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub metadata: AttributeMap,
    pub errors: Vec<String>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of edges leaving the given node.
    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.source == id).count()
    }

    /// Re-emit the graph as FlowMind source.
    ///
    /// Used to hand the current graph to the generation backend as context
    /// for AI-assisted edits; the output round-trips through the parser
    /// with identical node and edge identity.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.metadata {
            out.push_str(&format!("{key}: {}\n", format_scalar(value)));
        }
        self.write_children(None, 0, &mut out);
        for edge in &self.edges {
            let arrow = match edge.attributes.get("styleType").and_then(AttrValue::as_str) {
                Some("curved") => "-->",
                Some("dashed") => "..>",
                Some("thick") => "==>",
                _ => "->",
            };
            let label = edge
                .label
                .as_ref()
                .map(|l| format!("|{l}|"))
                .unwrap_or_default();
            // styleType is re-encoded as the arrow itself.
            let extra: AttributeMap = edge
                .attributes
                .iter()
                .filter(|(k, _)| k.as_str() != "styleType")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            out.push_str(&format!(
                "{} {arrow}{label} {}{}\n",
                edge.source,
                edge.target,
                format_attrs(&extra)
            ));
        }
        out
    }

    fn write_children(&self, parent: Option<&str>, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        for node in self.nodes.iter().filter(|n| n.parent_id.as_deref() == parent) {
            if node.kind == NodeKind::Group {
                out.push_str(&format!("{indent}group \"{}\" {{\n", node.label));
                self.write_children(Some(&node.id), depth + 1, out);
                out.push_str(&format!("{indent}}}\n"));
            } else {
                out.push_str(&format!(
                    "{indent}[{}] {}: {}{}\n",
                    node.kind,
                    node.id,
                    node.label,
                    format_attrs(&node.attributes)
                ));
            }
        }
    }
}

fn format_attrs(attrs: &AttributeMap) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{k}: {}", format_scalar(v)))
        .collect();
    format!(" {{{}}}", pairs.join(", "))
}

fn format_scalar(value: &AttrValue) -> String {
    match value {
        AttrValue::String(s) => format!("\"{}\"", escape(s)),
        other => other.to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
