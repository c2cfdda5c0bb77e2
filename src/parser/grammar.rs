//! Line classifier and grammar parser for FlowMind source
//!
//! The grammar is line-oriented and tolerant: every non-empty, non-comment
//! line is classified as metadata, group open, group close, edge, or node
//! declaration, in that precedence order. A line matching nothing is
//! silently ignored. The only recorded diagnostics are structural (stray or
//! missing closing braces); they never abort the parse.

use tracing::trace;

use super::ast::{ArrowKind, AttributeMap, DeclaredEdge, DeclaredNode, NodeKind, ParsedSource};
use super::attrs::{coerce_scalar, parse_attributes, strip_quotes};
use crate::error::LineError;

/// Classification of a single trimmed source line.
#[derive(Debug, Clone, PartialEq)]
enum LineKind<'a> {
    Blank,
    Metadata {
        key: String,
        value: &'a str,
    },
    GroupOpen {
        label: String,
    },
    GroupClose,
    Edge {
        source: String,
        arrow: ArrowKind,
        label: Option<String>,
        target: String,
        attrs: &'a str,
    },
    Node {
        kind: NodeKind,
        id: String,
        label: String,
        attrs: &'a str,
    },
    Ignored,
}

/// Parse FlowMind source into declared nodes, edges, metadata, and
/// non-fatal line errors.
///
/// Nodes and edges may appear in any order; symbolic references are
/// resolved in a later pass by [`crate::resolver`].
pub fn parse_source(source: &str) -> ParsedSource {
    let mut parsed = ParsedSource::default();
    // Stack of open group ids with the line that opened them.
    let mut group_stack: Vec<(String, usize, std::ops::Range<usize>)> = Vec::new();
    let mut group_ordinal = 0usize;
    let mut offset = 0usize;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let span = offset..offset + raw.len();
        offset += raw.len() + 1;

        match classify(raw) {
            LineKind::Blank | LineKind::Ignored => {}
            LineKind::Metadata { key, value } => {
                parsed.metadata.insert(key, coerce_scalar(value));
            }
            LineKind::GroupOpen { label } => {
                group_ordinal += 1;
                let id = format!("group-{group_ordinal}");
                parsed.nodes.push(DeclaredNode {
                    id: id.clone(),
                    kind: NodeKind::Group,
                    label,
                    parent_id: group_stack.last().map(|(id, _, _)| id.clone()),
                    attributes: AttributeMap::new(),
                });
                group_stack.push((id, line_no, span));
            }
            LineKind::GroupClose => {
                if group_stack.pop().is_none() {
                    parsed.errors.push(LineError::new(
                        line_no,
                        span,
                        "unexpected closing brace with no open group",
                    ));
                }
            }
            LineKind::Edge {
                source,
                arrow,
                label,
                target,
                attrs,
            } => {
                parsed.edges.push(DeclaredEdge {
                    source_ref: source,
                    target_ref: target,
                    label,
                    arrow,
                    attributes: parse_attributes(attrs),
                });
            }
            LineKind::Node {
                kind,
                id,
                label,
                attrs,
            } => {
                trace!(%id, %kind, "declared node");
                parsed.nodes.push(DeclaredNode {
                    id,
                    kind,
                    label,
                    parent_id: group_stack.last().map(|(id, _, _)| id.clone()),
                    attributes: parse_attributes(attrs),
                });
            }
        }
    }

    for (id, line, span) in group_stack.into_iter().rev() {
        parsed.errors.push(LineError::new(
            line,
            span,
            format!("group '{id}' is never closed"),
        ));
    }

    parsed
}

fn classify(line: &str) -> LineKind<'_> {
    let t = line.trim();
    if t.is_empty() || t.starts_with('#') {
        return LineKind::Blank;
    }
    if let Some(meta) = classify_metadata(t) {
        return meta;
    }
    if let Some(open) = classify_group_open(t) {
        return open;
    }
    if t == "}" {
        return LineKind::GroupClose;
    }
    if let Some(edge) = classify_edge(t) {
        return edge;
    }
    if let Some(node) = classify_node(t) {
        return node;
    }
    LineKind::Ignored
}

/// `key: value` with no `[` and no arrow anywhere on the line.
fn classify_metadata(t: &str) -> Option<LineKind<'_>> {
    if t.contains('[') || find_arrow(t).is_some() {
        return None;
    }
    let (key, value) = t.split_once(':')?;
    let key = key.trim();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(LineKind::Metadata {
        key: key.to_lowercase(),
        value,
    })
}

/// `group "Label" {` (keyword case-insensitive, label quoted or bare).
fn classify_group_open(t: &str) -> Option<LineKind<'static>> {
    let head = t.strip_suffix('{')?.trim_end();
    let (keyword, rest) = head.split_once(char::is_whitespace)?;
    if !keyword.eq_ignore_ascii_case("group") {
        return None;
    }
    let label = strip_quotes(rest.trim()).to_string();
    if label.is_empty() {
        return None;
    }
    Some(LineKind::GroupOpen { label })
}

/// `source ARROW [|label|] target [{attrs}]`
fn classify_edge(t: &str) -> Option<LineKind<'_>> {
    let (pos, arrow) = find_arrow(t)?;
    let source = clean_ref(&t[..pos]);
    let mut rest = t[pos + arrow.token().len()..].trim_start();

    let mut label = None;
    if let Some(after_pipe) = rest.strip_prefix('|') {
        if let Some(end) = after_pipe.find('|') {
            label = Some(after_pipe[..end].trim().to_string());
            rest = after_pipe[end + 1..].trim_start();
        }
    }

    let (target_text, attrs) = split_attrs(rest);
    let target = clean_ref(target_text);
    if source.is_empty() || target.is_empty() {
        return None;
    }
    Some(LineKind::Edge {
        source,
        arrow,
        label,
        target,
        attrs,
    })
}

/// `[kind] id: Label {attrs}` or `[kind] Label {attrs}` (id defaults to
/// the label text).
fn classify_node(t: &str) -> Option<LineKind<'_>> {
    let rest = t.strip_prefix('[')?;
    let close = rest.find(']')?;
    let kind = NodeKind::parse(&rest[..close]);
    let (body, attrs) = split_attrs(rest[close + 1..].trim());
    let body = body.trim();

    let (id, label) = match body.split_once(':') {
        Some((id, label)) => (
            strip_quotes(id.trim()).to_string(),
            strip_quotes(label.trim()).to_string(),
        ),
        None => {
            let label = strip_quotes(body).to_string();
            (label.clone(), label)
        }
    };
    let id = if id.is_empty() { label.clone() } else { id };
    if id.is_empty() {
        return None;
    }
    Some(LineKind::Node {
        kind,
        id,
        label,
        attrs,
    })
}

/// Find the earliest arrow occurrence, longest pattern first at each
/// position (`-->` must not be read as `->`).
fn find_arrow(t: &str) -> Option<(usize, ArrowKind)> {
    for (i, _) in t.char_indices() {
        for (pat, kind) in [
            ("-->", ArrowKind::Curved),
            ("..>", ArrowKind::Dashed),
            ("==>", ArrowKind::Thick),
            ("->", ArrowKind::Plain),
        ] {
            if t[i..].starts_with(pat) {
                return Some((i, kind));
            }
        }
    }
    None
}

/// Split trailing `{...}` attributes off the end of a line fragment.
fn split_attrs(t: &str) -> (&str, &str) {
    match t.find('{') {
        Some(brace) => (&t[..brace], t[brace..].trim()),
        None => (t, ""),
    }
}

/// Normalize an edge endpoint reference: strip a stray `[kind]` prefix the
/// generator sometimes leaves on refs, then surrounding quotes.
fn clean_ref(text: &str) -> String {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            t = rest[close + 1..].trim();
        }
    }
    strip_quotes(t).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::AttrValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let parsed = parse_source("\n   \n# section marker\n");
        assert!(parsed.nodes.is_empty());
        assert!(parsed.edges.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_metadata_line() {
        let parsed = parse_source("Flow: \"Checkout\"\nversion: 2\n");
        assert_eq!(
            parsed.metadata.get("flow"),
            Some(&AttrValue::String("Checkout".into()))
        );
        assert_eq!(parsed.metadata.get("version"), Some(&AttrValue::Number(2.0)));
    }

    #[test]
    fn test_line_with_arrow_is_not_metadata() {
        let parsed = parse_source("rate: 3 -> 4\n");
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.edges.len(), 1);
        assert_eq!(parsed.edges[0].source_ref, "rate: 3");
        assert_eq!(parsed.edges[0].target_ref, "4");
    }

    #[test]
    fn test_node_declaration_with_id_and_attrs() {
        let parsed = parse_source("[start] a: Begin {color:\"emerald\"}\n");
        assert_eq!(parsed.nodes.len(), 1);
        let node = &parsed.nodes[0];
        assert_eq!(node.id, "a");
        assert_eq!(node.kind, NodeKind::Start);
        assert_eq!(node.label, "Begin");
        assert_eq!(
            node.attributes.get("color"),
            Some(&AttrValue::String("emerald".into()))
        );
    }

    #[test]
    fn test_node_id_defaults_to_label() {
        let parsed = parse_source("[process] Validate Input\n");
        assert_eq!(parsed.nodes[0].id, "Validate Input");
        assert_eq!(parsed.nodes[0].label, "Validate Input");
    }

    #[test]
    fn test_node_label_may_be_empty() {
        let parsed = parse_source("[process] p1:\n");
        assert_eq!(parsed.nodes[0].id, "p1");
        assert_eq!(parsed.nodes[0].label, "");
    }

    #[test]
    fn test_node_without_id_or_label_ignored() {
        let parsed = parse_source("[process]\n[process] :\n");
        assert!(parsed.nodes.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_edge_arrow_kinds() {
        let parsed = parse_source("a -> b\nc --> d\ne ..> f\ng ==> h\n");
        let arrows: Vec<_> = parsed.edges.iter().map(|e| e.arrow).collect();
        assert_eq!(
            arrows,
            vec![
                ArrowKind::Plain,
                ArrowKind::Curved,
                ArrowKind::Dashed,
                ArrowKind::Thick
            ]
        );
    }

    #[test]
    fn test_edge_branch_label() {
        let parsed = parse_source("b ->|ok| c\n");
        let edge = &parsed.edges[0];
        assert_eq!(edge.label.as_deref(), Some("ok"));
        assert_eq!(edge.source_ref, "b");
        assert_eq!(edge.target_ref, "c");
    }

    #[test]
    fn test_edge_strips_stray_kind_prefix() {
        let parsed = parse_source("[process] a -> [end] b\n");
        // The '[' on the line keeps it out of metadata; edge wins over node.
        assert_eq!(parsed.edges.len(), 1);
        assert_eq!(parsed.edges[0].source_ref, "a");
        assert_eq!(parsed.edges[0].target_ref, "b");
    }

    #[test]
    fn test_edge_with_trailing_attrs() {
        let parsed = parse_source("a -> b {styleType: \"dashed\", weight: 2}\n");
        let edge = &parsed.edges[0];
        assert_eq!(edge.target_ref, "b");
        assert_eq!(edge.attributes.get("weight"), Some(&AttrValue::Number(2.0)));
    }

    #[test]
    fn test_group_nesting_assigns_parents() {
        let src = "group \"Outer\" {\n[process] x: X\ngroup \"Inner\" {\n[process] y: Y\n}\n}\n";
        let parsed = parse_source(src);
        assert!(parsed.errors.is_empty());
        let outer = &parsed.nodes[0];
        assert_eq!(outer.id, "group-1");
        assert_eq!(outer.kind, NodeKind::Group);
        assert_eq!(outer.label, "Outer");
        assert_eq!(parsed.nodes[1].parent_id.as_deref(), Some("group-1"));
        let inner = &parsed.nodes[2];
        assert_eq!(inner.id, "group-2");
        assert_eq!(inner.parent_id.as_deref(), Some("group-1"));
        assert_eq!(parsed.nodes[3].parent_id.as_deref(), Some("group-2"));
    }

    #[test]
    fn test_stray_closing_brace_is_line_error() {
        let parsed = parse_source("[process] a: A\n}\n");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 2);
        assert!(parsed.errors[0].message.contains("unexpected closing brace"));
        // Non-fatal: the node still parsed.
        assert_eq!(parsed.nodes.len(), 1);
    }

    #[test]
    fn test_unclosed_group_is_line_error() {
        let parsed = parse_source("group \"A\" {\n[process] x: X\n");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("never closed"));
        assert_eq!(parsed.nodes.len(), 2);
    }

    #[test]
    fn test_unrecognized_line_silently_ignored() {
        let parsed = parse_source("this matches nothing at all\n");
        assert!(parsed.nodes.is_empty());
        assert!(parsed.edges.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_group_keyword_case_insensitive() {
        let parsed = parse_source("GROUP Checkout {\n}\n");
        assert_eq!(parsed.nodes[0].kind, NodeKind::Group);
        assert_eq!(parsed.nodes[0].label, "Checkout");
    }
}
