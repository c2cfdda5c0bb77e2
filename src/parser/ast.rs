//! Intermediate types produced by the FlowMind grammar

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LineError;

/// A typed scalar attribute value.
///
/// Attribute bags in the source are loosely typed; representing each entry
/// as a tagged value keeps the resolver's style mapping exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// Attribute name to typed value; keys unique, order-independent.
///
/// A `BTreeMap` keeps iteration deterministic, which the resolver's
/// stable-output contract relies on.
pub type AttributeMap = BTreeMap<String, AttrValue>;

/// The fixed node kind vocabulary.
///
/// Unrecognized kind words fall back to [`NodeKind::Process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Start,
    Process,
    Decision,
    End,
    Custom,
    Annotation,
    Section,
    Browser,
    Mobile,
    WireframeButton,
    WireframeInput,
    Icon,
    WireframeImage,
    Container,
    Group,
}

impl NodeKind {
    /// Map a kind word from the source to its canonical kind.
    pub fn parse(word: &str) -> NodeKind {
        match word.trim().to_ascii_lowercase().as_str() {
            "start" => NodeKind::Start,
            "process" => NodeKind::Process,
            "decision" => NodeKind::Decision,
            "end" => NodeKind::End,
            "system" | "custom" => NodeKind::Custom,
            "note" | "annotation" => NodeKind::Annotation,
            "section" => NodeKind::Section,
            "browser" => NodeKind::Browser,
            "mobile" => NodeKind::Mobile,
            "button" | "wireframe_button" => NodeKind::WireframeButton,
            "input" | "wireframe_input" => NodeKind::WireframeInput,
            "icon" => NodeKind::Icon,
            "placeholder" | "wireframe_image" => NodeKind::WireframeImage,
            "container" => NodeKind::Container,
            "group" => NodeKind::Group,
            _ => NodeKind::Process,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Process => "process",
            NodeKind::Decision => "decision",
            NodeKind::End => "end",
            NodeKind::Custom => "custom",
            NodeKind::Annotation => "annotation",
            NodeKind::Section => "section",
            NodeKind::Browser => "browser",
            NodeKind::Mobile => "mobile",
            NodeKind::WireframeButton => "wireframe_button",
            NodeKind::WireframeInput => "wireframe_input",
            NodeKind::Icon => "icon",
            NodeKind::WireframeImage => "wireframe_image",
            NodeKind::Container => "container",
            NodeKind::Group => "group",
        }
    }

    /// Annotations are commentary; every other kind counts toward the
    /// quality heuristics.
    pub fn is_substantive(&self) -> bool {
        !matches!(self, NodeKind::Annotation)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Arrow notation on an edge line, determining the default style mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
    /// `->`
    Plain,
    /// `-->`
    Curved,
    /// `..>`
    Dashed,
    /// `==>`
    Thick,
}

impl ArrowKind {
    /// Presentation hint carried on the edge record, if any.
    pub fn style_type(&self) -> Option<&'static str> {
        match self {
            ArrowKind::Plain => None,
            ArrowKind::Curved => Some("curved"),
            ArrowKind::Dashed => Some("dashed"),
            ArrowKind::Thick => Some("thick"),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ArrowKind::Plain => "->",
            ArrowKind::Curved => "-->",
            ArrowKind::Dashed => "..>",
            ArrowKind::Thick => "==>",
        }
    }
}

/// A parsed node declaration, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Set when declared inside a `group { }` block
    pub parent_id: Option<String>,
    pub attributes: AttributeMap,
}

/// A parsed edge declaration. Refs may name a node by id or label, or
/// reference a node that does not exist yet (an implicit node).
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredEdge {
    pub source_ref: String,
    pub target_ref: String,
    /// Piped branch label, e.g. `->|Yes|`
    pub label: Option<String>,
    pub arrow: ArrowKind,
    pub attributes: AttributeMap,
}

/// Output of the line classifier: everything the resolver needs, plus the
/// non-fatal diagnostics collected along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSource {
    pub nodes: Vec<DeclaredNode>,
    pub edges: Vec<DeclaredEdge>,
    pub metadata: AttributeMap,
    pub errors: Vec<LineError>,
}
