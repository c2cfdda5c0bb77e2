//! Theme system for per-kind default styling
//!
//! Themes fill in `color` and `icon` attributes for nodes that lack them,
//! keyed by node kind. They never overwrite attributes the source (or the
//! generation backend) set explicitly, and they run after resolution so
//! the quality gate still sees what the backend actually produced.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::graph::FlowGraph;
use crate::parser::ast::{AttrValue, NodeKind};

/// Errors that can occur when loading or parsing theme files
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse theme TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default styling for one node kind.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct KindStyle {
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// A theme mapping node kinds to default styling.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: Option<String>,
    pub description: Option<String>,
    kinds: HashMap<String, KindStyle>,
}

/// TOML structure for deserializing themes
#[derive(Deserialize)]
struct TomlTheme {
    metadata: Option<TomlMetadata>,
    kinds: HashMap<String, KindStyle>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Default palette: tailwind-ish hues with lucide icon names.
const DEFAULT_THEME: &str = r#"
[kinds.start]
color = "emerald"
icon = "Play"

[kinds.process]
color = "blue"
icon = "Settings"

[kinds.decision]
color = "amber"
icon = "GitBranch"

[kinds.end]
color = "red"
icon = "Flag"

[kinds.custom]
color = "purple"
icon = "Box"

[kinds.annotation]
color = "slate"
icon = "StickyNote"

[kinds.section]
color = "gray"
icon = "Layers"

[kinds.browser]
color = "sky"
icon = "Globe"

[kinds.mobile]
color = "teal"
icon = "Smartphone"

[kinds.wireframe_button]
color = "indigo"
icon = "MousePointer"

[kinds.wireframe_input]
color = "indigo"
icon = "TextCursorInput"

[kinds.icon]
color = "pink"
icon = "Star"

[kinds.wireframe_image]
color = "stone"
icon = "Image"

[kinds.container]
color = "zinc"
icon = "Package"
"#;

impl Theme {
    /// Load theme from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load theme from TOML string
    pub fn from_str(content: &str) -> Result<Self, ThemeError> {
        let parsed: TomlTheme = toml::from_str(content)?;
        Ok(Theme {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            kinds: parsed.kinds,
        })
    }

    /// Default styling for a kind, if the theme defines one.
    pub fn style_for(&self, kind: NodeKind) -> Option<&KindStyle> {
        self.kinds.get(kind.as_str())
    }

    /// Fill missing `color` and `icon` attributes from the theme. Group
    /// nodes are containers, not shapes, and are left alone.
    pub fn apply(&self, graph: &mut FlowGraph) {
        for node in &mut graph.nodes {
            if node.kind == NodeKind::Group {
                continue;
            }
            let Some(style) = self.style_for(node.kind) else {
                continue;
            };
            if let Some(color) = &style.color {
                node.attributes
                    .entry("color".to_string())
                    .or_insert_with(|| AttrValue::String(color.clone()));
            }
            if let Some(icon) = &style.icon {
                node.attributes
                    .entry("icon".to_string())
                    .or_insert_with(|| AttrValue::String(icon.clone()));
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_str(DEFAULT_THEME).expect("Default theme should be valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::resolver::resolve;

    #[test]
    fn test_default_theme_covers_core_kinds() {
        let theme = Theme::default();
        for kind in [
            NodeKind::Start,
            NodeKind::Process,
            NodeKind::Decision,
            NodeKind::End,
        ] {
            assert!(theme.style_for(kind).is_some(), "no style for {kind}");
        }
    }

    #[test]
    fn test_apply_fills_only_missing_attributes() {
        let mut graph = resolve(parse_source(
            "[start] a: Begin {color: \"crimson\"}\n[process] b: Work\n",
        ));
        Theme::default().apply(&mut graph);
        // Explicit color preserved, icon filled in.
        let a = graph.node("a").unwrap();
        assert_eq!(a.attributes.get("color"), Some(&AttrValue::String("crimson".into())));
        assert_eq!(a.attributes.get("icon"), Some(&AttrValue::String("Play".into())));
        // Everything filled for the bare node.
        let b = graph.node("b").unwrap();
        assert_eq!(b.attributes.get("color"), Some(&AttrValue::String("blue".into())));
        assert_eq!(b.attributes.get("icon"), Some(&AttrValue::String("Settings".into())));
    }

    #[test]
    fn test_groups_left_untouched() {
        let mut graph = resolve(parse_source("group \"G\" {\n[process] x: X\n}\n"));
        Theme::default().apply(&mut graph);
        assert!(graph.node("group-1").unwrap().attributes.is_empty());
    }

    #[test]
    fn test_custom_theme_with_metadata() {
        let toml_str = r#"
[metadata]
name = "Mono"

[kinds.process]
color = "black"
"#;
        let theme = Theme::from_str(toml_str).expect("should parse");
        assert_eq!(theme.name.as_deref(), Some("Mono"));
        assert_eq!(
            theme.style_for(NodeKind::Process).unwrap().color.as_deref(),
            Some("black")
        );
        assert!(theme.style_for(NodeKind::Start).is_none());
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(Theme::from_str("not toml {{{{").is_err());
    }
}
