//! FlowMind - a text-to-graph compiler for AI-written flow diagrams
//!
//! This library parses the FlowMind DSL (a lenient, line-oriented notation
//! for nodes, edges, and groups) into a validated, laid-out graph, and
//! wraps an external text-generation backend in a bounded self-correction
//! protocol for AI-assisted diagram generation.
//!
//! # Example
//!
//! ```rust
//! let graph = flowmind::compile("[start] a: Begin {color: \"emerald\"}\na -> b\n");
//! assert_eq!(graph.nodes.len(), 2);
//! assert_eq!(graph.edges.len(), 1);
//! assert!(graph.errors.is_empty());
//! ```

pub mod driver;
pub mod error;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod prompt;
pub mod quality;
pub mod resolver;
pub mod theme;

pub use driver::{DriverError, GenerationError, GenerationRequest, TextGenerator};
pub use error::LineError;
pub use graph::{FlowEdge, FlowGraph, FlowNode, Point};
pub use layout::{Algorithm, Direction, LayoutConfig};
pub use parser::{parse_source, AttrValue, AttributeMap, NodeKind, ParsedSource};
pub use quality::QualityReport;
pub use theme::Theme;

/// Configuration for the complete compile pipeline
#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// Theme for per-kind default styling
    pub theme: Theme,
    /// Skip the layout pass entirely (positions stay zeroed)
    pub skip_layout: bool,
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.skip_layout = true;
        self
    }
}

/// Compile FlowMind source to a themed, laid-out graph with default
/// configuration.
///
/// The compiler is lenient: this never fails. Structural problems are
/// carried in the returned graph's `errors`.
pub fn compile(source: &str) -> FlowGraph {
    compile_with_config(source, &CompileConfig::default())
}

/// Compile FlowMind source with custom configuration.
pub fn compile_with_config(source: &str, config: &CompileConfig) -> FlowGraph {
    let parsed = parser::parse_source(source);
    let mut graph = resolver::resolve(parsed);
    config.theme.apply(&mut graph);
    if !config.skip_layout {
        layout::compute(&mut graph, &config.layout);
    }
    graph
}

/// Generate a diagram through the self-correction driver, then theme and
/// lay out the validated result.
///
/// `context` is the diagram being edited, if any; `image` is an optional
/// sketch for multimodal backends.
pub async fn generate_diagram<G>(
    request: &str,
    context: Option<&FlowGraph>,
    image: Option<&[u8]>,
    generator: &mut G,
    config: &CompileConfig,
) -> Result<FlowGraph, DriverError>
where
    G: TextGenerator + ?Sized,
{
    let mut graph = driver::generate_validated_graph(request, context, image, generator).await?;
    config.theme.apply(&mut graph);
    if !config.skip_layout {
        layout::compute(&mut graph, &config.layout);
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_assigns_positions() {
        let graph = compile("[start] a: Begin\na -> b\n");
        let a = graph.node("a").unwrap().position;
        let b = graph.node("b").unwrap().position;
        assert_ne!(a, b);
    }

    #[test]
    fn test_compile_applies_default_theme() {
        let graph = compile("[start] a: Begin\n");
        assert!(graph.node("a").unwrap().attributes.contains_key("color"));
        assert!(graph.node("a").unwrap().attributes.contains_key("icon"));
    }

    #[test]
    fn test_without_layout_keeps_positions_zeroed() {
        let config = CompileConfig::new().without_layout();
        let graph = compile_with_config("a -> b\n", &config);
        assert_eq!(graph.node("a").unwrap().position, Point::default());
        assert_eq!(graph.node("b").unwrap().position, Point::default());
    }

    #[test]
    fn test_compile_never_fails_on_junk() {
        let graph = compile("complete nonsense\n}\nmore nonsense\n");
        assert!(graph.nodes.is_empty());
        assert!(!graph.errors.is_empty());
    }
}
