//! Layout adapter: 2D coordinates for a resolved graph
//!
//! Narrow contract: given final nodes and edges, assign positions in
//! place. Invoked once per successful compile or generation.

pub mod config;
mod engine;

pub use config::{Algorithm, Direction, LayoutConfig};

use tracing::debug;

use crate::graph::FlowGraph;

/// Assign positions to every node in the graph.
pub fn compute(graph: &mut FlowGraph, config: &LayoutConfig) {
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        algorithm = ?config.algorithm,
        "computing layout"
    );
    match config.algorithm {
        Algorithm::Layered => engine::layered(graph, config),
        Algorithm::Grid => engine::grid(graph, config),
    }
}
