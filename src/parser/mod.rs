//! Parser for the FlowMind DSL

pub mod ast;
pub mod attrs;
pub mod grammar;
pub mod lexer;

pub use ast::{ArrowKind, AttrValue, AttributeMap, DeclaredEdge, DeclaredNode, NodeKind, ParsedSource};
pub use attrs::parse_attributes;
pub use grammar::parse_source;
