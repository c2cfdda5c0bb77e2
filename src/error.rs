//! Error types for parsing and diagnostics

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A non-fatal structural problem on a single source line.
///
/// The grammar is tolerant by design: a line error never aborts parsing.
/// Errors are collected and carried alongside the parsed graph so callers
/// can decide how loudly to report them.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct LineError {
    /// 1-based source line number
    pub line: usize,
    /// Byte range of the offending line
    pub span: Span,
    pub message: String,
}

impl LineError {
    pub fn new(line: usize, span: Span, message: impl Into<String>) -> Self {
        Self {
            line,
            span,
            message: message.into(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        Report::build(ReportKind::Warning, filename, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}
