//! Quality gate and self-correction driver
//!
//! Wraps an opaque, possibly-failing text-generation backend in a bounded
//! correction protocol: at most one retry when the parse fails, at most
//! one best-effort retry when the parse succeeds but quality heuristics
//! flag issues. The backend is called at most three times, strictly in
//! sequence, and backend failures always propagate unchanged.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::FlowGraph;
use crate::parser::parse_source;
use crate::prompt;
use crate::quality;
use crate::resolver::resolve;

/// Failure reported by the generation backend (network, auth, quota).
/// Never retried by the driver; surfaced to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct GenerationError(pub String);

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Terminal driver failure. Distinguishes "could not parse" (both parse
/// attempts failed) from "could not generate" (backend error).
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not parse generated diagram: {0}")]
    Parse(String),
    #[error("could not generate diagram: {0}")]
    Generation(#[from] GenerationError),
}

/// One request to the generation backend.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Raw image bytes for multimodal backends (sketch-to-diagram).
    pub image: Option<Vec<u8>>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    /// Image payload as a base64 data URL, the form most backends accept.
    pub fn image_data_url(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|bytes| format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
    }
}

/// The external text-generation collaborator.
#[async_trait]
pub trait TextGenerator {
    async fn generate(&mut self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Generate a diagram from a request, parse and validate it, and drive the
/// bounded correction protocol. Returns the resolved graph without layout;
/// the caller runs the layout adapter once on success.
pub async fn generate_validated_graph<G>(
    request: &str,
    context: Option<&FlowGraph>,
    image: Option<&[u8]>,
    generator: &mut G,
) -> Result<FlowGraph, DriverError>
where
    G: TextGenerator + ?Sized,
{
    let first = prompt::generation_prompt(request, context);
    let mut text = ask(generator, first, image).await?;

    let mut graph = match try_compile(&text) {
        Ok(graph) => graph,
        Err(parse_error) => {
            warn!(error = %parse_error, "initial parse failed; requesting one correction");
            let retry = prompt::correction_prompt(request, &text, &parse_error);
            text = ask(generator, retry, image).await?;
            try_compile(&text).map_err(DriverError::Parse)?
        }
    };

    let report = quality::assess(&graph);
    if !report.is_acceptable() {
        debug!(
            issues = report.issues.len(),
            "quality shortfall; attempting one improvement pass"
        );
        let retry = prompt::quality_prompt(request, &text, &report.issues);
        let candidate_text = ask(generator, retry, image).await?;
        match try_compile(&candidate_text) {
            Ok(candidate) if !candidate.nodes.is_empty() => graph = candidate,
            _ => debug!("improvement pass rejected; keeping original graph"),
        }
    }

    Ok(graph)
}

async fn ask<G>(
    generator: &mut G,
    prompt: String,
    image: Option<&[u8]>,
) -> Result<String, GenerationError>
where
    G: TextGenerator + ?Sized,
{
    let mut request = GenerationRequest::new(prompt);
    if let Some(bytes) = image {
        request = request.with_image(bytes.to_vec());
    }
    let raw = generator.generate(&request).await?;
    Ok(strip_code_fences(&raw))
}

/// Parse and resolve generated text, treating structural line errors and
/// an empty node set as parse failures.
fn try_compile(text: &str) -> Result<FlowGraph, String> {
    let parsed = parse_source(text);
    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        return Err(messages.join("; "));
    }
    let graph = resolve(parsed);
    if graph.nodes.is_empty() {
        return Err("no nodes found in generated text".to_string());
    }
    Ok(graph)
}

/// Strip Markdown code-fence artifacts the backend tends to wrap its
/// answer in, keeping the fenced interior.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed.to_string();
    };
    // Skip the opening fence line (which may carry a language tag).
    let after_fence = &trimmed[start + 3..];
    let body = match after_fence.find('\n') {
        Some(nl) => &after_fence[nl + 1..],
        None => after_fence,
    };
    let body = match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        let raw = "```flowmind\n[start] a: Begin\n```";
        assert_eq!(strip_code_fences(raw), "[start] a: Begin");
    }

    #[test]
    fn test_strip_fences_with_surrounding_prose() {
        let raw = "Here you go:\n```\n[start] a: Begin\na -> b\n```\nEnjoy!";
        assert_eq!(strip_code_fences(raw), "[start] a: Begin\na -> b");
    }

    #[test]
    fn test_unfenced_text_passes_through() {
        assert_eq!(strip_code_fences("  [start] a: A  "), "[start] a: A");
    }

    #[test]
    fn test_try_compile_rejects_empty_and_broken_text() {
        assert!(try_compile("nothing declarable here").is_err());
        let err = try_compile("[process] a: A\n}\n").unwrap_err();
        assert!(err.contains("unexpected closing brace"));
    }

    #[test]
    fn test_image_data_url_prefix() {
        let request = GenerationRequest::new("p").with_image(vec![1, 2, 3]);
        let url = request.image_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(GenerationRequest::new("p").image_data_url(), None);
    }
}
