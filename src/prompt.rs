//! Prompt construction for the generation backend
//!
//! The backend is asked to answer in raw FlowMind source. Every prompt
//! embeds the same compact skill reference so correction and improvement
//! rounds see the identical contract.

use crate::graph::FlowGraph;

/// Compact FlowMind reference embedded in every generation prompt.
pub const SKILL_REFERENCE: &str = r#"You write FlowMind, a line-oriented diagram notation. Respond with raw
FlowMind source only - no markdown fences, no commentary.

SYNTAX
  name: "value"                       metadata (one per line)
  [kind] id: Label {attrs}            node declaration (id optional)
  group "Label" {                     open a group; close with } on its own line
  a -> b                              edge; also --> (curved), ..> (dashed), ==> (thick)
  a ->|Yes| b                         edge with a branch label
  # comment                           ignored

KINDS
  start, process, decision, end, system, note, section, browser, mobile,
  button, input, icon, placeholder, container

ATTRIBUTES
  {color: "emerald", icon: "Zap", subLabel: "short description"}
  Give every node a color, an icon, and a subLabel.

GUIDELINES
  - Use at least 3 distinct node kinds on flows with 5+ nodes.
  - Decisions should branch: two or more outgoing edges with |labels|.
  - Reference nodes by their declared id."#;

/// Build the initial generation prompt, with the current graph re-emitted
/// as source when the request edits an existing diagram.
pub fn generation_prompt(request: &str, context: Option<&FlowGraph>) -> String {
    let mut prompt = String::from(SKILL_REFERENCE);
    if let Some(graph) = context {
        prompt.push_str("\n\nCURRENT DIAGRAM (modify it; keep existing ids and labels stable):\n");
        prompt.push_str(&graph.to_source());
    }
    prompt.push_str("\n\nREQUEST:\n");
    prompt.push_str(request);
    prompt
}

/// Build the one parse-correction prompt, embedding the literal error.
pub fn correction_prompt(request: &str, failed_source: &str, error: &str) -> String {
    format!(
        "{SKILL_REFERENCE}\n\nYour previous output could not be parsed.\n\
         ERROR: {error}\n\nPREVIOUS OUTPUT:\n{failed_source}\n\n\
         Rewrite it as valid FlowMind source for this request:\n{request}"
    )
}

/// Build the one best-effort quality-retry prompt, enumerating the issues.
pub fn quality_prompt(request: &str, source: &str, issues: &[String]) -> String {
    let mut listed = String::new();
    for issue in issues {
        listed.push_str("  - ");
        listed.push_str(issue);
        listed.push('\n');
    }
    format!(
        "{SKILL_REFERENCE}\n\nYour previous output parsed but has quality issues:\n{listed}\n\
         PREVIOUS OUTPUT:\n{source}\n\n\
         Produce an improved version for this request, fixing every issue:\n{request}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::resolver::resolve;

    #[test]
    fn test_generation_prompt_embeds_request() {
        let prompt = generation_prompt("signup flow", None);
        assert!(prompt.contains("signup flow"));
        assert!(prompt.contains("FlowMind"));
        assert!(!prompt.contains("CURRENT DIAGRAM"));
    }

    #[test]
    fn test_generation_prompt_embeds_context_source() {
        let graph = resolve(parse_source("[start] a: Begin\n"));
        let prompt = generation_prompt("add an end state", Some(&graph));
        assert!(prompt.contains("CURRENT DIAGRAM"));
        assert!(prompt.contains("[start] a: Begin"));
    }

    #[test]
    fn test_correction_prompt_embeds_literal_error() {
        let prompt = correction_prompt("x", "garbage", "line 2: unexpected closing brace");
        assert!(prompt.contains("line 2: unexpected closing brace"));
        assert!(prompt.contains("garbage"));
    }

    #[test]
    fn test_quality_prompt_enumerates_issues() {
        let issues = vec!["no branching".to_string(), "low type diversity".to_string()];
        let prompt = quality_prompt("x", "src", &issues);
        assert!(prompt.contains("- no branching"));
        assert!(prompt.contains("- low type diversity"));
    }
}
