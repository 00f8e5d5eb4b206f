//! Instruction payloads for the generative backend.
//!
//! A request is a fixed system directive plus a user message holding the
//! field constraints followed by the clamped article text. The JSON mode
//! demands a single bare object; the markdown mode asks for readable prose.

use crate::config::OutputMode;

const JSON_SYSTEM: &str = "You are an assistant that outputs JSON only. \
Never output explanations, prefixes, suffixes, Markdown code blocks or backticks. \
The output must be one valid JSON object wrapped in a single pair of curly braces.";

const JSON_INSTRUCTIONS: &str = "\
Based on the article text below, produce a structured summary with tags. Return strictly JSON with these fields and constraints:
- summary: a summary of 120 to 220 characters written in the article's language; no line breaks; rely only on the given text; do not add outside information or guess dates.
- tags: 3 to 6 tags, nouns or short phrases, ordered by importance (most important first); never include the word \"tag\"; no punctuation.

Return JSON only. No Markdown, no ```, no explanatory text.";

const MARKDOWN_SYSTEM: &str = "You are an assistant that writes concise, faithful summaries of web articles in Markdown.";

const MARKDOWN_INSTRUCTIONS: &str = "\
Summarize the article text below in Markdown, in the article's language:
- Start with a one-sentence overview in bold.
- Follow with 3 to 5 bullet points covering the key facts.
- End with a line `Tags: ` followed by 3 to 6 comma-separated topical tags.
Rely only on the given text.";

/// A fully assembled request for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub system: String,
    pub user: String,
    pub mode: OutputMode,
}

impl SummaryRequest {
    /// Whether the backend should be told to emit structured output.
    pub fn wants_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}

/// Builds [`SummaryRequest`]s for one output mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRequestBuilder {
    mode: OutputMode,
}

impl SummaryRequestBuilder {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Assemble the request for already-clamped `content` (title, blank line, body).
    pub fn build(&self, content: &str) -> SummaryRequest {
        let (system, instructions) = match self.mode {
            OutputMode::Json => (JSON_SYSTEM, JSON_INSTRUCTIONS),
            OutputMode::Markdown => (MARKDOWN_SYSTEM, MARKDOWN_INSTRUCTIONS),
        };
        SummaryRequest {
            system: system.to_string(),
            user: format!("{instructions}\n\nArticle text (including title):\n{content}\n"),
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_carries_constraints_and_content() {
        let req = SummaryRequestBuilder::new(OutputMode::Json).build("Title\n\nBody text");
        assert!(req.wants_json());
        assert!(req.system.contains("JSON only"));
        assert!(req.user.contains("120 to 220 characters"));
        assert!(req.user.contains("3 to 6 tags"));
        assert!(req.user.contains("no punctuation"));
        assert!(req.user.ends_with("Title\n\nBody text\n"));
    }

    #[test]
    fn test_content_is_inserted_verbatim() {
        // braces in the article must not be treated as template variables
        let content = "fn main() { println!(\"{}\", 1); }";
        let req = SummaryRequestBuilder::new(OutputMode::Json).build(content);
        assert!(req.user.contains(content));
    }

    #[test]
    fn test_markdown_request() {
        let req = SummaryRequestBuilder::new(OutputMode::Markdown).build("T\n\nB");
        assert!(!req.wants_json());
        assert!(req.user.contains("Tags: "));
        assert!(!req.system.contains("JSON"));
    }

    #[test]
    fn test_default_mode_is_json() {
        assert!(SummaryRequestBuilder::default().build("T\n\nB").wants_json());
    }
}
