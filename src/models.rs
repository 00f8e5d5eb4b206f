//! Data models shared by the pipeline and its front ends.
//!
//! - [`Article`]: normalized page content produced by the extractor
//! - [`SummaryResult`]: validated synopsis and tags (or the fallback pair)
//! - [`SummarizeRequest`], [`FreeformBody`], [`ErrorBody`], [`StatusBody`]: HTTP payloads
//!
//! All values are built once and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Tags returned when the backend output could not be validated.
pub const FALLBACK_TAGS: [&str; 2] = ["generation-failed", "fallback"];

/// Summary used when the fallback has no title to work with.
pub const FALLBACK_SUMMARY: &str = "summary generation failed";

/// Longest title prefix (in characters) reused as a fallback summary.
const FALLBACK_TITLE_CHARS: usize = 100;

/// Readable content extracted from a single web page.
///
/// # Fields
///
/// * `title` - Page or article title, possibly empty
/// * `date` - Publication date exactly as the page states it, possibly empty
/// * `text` - Article body; never empty for an `Article` returned by the extractor
/// * `url` - The normalized input URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub date: String,
    pub text: String,
    pub url: String,
}

impl Article {
    /// The text handed to the clamper: title, a blank line, then the body.
    pub fn content(&self) -> String {
        format!("{}\n\n{}", self.title, self.text)
    }
}

/// A short synopsis plus topical tags, ordered by importance.
///
/// Either both fields passed validation, or this is the value produced by
/// [`SummaryResult::fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub tags: Vec<String>,
}

impl SummaryResult {
    /// Build the degraded result substituted for unusable backend output.
    ///
    /// The summary is the trimmed title cut to 100 characters, or
    /// [`FALLBACK_SUMMARY`] when the title is blank. The tags are always
    /// [`FALLBACK_TAGS`].
    pub fn fallback(title: &str) -> Self {
        let summary: String = title.trim().chars().take(FALLBACK_TITLE_CHARS).collect();
        let summary = if summary.is_empty() {
            FALLBACK_SUMMARY.to_string()
        } else {
            summary
        };
        Self {
            summary,
            tags: FALLBACK_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Whether this value is the degraded fallback.
    pub fn is_fallback(&self) -> bool {
        self.tags.iter().map(String::as_str).eq(FALLBACK_TAGS)
    }
}

/// Body of `POST /summarize`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizeRequest {
    pub url: String,
}

/// Body of a `POST /summarize` answer in markdown mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FreeformBody {
    pub markdown: String,
}

/// Body returned with HTTP 500.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Body of the `GET /` liveness probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_content_joins_title_and_body() {
        let article = Article {
            title: "Title".to_string(),
            date: String::new(),
            text: "Body".to_string(),
            url: "https://example.com/".to_string(),
        };
        assert_eq!(article.content(), "Title\n\nBody");
    }

    #[test]
    fn test_fallback_uses_title() {
        let r = SummaryResult::fallback("  测试文章  ");
        assert_eq!(r.summary, "测试文章");
        assert_eq!(r.tags, vec!["generation-failed", "fallback"]);
        assert!(r.is_fallback());
    }

    #[test]
    fn test_fallback_truncates_by_chars() {
        let title = "标".repeat(150);
        let r = SummaryResult::fallback(&title);
        assert_eq!(r.summary.chars().count(), 100);
    }

    #[test]
    fn test_fallback_blank_title() {
        let r = SummaryResult::fallback(" \n\t ");
        assert_eq!(r.summary, FALLBACK_SUMMARY);
        assert_eq!(r.tags.len(), 2);
    }

    #[test]
    fn test_summary_result_serialization() {
        let r = SummaryResult {
            summary: "s".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        };
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"summary":"s","tags":["a","b"]}"#);
        assert!(!r.is_fallback());
    }
}
