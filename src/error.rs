//! Error taxonomy for the summarization pipeline.
//!
//! Errors fall into two groups:
//!
//! - **Fatal** ([`SummarizeError`]): extraction exhausted every strategy, or
//!   the generative backend could not be reached. These reach the caller as an
//!   HTTP 500, a non-zero exit code, or a printed message.
//! - **Recoverable** ([`PayloadError`]): the backend answered, but the answer
//!   could not be turned into a valid [`SummaryResult`](crate::models::SummaryResult).
//!   The orchestrator absorbs these into the fallback result.

use thiserror::Error;

/// Failure of a single extraction strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("browser session failed: {0}")]
    Browser(String),

    #[error("content extraction failed: {0}")]
    Readability(String),

    #[error("page has no usable text")]
    Empty,
}

/// Why a backend reply could not be turned into a summary.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("no JSON object found in model output")]
    NoPayloadFound,

    #[error("model output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

/// Transport or protocol failure while talking to the generative backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend reply carried no content")]
    EmptyReply,
}

/// Caller-visible failure of a `summarize` call.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("failed to extract article from {url}: {reason}")]
    ExtractionFailed { url: String, reason: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Problems loading [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("max_chars = {max_chars} is below the minimum clamp budget of {min}")]
    BudgetTooSmall { max_chars: usize, min: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_failed_message_names_url() {
        let err = SummarizeError::ExtractionFailed {
            url: "https://example.com/a".to_string(),
            reason: "readability: page has no usable text".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/a"));
        assert!(msg.contains("no usable text"));
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err: SummarizeError = BackendError::Status {
            status: 503,
            body: "loading model".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "backend returned HTTP 503: loading model");
    }
}
