//! End-to-end `summarize(url)` orchestration.
//!
//! ```text
//! URL → DomainPolicy → ArticleExtractor → clamp → SummaryRequestBuilder
//!     → SummaryBackend → parse → validate → SummaryResult
//! ```
//!
//! Each call runs the chain exactly once: no retries, no caching, no sharing
//! between concurrent calls. Extraction failures and backend transport
//! failures are returned to the caller; anything wrong with the content of
//! the backend's answer is replaced by [`SummaryResult::fallback`].

use crate::api::{OllamaBackend, SummaryBackend};
use crate::clamp::clamp;
use crate::config::{OutputMode, Settings};
use crate::error::SummarizeError;
use crate::extract::ArticleExtractor;
use crate::models::{Article, SummaryResult};
use crate::parse::parse_summary;
use crate::prompt::SummaryRequestBuilder;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// Composes extraction, clamping, prompting and validation.
pub struct Summarizer {
    extractor: ArticleExtractor,
    backend: Box<dyn SummaryBackend>,
    max_chars: usize,
    mode: OutputMode,
}

impl Summarizer {
    pub fn new(
        extractor: ArticleExtractor,
        backend: Box<dyn SummaryBackend>,
        max_chars: usize,
        mode: OutputMode,
    ) -> Self {
        Self {
            extractor,
            backend,
            max_chars,
            mode,
        }
    }

    /// The production wiring: real strategies and an Ollama backend sharing one HTTP client.
    pub fn from_settings(settings: &Settings) -> Self {
        let client = reqwest::Client::new();
        Self::new(
            ArticleExtractor::from_settings(client.clone(), settings),
            Box::new(OllamaBackend::new(client, settings)),
            settings.max_chars,
            settings.output_mode,
        )
    }

    /// Output mode selected by configuration.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Extract the article behind `url` without summarizing it.
    pub async fn article(&self, url: &str) -> Result<Article, SummarizeError> {
        self.extractor.extract(url).await
    }

    /// Summarize `url` into a validated [`SummaryResult`].
    ///
    /// # Errors
    ///
    /// - [`SummarizeError::ExtractionFailed`] when no strategy yields text
    /// - [`SummarizeError::Backend`] when the backend cannot be reached
    ///
    /// Unparseable or out-of-schema backend output is not an error: the
    /// fallback result is returned instead.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn summarize(&self, url: &str) -> Result<SummaryResult, SummarizeError> {
        let article = self.article(url).await?;
        self.summarize_article(&article).await
    }

    /// Summarize an already extracted article.
    pub async fn summarize_article(&self, article: &Article) -> Result<SummaryResult, SummarizeError> {
        let raw = self.ask(article, OutputMode::Json).await?;

        match parse_summary(&raw) {
            Ok(result) => {
                info!(
                    summary_chars = result.summary.chars().count(),
                    tags = ?result.tags,
                    "Summary validated"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(&raw, 300),
                    "Model output rejected; using fallback result"
                );
                Ok(SummaryResult::fallback(&article.title))
            }
        }
    }

    /// Summarize `url` as freeform markdown, returned exactly as the model wrote it.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn summarize_freeform(&self, url: &str) -> Result<String, SummarizeError> {
        let article = self.article(url).await?;
        self.freeform_article(&article).await
    }

    /// Freeform markdown summary of an already extracted article.
    pub async fn freeform_article(&self, article: &Article) -> Result<String, SummarizeError> {
        self.ask(article, OutputMode::Markdown).await
    }

    /// Summarize `url` in the configured mode and render the text block the CLI prints.
    ///
    /// Nothing is rendered unless the whole call succeeds.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn report(&self, url: &str) -> Result<String, SummarizeError> {
        let article = self.article(url).await?;
        let body = match self.mode {
            OutputMode::Json => {
                let result = self.summarize_article(&article).await?;
                format!("Summary: {}\nTags: {}", result.summary, result.tags.iter().join(", "))
            }
            OutputMode::Markdown => self.freeform_article(&article).await?,
        };
        Ok(format!("Title: {}\n{body}", article.title))
    }

    /// Clamp the article, build the request for `mode` and return the raw reply text.
    async fn ask(&self, article: &Article, mode: OutputMode) -> Result<String, SummarizeError> {
        let content = clamp(&article.content(), self.max_chars);
        debug!(chars = content.chars().count(), "Clamped article text");

        let request = SummaryRequestBuilder::new(mode).build(&content);
        let raw = self.backend.complete(&request).await?.into_text();
        debug!(
            model = self.backend.model_name(),
            raw = %truncate_for_log(&raw, 2000),
            "Backend raw output"
        );
        Ok(raw)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Backend doubles for pipeline and server tests.

    use crate::api::{BackendReply, SummaryBackend};
    use crate::error::BackendError;
    use crate::prompt::SummaryRequest;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed text and records every request it receives.
    #[derive(Clone)]
    pub struct EchoBackend {
        pub reply: Option<String>,
        pub seen: Arc<Mutex<Vec<SummaryRequest>>>,
    }

    impl EchoBackend {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: Some(reply.into()),
                seen: Arc::default(),
            }
        }

        /// A backend whose every call fails at the transport level.
        pub fn unreachable() -> Self {
            Self {
                reply: None,
                seen: Arc::default(),
            }
        }

        pub fn requests(&self) -> Vec<SummaryRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SummaryBackend for EchoBackend {
        async fn complete(&self, request: &SummaryRequest) -> Result<BackendReply, BackendError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Some(text) => Ok(BackendReply::Text(text.clone())),
                None => Err(BackendError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                }),
            }
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }
}
