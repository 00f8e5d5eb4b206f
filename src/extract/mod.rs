//! Article extraction with per-domain policy and ordered fallback.
//!
//! Every way of turning a URL into an [`Article`] implements
//! [`ExtractStrategy`]. The [`ArticleExtractor`] picks a plan per URL:
//!
//! | Policy decision | Plan |
//! |-----------------|------|
//! | heavy fetch forced | [`browser`] only |
//! | otherwise | [`readability`], then [`generic`] |
//!
//! Strategies in a plan run in order until one yields non-empty text. If all
//! of them fail the call fails with
//! [`SummarizeError::ExtractionFailed`](crate::error::SummarizeError::ExtractionFailed),
//! carrying each strategy's reason.
//!
//! # Supported Strategies
//!
//! | Strategy | Module | Method | User-Agent |
//! |----------|--------|--------|------------|
//! | readability | [`readability`] | HTTP fetch + charset decoding + Readability | crate identity |
//! | generic | [`generic`] | HTTP fetch + whole-body text | configured browser UA |
//! | browser | [`browser`] | WebDriver-rendered page | configured browser UA |

pub mod browser;
pub mod generic;
pub mod readability;

use crate::config::Settings;
use crate::error::{StrategyError, SummarizeError};
use crate::models::Article;
use crate::policy::DomainPolicy;
use async_trait::async_trait;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// One way of fetching a page and pulling its article out.
#[async_trait]
pub trait ExtractStrategy: Send + Sync {
    /// Short name used in logs and failure reasons.
    fn name(&self) -> &'static str;

    /// Fetch `url` and extract its content.
    ///
    /// Implementations return [`StrategyError::Empty`] rather than an
    /// `Article` with blank text.
    async fn fetch(&self, url: &Url) -> Result<Article, StrategyError>;
}

/// Produces an [`Article`] for a URL using the configured strategies.
pub struct ArticleExtractor {
    policy: DomainPolicy,
    heavy: Box<dyn ExtractStrategy>,
    fallbacks: Vec<Box<dyn ExtractStrategy>>,
}

impl ArticleExtractor {
    /// Assemble an extractor from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `policy` - Decides when `heavy` is mandatory
    /// * `heavy` - Strategy used alone for heavy-fetch domains
    /// * `fallbacks` - Strategies tried in order for every other URL
    pub fn new(
        policy: DomainPolicy,
        heavy: Box<dyn ExtractStrategy>,
        fallbacks: Vec<Box<dyn ExtractStrategy>>,
    ) -> Self {
        Self {
            policy,
            heavy,
            fallbacks,
        }
    }

    /// The standard extractor: browser for listed domains, readability then generic otherwise.
    pub fn from_settings(client: reqwest::Client, settings: &Settings) -> Self {
        Self::new(
            DomainPolicy::new(settings.heavy_domains.iter().cloned()),
            Box::new(browser::BrowserStrategy::new(
                settings.webdriver_url.clone(),
                settings.user_agent.clone(),
            )),
            vec![
                Box::new(readability::ReadabilityStrategy::new(
                    client.clone(),
                    readability::ExtractOptions::default(),
                )),
                Box::new(generic::GenericStrategy::new(client, settings.user_agent.clone())),
            ],
        )
    }

    /// Strategies that will be tried for `url`, in order.
    fn plan(&self, url: &str) -> Vec<&dyn ExtractStrategy> {
        if self.policy.classify(url).force_heavy_fetch {
            vec![self.heavy.as_ref()]
        } else {
            self.fallbacks.iter().map(|s| s.as_ref()).collect()
        }
    }

    /// Extract the article behind `url`.
    ///
    /// # Errors
    ///
    /// [`SummarizeError::ExtractionFailed`] when the URL does not parse or no
    /// strategy produced usable text.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract(&self, url: &str) -> Result<Article, SummarizeError> {
        let parsed = Url::parse(url.trim()).map_err(|e| SummarizeError::ExtractionFailed {
            url: url.to_string(),
            reason: format!("invalid URL: {e}"),
        })?;
        let normalized = parsed.as_str();

        let mut failures = Vec::new();
        for strategy in self.plan(normalized) {
            debug!(strategy = strategy.name(), "Trying extraction strategy");
            match strategy.fetch(&parsed).await {
                Ok(article) if !article.text.trim().is_empty() => {
                    info!(
                        strategy = strategy.name(),
                        title = %article.title,
                        chars = article.text.chars().count(),
                        "Extracted article"
                    );
                    return Ok(article);
                }
                Ok(_) => {
                    warn!(strategy = strategy.name(), "Strategy produced no text");
                    failures.push((strategy.name(), StrategyError::Empty.to_string()));
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Strategy failed");
                    failures.push((strategy.name(), e.to_string()));
                }
            }
        }

        Err(SummarizeError::ExtractionFailed {
            url: normalized.to_string(),
            reason: failures
                .iter()
                .map(|(name, reason)| format!("{name}: {reason}"))
                .join("; "),
        })
    }
}
