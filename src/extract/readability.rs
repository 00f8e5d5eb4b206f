//! Lightweight strategy: fetch raw HTML and run Readability over it.
//!
//! Content scoring, boilerplate removal, title and publication-date lookup
//! all come from `dom_smoothie`, a port of Mozilla's Readability. This module
//! only fetches the page, decodes it to UTF-8 and maps the result onto an
//! [`Article`].
//!
//! Pages with more elements than [`ExtractOptions::max_elements`] are refused
//! before any scoring runs, which keeps pathological markup from pinning a
//! request.

use super::ExtractStrategy;
use crate::error::StrategyError;
use crate::models::Article;
use crate::utils::tidy_lines;
use async_trait::async_trait;
use dom_smoothie::{Config, Readability, TextMode};
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tracing::{debug, instrument, warn};
use url::Url;

/// Identity sent by the lightweight strategy.
const CRATE_USER_AGENT: &str = concat!("web_summarizer/", env!("CARGO_PKG_VERSION"));

/// How far into the document a `<meta charset>` declaration is looked for.
const CHARSET_SNIFF_BYTES: usize = 1024;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).expect("static regex is valid")
});

/// Tuning knobs for the Readability pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Require a longer article before Readability stops relaxing its filters.
    pub favor_precision: bool,
    /// Documents with more elements than this are rejected unparsed.
    pub max_elements: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            favor_precision: true,
            max_elements: 9000,
        }
    }
}

impl ExtractOptions {
    fn config(&self) -> Config {
        Config {
            max_elements_to_parse: self.max_elements,
            char_threshold: if self.favor_precision { 500 } else { 250 },
            text_mode: TextMode::Formatted,
            ..Config::default()
        }
    }
}

/// Title, date and body found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub date: String,
    pub text: String,
}

/// Run Readability over a decoded HTML document.
pub fn extract_document(html: &str, url: Option<&str>, opts: &ExtractOptions) -> Result<ExtractedPage, StrategyError> {
    let mut readability =
        Readability::new(html, url, Some(opts.config())).map_err(|e| StrategyError::Readability(e.to_string()))?;
    let article = readability
        .parse()
        .map_err(|e| StrategyError::Readability(e.to_string()))?;

    Ok(ExtractedPage {
        title: article.title.trim().to_string(),
        date: article
            .published_time
            .map(|d| d.trim().to_string())
            .unwrap_or_default(),
        text: tidy_lines(&article.text_content),
    })
}

/// Decode a response body to UTF-8.
///
/// A byte-order mark wins, then the `Content-Type` charset, then a
/// `<meta charset>` near the top of the document. Anything else is UTF-8.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(bytes));
    let (text, encoding, had_errors) = declared.unwrap_or(UTF_8).decode(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "Page contained undecodable bytes");
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

/// Fetches raw HTML with the crate's own identity and runs [`extract_document`].
#[derive(Debug, Clone)]
pub struct ReadabilityStrategy {
    client: reqwest::Client,
    options: ExtractOptions,
}

impl ReadabilityStrategy {
    pub fn new(client: reqwest::Client, options: ExtractOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl ExtractStrategy for ReadabilityStrategy {
    fn name(&self) -> &'static str {
        "readability"
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<Article, StrategyError> {
        let resp = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, CRATE_USER_AGENT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StrategyError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?;
        debug!(bytes = bytes.len(), content_type = ?content_type, "Fetched page");

        let html = decode_html(&bytes, content_type.as_deref());
        let page = extract_document(&html, Some(url.as_str()), &self.options)?;
        if page.text.is_empty() {
            return Err(StrategyError::Empty);
        }
        Ok(Article {
            title: page.title,
            date: page.date,
            text: page.text,
            url: url.to_string(),
        })
    }
}
