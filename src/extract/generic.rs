//! Generic rendering strategy: the whole page as plain text.
//!
//! No content scoring happens here. The page body is flattened to text with
//! only scripts and styles removed, and the title comes from page metadata.
//! Used when the readability heuristic fails or finds nothing.

use super::ExtractStrategy;
use crate::error::StrategyError;
use crate::models::Article;
use crate::utils::tidy_lines;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::USER_AGENT;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("static selector is valid"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("static selector is valid"));
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("static selector is valid"));

const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Title and text of a whole page.
pub fn page_text(html: &str) -> (String, String) {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>())
        .or_else(|| {
            doc.select(&OG_TITLE)
                .next()
                .and_then(|m| m.value().attr("content"))
                .map(str::to_string)
        })
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let mut raw = String::new();
    if let Some(body) = doc.select(&BODY).next() {
        visible_text(body, &mut raw);
    }
    (title, tidy_lines(&raw))
}

fn visible_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if INVISIBLE_TAGS.contains(&e.name()) => {}
            Node::Element(e) => {
                if e.name() == "br" {
                    out.push('\n');
                } else if let Some(child_el) = ElementRef::wrap(child) {
                    visible_text(child_el, out);
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Plain fetch with a browser `User-Agent`, set on each request.
#[derive(Debug, Clone)]
pub struct GenericStrategy {
    client: reqwest::Client,
    user_agent: String,
}

impl GenericStrategy {
    pub fn new(client: reqwest::Client, user_agent: String) -> Self {
        Self { client, user_agent }
    }
}

#[async_trait]
impl ExtractStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<Article, StrategyError> {
        let resp = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StrategyError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let html = resp.text().await?;

        let (title, text) = page_text(&html);
        debug!(bytes = html.len(), chars = text.chars().count(), "Flattened page");
        if text.is_empty() {
            return Err(StrategyError::Empty);
        }
        Ok(Article {
            title,
            date: String::new(),
            text,
            url: url.to_string(),
        })
    }
}
