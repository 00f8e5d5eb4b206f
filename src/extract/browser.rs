//! Heavy-fetch strategy: render the page in a WebDriver-controlled browser.
//!
//! Needed for sites whose article body is produced by scripts or that turn
//! away plain HTTP clients. Requires a running WebDriver service (for example
//! `chromedriver --port=9515`).
//!
//! The browser identity is passed as a launch argument of the session, so
//! concurrent calls never share or mutate it.

use super::ExtractStrategy;
use crate::error::StrategyError;
use crate::models::Article;
use crate::utils::tidy_lines;
use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, instrument, warn};
use url::Url;

/// Renders pages through a WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct BrowserStrategy {
    webdriver_url: String,
    user_agent: String,
}

impl BrowserStrategy {
    pub fn new(webdriver_url: String, user_agent: String) -> Self {
        Self {
            webdriver_url,
            user_agent,
        }
    }

    /// Headless Chrome capabilities carrying this strategy's user agent.
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": [
                    "--headless=new",
                    "--disable-gpu",
                    "--no-sandbox",
                    "--disable-dev-shm-usage",
                    format!("--user-agent={}", self.user_agent),
                ]
            }),
        );
        caps
    }

    async fn read_page(client: &Client, url: &Url) -> Result<(String, String), fantoccini::error::CmdError> {
        client.goto(url.as_str()).await?;
        let title = client.title().await?;
        let text = client.find(Locator::Css("body")).await?.text().await?;
        Ok((title, text))
    }
}

#[async_trait]
impl ExtractStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "browser"
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<Article, StrategyError> {
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| StrategyError::Browser(format!("cannot start session at {}: {e}", self.webdriver_url)))?;

        let page = Self::read_page(&client, url).await;
        // close before inspecting the result so no session leaks on error
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close browser session");
        }
        let (title, text) = page.map_err(|e| StrategyError::Browser(e.to_string()))?;

        let text = tidy_lines(&text);
        debug!(chars = text.chars().count(), "Rendered page");
        if text.is_empty() {
            return Err(StrategyError::Empty);
        }
        Ok(Article {
            title: title.trim().to_string(),
            date: String::new(),
            text,
            url: url.to_string(),
        })
    }
}
