//! Process-wide configuration.
//!
//! [`Settings`] is resolved once at startup and then handed to every component
//! by value (or behind an `Arc`). Nothing reads the environment during a
//! request, so concurrent calls always see a consistent configuration.
//!
//! # Resolution Order
//!
//! 1. Built-in defaults
//! 2. Optional YAML file (`--config` / `WEB_SUMMARIZER_CONFIG`)
//! 3. Environment overrides (`OLLAMA_MODEL`, `OLLAMA_BASE_URL`, `USER_AGENT`, `WEBDRIVER_URL`)

use crate::clamp::MIN_MAX_CHARS;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Desktop browser identity sent by the strategies that pretend to be a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Domains whose pages only come out right from a fully rendered browser session.
pub const DEFAULT_HEAVY_DOMAINS: &[&str] = &[
    "juejin.cn",
    "163.com",
    "guokr.com",
    "baidu.com",
    "smzdm.com",
    "nmc.cn",
    "52pojie.cn",
    "toutiao.com",
    "sspai.com",
    "sina.com.cn",
    "hupu.com",
    "51cto.com",
    "ithome.com",
    "news.qq.com",
    "nodeseek.com",
    "thepaper.cn",
    "hellogithub.com",
    "miyoushe.com",
];

/// Shape of the text the backend is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// A single JSON object with `summary` and `tags`, validated before use.
    #[default]
    Json,
    /// Freeform markdown returned to the caller untouched.
    Markdown,
}

/// Resolved configuration for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ollama model identifier.
    pub model: String,
    /// Base address of the Ollama server.
    pub base_url: String,
    /// Outbound `User-Agent` for the generic and heavy-fetch strategies.
    pub user_agent: String,
    /// WebDriver endpoint used by the heavy-fetch strategy.
    pub webdriver_url: String,
    /// Context window requested from the backend.
    pub num_ctx: u32,
    /// Character budget for the text sent to the backend.
    pub max_chars: usize,
    pub output_mode: OutputMode,
    /// Substrings that force the heavy-fetch strategy, checked in order.
    pub heavy_domains: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gemma3:4b".to_string(),
            base_url: "http://127.0.0.1:11434".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            num_ctx: 8192,
            max_chars: crate::clamp::DEFAULT_MAX_CHARS,
            output_mode: OutputMode::Json,
            heavy_domains: DEFAULT_HEAVY_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional YAML file, and the process environment.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to a YAML file; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid YAML,
    /// or sets `max_chars` below [`MIN_MAX_CHARS`].
    #[instrument(level = "info", skip_all)]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        info!(
            model = %settings.model,
            base_url = %settings.base_url,
            mode = ?settings.output_mode,
            "Configuration resolved"
        );
        Ok(settings)
    }

    /// Parse a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        // An empty file deserializes to `null`, which means "all defaults".
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chars < MIN_MAX_CHARS {
            return Err(ConfigError::BudgetTooSmall {
                max_chars: self.max_chars,
                min: MIN_MAX_CHARS,
            });
        }
        Ok(())
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` abstracts `std::env::var` so the override rules can be tested
    /// without touching the real process environment. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OLLAMA_MODEL") {
            debug!(model = %v, "OLLAMA_MODEL override");
            self.model = v;
        }
        if let Some(v) = get("OLLAMA_BASE_URL") {
            debug!(base_url = %v, "OLLAMA_BASE_URL override");
            self.base_url = v;
        }
        if let Some(v) = get("USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = get("WEBDRIVER_URL") {
            self.webdriver_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.model, "gemma3:4b");
        assert_eq!(s.base_url, "http://127.0.0.1:11434");
        assert_eq!(s.max_chars, 4000);
        assert_eq!(s.num_ctx, 8192);
        assert_eq!(s.output_mode, OutputMode::Json);
        assert_eq!(s.heavy_domains.len(), 18);
        assert_eq!(s.heavy_domains[0], "juejin.cn");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OLLAMA_MODEL", "qwen2.5:7b"),
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("USER_AGENT", "  "),
        ]
        .into_iter()
        .collect();

        let mut s = Settings::default();
        s.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(s.model, "qwen2.5:7b");
        assert_eq!(s.base_url, "http://gpu-box:11434");
        // blank values do not clobber the default
        assert_eq!(s.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(s.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model: llama3.1:8b").unwrap();
        writeln!(file, "output_mode: markdown").unwrap();
        writeln!(file, "heavy_domains: [\"example.org\"]").unwrap();

        let s = Settings::from_file(file.path()).unwrap();
        assert_eq!(s.model, "llama3.1:8b");
        assert_eq!(s.output_mode, OutputMode::Markdown);
        assert_eq!(s.heavy_domains, vec!["example.org".to_string()]);
        assert_eq!(s.max_chars, 4000);
    }

    #[test]
    fn test_from_file_empty_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let s = Settings::from_file(file.path()).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "num_ctx: [not, a, number]").unwrap();
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_file_rejects_small_budget() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_chars: 1000").unwrap();
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BudgetTooSmall {
                max_chars: 1000,
                min: MIN_MAX_CHARS
            }
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_chars: {MIN_MAX_CHARS}").unwrap();
        assert_eq!(Settings::from_file(file.path()).unwrap().max_chars, MIN_MAX_CHARS);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Settings::from_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
