//! Per-domain extraction policy.
//!
//! Some sites defeat lightweight extraction (script-rendered bodies,
//! anti-scraping checks, unusual markup). URLs mentioning one of those
//! domains go straight to the heavy-fetch strategy.
//!
//! Matching is plain substring containment over the whole URL, so
//! subdomains and domain-like path segments match as well.

use tracing::debug;

/// Outcome of [`DomainPolicy::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    /// Skip the lightweight strategies and render the page in a browser.
    pub force_heavy_fetch: bool,
}

/// Ordered list of domain substrings that require a rendered page.
#[derive(Debug, Clone, Default)]
pub struct DomainPolicy {
    heavy_domains: Vec<String>,
}

impl DomainPolicy {
    pub fn new<I, S>(heavy_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            heavy_domains: heavy_domains
                .into_iter()
                .map(Into::<String>::into)
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// The first listed domain contained in `url`, if any.
    pub fn matching_domain(&self, url: &str) -> Option<&str> {
        self.heavy_domains
            .iter()
            .find(|d| url.contains(d.as_str()))
            .map(String::as_str)
    }

    /// Decide which extraction path `url` must take.
    pub fn classify(&self, url: &str) -> Decision {
        let matched = self.matching_domain(url);
        if let Some(domain) = matched {
            debug!(%url, %domain, "URL matches heavy-fetch domain");
        }
        Decision {
            force_heavy_fetch: matched.is_some(),
        }
    }
}
