//! Secondary service-page crawl strategy.
//!
//! URLs gathered by the other strategies whose path matches a
//! service/practice-area pattern are treated as listing pages; their
//! card/list/heading links are extracted as individual service-page
//! candidates.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::fetch::HttpFetcher;

/// Selectors for service cards and linked titles on a listing page.
const SERVICE_LINK_SELECTORS: &[&str] = &[
    ".service-item a",
    ".practice-area a",
    ".service-card a",
    ".practice-card a",
    "article a",
    ".services-list a",
    "h2 a",
    "h3 a",
];

/// Maximum links taken from one listing page.
const MAX_SERVICE_LINKS: usize = 30;

/// Path patterns that mark a URL as a service listing page.
const LISTING_PATTERNS: &[&str] = &[
    r"(?i)/practices?/",
    r"(?i)/services?/",
    r"(?i)/areas?-of-practice/",
    r"(?i)/what-we-do/",
    r"(?i)/expertise/",
    r"(?i)/specialt(y|ies)/",
];

/// Compiled listing-page patterns, built once per engine.
#[derive(Debug)]
pub struct ServicePagePatterns {
    patterns: Vec<Regex>,
}

impl ServicePagePatterns {
    pub fn new() -> Self {
        Self {
            patterns: LISTING_PATTERNS
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect(),
        }
    }

    /// Whether a URL looks like a service listing page.
    pub fn is_listing(&self, url: &str) -> bool {
        // Patterns expect a trailing slash boundary; normalize so that
        // `/services` matches as well as `/services/divorce`.
        let with_slash = format!("{}/", url.trim_end_matches('/'));
        self.patterns.iter().any(|p| p.is_match(&with_slash))
    }
}

impl Default for ServicePagePatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Crawl listing pages among `gathered` and extract service-page links.
pub async fn discover(
    fetcher: &HttpFetcher,
    base: &Url,
    gathered: &[String],
    patterns: &ServicePagePatterns,
) -> Vec<String> {
    let mut urls = Vec::new();

    for candidate in gathered {
        if !patterns.is_listing(candidate) {
            continue;
        }
        let Ok(listing_url) = Url::parse(candidate) else {
            continue;
        };

        match fetcher.get_text(&listing_url).await {
            Ok(html) => {
                let links = extract_listing_links(&html, base);
                debug!(listing = %listing_url, count = links.len(), "listing page crawled");
                urls.extend(links);
            }
            Err(e) => {
                debug!(listing = %listing_url, error = %e, "listing page fetch failed");
            }
        }
    }

    urls
}

/// Extract same-domain links under the service selectors, capped.
fn extract_listing_links(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();

    for selector in SERVICE_LINK_SELECTORS {
        let sel = Selector::parse(selector).unwrap();
        for el in doc.select(&sel) {
            if links.len() >= MAX_SERVICE_LINKS {
                return links;
            }
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if resolved.host_str() != base.host_str() {
                continue;
            }
            let url = resolved.to_string();
            if !links.contains(&url) {
                links.push(url);
            }
        }
    }

    links
}
