//! Known-path probing strategy.
//!
//! Issues lightweight HEAD existence checks (no body fetch) against
//! conventional page paths; each path that resolves contributes its URL.

use tracing::debug;
use url::Url;

use crate::fetch::HttpFetcher;

/// Conventional paths checked on every site.
const COMMON_PATHS: &[&str] = &[
    "/about",
    "/about-us",
    "/about-team",
    "/services",
    "/our-services",
    "/what-we-do",
    "/practices",
    "/practice-areas",
    "/areas-of-practice",
    "/team",
    "/our-team",
    "/attorneys",
    "/lawyers",
    "/staff",
    "/contact",
    "/contact-us",
    "/get-in-touch",
    "/testimonials",
    "/reviews",
    "/case-studies",
    "/faq",
    "/faqs",
    "/frequently-asked-questions",
];

/// Probe the conventional paths and return those that exist.
pub async fn discover(fetcher: &HttpFetcher, base: &Url) -> Vec<String> {
    let mut urls = Vec::new();

    for path in COMMON_PATHS {
        let Ok(url) = base.join(path) else {
            continue;
        };
        if fetcher.head_ok(&url).await {
            urls.push(url.to_string());
        }
    }

    debug!(count = urls.len(), "path probing complete");
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probes_resolve_only_existing_paths() {
        let server = wiremock::MockServer::start().await;

        for path in ["/about", "/contact", "/services"] {
            wiremock::Mock::given(wiremock::matchers::method("HEAD"))
                .and(wiremock::matchers::path(path))
                .respond_with(wiremock::ResponseTemplate::new(200))
                .mount(&server)
                .await;
        }

        let fetcher = HttpFetcher::new(&siteforge_shared::DiscoveryConfig::default()).unwrap();
        let base = Url::parse(&server.uri()).unwrap();
        let urls = discover(&fetcher, &base).await;

        assert_eq!(urls.len(), 3);
        assert!(urls.iter().any(|u| u.ends_with("/about")));
        assert!(urls.iter().any(|u| u.ends_with("/contact")));
        assert!(urls.iter().any(|u| u.ends_with("/services")));
    }
}
