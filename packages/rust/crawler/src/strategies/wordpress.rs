//! WordPress REST API discovery strategy.
//!
//! Detection fires on any of three independent homepage signals; page
//! links are then pulled from the first REST endpoint returning a
//! parseable array.

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::fetch::HttpFetcher;

/// REST endpoints queried in order once WordPress is detected.
const REST_ENDPOINTS: &[&str] = &[
    "/wp-json/wp/v2/pages",
    "/wp-json/wp/v2/posts?categories_exclude=1",
    "/?rest_route=/wp/v2/pages",
];

/// Maximum page links taken from a REST response.
const MAX_REST_LINKS: usize = 30;

/// Check homepage markup for WordPress signals: a generator meta tag, the
/// REST-discovery link relation, or known asset-path substrings.
pub fn is_wordpress(homepage_html: &str) -> bool {
    if homepage_html.contains("wp-content") || homepage_html.contains("wp-includes") {
        return true;
    }

    let doc = Html::parse_document(homepage_html);

    let generator_sel = Selector::parse(r#"meta[name="generator"]"#).unwrap();
    let generator_hit = doc.select(&generator_sel).any(|el| {
        el.value()
            .attr("content")
            .is_some_and(|c| c.to_lowercase().contains("wordpress"))
    });
    if generator_hit {
        return true;
    }

    let api_link_sel = Selector::parse(r#"link[rel="https://api.w.org/"]"#).unwrap();
    doc.select(&api_link_sel).next().is_some()
}

/// Gather page URLs from the WordPress REST API, if the site is WordPress.
pub async fn discover(fetcher: &HttpFetcher, base: &Url, homepage_html: Option<&str>) -> Vec<String> {
    let Some(html) = homepage_html else {
        return Vec::new();
    };
    if !is_wordpress(html) {
        return Vec::new();
    }

    debug!(%base, "WordPress detected, querying REST API");

    for endpoint in REST_ENDPOINTS {
        let Ok(api_url) = base.join(endpoint) else {
            continue;
        };

        match fetcher.get_json(&api_url).await {
            Ok(serde_json::Value::Array(pages)) => {
                let urls: Vec<String> = pages
                    .iter()
                    .take(MAX_REST_LINKS)
                    .filter_map(|page| page.get("link")?.as_str().map(String::from))
                    .collect();
                if !urls.is_empty() {
                    debug!(endpoint, count = urls.len(), "REST pages gathered");
                    return urls;
                }
            }
            Ok(_) => {
                debug!(url = %api_url, "REST endpoint returned non-array data");
            }
            Err(e) => {
                debug!(url = %api_url, error = %e, "REST endpoint unavailable");
            }
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_generator_meta() {
        let html = r#"<html><head>
            <meta name="generator" content="WordPress 6.4.2">
        </head><body></body></html>"#;
        assert!(is_wordpress(html));
    }

    #[test]
    fn detects_rest_link_relation() {
        let html = r#"<html><head>
            <link rel="https://api.w.org/" href="https://example.com/wp-json/">
        </head><body></body></html>"#;
        assert!(is_wordpress(html));
    }

    #[test]
    fn detects_asset_paths() {
        let html = r#"<html><body>
            <script src="/wp-includes/js/jquery.js"></script>
        </body></html>"#;
        assert!(is_wordpress(html));
    }

    #[test]
    fn plain_site_is_not_wordpress() {
        let html = "<html><head><title>Acme</title></head><body><p>Hello</p></body></html>";
        assert!(!is_wordpress(html));
    }

    #[tokio::test]
    async fn pulls_links_from_first_parseable_endpoint() {
        let server = wiremock::MockServer::start().await;

        let pages = serde_json::json!([
            {"id": 1, "link": "https://example.com/about"},
            {"id": 2, "link": "https://example.com/services"},
        ]);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/wp-json/wp/v2/pages"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(&pages))
            .mount(&server)
            .await;

        let homepage = r#"<html><head><meta name="generator" content="WordPress"></head></html>"#;
        let fetcher = HttpFetcher::new(&siteforge_shared::DiscoveryConfig::default()).unwrap();
        let base = Url::parse(&server.uri()).unwrap();

        let urls = discover(&fetcher, &base, Some(homepage)).await;
        assert_eq!(
            urls,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/services".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn non_wordpress_site_skips_rest_probing() {
        let server = wiremock::MockServer::start().await;
        let fetcher = HttpFetcher::new(&siteforge_shared::DiscoveryConfig::default()).unwrap();
        let base = Url::parse(&server.uri()).unwrap();

        let urls = discover(&fetcher, &base, Some("<html></html>")).await;
        assert!(urls.is_empty());
    }
}
