//! The Discovery Engine: orchestrates the five strategies against one
//! root URL and merges their contributions into a categorized URL set.

use std::collections::HashSet;

use tracing::{info, instrument, warn};
use url::Url;

use siteforge_shared::{
    CategorizedUrls, DiscoveryConfig, PageContent, Result, SiteForgeError,
    types::MAX_URLS_PER_CATEGORY,
};

use crate::categorize::UrlCategorizer;
use crate::extract;
use crate::fetch::HttpFetcher;
use crate::strategies::{navigation, probe, services, sitemap, wordpress};
use crate::strategies::services::ServicePagePatterns;

/// Multi-strategy content discovery for a single site.
pub struct DiscoveryEngine {
    fetcher: HttpFetcher,
    categorizer: UrlCategorizer,
    service_patterns: ServicePagePatterns,
}

impl DiscoveryEngine {
    /// Build an engine from the runtime discovery configuration.
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            categorizer: UrlCategorizer::new(),
            service_patterns: ServicePagePatterns::new(),
        })
    }

    /// The underlying fetcher, for callers that need raw page access.
    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    /// Discover same-domain page URLs for the site at `root`.
    ///
    /// The homepage is fetched once and shared by the WordPress detector
    /// and the navigation extractor. The four independent strategies run
    /// concurrently; the secondary service crawl runs afterwards over
    /// everything they gathered. Each strategy is fail-soft.
    #[instrument(skip(self), fields(root = %root))]
    pub async fn discover(&self, root: &Url) -> Result<CategorizedUrls> {
        let base = origin_url(root)?;

        let homepage = match self.fetcher.get_text(&base).await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(url = %base, error = %e, "homepage fetch failed");
                None
            }
        };

        let (sitemap_urls, wp_urls, probed_urls, nav_urls) = tokio::join!(
            sitemap::discover(&self.fetcher, &base),
            wordpress::discover(&self.fetcher, &base, homepage.as_deref()),
            probe::discover(&self.fetcher, &base),
            async {
                homepage
                    .as_deref()
                    .map(|html| navigation::extract_links(html, &base))
                    .unwrap_or_default()
            },
        );

        info!(
            sitemap = sitemap_urls.len(),
            wordpress = wp_urls.len(),
            probed = probed_urls.len(),
            navigation = nav_urls.len(),
            "primary strategies complete"
        );

        // Merge in strategy order with stable first-insertion dedup.
        let mut seen: HashSet<String> = HashSet::new();
        let mut gathered: Vec<String> = Vec::new();
        for url in sitemap_urls
            .into_iter()
            .chain(wp_urls)
            .chain(probed_urls)
            .chain(nav_urls)
        {
            if seen.insert(url.clone()) {
                gathered.push(url);
            }
        }

        let secondary =
            services::discover(&self.fetcher, &base, &gathered, &self.service_patterns).await;
        for url in secondary {
            if seen.insert(url.clone()) {
                gathered.push(url);
            }
        }

        let mut result = CategorizedUrls::default();
        for url in gathered {
            if let Some(category) = self.categorizer.categorize(&url) {
                result.push(category, url);
            }
        }
        result.truncate_each(MAX_URLS_PER_CATEGORY);

        info!(
            services = result.services.len(),
            about = result.about.len(),
            contact = result.contact.len(),
            other = result.other.len(),
            "discovery complete"
        );

        Ok(result)
    }

    /// Extract structured content from a single page (fail-soft).
    pub async fn extract_content(&self, url: &Url) -> PageContent {
        extract::extract_content(&self.fetcher, url).await
    }
}

/// Reduce a URL to its origin (scheme + host + port).
fn origin_url(url: &Url) -> Result<Url> {
    let scheme = url.scheme();
    let host = url
        .host_str()
        .ok_or_else(|| SiteForgeError::validation(format!("URL has no host: {url}")))?;

    let origin = match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}/"),
        None => format!("{scheme}://{host}/"),
    };

    Url::parse(&origin).map_err(|e| SiteForgeError::validation(format!("{origin}: {e}")))
}

#[cfg(test)]
mod engine_tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_engine() -> DiscoveryEngine {
        DiscoveryEngine::new(&DiscoveryConfig {
            timeout_secs: 5,
            probe_timeout_secs: 2,
        })
        .unwrap()
    }

    #[test]
    fn origin_url_strips_path() {
        let url = Url::parse("https://acme.example/services/divorce?x=1").unwrap();
        assert_eq!(origin_url(&url).unwrap().as_str(), "https://acme.example/");

        let url = Url::parse("http://localhost:3000/docs").unwrap();
        assert_eq!(origin_url(&url).unwrap().as_str(), "http://localhost:3000/");
    }

    #[tokio::test]
    async fn end_to_end_navigation_and_secondary_crawl() {
        // Sitemap absent; homepage navigation carries the links; /services
        // is a listing page with two cards. /services/divorce shows up via
        // both navigation and the secondary crawl and must dedup to one.
        let server = MockServer::start().await;

        let homepage = r#"<html><body><nav>
            <a href="/about">About</a>
            <a href="/services">Services</a>
            <a href="/services/divorce">Divorce</a>
            <a href="/services/corporate">Corporate</a>
            <a href="/contact">Contact</a>
            <a href="/blog/2023/04/post">News</a>
        </nav></body></html>"#;

        let listing = r#"<html><body>
            <div class="service-card"><a href="/services/divorce">Divorce</a></div>
            <div class="service-card"><a href="/services/immigration">Immigration</a></div>
        </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(homepage))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&server)
            .await;

        let engine = test_engine();
        let root = Url::parse(&server.uri()).unwrap();
        let discovered = engine.discover(&root).await.unwrap();

        let suffix = |s: &str| format!("{}{s}", server.uri());

        assert!(discovered.about.contains(&suffix("/about")));
        assert!(discovered.contact.contains(&suffix("/contact")));
        assert!(discovered.services.contains(&suffix("/services/divorce")));
        assert!(discovered.services.contains(&suffix("/services/corporate")));
        assert!(discovered.services.contains(&suffix("/services/immigration")));

        // Dedup invariant: exactly one entry for the twice-discovered URL.
        let divorce_count = discovered
            .iter_all()
            .filter(|u| u.ends_with("/services/divorce"))
            .count();
        assert_eq!(divorce_count, 1);

        // Skip-pattern exclusion: the blog post appears in no category.
        assert!(discovered.iter_all().all(|u| !u.contains("/blog/")));
    }

    #[tokio::test]
    async fn overlapping_strategies_dedup() {
        // Sitemap and navigation both surface /contact.
        let server = MockServer::start().await;

        let sitemap = format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
<url><loc>{0}/contact</loc></url>
</urlset>"#,
            server.uri()
        );
        let homepage = r#"<html><body><nav><a href="/contact">Contact</a></nav></body></html>"#;

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(homepage))
            .mount(&server)
            .await;

        let engine = test_engine();
        let root = Url::parse(&server.uri()).unwrap();
        let discovered = engine.discover(&root).await.unwrap();

        assert_eq!(discovered.contact.len(), 1);
    }

    #[tokio::test]
    async fn category_truncation_preserves_sitemap_order() {
        let server = MockServer::start().await;

        let entries: String = (0..35)
            .map(|i| format!("<url><loc>{}/services/area-{i:02}</loc></url>", server.uri()))
            .collect();
        let sitemap = format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
        );

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;

        let engine = test_engine();
        let root = Url::parse(&server.uri()).unwrap();
        let discovered = engine.discover(&root).await.unwrap();

        assert_eq!(discovered.services.len(), 20);
        assert!(discovered.services[0].ends_with("/services/area-00"));
        assert!(discovered.services[19].ends_with("/services/area-19"));
    }

    #[tokio::test]
    async fn extraction_is_fail_soft_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let engine = test_engine();
        let url = Url::parse(&format!("{}/broken", server.uri())).unwrap();
        let content = engine.extract_content(&url).await;

        assert_eq!(content.url, url.as_str());
        assert!(content.title.is_empty());
        assert!(content.sections.is_empty());
        assert!(content.body.is_empty());
    }

    #[tokio::test]
    async fn unreachable_site_discovers_nothing() {
        // Nothing mounted: every strategy degrades to an empty contribution.
        let server = MockServer::start().await;

        let engine = test_engine();
        let root = Url::parse(&server.uri()).unwrap();
        let discovered = engine.discover(&root).await.unwrap();

        assert_eq!(discovered.total(), 0);
    }
}
