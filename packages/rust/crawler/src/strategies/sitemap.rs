//! Sitemap discovery strategy.
//!
//! Probes a fixed list of well-known sitemap locations and stops at the
//! first one that yields URLs. A sitemap-index is followed one level deep:
//! each child sitemap is fetched and its `<loc>` entries unioned.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use url::Url;

use siteforge_shared::{Result, SiteForgeError};

use crate::fetch::HttpFetcher;

/// Well-known sitemap locations, probed in order.
const SITEMAP_LOCATIONS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/wp-sitemap.xml",
    "/sitemap.xml.gz",
];

/// A parsed sitemap document.
#[derive(Debug, PartialEq)]
pub enum SitemapDoc {
    /// A sitemap-index: `<loc>` entries point at child sitemaps.
    Index(Vec<String>),
    /// A urlset: `<loc>` entries are page URLs.
    UrlSet(Vec<String>),
}

/// Gather page URLs from the first sitemap location that yields any.
pub async fn discover(fetcher: &HttpFetcher, base: &Url) -> Vec<String> {
    for location in SITEMAP_LOCATIONS {
        let Ok(sitemap_url) = base.join(location) else {
            continue;
        };

        let xml = match fetcher.get_text(&sitemap_url).await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %sitemap_url, error = %e, "sitemap not found");
                continue;
            }
        };

        let urls = match parse_sitemap(&xml) {
            Ok(SitemapDoc::UrlSet(urls)) => urls,
            Ok(SitemapDoc::Index(children)) => {
                // One level of indirection only.
                let mut urls = Vec::new();
                for child in children {
                    let Ok(child_url) = Url::parse(&child) else {
                        continue;
                    };
                    match fetcher.get_text(&child_url).await {
                        Ok(child_xml) => {
                            if let Ok(SitemapDoc::UrlSet(child_urls)) = parse_sitemap(&child_xml) {
                                urls.extend(child_urls);
                            }
                        }
                        Err(e) => {
                            debug!(url = %child_url, error = %e, "child sitemap fetch failed");
                        }
                    }
                }
                urls
            }
            Err(e) => {
                debug!(url = %sitemap_url, error = %e, "sitemap parse failed");
                continue;
            }
        };

        if !urls.is_empty() {
            debug!(url = %sitemap_url, count = urls.len(), "sitemap URLs gathered");
            return urls;
        }
    }

    Vec::new()
}

/// Parse sitemap XML into either an index or a urlset of `<loc>` entries.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDoc> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut root: Option<Vec<u8>> = None;
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if root.is_none() {
                    root = Some(e.local_name().as_ref().to_vec());
                } else if e.local_name().as_ref() == b"loc" {
                    in_loc = true;
                }
            }
            Ok(Event::Text(e)) if in_loc => {
                let text = e
                    .unescape()
                    .map_err(|err| SiteForgeError::parse(format!("sitemap text: {err}")))?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    locs.push(text);
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SiteForgeError::parse(format!("sitemap XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    match root.as_deref() {
        Some(b"sitemapindex") => Ok(SitemapDoc::Index(locs)),
        Some(b"urlset") => Ok(SitemapDoc::UrlSet(locs)),
        _ => Err(SiteForgeError::parse(
            "not a sitemap document (expected <urlset> or <sitemapindex>)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/about</loc></url>
  <url><loc>https://example.com/services/divorce</loc></url>
</urlset>"#;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap-posts.xml</loc></sitemap>
</sitemapindex>"#;

    #[test]
    fn parses_urlset() {
        let doc = parse_sitemap(URLSET).unwrap();
        assert_eq!(
            doc,
            SitemapDoc::UrlSet(vec![
                "https://example.com/about".into(),
                "https://example.com/services/divorce".into(),
            ])
        );
    }

    #[test]
    fn parses_sitemap_index() {
        let doc = parse_sitemap(INDEX).unwrap();
        assert!(matches!(doc, SitemapDoc::Index(locs) if locs.len() == 2));
    }

    #[test]
    fn rejects_non_sitemap_xml() {
        assert!(parse_sitemap("<html><body>not a sitemap</body></html>").is_err());
        assert!(parse_sitemap("definitely not xml {").is_err());
    }

    #[tokio::test]
    async fn follows_index_one_level() {
        let server = wiremock::MockServer::start().await;

        let index = format!(
            r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
<sitemap><loc>{0}/sitemap-pages.xml</loc></sitemap>
</sitemapindex>"#,
            server.uri()
        );

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap.xml"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(index))
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/sitemap-pages.xml"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(URLSET))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&siteforge_shared::DiscoveryConfig::default()).unwrap();
        let base = Url::parse(&server.uri()).unwrap();
        let urls = discover(&fetcher, &base).await;

        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"https://example.com/about".to_string()));
    }

    #[tokio::test]
    async fn absent_sitemap_contributes_nothing() {
        let server = wiremock::MockServer::start().await;

        let fetcher = HttpFetcher::new(&siteforge_shared::DiscoveryConfig::default()).unwrap();
        let base = Url::parse(&server.uri()).unwrap();
        let urls = discover(&fetcher, &base).await;

        assert!(urls.is_empty());
    }
}
