//! Navigation-link extraction strategy.
//!
//! Pulls same-domain links out of the homepage's navigation-like
//! containers.

use scraper::{Html, Selector};
use url::Url;

/// Navigation containers, in the order they are walked.
const NAV_SELECTORS: &[&str] = &[
    "nav a",
    ".nav a",
    ".navbar a",
    ".navigation a",
    ".menu a",
    ".main-menu a",
    "header a",
    r#"[role="navigation"] a"#,
];

/// Extract same-domain navigation links from homepage markup.
pub fn extract_links(homepage_html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(homepage_html);
    let mut urls = Vec::new();

    for selector in NAV_SELECTORS {
        let sel = Selector::parse(selector).unwrap();
        for el in doc.select(&sel) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:")
            {
                continue;
            }
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if resolved.host_str() != base.host_str() {
                continue;
            }
            let url = resolved.to_string();
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_same_domain_nav_links() {
        let html = r##"<html><body>
            <nav>
                <a href="/about">About</a>
                <a href="/services/divorce">Divorce</a>
                <a href="https://external.example.org/partner">Partner</a>
                <a href="#top">Top</a>
                <a href="mailto:info@acme.example">Email</a>
            </nav>
            <header><a href="/contact">Contact</a></header>
        </body></html>"##;

        let base = Url::parse("https://acme.example/").unwrap();
        let links = extract_links(html, &base);

        assert_eq!(
            links,
            vec![
                "https://acme.example/about".to_string(),
                "https://acme.example/services/divorce".to_string(),
                "https://acme.example/contact".to_string(),
            ]
        );
    }

    #[test]
    fn duplicate_links_collapse() {
        let html = r#"<html><body>
            <nav><a href="/about">About</a></nav>
            <header><a href="/about">About again</a></header>
        </body></html>"#;

        let base = Url::parse("https://acme.example/").unwrap();
        let links = extract_links(html, &base);
        assert_eq!(links.len(), 1);
    }
}
