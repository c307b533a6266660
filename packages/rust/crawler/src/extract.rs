//! Fail-soft structured content extraction for a single page.
//!
//! Locates the first matching main-content container, walks its heading/
//! paragraph/list children into typed sections, and caps the concatenated
//! body text. Any fetch or parse failure yields a well-formed empty
//! content object, never an error.

use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use siteforge_shared::{PageContent, PageSection};

use crate::fetch::HttpFetcher;

/// Main-content containers, tried in priority order.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    ".content",
    "#content",
    ".main-content",
    ".page-content",
];

/// Maximum number of sections walked out of the main container.
const MAX_SECTIONS: usize = 50;

/// Paragraphs shorter than this are excluded as noise.
const MIN_PARAGRAPH_LEN: usize = 50;

/// Cap on the concatenated body text, in characters.
const MAX_BODY_LEN: usize = 3000;

/// Fetch a page and extract its structured content.
pub async fn extract_content(fetcher: &HttpFetcher, url: &Url) -> PageContent {
    match fetcher.get_text(url).await {
        Ok(html) => parse_content(url.as_str(), &html),
        Err(e) => {
            warn!(%url, error = %e, "content extraction failed, returning empty content");
            PageContent::empty(url.as_str())
        }
    }
}

/// Parse already-fetched markup into structured content.
pub fn parse_content(url: &str, html: &str) -> PageContent {
    let doc = Html::parse_document(html);
    let mut content = PageContent::empty(url);

    let title_sel = Selector::parse("title").unwrap();
    if let Some(el) = doc.select(&title_sel).next() {
        content.title = collapse_whitespace(&el.text().collect::<String>());
    }

    let desc_sel = Selector::parse(r#"meta[name="description"]"#).unwrap();
    if let Some(el) = doc.select(&desc_sel).next() {
        content.description = el.value().attr("content").unwrap_or_default().to_string();
    }

    let Some(main) = MAIN_SELECTORS.iter().find_map(|s| {
        let sel = Selector::parse(s).unwrap();
        doc.select(&sel).next()
    }) else {
        return content;
    };

    let section_sel = Selector::parse("h1, h2, h3, p, ul, ol").unwrap();
    for el in main.select(&section_sel).take(MAX_SECTIONS) {
        match el.value().name() {
            name @ ("h1" | "h2" | "h3") => {
                let text = collapse_whitespace(&el.text().collect::<String>());
                if !text.is_empty() {
                    let level = name[1..].parse().unwrap_or(1);
                    content.sections.push(PageSection::Heading { level, text });
                }
            }
            "p" => {
                let text = collapse_whitespace(&el.text().collect::<String>());
                if text.len() >= MIN_PARAGRAPH_LEN {
                    content.sections.push(PageSection::Paragraph { text });
                }
            }
            "ul" | "ol" => {
                let li_sel = Selector::parse("li").unwrap();
                let items: Vec<String> = el
                    .select(&li_sel)
                    .map(|li| collapse_whitespace(&li.text().collect::<String>()))
                    .filter(|t| !t.is_empty())
                    .collect();
                if !items.is_empty() {
                    content.sections.push(PageSection::List { items });
                }
            }
            _ => {}
        }
    }

    let full_text = collapse_whitespace(&main.text().collect::<String>());
    content.body = full_text.chars().take(MAX_BODY_LEN).collect();

    if !content.body.is_empty() {
        let mut hasher = Sha256::new();
        hasher.update(content.body.as_bytes());
        content.content_hash = format!("{:x}", hasher.finalize());
    }

    content
}

/// Collapse runs of whitespace into single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
        <head>
            <title>Divorce Law | Acme Law</title>
            <meta name="description" content="Experienced divorce representation.">
        </head>
        <body>
            <nav><a href="/">Home</a></nav>
            <main>
                <h1>Divorce Law</h1>
                <p>Short.</p>
                <p>Our attorneys have guided families through divorce proceedings
                   for more than twenty years across the state.</p>
                <ul><li>Custody agreements</li><li>Asset division</li></ul>
                <h2>Why choose us</h2>
            </main>
            <footer>Footer text</footer>
        </body>
    </html>"#;

    #[test]
    fn extracts_title_description_and_sections() {
        let content = parse_content("https://example.com/services/divorce", PAGE);

        assert_eq!(content.title, "Divorce Law | Acme Law");
        assert_eq!(content.description, "Experienced divorce representation.");
        assert_eq!(content.sections.len(), 4);
        assert!(matches!(
            &content.sections[0],
            PageSection::Heading { level: 1, text } if text == "Divorce Law"
        ));
        // "Short." is below the noise threshold.
        assert!(matches!(&content.sections[1], PageSection::Paragraph { text } if text.starts_with("Our attorneys")));
        assert!(matches!(&content.sections[2], PageSection::List { items } if items.len() == 2));
        assert!(!content.body.is_empty());
        assert_eq!(content.content_hash.len(), 64);
    }

    #[test]
    fn body_is_capped() {
        let long = "word ".repeat(2000);
        let html = format!("<html><body><main><p>{long}</p></main></body></html>");
        let content = parse_content("https://example.com/long", &html);
        assert_eq!(content.body.chars().count(), 3000);
    }

    #[test]
    fn no_main_container_yields_empty_sections() {
        let html = "<html><head><title>Bare</title></head><body><div>loose text</div></body></html>";
        let content = parse_content("https://example.com/bare", html);
        assert_eq!(content.title, "Bare");
        assert!(content.sections.is_empty());
        assert!(content.body.is_empty());
        assert!(content.content_hash.is_empty());
    }
}
