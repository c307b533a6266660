//! URL categorization with immutable pattern tables.
//!
//! Skip patterns are checked first and exclude a URL from the discovered
//! set entirely; the remaining URLs fall into about, contact, or services
//! (in that priority order), with everything else in the catch-all
//! category.

use regex::Regex;

use siteforge_shared::Category;

/// Path patterns that exclude a URL from discovery: blog/news archives,
/// date-based posts, taxonomy pages, binary documents, and non-page links.
const SKIP_PATTERNS: &[&str] = &[
    r"(?i)/blog/",
    r"(?i)/news/",
    r"(?i)/articles?/",
    r"(?i)/posts?/",
    r"/\d{4}/\d{2}/",
    r"(?i)/category/",
    r"(?i)/tag/",
    r"(?i)/author/",
    r"(?i)\.pdf$",
    r"(?i)\.docx?",
    r"(?i)\.zip",
    r"#",
    r"(?i)javascript:",
    r"(?i)mailto:",
];

const ABOUT_PATTERN: &str = r"(?i)/about|/team|/attorney|/lawyer|/staff";
const CONTACT_PATTERN: &str = r"(?i)/contact|/get-in-touch|/location";
const SERVICES_PATTERN: &str = r"(?i)/service|/practice|/area|/expertise|/what-we-do";

/// Categorizes URLs against compiled, immutable pattern tables.
///
/// Built once per engine and injected; the tables are fixed data, not
/// process-wide mutable state.
#[derive(Debug)]
pub struct UrlCategorizer {
    skip: Vec<Regex>,
    about: Regex,
    contact: Regex,
    services: Regex,
}

impl UrlCategorizer {
    pub fn new() -> Self {
        Self {
            skip: SKIP_PATTERNS
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect(),
            about: Regex::new(ABOUT_PATTERN).unwrap(),
            contact: Regex::new(CONTACT_PATTERN).unwrap(),
            services: Regex::new(SERVICES_PATTERN).unwrap(),
        }
    }

    /// Assign a URL to a category, or `None` when a skip pattern matches.
    pub fn categorize(&self, url: &str) -> Option<Category> {
        if self.skip.iter().any(|p| p.is_match(url)) {
            return None;
        }

        if self.about.is_match(url) {
            Some(Category::About)
        } else if self.contact.is_match(url) {
            Some(Category::Contact)
        } else if self.services.is_match(url) {
            Some(Category::Services)
        } else {
            Some(Category::Other)
        }
    }
}

impl Default for UrlCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_patterns_exclude_entirely() {
        let categorizer = UrlCategorizer::new();

        assert_eq!(
            categorizer.categorize("https://example.com/blog/2023/04/post"),
            None
        );
        assert_eq!(categorizer.categorize("https://example.com/2023/04/launch"), None);
        assert_eq!(categorizer.categorize("https://example.com/tag/divorce"), None);
        assert_eq!(categorizer.categorize("https://example.com/brochure.pdf"), None);
        assert_eq!(categorizer.categorize("https://example.com/page#section"), None);
        assert_eq!(categorizer.categorize("mailto:info@example.com"), None);
    }

    #[test]
    fn skip_wins_over_category_patterns() {
        let categorizer = UrlCategorizer::new();
        // Matches the services pattern but sits under /blog/.
        assert_eq!(
            categorizer.categorize("https://example.com/blog/service-update"),
            None
        );
    }

    #[test]
    fn category_priority_order() {
        let categorizer = UrlCategorizer::new();

        assert_eq!(
            categorizer.categorize("https://example.com/about-us"),
            Some(Category::About)
        );
        assert_eq!(
            categorizer.categorize("https://example.com/team"),
            Some(Category::About)
        );
        // No slash boundary before "team": falls through to the catch-all.
        assert_eq!(
            categorizer.categorize("https://example.com/our-team"),
            Some(Category::Other)
        );
        assert_eq!(
            categorizer.categorize("https://example.com/contact"),
            Some(Category::Contact)
        );
        assert_eq!(
            categorizer.categorize("https://example.com/services/divorce"),
            Some(Category::Services)
        );
        assert_eq!(
            categorizer.categorize("https://example.com/practice-areas"),
            Some(Category::Services)
        );
        assert_eq!(
            categorizer.categorize("https://example.com/testimonials"),
            Some(Category::Other)
        );
        assert_eq!(
            categorizer.categorize("https://example.com/"),
            Some(Category::Other)
        );
    }
}
