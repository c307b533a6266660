//! Core domain types for SiteForge pipeline runs and discovery results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SiteForgeError;

/// Maximum number of URLs kept per category after aggregation.
pub const MAX_URLS_PER_CATEGORY: usize = 20;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pipeline run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// StageName
// ---------------------------------------------------------------------------

/// The fixed, totally-ordered pipeline stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    Discovery,
    ArchitecturePlanning,
    ContentStrategy,
    ContentGeneration,
    SiteEmission,
}

impl StageName {
    /// All stages in pipeline order.
    pub const ALL: [StageName; 5] = [
        StageName::Discovery,
        StageName::ArchitecturePlanning,
        StageName::ContentStrategy,
        StageName::ContentGeneration,
        StageName::SiteEmission,
    ];

    /// The stage's stable string name (used in state files and artifacts).
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Discovery => "discovery",
            StageName::ArchitecturePlanning => "architecture-planning",
            StageName::ContentStrategy => "content-strategy",
            StageName::ContentGeneration => "content-generation",
            StageName::SiteEmission => "site-emission",
        }
    }

    /// Position of this stage in the fixed order.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    /// The stage at a given index, if any.
    pub fn at(index: usize) -> Option<StageName> {
        Self::ALL.get(index).copied()
    }

    /// The stage after this one, or `None` at the end of the pipeline.
    pub fn next(&self) -> Option<StageName> {
        Self::at(self.index() + 1)
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageName {
    type Err = SiteForgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|stage| stage.as_str() == s)
            .copied()
            .ok_or_else(|| SiteForgeError::UnknownStage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Category / CategorizedUrls
// ---------------------------------------------------------------------------

/// Content category assigned to a discovered URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Services,
    About,
    Contact,
    /// Catch-all for team pages, testimonials, and anything unmatched.
    Other,
}

impl Category {
    /// All categories in reporting order.
    pub const ALL: [Category; 4] = [
        Category::Services,
        Category::About,
        Category::Contact,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Services => "services",
            Category::About => "about",
            Category::Contact => "contact",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The deduplicated output of the Discovery Engine, partitioned by category.
///
/// Insertion order is preserved within each category; truncation cuts in
/// that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedUrls {
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub about: Vec<String>,
    #[serde(default)]
    pub contact: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

impl CategorizedUrls {
    /// Append a URL to its category.
    pub fn push(&mut self, category: Category, url: String) {
        self.get_mut(category).push(url);
    }

    /// The URL list for a category.
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Services => &self.services,
            Category::About => &self.about,
            Category::Contact => &self.contact,
            Category::Other => &self.other,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Services => &mut self.services,
            Category::About => &mut self.about,
            Category::Contact => &mut self.contact,
            Category::Other => &mut self.other,
        }
    }

    /// Truncate every category to `cap` entries, preserving order.
    pub fn truncate_each(&mut self, cap: usize) {
        for category in Category::ALL {
            self.get_mut(category).truncate(cap);
        }
    }

    /// Total number of URLs across all categories.
    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    /// Iterate over all URLs across categories, in reporting order.
    pub fn iter_all(&self) -> impl Iterator<Item = &String> {
        Category::ALL.into_iter().flat_map(|c| self.get(c).iter())
    }
}

// ---------------------------------------------------------------------------
// PageContent
// ---------------------------------------------------------------------------

/// One typed content section walked out of a page's main container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageSection {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    List { items: Vec<String> },
}

/// Structured content extracted from a single fetched page.
///
/// Created transiently per extraction call; never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    /// The page URL.
    pub url: String,
    /// `<title>` text.
    #[serde(default)]
    pub title: String,
    /// Meta description, if present.
    #[serde(default)]
    pub description: String,
    /// Ordered typed sections from the main content container.
    #[serde(default)]
    pub sections: Vec<PageSection>,
    /// Concatenated body text, capped at the extraction limit.
    #[serde(default)]
    pub body: String,
    /// SHA-256 hash of `body` (empty when there is no body).
    #[serde(default)]
    pub content_hash: String,
}

impl PageContent {
    /// A well-formed content object with empty fields, used when a fetch
    /// or parse fails (extraction is fail-soft).
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Validation / checkpoints
// ---------------------------------------------------------------------------

/// Result of running a checkpoint validator against a stage output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// An always-pass result with no findings.
    pub fn pass() -> Self {
        Self {
            passed: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Record of a passed checkpoint in the pipeline state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointPassed {
    pub stage: String,
    pub timestamp: DateTime<Utc>,
}

/// Immutable checkpoint artifact, persisted once per checkpoint call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointReport {
    pub stage: StageName,
    pub timestamp: DateTime<Utc>,
    pub validation_results: ValidationResult,
    /// Stage-specific summary of the output under review.
    pub output_summary: serde_json::Value,
    /// The stage that would run next, `None` at the end of the pipeline.
    pub next_stage: Option<StageName>,
    /// Whether the pipeline may advance. Authoritative: always `false`
    /// when `validation_results.errors` is non-empty.
    pub can_proceed: bool,
}

impl CheckpointReport {
    /// Build a report, deriving `can_proceed` from the validation result.
    ///
    /// Any reported error blocks advancement even if the validator claimed
    /// `passed: true`.
    pub fn new(
        stage: StageName,
        validation: ValidationResult,
        summary: serde_json::Value,
        next_stage: Option<StageName>,
    ) -> Self {
        let can_proceed = validation.passed && validation.errors.is_empty();
        Self {
            stage,
            timestamp: Utc::now(),
            validation_results: validation,
            output_summary: summary,
            next_stage,
            can_proceed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn stage_order_and_next() {
        assert_eq!(StageName::Discovery.index(), 0);
        assert_eq!(StageName::SiteEmission.index(), 4);
        assert_eq!(
            StageName::Discovery.next(),
            Some(StageName::ArchitecturePlanning)
        );
        assert_eq!(StageName::SiteEmission.next(), None);
    }

    #[test]
    fn stage_name_parses() {
        assert_eq!(
            StageName::from_str("architecture-planning").unwrap(),
            StageName::ArchitecturePlanning
        );
        assert!(matches!(
            StageName::from_str("deploy"),
            Err(SiteForgeError::UnknownStage(_))
        ));
    }

    #[test]
    fn stage_name_serde_matches_as_str() {
        for stage in StageName::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }

    #[test]
    fn categorized_urls_truncation_preserves_order() {
        let mut urls = CategorizedUrls::default();
        for i in 0..35 {
            urls.push(Category::Services, format!("https://example.com/services/{i}"));
        }
        urls.truncate_each(MAX_URLS_PER_CATEGORY);
        assert_eq!(urls.services.len(), 20);
        assert_eq!(urls.services[0], "https://example.com/services/0");
        assert_eq!(urls.services[19], "https://example.com/services/19");
    }

    #[test]
    fn checkpoint_errors_block_advancement() {
        // A buggy validator can claim passed while reporting errors; the
        // report must still block.
        let validation = ValidationResult {
            passed: true,
            warnings: vec![],
            errors: vec!["business name not found".into()],
        };
        let report = CheckpointReport::new(
            StageName::Discovery,
            validation,
            serde_json::json!({}),
            Some(StageName::ArchitecturePlanning),
        );
        assert!(!report.can_proceed);
    }

    #[test]
    fn page_section_serde_shape() {
        let section = PageSection::Heading {
            level: 2,
            text: "Our Services".into(),
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);
    }
}
