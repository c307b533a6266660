//! Typed stage payloads.
//!
//! Each adjacent stage pair shares a schema; the tagged [`StagePayload`]
//! union makes those schemas statically checkable while the pipeline
//! itself stays generic over JSON values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use siteforge_shared::{
    CategorizedUrls, PageSection, Result, SiteForgeError, StageName,
};

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Business identity extracted from homepage markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_summary: Option<String>,
}

/// Contact details extracted from homepage markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One navigation menu entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub url: String,
}

/// One discovered service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Which discovery path produced this entry.
    pub source: String,
    /// Body excerpt from the service page.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sections: Vec<PageSection>,
}

/// Depth and quality analysis of the discovered content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub total_pages: usize,
    pub pages_with_content: usize,
    pub average_content_length: usize,
    #[serde(default)]
    pub content_quality_scores: BTreeMap<String, u32>,
    #[serde(default)]
    pub missing_content: Vec<String>,
}

/// Structural flags over the discovered URL set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPatterns {
    pub has_blog: bool,
    pub has_case_studies: bool,
    pub has_testimonials: bool,
    pub has_team_profiles: bool,
    pub has_service_pages: bool,
    pub has_location_pages: bool,
    #[serde(default)]
    pub content_style: String,
}

/// Output of the discovery stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryOutput {
    pub url: String,
    #[serde(default)]
    pub business_info: BusinessInfo,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    /// Taxonomy category → service names.
    #[serde(default)]
    pub service_taxonomy: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub discovered_pages: CategorizedUrls,
    #[serde(default)]
    pub navigation: Vec<NavItem>,
    #[serde(default)]
    pub content_analysis: ContentAnalysis,
    #[serde(default)]
    pub content_patterns: ContentPatterns,
}

// ---------------------------------------------------------------------------
// Architecture planning
// ---------------------------------------------------------------------------

/// One node of the planned site tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteNode {
    pub title: String,
    pub url: String,
    pub template: String,
    pub priority: f64,
    #[serde(default)]
    pub children: BTreeMap<String, SiteNode>,
}

impl SiteNode {
    pub fn new(title: &str, url: &str, template: &str, priority: f64) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            template: template.to_string(),
            priority,
            children: BTreeMap::new(),
        }
    }

    /// Total nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.values().map(SiteNode::count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .values()
            .map(SiteNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Breadcrumb step: title plus URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub title: String,
    pub url: String,
}

/// Planned navigation menus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationPlan {
    #[serde(default)]
    pub primary_nav: Vec<NavItem>,
    #[serde(default)]
    pub footer_nav: Vec<NavItem>,
}

/// Output of the architecture-planning stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOutput {
    #[serde(default)]
    pub site_structure: BTreeMap<String, SiteNode>,
    #[serde(default)]
    pub url_pattern: String,
    #[serde(default)]
    pub navigation: NavigationPlan,
    #[serde(default)]
    pub service_taxonomy: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub page_templates: Vec<String>,
    /// Page URL → breadcrumb trail.
    #[serde(default)]
    pub breadcrumbs: BTreeMap<String, Vec<Breadcrumb>>,
    /// Page URL → keywords.
    #[serde(default)]
    pub keyword_mapping: BTreeMap<String, Vec<String>>,
    pub total_pages: usize,
    pub depth_levels: usize,
    /// Carried forward for content generation.
    #[serde(default)]
    pub business_info: BusinessInfo,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

// ---------------------------------------------------------------------------
// Content strategy
// ---------------------------------------------------------------------------

/// Planned outline for one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageOutline {
    pub title: String,
    pub url: String,
    pub template: String,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Output of the content-strategy stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyOutput {
    /// Page URL → template name.
    #[serde(default)]
    pub page_templates: BTreeMap<String, String>,
    #[serde(default)]
    pub keyword_mapping: BTreeMap<String, Vec<String>>,
    /// Page URL → outline.
    #[serde(default)]
    pub content_outlines: BTreeMap<String, PageOutline>,
    pub estimated_pages: usize,
    #[serde(default)]
    pub business_info: BusinessInfo,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    #[serde(default)]
    pub navigation: NavigationPlan,
}

// ---------------------------------------------------------------------------
// Content generation
// ---------------------------------------------------------------------------

/// One generated page document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedPage {
    pub title: String,
    pub url: String,
    pub template: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub body: String,
    pub word_count: usize,
    #[serde(default)]
    pub internal_links: Vec<String>,
}

/// Output of the content-generation stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// Page URL → generated document.
    #[serde(default)]
    pub generated_pages: BTreeMap<String, GeneratedPage>,
    pub total_word_count: usize,
    pub internal_links: usize,
    pub seo_optimized: bool,
}

// ---------------------------------------------------------------------------
// Site emission
// ---------------------------------------------------------------------------

/// Output of the site-emission stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionOutput {
    #[serde(default)]
    pub files_written: Vec<String>,
    pub sitemap_generated: bool,
    pub ready: bool,
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// The union of per-stage output schemas, tagged by stage name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", content = "data", rename_all = "kebab-case")]
pub enum StagePayload {
    Discovery(DiscoveryOutput),
    ArchitecturePlanning(PlanOutput),
    ContentStrategy(StrategyOutput),
    ContentGeneration(GenerationOutput),
    SiteEmission(EmissionOutput),
}

impl StagePayload {
    /// Which stage this payload belongs to.
    pub fn stage(&self) -> StageName {
        match self {
            StagePayload::Discovery(_) => StageName::Discovery,
            StagePayload::ArchitecturePlanning(_) => StageName::ArchitecturePlanning,
            StagePayload::ContentStrategy(_) => StageName::ContentStrategy,
            StagePayload::ContentGeneration(_) => StageName::ContentGeneration,
            StagePayload::SiteEmission(_) => StageName::SiteEmission,
        }
    }

    /// Check a raw stage output against the stage's schema.
    pub fn from_stage_output(stage: StageName, output: Value) -> Result<Self> {
        let result = match stage {
            StageName::Discovery => serde_json::from_value(output).map(StagePayload::Discovery),
            StageName::ArchitecturePlanning => {
                serde_json::from_value(output).map(StagePayload::ArchitecturePlanning)
            }
            StageName::ContentStrategy => {
                serde_json::from_value(output).map(StagePayload::ContentStrategy)
            }
            StageName::ContentGeneration => {
                serde_json::from_value(output).map(StagePayload::ContentGeneration)
            }
            StageName::SiteEmission => {
                serde_json::from_value(output).map(StagePayload::SiteEmission)
            }
        };
        result.map_err(|e| {
            SiteForgeError::validation(format!("{stage} output does not match its schema: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn site_node_count_and_depth() {
        let mut services = SiteNode::new("Services", "/services", "services_index", 0.9);
        services.children.insert(
            "divorce".into(),
            SiteNode::new("Divorce", "/services/divorce", "service_page", 0.8),
        );
        services.children.insert(
            "corporate".into(),
            SiteNode::new("Corporate", "/services/corporate", "service_page", 0.8),
        );

        assert_eq!(services.count(), 3);
        assert_eq!(services.depth(), 2);
    }

    #[test]
    fn payload_tagged_roundtrip() {
        let payload = StagePayload::Discovery(DiscoveryOutput {
            url: "https://acme.example".into(),
            business_type: "law_firm".into(),
            ..Default::default()
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["stage"], "discovery");

        let parsed: StagePayload = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.stage(), StageName::Discovery);
    }

    #[test]
    fn schema_check_accepts_partial_output() {
        let output = json!({
            "url": "https://acme.example",
            "business_info": {"name": "Acme Law"},
            "services": []
        });
        let payload = StagePayload::from_stage_output(StageName::Discovery, output).unwrap();
        assert_eq!(payload.stage(), StageName::Discovery);
    }

    #[test]
    fn schema_check_rejects_wrong_shape() {
        let output = json!({"generated_pages": "not an object"});
        assert!(StagePayload::from_stage_output(StageName::ContentGeneration, output).is_err());
    }
}
