//! Architecture-planning stage: turns discovery output into a site tree,
//! navigation, breadcrumbs, and an initial keyword mapping.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use siteforge_pipeline::{Stage, StageContext};
use siteforge_shared::{Result, SiteForgeError, StageName};

use crate::payload::{
    Breadcrumb, DiscoveryOutput, NavItem, NavigationPlan, PlanOutput, SiteNode,
};
use crate::write_json_artifact;

/// The second pipeline stage: information-architecture planning.
pub struct ArchitecturePlanningStage;

#[async_trait]
impl Stage for ArchitecturePlanningStage {
    fn name(&self) -> StageName {
        StageName::ArchitecturePlanning
    }

    #[instrument(skip_all)]
    async fn run(&self, ctx: &StageContext, input: Value) -> Result<Value> {
        let discovery: DiscoveryOutput = serde_json::from_value(input).map_err(|e| {
            SiteForgeError::validation(format!("planning input is not a discovery output: {e}"))
        })?;

        let site_structure = build_site_structure(&discovery);
        let navigation = build_navigation(&site_structure);
        let breadcrumbs = build_breadcrumbs(&site_structure);
        let keyword_mapping = initial_keyword_mapping(&site_structure, &discovery);
        let page_templates = collect_templates(&site_structure);

        let total_pages = site_structure.values().map(SiteNode::count).sum();
        let depth_levels = site_structure
            .values()
            .map(SiteNode::depth)
            .max()
            .unwrap_or(0);

        let output = PlanOutput {
            site_structure,
            url_pattern: "/{section}/{page}".into(),
            navigation,
            service_taxonomy: discovery.service_taxonomy.clone(),
            page_templates,
            breadcrumbs,
            keyword_mapping,
            total_pages,
            depth_levels,
            business_info: discovery.business_info.clone(),
            business_type: discovery.business_type.clone(),
            contact: discovery.contact.clone(),
            services: discovery.services.clone(),
        };

        write_json_artifact(&ctx.project_dir.join("planning"), "planning_output.json", &output)?;

        info!(
            total_pages = output.total_pages,
            depth = output.depth_levels,
            "architecture planning complete"
        );

        serde_json::to_value(&output)
            .map_err(|e| SiteForgeError::State(format!("serialize plan output: {e}")))
    }
}

/// Build the hierarchical site tree from the taxonomy and patterns.
fn build_site_structure(discovery: &DiscoveryOutput) -> BTreeMap<String, SiteNode> {
    let mut structure = BTreeMap::new();

    structure.insert(
        "home".to_string(),
        SiteNode::new("Home", "/", "homepage", 1.0),
    );

    let mut about = SiteNode::new("About", "/about", "about_page", 0.9);
    if discovery.content_patterns.has_team_profiles {
        about.children.insert(
            "team".into(),
            SiteNode::new("Our Team", "/about/team", "team_page", 0.8),
        );
    }
    about.children.insert(
        "our-story".into(),
        SiteNode::new("Our Story", "/about/our-story", "story_page", 0.7),
    );
    structure.insert("about".to_string(), about);

    let mut services = SiteNode::new("Services", "/services", "services_index", 0.9);
    if discovery.service_taxonomy.len() > 1 {
        // Category level, then individual service pages.
        for (category, names) in &discovery.service_taxonomy {
            let category_slug = slugify(category);
            let mut category_node = SiteNode::new(
                category,
                &format!("/services/{category_slug}"),
                "service_category",
                0.8,
            );
            for name in names {
                let slug = slugify(name);
                category_node.children.insert(
                    slug.clone(),
                    SiteNode::new(
                        name,
                        &format!("/services/{category_slug}/{slug}"),
                        "service_page",
                        0.7,
                    ),
                );
            }
            services.children.insert(category_slug, category_node);
        }
    } else {
        for service in &discovery.services {
            let slug = slugify(&service.name);
            services.children.insert(
                slug.clone(),
                SiteNode::new(
                    &service.name,
                    &format!("/services/{slug}"),
                    "service_page",
                    0.8,
                ),
            );
        }
    }
    structure.insert("services".to_string(), services);

    let mut contact = SiteNode::new("Contact", "/contact", "contact_page", 0.9);
    if discovery.content_patterns.has_location_pages {
        contact.children.insert(
            "locations".into(),
            SiteNode::new("Locations", "/contact/locations", "locations_page", 0.6),
        );
    }
    structure.insert("contact".to_string(), contact);

    structure
}

/// Primary navigation from the top level, footer from fixed entries.
fn build_navigation(structure: &BTreeMap<String, SiteNode>) -> NavigationPlan {
    // Home first, then the remaining sections in tree order.
    let mut primary_nav = Vec::new();
    if let Some(home) = structure.get("home") {
        primary_nav.push(NavItem {
            label: home.title.clone(),
            url: home.url.clone(),
        });
    }
    for (key, node) in structure {
        if key != "home" {
            primary_nav.push(NavItem {
                label: node.title.clone(),
                url: node.url.clone(),
            });
        }
    }

    let footer_nav = primary_nav
        .iter()
        .filter(|item| item.url != "/")
        .cloned()
        .collect();

    NavigationPlan {
        primary_nav,
        footer_nav,
    }
}

/// Depth-first walk producing a breadcrumb trail per page URL.
fn build_breadcrumbs(structure: &BTreeMap<String, SiteNode>) -> BTreeMap<String, Vec<Breadcrumb>> {
    let mut breadcrumbs = BTreeMap::new();
    let home = Breadcrumb {
        title: "Home".into(),
        url: "/".into(),
    };

    fn walk(
        node: &SiteNode,
        trail: &[Breadcrumb],
        breadcrumbs: &mut BTreeMap<String, Vec<Breadcrumb>>,
    ) {
        let mut trail = trail.to_vec();
        trail.push(Breadcrumb {
            title: node.title.clone(),
            url: node.url.clone(),
        });
        breadcrumbs.insert(node.url.clone(), trail.clone());
        for child in node.children.values() {
            walk(child, &trail, breadcrumbs);
        }
    }

    for node in structure.values() {
        if node.url == "/" {
            breadcrumbs.insert("/".into(), vec![home.clone()]);
        } else {
            walk(node, std::slice::from_ref(&home), &mut breadcrumbs);
        }
    }

    breadcrumbs
}

/// Seed keywords per page from titles, business type, and service names.
fn initial_keyword_mapping(
    structure: &BTreeMap<String, SiteNode>,
    discovery: &DiscoveryOutput,
) -> BTreeMap<String, Vec<String>> {
    let mut mapping = BTreeMap::new();

    fn walk(node: &SiteNode, business_type: &str, mapping: &mut BTreeMap<String, Vec<String>>) {
        let mut keywords: Vec<String> = node
            .title
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        if node.template == "service_page" {
            keywords.push(business_type.replace('_', " "));
        }
        keywords.dedup();
        mapping.insert(node.url.clone(), keywords);
        for child in node.children.values() {
            walk(child, business_type, mapping);
        }
    }

    for node in structure.values() {
        walk(node, &discovery.business_type, &mut mapping);
    }

    mapping
}

/// The distinct templates referenced by the tree.
fn collect_templates(structure: &BTreeMap<String, SiteNode>) -> Vec<String> {
    let mut templates = Vec::new();

    fn walk(node: &SiteNode, templates: &mut Vec<String>) {
        if !templates.contains(&node.template) {
            templates.push(node.template.clone());
        }
        for child in node.children.values() {
            walk(child, templates);
        }
    }

    for node in structure.values() {
        walk(node, &mut templates);
    }
    templates
}

/// URL-safe slug from a title.
pub(crate) fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ContentPatterns, ServiceEntry};

    fn sample_discovery() -> DiscoveryOutput {
        let mut taxonomy = BTreeMap::new();
        taxonomy.insert(
            "Family Law".to_string(),
            vec!["Divorce".to_string(), "Custody".to_string()],
        );
        taxonomy.insert("Business Law".to_string(), vec!["Incorporation".to_string()]);

        DiscoveryOutput {
            url: "https://acme-law.example".into(),
            business_type: "law_firm".into(),
            service_taxonomy: taxonomy,
            services: vec![ServiceEntry {
                name: "Divorce".into(),
                description: String::new(),
                url: String::new(),
                source: "test".into(),
                content: String::new(),
                sections: vec![],
            }],
            content_patterns: ContentPatterns {
                has_team_profiles: true,
                ..ContentPatterns::default()
            },
            ..DiscoveryOutput::default()
        }
    }

    #[test]
    fn structure_has_category_level_for_rich_taxonomy() {
        let structure = build_site_structure(&sample_discovery());

        let services = &structure["services"];
        assert!(services.children.contains_key("family-law"));
        let family = &services.children["family-law"];
        assert_eq!(family.children.len(), 2);
        assert_eq!(
            family.children["divorce"].url,
            "/services/family-law/divorce"
        );

        // Team page exists because team profiles were discovered.
        assert!(structure["about"].children.contains_key("team"));
    }

    #[test]
    fn breadcrumbs_walk_depth_first() {
        let structure = build_site_structure(&sample_discovery());
        let breadcrumbs = build_breadcrumbs(&structure);

        let trail = &breadcrumbs["/services/family-law/divorce"];
        let titles: Vec<&str> = trail.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Home", "Services", "Family Law", "Divorce"]);
    }

    #[test]
    fn navigation_leads_with_home() {
        let structure = build_site_structure(&sample_discovery());
        let nav = build_navigation(&structure);

        assert_eq!(nav.primary_nav[0].url, "/");
        assert!(nav.footer_nav.iter().all(|item| item.url != "/"));
    }

    #[test]
    fn slugify_behaviour() {
        assert_eq!(slugify("Family Law"), "family-law");
        assert_eq!(slugify("Estate & Probate Planning"), "estate-probate-planning");
    }

    #[tokio::test]
    async fn planning_stage_runs_on_discovery_output() {
        let tmp_dir = std::env::temp_dir().join(format!(
            "sf-planning-test-{}",
            siteforge_shared::RunId::new()
        ));
        std::fs::create_dir_all(&tmp_dir).unwrap();

        let ctx = StageContext {
            project_dir: tmp_dir.clone(),
        };
        let input = serde_json::to_value(sample_discovery()).unwrap();

        let output = ArchitecturePlanningStage.run(&ctx, input).await.unwrap();

        assert!(output["total_pages"].as_u64().unwrap() >= 5);
        assert!(output["site_structure"]["services"].is_object());
        assert_eq!(output["url_pattern"], "/{section}/{page}");
        assert!(tmp_dir.join("planning/planning_output.json").exists());

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }
}
