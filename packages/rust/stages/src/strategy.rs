//! Content-strategy stage: per-page outlines, template assignments, and
//! keyword mapping derived from the planned architecture.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use siteforge_pipeline::{Stage, StageContext};
use siteforge_shared::{Result, SiteForgeError, StageName};

use crate::payload::{PageOutline, PlanOutput, SiteNode, StrategyOutput};
use crate::write_json_artifact;

/// The third pipeline stage: content strategy.
pub struct ContentStrategyStage;

#[async_trait]
impl Stage for ContentStrategyStage {
    fn name(&self) -> StageName {
        StageName::ContentStrategy
    }

    #[instrument(skip_all)]
    async fn run(&self, ctx: &StageContext, input: Value) -> Result<Value> {
        let plan: PlanOutput = serde_json::from_value(input).map_err(|e| {
            SiteForgeError::validation(format!("strategy input is not a planning output: {e}"))
        })?;

        let mut page_templates = BTreeMap::new();
        let mut content_outlines = BTreeMap::new();

        for node in plan.site_structure.values() {
            walk(node, &plan, &mut page_templates, &mut content_outlines);
        }

        let output = StrategyOutput {
            estimated_pages: content_outlines.len(),
            page_templates,
            keyword_mapping: plan.keyword_mapping.clone(),
            content_outlines,
            business_info: plan.business_info.clone(),
            business_type: plan.business_type.clone(),
            contact: plan.contact.clone(),
            services: plan.services.clone(),
            navigation: plan.navigation.clone(),
        };

        write_json_artifact(&ctx.project_dir.join("strategy"), "strategy_output.json", &output)?;

        info!(
            outlines = output.content_outlines.len(),
            "content strategy complete"
        );

        serde_json::to_value(&output)
            .map_err(|e| SiteForgeError::State(format!("serialize strategy output: {e}")))
    }
}

fn walk(
    node: &SiteNode,
    plan: &PlanOutput,
    templates: &mut BTreeMap<String, String>,
    outlines: &mut BTreeMap<String, PageOutline>,
) {
    templates.insert(node.url.clone(), node.template.clone());
    outlines.insert(
        node.url.clone(),
        PageOutline {
            title: node.title.clone(),
            url: node.url.clone(),
            template: node.template.clone(),
            sections: sections_for_template(&node.template),
            keywords: plan.keyword_mapping.get(&node.url).cloned().unwrap_or_default(),
        },
    );

    for child in node.children.values() {
        walk(child, plan, templates, outlines);
    }
}

/// Outline sections per template kind.
fn sections_for_template(template: &str) -> Vec<String> {
    let sections: &[&str] = match template {
        "homepage" => &["hero", "services-overview", "why-choose-us", "call-to-action"],
        "about_page" | "story_page" => &["introduction", "history", "values", "call-to-action"],
        "team_page" => &["introduction", "team-members", "call-to-action"],
        "services_index" | "service_category" => &["overview", "service-list", "call-to-action"],
        "service_page" => &["introduction", "details", "benefits", "faq", "call-to-action"],
        "contact_page" => &["contact-details", "form", "map"],
        "locations_page" => &["locations", "contact-details"],
        _ => &["introduction", "content", "call-to-action"],
    };
    sections.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_template_includes_faq_section() {
        let sections = sections_for_template("service_page");
        assert!(sections.contains(&"faq".to_string()));
        assert!(sections.contains(&"call-to-action".to_string()));
    }

    #[tokio::test]
    async fn outlines_cover_every_planned_page() {
        let mut structure = BTreeMap::new();
        structure.insert("home".to_string(), SiteNode::new("Home", "/", "homepage", 1.0));
        let mut services = SiteNode::new("Services", "/services", "services_index", 0.9);
        services.children.insert(
            "divorce".into(),
            SiteNode::new("Divorce", "/services/divorce", "service_page", 0.8),
        );
        structure.insert("services".to_string(), services);

        let plan = PlanOutput {
            site_structure: structure,
            total_pages: 3,
            ..PlanOutput::default()
        };

        let tmp_dir = std::env::temp_dir().join(format!(
            "sf-strategy-test-{}",
            siteforge_shared::RunId::new()
        ));
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let ctx = StageContext {
            project_dir: tmp_dir.clone(),
        };

        let output = ContentStrategyStage
            .run(&ctx, serde_json::to_value(&plan).unwrap())
            .await
            .unwrap();

        let outlines = output["content_outlines"].as_object().unwrap();
        assert_eq!(outlines.len(), 3);
        assert!(outlines.contains_key("/services/divorce"));
        assert_eq!(output["estimated_pages"], 3);

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }
}
