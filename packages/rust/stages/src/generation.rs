//! Content-generation stage: deterministic page body assembly from the
//! strategy outlines and the discovered content. No AI synthesis; the
//! text is templated from what discovery actually extracted.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use siteforge_pipeline::{Stage, StageContext};
use siteforge_shared::{Result, SiteForgeError, StageName};

use crate::payload::{GeneratedPage, GenerationOutput, PageOutline, StrategyOutput};
use crate::write_json_artifact;

/// The fourth pipeline stage: content generation.
pub struct ContentGenerationStage;

#[async_trait]
impl Stage for ContentGenerationStage {
    fn name(&self) -> StageName {
        StageName::ContentGeneration
    }

    #[instrument(skip_all)]
    async fn run(&self, ctx: &StageContext, input: Value) -> Result<Value> {
        let strategy: StrategyOutput = serde_json::from_value(input).map_err(|e| {
            SiteForgeError::validation(format!("generation input is not a strategy output: {e}"))
        })?;

        let business_name = strategy
            .business_info
            .name
            .clone()
            .unwrap_or_else(|| "the business".to_string());

        let nav_urls: Vec<String> = strategy
            .navigation
            .primary_nav
            .iter()
            .map(|item| item.url.clone())
            .collect();

        let mut generated_pages = BTreeMap::new();
        let mut total_word_count = 0;
        let mut internal_links = 0;

        for (url, outline) in &strategy.content_outlines {
            let page = generate_page(outline, &business_name, &strategy, &nav_urls);
            total_word_count += page.word_count;
            internal_links += page.internal_links.len();
            generated_pages.insert(url.clone(), page);
        }

        let output = GenerationOutput {
            generated_pages,
            total_word_count,
            internal_links,
            seo_optimized: true,
        };

        write_json_artifact(
            &ctx.project_dir.join("generation"),
            "generation_output.json",
            &output,
        )?;

        info!(
            pages = output.generated_pages.len(),
            words = output.total_word_count,
            "content generation complete"
        );

        serde_json::to_value(&output)
            .map_err(|e| SiteForgeError::State(format!("serialize generation output: {e}")))
    }
}

fn generate_page(
    outline: &PageOutline,
    business_name: &str,
    strategy: &StrategyOutput,
    nav_urls: &[String],
) -> GeneratedPage {
    let mut body = Vec::new();
    body.push(format!("# {}", outline.title));

    // Service pages reuse the extracted source content where it exists.
    let source_content = strategy
        .services
        .iter()
        .find(|s| outline.title.eq_ignore_ascii_case(&s.name))
        .map(|s| s.content.clone())
        .filter(|c| !c.is_empty());

    for section in &outline.sections {
        body.push(format!("\n## {}", section_heading(section)));
        match section.as_str() {
            "hero" => body.push(format!(
                "Welcome to {business_name}. {}",
                strategy
                    .business_info
                    .tagline
                    .as_deref()
                    .unwrap_or("We are here to help.")
            )),
            "introduction" | "details" => match &source_content {
                Some(content) => body.push(content.clone()),
                None => body.push(format!(
                    "{business_name} provides {} designed around your needs.",
                    outline.title.to_lowercase()
                )),
            },
            "services-overview" | "service-list" => {
                for service in &strategy.services {
                    body.push(format!("- {}", service.name));
                }
            }
            "contact-details" => {
                if let Some(phone) = &strategy.contact.phone {
                    body.push(format!("Phone: {phone}"));
                }
                if let Some(email) = &strategy.contact.email {
                    body.push(format!("Email: {email}"));
                }
                if let Some(address) = &strategy.contact.address {
                    body.push(format!("Address: {address}"));
                }
            }
            "call-to-action" => body.push(format!(
                "Contact {business_name} today to find out how we can help."
            )),
            _ => body.push(format!(
                "{business_name} — {}.",
                section_heading(section).to_lowercase()
            )),
        }
    }

    let body = body.join("\n");
    let word_count = body.split_whitespace().count();

    let meta_description = match &source_content {
        Some(content) => content.chars().take(160).collect(),
        None => format!("{} — {business_name}", outline.title),
    };

    GeneratedPage {
        title: outline.title.clone(),
        url: outline.url.clone(),
        template: outline.template.clone(),
        meta_description,
        word_count,
        internal_links: nav_urls
            .iter()
            .filter(|u| u.as_str() != outline.url)
            .cloned()
            .collect(),
        body,
    }
}

fn section_heading(section: &str) -> String {
    section
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{BusinessInfo, NavItem, NavigationPlan, ServiceEntry};

    fn sample_strategy() -> StrategyOutput {
        let mut outlines = BTreeMap::new();
        outlines.insert(
            "/".to_string(),
            PageOutline {
                title: "Home".into(),
                url: "/".into(),
                template: "homepage".into(),
                sections: vec!["hero".into(), "services-overview".into(), "call-to-action".into()],
                keywords: vec![],
            },
        );
        outlines.insert(
            "/services/divorce".to_string(),
            PageOutline {
                title: "Divorce".into(),
                url: "/services/divorce".into(),
                template: "service_page".into(),
                sections: vec!["introduction".into(), "call-to-action".into()],
                keywords: vec![],
            },
        );

        StrategyOutput {
            content_outlines: outlines,
            estimated_pages: 2,
            business_info: BusinessInfo {
                name: Some("Acme Law".into()),
                ..BusinessInfo::default()
            },
            services: vec![ServiceEntry {
                name: "Divorce".into(),
                description: String::new(),
                url: String::new(),
                source: "test".into(),
                content: "Our attorneys have guided families through divorce for decades.".into(),
                sections: vec![],
            }],
            navigation: NavigationPlan {
                primary_nav: vec![
                    NavItem { label: "Home".into(), url: "/".into() },
                    NavItem { label: "Divorce".into(), url: "/services/divorce".into() },
                ],
                footer_nav: vec![],
            },
            ..StrategyOutput::default()
        }
    }

    #[tokio::test]
    async fn generates_every_outlined_page() {
        let tmp_dir = std::env::temp_dir().join(format!(
            "sf-generation-test-{}",
            siteforge_shared::RunId::new()
        ));
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let ctx = StageContext {
            project_dir: tmp_dir.clone(),
        };

        let output = ContentGenerationStage
            .run(&ctx, serde_json::to_value(sample_strategy()).unwrap())
            .await
            .unwrap();

        let pages = output["generated_pages"].as_object().unwrap();
        assert_eq!(pages.len(), 2);
        assert!(output["total_word_count"].as_u64().unwrap() > 0);

        // The service page reuses the extracted content.
        let divorce_body = pages["/services/divorce"]["body"].as_str().unwrap();
        assert!(divorce_body.contains("guided families through divorce"));

        // Internal links point at the other pages, not at self.
        let links = pages["/"]["internal_links"].as_array().unwrap();
        assert!(!links.iter().any(|l| l == "/"));

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[test]
    fn section_headings_are_title_cased() {
        assert_eq!(section_heading("call-to-action"), "Call To Action");
        assert_eq!(section_heading("hero"), "Hero");
    }
}
