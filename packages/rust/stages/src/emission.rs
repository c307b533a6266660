//! Site-emission stage: writes one JSON page document per generated page
//! under `site/`, plus a sitemap.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use siteforge_pipeline::{Stage, StageContext};
use siteforge_shared::{Result, SiteForgeError, StageName};

use crate::payload::{EmissionOutput, GenerationOutput};
use crate::write_json_artifact;

/// The final pipeline stage: site emission.
pub struct SiteEmissionStage;

#[async_trait]
impl Stage for SiteEmissionStage {
    fn name(&self) -> StageName {
        StageName::SiteEmission
    }

    #[instrument(skip_all)]
    async fn run(&self, ctx: &StageContext, input: Value) -> Result<Value> {
        let generation: GenerationOutput = serde_json::from_value(input).map_err(|e| {
            SiteForgeError::validation(format!("emission input is not a generation output: {e}"))
        })?;

        let site_dir = ctx.project_dir.join("site");
        std::fs::create_dir_all(&site_dir).map_err(|e| SiteForgeError::io(&site_dir, e))?;

        let mut files_written = Vec::new();

        for (url, page) in &generation.generated_pages {
            let file_name = format!("{}.json", page_slug(url));
            write_json_artifact(&site_dir, &file_name, page)?;
            files_written.push(format!("site/{file_name}"));
        }

        let sitemap = render_sitemap(generation.generated_pages.keys());
        let sitemap_path = site_dir.join("sitemap.xml");
        std::fs::write(&sitemap_path, sitemap)
            .map_err(|e| SiteForgeError::io(&sitemap_path, e))?;
        files_written.push("site/sitemap.xml".to_string());

        let output = EmissionOutput {
            sitemap_generated: true,
            ready: !generation.generated_pages.is_empty(),
            files_written,
        };

        write_json_artifact(
            &ctx.project_dir.join("emission"),
            "emission_output.json",
            &output,
        )?;

        info!(files = output.files_written.len(), "site emission complete");

        serde_json::to_value(&output)
            .map_err(|e| SiteForgeError::State(format!("serialize emission output: {e}")))
    }
}

/// File slug for a page URL (`/services/divorce` → `services-divorce`).
fn page_slug(url: &str) -> String {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.replace('/', "-")
    }
}

/// Minimal urlset sitemap over the emitted page URLs.
fn render_sitemap<'a>(urls: impl Iterator<Item = &'a String>) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in urls {
        out.push_str(&format!("  <url><loc>{url}</loc></url>\n"));
    }
    out.push_str("</urlset>\n");
    out
}
