//! Stage-specific output summaries for checkpoint reports.

use serde_json::{Value, json};

use siteforge_shared::StageName;

/// Summarize a stage's output for checkpoint review.
pub fn summarize(stage: StageName, output: &Value) -> Value {
    match stage {
        StageName::Discovery => json!({
            "business_name": output
                .pointer("/business_info/name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown"),
            "services_found": len_of(output, "services"),
            "pages_discovered": discovered_page_count(output),
            "has_contact_info": output
                .get("contact")
                .and_then(Value::as_object)
                .is_some_and(|c| !c.values().all(Value::is_null)),
        }),
        StageName::ArchitecturePlanning => json!({
            "total_pages": output.get("total_pages").and_then(Value::as_u64).unwrap_or(0),
            "service_categories": len_of(output, "service_taxonomy"),
            "navigation_items": output
                .pointer("/navigation/primary_nav")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            "url_structure": output
                .get("url_pattern")
                .and_then(Value::as_str)
                .unwrap_or("Not defined"),
        }),
        StageName::ContentStrategy => json!({
            "content_templates": len_of(output, "page_templates"),
            "total_keywords": len_of(output, "keyword_mapping"),
            "content_outlines": len_of(output, "content_outlines"),
            "estimated_pages": output.get("estimated_pages").and_then(Value::as_u64).unwrap_or(0),
        }),
        StageName::ContentGeneration => json!({
            "pages_generated": len_of(output, "generated_pages"),
            "total_word_count": output
                .get("total_word_count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            "internal_links_created": output
                .get("internal_links")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            "seo_optimized": output
                .get("seo_optimized")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }),
        StageName::SiteEmission => json!({
            "files_written": len_of(output, "files_written"),
            "sitemap_generated": output
                .get("sitemap_generated")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            "ready_for_deployment": output
                .get("ready")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }),
    }
}

/// Element count of an array or object field, 0 when absent.
fn len_of(output: &Value, key: &str) -> usize {
    match output.get(key) {
        Some(Value::Array(a)) => a.len(),
        Some(Value::Object(o)) => o.len(),
        _ => 0,
    }
}

/// Total URLs across the discovered-pages categories.
fn discovered_page_count(output: &Value) -> usize {
    output
        .get("discovered_pages")
        .and_then(Value::as_object)
        .map_or(0, |categories| {
            categories
                .values()
                .filter_map(Value::as_array)
                .map(Vec::len)
                .sum()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_summary_shape() {
        let output = json!({
            "business_info": {"name": "Acme Law"},
            "services": [{"name": "Divorce"}, {"name": "Corporate"}],
            "discovered_pages": {
                "services": ["https://a/s1", "https://a/s2"],
                "about": ["https://a/about"],
                "contact": [],
                "other": []
            },
            "contact": {"email": "info@acme.example"}
        });

        let summary = summarize(StageName::Discovery, &output);
        assert_eq!(summary["business_name"], "Acme Law");
        assert_eq!(summary["services_found"], 2);
        assert_eq!(summary["pages_discovered"], 3);
        assert_eq!(summary["has_contact_info"], true);
    }

    #[test]
    fn empty_output_summarizes_without_panicking() {
        for stage in StageName::ALL {
            let summary = summarize(stage, &json!({}));
            assert!(summary.is_object());
        }
    }
}
