//! Checkpoint validators: pure, side-effect-free functions over stage
//! outputs. Validators never touch pipeline state; the pipeline wraps
//! their result into a checkpoint report.

use serde_json::Value;

use siteforge_shared::{StageName, ValidationResult};

/// A checkpoint validator for one stage's output.
pub type Validator = fn(&Value) -> ValidationResult;

/// The stage-specific validator for a checkpoint.
pub fn validator_for(stage: StageName) -> Validator {
    match stage {
        StageName::Discovery => validate_discovery,
        StageName::ArchitecturePlanning => validate_planning,
        StageName::ContentStrategy => validate_strategy,
        StageName::ContentGeneration => validate_generation,
        StageName::SiteEmission => validate_emission,
    }
}

/// Default validator: always passes with no findings.
pub fn always_pass(_output: &Value) -> ValidationResult {
    ValidationResult::pass()
}

pub fn validate_discovery(output: &Value) -> ValidationResult {
    let mut results = ValidationResult::pass();

    let business_name = output
        .pointer("/business_info/name")
        .and_then(Value::as_str)
        .unwrap_or("");
    if business_name.is_empty() {
        results.errors.push("Business name not found".into());
        results.passed = false;
    }

    let service_count = output
        .get("services")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if service_count == 0 {
        results
            .warnings
            .push("No services found - will use default services".into());
    } else if service_count < 3 {
        results.warnings.push(format!(
            "Only {service_count} services found - consider adding more"
        ));
    }

    let has_email = output
        .pointer("/contact/email")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    let has_phone = output
        .pointer("/contact/phone")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if !has_email && !has_phone {
        results.warnings.push("No contact information found".into());
    }

    results
}

pub fn validate_planning(output: &Value) -> ValidationResult {
    let mut results = ValidationResult::pass();

    let structure_len = output
        .get("site_structure")
        .and_then(Value::as_object)
        .map_or(0, |o| o.len());
    if structure_len == 0 {
        results.errors.push("Site structure not defined".into());
        results.passed = false;
    }

    if output.get("navigation").map_or(true, Value::is_null) {
        results.errors.push("Navigation not defined".into());
        results.passed = false;
    }

    let total_pages = output
        .get("total_pages")
        .and_then(Value::as_u64)
        .unwrap_or(structure_len as u64);
    if total_pages < 5 {
        results
            .warnings
            .push("Less than 5 pages in site structure".into());
    }

    results
}

pub fn validate_strategy(output: &Value) -> ValidationResult {
    let mut results = ValidationResult::pass();

    let outline_count = output
        .get("content_outlines")
        .and_then(Value::as_object)
        .map_or(0, |o| o.len());
    if outline_count == 0 {
        results.errors.push("No content outlines created".into());
        results.passed = false;
    }

    let keyword_count = output
        .get("keyword_mapping")
        .and_then(Value::as_object)
        .map_or(0, |o| o.len());
    if keyword_count == 0 {
        results.warnings.push("No keyword mapping defined".into());
    }

    results
}

pub fn validate_generation(output: &Value) -> ValidationResult {
    let mut results = ValidationResult::pass();

    let page_count = output
        .get("generated_pages")
        .and_then(Value::as_object)
        .map_or(0, |o| o.len());
    if page_count == 0 {
        results.errors.push("No pages generated".into());
        results.passed = false;
    }

    let word_count = output
        .get("total_word_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if word_count == 0 {
        results.warnings.push("Generated pages contain no text".into());
    }

    results
}

pub fn validate_emission(output: &Value) -> ValidationResult {
    let mut results = ValidationResult::pass();

    let ready = output.get("ready").and_then(Value::as_bool).unwrap_or(false);
    if !ready {
        results.errors.push("Site emission did not complete".into());
        results.passed = false;
    }

    let files_written = output
        .get("files_written")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if files_written == 0 {
        results.warnings.push("No site files were written".into());
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn discovery_requires_business_name() {
        let output = json!({"business_info": {}, "services": []});
        let results = validate_discovery(&output);
        assert!(!results.passed);
        assert_eq!(results.errors, vec!["Business name not found".to_string()]);
    }

    #[test]
    fn discovery_few_services_is_warning_not_error() {
        let output = json!({
            "business_info": {"name": "Acme Law"},
            "services": [{"name": "Divorce"}, {"name": "Corporate"}],
            "contact": {"email": "info@acme.example"}
        });
        let results = validate_discovery(&output);
        assert!(results.passed);
        assert!(results.errors.is_empty());
        assert!(results.warnings.iter().any(|w| w.contains("Only 2 services")));
    }

    #[test]
    fn discovery_missing_contact_is_warning() {
        let output = json!({
            "business_info": {"name": "Acme Law"},
            "services": [{"a":1},{"b":2},{"c":3}],
            "contact": {}
        });
        let results = validate_discovery(&output);
        assert!(results.passed);
        assert!(results
            .warnings
            .iter()
            .any(|w| w.contains("No contact information")));
    }

    #[test]
    fn planning_requires_structure_and_navigation() {
        let results = validate_planning(&json!({}));
        assert!(!results.passed);
        assert_eq!(results.errors.len(), 2);

        let ok = json!({
            "site_structure": {"home": {}, "about": {}, "services": {}, "contact": {}, "faq": {}},
            "navigation": {"primary_nav": []},
            "total_pages": 5
        });
        let results = validate_planning(&ok);
        assert!(results.passed);
        assert!(results.errors.is_empty());
        assert!(results.warnings.is_empty());
    }

    #[test]
    fn strategy_requires_outlines() {
        let results = validate_strategy(&json!({"keyword_mapping": {}}));
        assert!(!results.passed);
        assert!(results.errors.iter().any(|e| e.contains("outlines")));
    }

    #[test]
    fn emission_requires_ready_flag() {
        let results = validate_emission(&json!({"files_written": ["site/index.json"]}));
        assert!(!results.passed);

        let results = validate_emission(&json!({
            "ready": true,
            "files_written": ["site/index.json"],
        }));
        assert!(results.passed);
    }
}
