//! Discovery stage: runs the Discovery Engine against the target site,
//! analyzes the homepage for business identity and contact details,
//! enhances services with extracted page content, and classifies them
//! into a taxonomy.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

use siteforge_crawler::DiscoveryEngine;
use siteforge_pipeline::{Stage, StageContext};
use siteforge_shared::{
    CategorizedUrls, DiscoveryConfig, PageContent, PageSection, Result, SiteForgeError, StageName,
};

use crate::payload::{
    BusinessInfo, ContactInfo, ContentAnalysis, ContentPatterns, DiscoveryOutput, NavItem,
    ServiceEntry,
};
use crate::taxonomy::{BusinessTypeDetector, ServiceClassifier};
use crate::write_json_artifact;

/// How many about pages are read for the business summary.
const MAX_ABOUT_PAGES: usize = 3;

/// Body excerpt length carried on service entries.
const EXCERPT_LEN: usize = 500;

/// Sections carried per service entry.
const MAX_SERVICE_SECTIONS: usize = 5;

/// The first pipeline stage: website discovery and analysis.
pub struct DiscoveryStage {
    config: DiscoveryConfig,
}

impl DiscoveryStage {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for DiscoveryStage {
    fn name(&self) -> StageName {
        StageName::Discovery
    }

    #[instrument(skip_all)]
    async fn run(&self, ctx: &StageContext, input: Value) -> Result<Value> {
        let url = input
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| SiteForgeError::validation("url is required for the discovery stage"))?;
        let root = normalize_root(url)?;

        info!(url = %root, "starting discovery");

        let engine = DiscoveryEngine::new(&self.config)?;
        let discovered = engine.discover(&root).await?;

        let homepage = match engine.fetcher().get_text(&root).await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(url = %root, error = %e, "homepage analysis skipped");
                None
            }
        };

        let mut business_info = homepage
            .as_deref()
            .map(extract_business_info)
            .unwrap_or_default();
        let contact = homepage
            .as_deref()
            .map(extract_contact_info)
            .unwrap_or_default();
        let navigation = homepage
            .as_deref()
            .map(|html| extract_navigation(html, &root))
            .unwrap_or_default();

        // Enhance services with content extracted from each service page.
        let mut services: Vec<ServiceEntry> = Vec::new();
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut analyzed_pages: Vec<PageContent> = Vec::new();

        for service_url in &discovered.services {
            let Ok(page_url) = Url::parse(service_url) else {
                continue;
            };
            let content = engine.extract_content(&page_url).await;
            if content.title.is_empty() && content.body.is_empty() {
                continue;
            }

            let name = clean_service_name(&content.title);
            if !name.is_empty() && seen_names.insert(name.to_lowercase()) {
                services.push(ServiceEntry {
                    name,
                    description: content.description.clone(),
                    url: service_url.clone(),
                    source: "crawled_page".into(),
                    content: excerpt(&content.body, EXCERPT_LEN),
                    sections: content
                        .sections
                        .iter()
                        .take(MAX_SERVICE_SECTIONS)
                        .cloned()
                        .collect(),
                });
            }
            analyzed_pages.push(content);
        }

        // Navigation labels that read like services fill in the gaps.
        for item in &navigation {
            let name = clean_service_name(&item.label);
            if is_service_related(&item.label)
                && !name.is_empty()
                && seen_names.insert(name.to_lowercase())
            {
                services.push(ServiceEntry {
                    name,
                    description: String::new(),
                    url: item.url.clone(),
                    source: "navigation".into(),
                    content: String::new(),
                    sections: Vec::new(),
                });
            }
        }

        // About pages feed the business summary and the content analysis.
        for about_url in discovered.about.iter().take(MAX_ABOUT_PAGES) {
            let Ok(page_url) = Url::parse(about_url) else {
                continue;
            };
            let content = engine.extract_content(&page_url).await;
            if business_info.about_summary.is_none() && !content.body.is_empty() {
                business_info.about_summary = Some(excerpt(&content.body, EXCERPT_LEN));
            }
            if !content.title.is_empty() || !content.body.is_empty() {
                analyzed_pages.push(content);
            }
        }

        let business_text = [
            business_info.name.as_deref().unwrap_or(""),
            business_info.tagline.as_deref().unwrap_or(""),
            business_info.about_summary.as_deref().unwrap_or(""),
        ]
        .join(" ");
        let service_text = services
            .iter()
            .map(|s| format!("{} {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join(" ");

        let business_type = BusinessTypeDetector::new().detect(&business_text, &service_text);
        let service_taxonomy =
            ServiceClassifier::for_business_type(&business_type).classify(&services);

        let content_analysis = analyze_content_depth(&discovered, &analyzed_pages);
        let content_patterns = identify_content_patterns(&discovered, &analyzed_pages, &services);

        let output = DiscoveryOutput {
            url: root.to_string(),
            business_info,
            business_type,
            contact,
            services,
            service_taxonomy,
            discovered_pages: discovered,
            navigation,
            content_analysis,
            content_patterns,
        };

        let dir = ctx.project_dir.join("discovery");
        write_json_artifact(&dir, "discovery_output.json", &output)?;
        let report_path = dir.join("discovery_report.md");
        std::fs::write(&report_path, render_report(&output))
            .map_err(|e| SiteForgeError::io(&report_path, e))?;

        info!(
            services = output.services.len(),
            pages = output.discovered_pages.total(),
            business_type = %output.business_type,
            "discovery stage complete"
        );

        serde_json::to_value(&output)
            .map_err(|e| SiteForgeError::State(format!("serialize discovery output: {e}")))
    }
}

/// Accept bare hostnames by defaulting to https.
fn normalize_root(url: &str) -> Result<Url> {
    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    Url::parse(&candidate)
        .map_err(|e| SiteForgeError::validation(format!("invalid URL {url:?}: {e}")))
}

// ---------------------------------------------------------------------------
// Homepage analysis
// ---------------------------------------------------------------------------

fn extract_business_info(html: &str) -> BusinessInfo {
    let doc = Html::parse_document(html);
    let mut info = BusinessInfo::default();

    let og_sel = Selector::parse(r#"meta[property="og:site_name"]"#).unwrap();
    let og_name = doc
        .select(&og_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .filter(|s| !s.is_empty());

    let brand_sel = Selector::parse(
        r#"[class*="brand"], [class*="site-title"], [class*="company-name"]"#,
    )
    .unwrap();
    let brand_text = doc
        .select(&brand_sel)
        .next()
        .map(|el| collapse(&el.text().collect::<String>()))
        .filter(|s| s.len() > 3);

    let logo_sel = Selector::parse(r#"img[class*="logo"], img[id*="logo"]"#).unwrap();
    if let Some(alt) = doc
        .select(&logo_sel)
        .next()
        .and_then(|el| el.value().attr("alt"))
    {
        if !alt.is_empty() {
            info.logo_alt = Some(alt.to_string());
        }
    }

    let title_sel = Selector::parse("title").unwrap();
    let title_name = doc
        .select(&title_sel)
        .next()
        .map(|el| clean_business_name(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty());

    // Preference order: explicit metadata, then branded chrome, then title.
    info.name = og_name
        .or(brand_text)
        .or_else(|| {
            info.logo_alt
                .clone()
                .filter(|alt| alt.len() > 3 && !alt.to_lowercase().starts_with("logo"))
        })
        .or(title_name);

    let tagline_sel =
        Selector::parse(r#"[class*="tagline"], [class*="slogan"], [class*="subtitle"]"#).unwrap();
    info.tagline = doc
        .select(&tagline_sel)
        .next()
        .map(|el| collapse(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty());

    info
}

fn extract_contact_info(html: &str) -> ContactInfo {
    let doc = Html::parse_document(html);
    let mut contact = ContactInfo::default();

    let body_sel = Selector::parse("body").unwrap();
    let text = doc
        .select(&body_sel)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let phone_re = Regex::new(r"\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]\d{4}").unwrap();
    contact.phone = phone_re.find(&text).map(|m| m.as_str().trim().to_string());

    let email_re = Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap();
    contact.email = email_re.find(&text).map(|m| m.as_str().to_string());

    // A mailto link is the most reliable email signal.
    let mailto_sel = Selector::parse(r#"a[href^="mailto:"]"#).unwrap();
    if let Some(href) = doc
        .select(&mailto_sel)
        .next()
        .and_then(|el| el.value().attr("href"))
    {
        contact.email = Some(href.trim_start_matches("mailto:").to_string());
    }

    let address_sel = Selector::parse(r#"address, [class*="address"]"#).unwrap();
    contact.address = doc
        .select(&address_sel)
        .next()
        .map(|el| collapse(&el.text().collect::<String>()))
        .filter(|s| !s.is_empty());

    contact
}

fn extract_navigation(html: &str, base: &Url) -> Vec<NavItem> {
    let doc = Html::parse_document(html);
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for selector in ["nav a", ".nav a", ".menu a"] {
        let sel = Selector::parse(selector).unwrap();
        for el in doc.select(&sel) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if href.starts_with('#') {
                continue;
            }
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            let label = collapse(&el.text().collect::<String>());
            if label.is_empty() || !seen.insert(resolved.to_string()) {
                continue;
            }
            items.push(NavItem {
                label,
                url: resolved.to_string(),
            });
        }
        if !items.is_empty() {
            break;
        }
    }

    items
}

// ---------------------------------------------------------------------------
// Service helpers
// ---------------------------------------------------------------------------

/// Normalize a page title into a service name: drop separator suffixes
/// ("Divorce Law | Acme") and a trailing "Service(s)".
fn clean_service_name(title: &str) -> String {
    let separator_re = Regex::new(r"\s*[|\-•–].*$").unwrap();
    let cleaned = separator_re.replace(title, "");
    let services_re = Regex::new(r"\s+[Ss]ervices?$").unwrap();
    let cleaned = services_re.replace(&cleaned, "");
    collapse(&cleaned)
}

fn is_service_related(text: &str) -> bool {
    const SERVICE_KEYWORDS: &[&str] = &[
        "service", "practice", "solution", "consulting", "treatment", "therapy", "program",
        "assistance",
    ];
    let lower = text.to_lowercase();
    SERVICE_KEYWORDS.iter().any(|k| lower.contains(k))
}

// ---------------------------------------------------------------------------
// Content analysis
// ---------------------------------------------------------------------------

fn analyze_content_depth(
    discovered: &CategorizedUrls,
    pages: &[PageContent],
) -> ContentAnalysis {
    let mut analysis = ContentAnalysis {
        total_pages: discovered.total(),
        ..ContentAnalysis::default()
    };

    let mut total_length = 0usize;
    for page in pages {
        if page.body.is_empty() {
            continue;
        }
        analysis.pages_with_content += 1;
        total_length += page.body.chars().count();
        analysis
            .content_quality_scores
            .insert(page.url.clone(), score_content_quality(page));

        let lower = page.body.to_lowercase();
        if !lower.contains("testimonial") {
            analysis
                .missing_content
                .push(format!("{}: No testimonials", page.url));
        }
        if !lower.contains("faq") && !lower.contains("frequently") {
            analysis.missing_content.push(format!("{}: No FAQs", page.url));
        }
    }

    if analysis.pages_with_content > 0 {
        analysis.average_content_length = total_length / analysis.pages_with_content;
    }

    analysis
}

/// Score content quality 0-100: length, structure, and key elements.
fn score_content_quality(page: &PageContent) -> u32 {
    let mut score = 0;

    let length = page.body.chars().count();
    if length > 3000 {
        score += 30;
    } else if length > 1500 {
        score += 20;
    } else if length > 500 {
        score += 10;
    }

    let has_h2 = page
        .sections
        .iter()
        .any(|s| matches!(s, PageSection::Heading { level: 2, .. }));
    let has_h3 = page
        .sections
        .iter()
        .any(|s| matches!(s, PageSection::Heading { level: 3, .. }));
    let has_list = page.sections.iter().any(|s| matches!(s, PageSection::List { .. }));
    if has_h2 {
        score += 10;
    }
    if has_h3 {
        score += 10;
    }
    if has_list {
        score += 10;
    }

    let lower = page.body.to_lowercase();
    for keywords in [
        ["testimonial", "review"],
        ["faq", "question"],
        ["contact", "call"],
        ["about", "experience"],
    ] {
        if keywords.iter().any(|k| lower.contains(k)) {
            score += 10;
        }
    }

    score.min(100)
}

fn identify_content_patterns(
    discovered: &CategorizedUrls,
    pages: &[PageContent],
    services: &[ServiceEntry],
) -> ContentPatterns {
    let mut patterns = ContentPatterns {
        has_service_pages: !services.is_empty(),
        ..ContentPatterns::default()
    };

    for url in discovered.iter_all() {
        let lower = url.to_lowercase();
        if lower.contains("blog") || lower.contains("news") || lower.contains("article") {
            patterns.has_blog = true;
        }
        if lower.contains("case-study") || lower.contains("portfolio") || lower.contains("project")
        {
            patterns.has_case_studies = true;
        }
        if lower.contains("testimonial") || lower.contains("review") {
            patterns.has_testimonials = true;
        }
        if lower.contains("location") || lower.contains("office") {
            patterns.has_location_pages = true;
        }
        if lower.contains("team") || lower.contains("staff") || lower.contains("attorney") {
            patterns.has_team_profiles = true;
        }
    }

    let sample_length: usize = pages.iter().take(3).map(|p| p.body.chars().count()).sum();
    patterns.content_style = if sample_length == 0 {
        "unknown".into()
    } else if sample_length > 5000 {
        "detailed".into()
    } else if sample_length > 2000 {
        "moderate".into()
    } else {
        "concise".into()
    };

    patterns
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Render the human-readable discovery summary document.
fn render_report(output: &DiscoveryOutput) -> String {
    let mut report = Vec::new();

    report.push("# Discovery Report".to_string());
    report.push(format!("\n**URL:** {}", output.url));
    report.push(format!(
        "**Business Name:** {}",
        output.business_info.name.as_deref().unwrap_or("Unknown")
    ));
    report.push(format!("**Business Type:** {}", output.business_type));

    report.push("\n## Services Found".to_string());
    report.push(format!(
        "Total services discovered: {}",
        output.services.len()
    ));

    if !output.service_taxonomy.is_empty() {
        report.push("\n### Service Categories".to_string());
        for (category, names) in &output.service_taxonomy {
            report.push(format!("\n**{category}** ({} services)", names.len()));
            for name in names.iter().take(5) {
                report.push(format!("- {name}"));
            }
            if names.len() > 5 {
                report.push(format!("  ... and {} more", names.len() - 5));
            }
        }
    }

    report.push("\n## Content Analysis".to_string());
    let analysis = &output.content_analysis;
    report.push(format!("- Total pages: {}", analysis.total_pages));
    report.push(format!(
        "- Pages with content: {}",
        analysis.pages_with_content
    ));
    report.push(format!(
        "- Average content length: {} characters",
        analysis.average_content_length
    ));

    if !analysis.missing_content.is_empty() {
        report.push("\n### Missing Content".to_string());
        for missing in analysis.missing_content.iter().take(10) {
            report.push(format!("- {missing}"));
        }
    }

    report.push("\n## Content Patterns".to_string());
    let patterns = &output.content_patterns;
    report.push(format!("- Has blog: {}", patterns.has_blog));
    report.push(format!("- Has testimonials: {}", patterns.has_testimonials));
    report.push(format!("- Has team profiles: {}", patterns.has_team_profiles));
    report.push(format!("- Content style: {}", patterns.content_style));

    report.push("\n## Contact Information".to_string());
    let contact = &output.contact;
    report.push(format!(
        "- Phone: {}",
        contact.phone.as_deref().unwrap_or("Not found")
    ));
    report.push(format!(
        "- Email: {}",
        contact.email.as_deref().unwrap_or("Not found")
    ));
    report.push(format!(
        "- Address: {}",
        contact.address.as_deref().unwrap_or("Not found")
    ));

    report.join("\n")
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip separator suffixes from a site title ("Acme Law | Home" → "Acme Law").
fn clean_business_name(title: &str) -> String {
    let separator_re = Regex::new(r"\s*[|•–].*$").unwrap();
    collapse(&separator_re.replace(title.trim(), ""))
}
