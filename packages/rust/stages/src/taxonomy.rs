//! Business-type detection and service taxonomy classification.
//!
//! Both run over immutable keyword tables compiled into the binary and
//! injected into the discovery stage as values.

use std::collections::BTreeMap;

use tracing::info;

use crate::payload::ServiceEntry;

// ---------------------------------------------------------------------------
// Business-type detection
// ---------------------------------------------------------------------------

/// Keyword profile for one business type.
struct BusinessProfile {
    name: &'static str,
    /// General keywords; each occurrence in business text weighs 2,
    /// in service text 1.
    keywords: &'static [&'static str],
    /// Service-specific terms; each occurrence in service text weighs 3.
    services: &'static [&'static str],
}

const BUSINESS_PROFILES: &[BusinessProfile] = &[
    BusinessProfile {
        name: "law_firm",
        keywords: &[
            "attorney", "lawyer", "legal", "law firm", "litigation", "counsel",
            "practice area", "paralegal",
        ],
        services: &[
            "litigation", "divorce", "criminal defense", "estate planning",
            "personal injury", "immigration", "bankruptcy",
        ],
    },
    BusinessProfile {
        name: "medical_practice",
        keywords: &[
            "doctor", "physician", "medical", "clinic", "patient", "appointment",
            "health", "treatment", "diagnosis",
        ],
        services: &[
            "consultation", "surgery", "examination", "therapy", "checkup",
            "screening",
        ],
    },
    BusinessProfile {
        name: "accounting_firm",
        keywords: &[
            "accountant", "cpa", "tax", "audit", "bookkeeping", "payroll",
            "taxation",
        ],
        services: &[
            "tax preparation", "bookkeeping", "payroll", "financial planning",
            "tax planning",
        ],
    },
    BusinessProfile {
        name: "real_estate",
        keywords: &[
            "real estate", "property", "realtor", "listing", "mortgage", "broker",
        ],
        services: &[
            "buying", "selling", "property management", "rental",
            "commercial real estate", "residential",
        ],
    },
    BusinessProfile {
        name: "consulting",
        keywords: &[
            "consulting", "consultant", "advisory", "strategy", "solutions",
            "expertise",
        ],
        services: &["consulting", "strategy", "advisory", "training", "optimization"],
    },
];

/// Detects a business type by scoring keyword occurrences against the
/// immutable profile tables.
pub struct BusinessTypeDetector {
    profiles: &'static [BusinessProfile],
}

impl BusinessTypeDetector {
    pub fn new() -> Self {
        Self {
            profiles: BUSINESS_PROFILES,
        }
    }

    /// Score `business_text` (name/tagline/about) and `service_text`
    /// (service names and descriptions); the highest-weighted profile
    /// wins, falling back to `general_service`.
    pub fn detect(&self, business_text: &str, service_text: &str) -> String {
        let business_text = business_text.to_lowercase();
        let service_text = service_text.to_lowercase();

        let mut detected = "general_service";
        let mut max_weight = 0u32;

        for profile in self.profiles {
            let mut weight = 0u32;
            for keyword in profile.keywords {
                if business_text.contains(keyword) {
                    weight += 2;
                }
                if service_text.contains(keyword) {
                    weight += 1;
                }
            }
            for service in profile.services {
                if service_text.contains(service) {
                    weight += 3;
                }
            }
            if weight > max_weight {
                max_weight = weight;
                detected = profile.name;
            }
        }

        info!(business_type = detected, confidence = max_weight, "business type detected");
        detected.to_string()
    }
}

impl Default for BusinessTypeDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Service taxonomy
// ---------------------------------------------------------------------------

/// Keyword rule for one taxonomy category.
struct CategoryRule {
    name: &'static str,
    keywords: &'static [&'static str],
}

const LAW_FIRM_TAXONOMY: &[CategoryRule] = &[
    CategoryRule {
        name: "Criminal Law",
        keywords: &["criminal", "dui", "drug", "assault", "theft", "felony", "misdemeanor"],
    },
    CategoryRule {
        name: "Family Law",
        keywords: &["divorce", "custody", "child", "adoption", "alimony", "family"],
    },
    CategoryRule {
        name: "Personal Injury",
        keywords: &["injury", "accident", "medical malpractice", "slip", "fall", "negligence"],
    },
    CategoryRule {
        name: "Estate Planning",
        keywords: &["estate", "will", "trust", "probate", "inheritance"],
    },
    CategoryRule {
        name: "Business Law",
        keywords: &["business", "corporate", "contract", "partnership", "llc", "incorporation"],
    },
    CategoryRule {
        name: "Real Estate",
        keywords: &["real estate", "property", "landlord", "tenant", "closing"],
    },
    CategoryRule {
        name: "Immigration",
        keywords: &["immigration", "visa", "citizenship", "deportation", "asylum"],
    },
];

const MEDICAL_TAXONOMY: &[CategoryRule] = &[
    CategoryRule {
        name: "Primary Care",
        keywords: &["general", "checkup", "physical", "wellness", "preventive"],
    },
    CategoryRule {
        name: "Specialized Care",
        keywords: &["cardiology", "dermatology", "orthopedic", "neurology"],
    },
    CategoryRule {
        name: "Diagnostic Services",
        keywords: &["x-ray", "mri", "blood test", "screening", "diagnostic"],
    },
    CategoryRule {
        name: "Treatment Services",
        keywords: &["surgery", "therapy", "rehabilitation", "treatment"],
    },
];

/// Category used for services no rule matches.
const FALLBACK_CATEGORY: &str = "General Services";

/// Groups services into a taxonomy using the tables for one business type.
pub struct ServiceClassifier {
    rules: &'static [CategoryRule],
}

impl ServiceClassifier {
    /// The classifier for a detected business type; unknown types get an
    /// empty rule set, so every service lands in the fallback category.
    pub fn for_business_type(business_type: &str) -> Self {
        let rules: &'static [CategoryRule] = match business_type {
            "law_firm" => LAW_FIRM_TAXONOMY,
            "medical_practice" => MEDICAL_TAXONOMY,
            _ => &[],
        };
        Self { rules }
    }

    /// Partition services into categories; first matching rule wins.
    pub fn classify(&self, services: &[ServiceEntry]) -> BTreeMap<String, Vec<String>> {
        let mut taxonomy: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for service in services {
            let lower = service.name.to_lowercase();
            let category = self
                .rules
                .iter()
                .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
                .map_or(FALLBACK_CATEGORY, |rule| rule.name);

            taxonomy
                .entry(category.to_string())
                .or_default()
                .push(service.name.clone());
        }

        taxonomy
    }
}
