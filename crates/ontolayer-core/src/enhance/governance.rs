use std::collections::BTreeSet;

use rayon::prelude::*;
use regex::Regex;

use super::{distinct_tags, DomainEnhancer, FrameworkCode, FrameworkLexicon};
use crate::entity::{ClassEntity, Classified, IndividualEntity, Layer, PropertyEntity};
use crate::model::{ClassifiedModel, FrameworkAnalysis, ReadinessThresholds, Tier};

pub const DOMAIN_TAG: &str = "cobit5_domain";
pub const BUSINESS_RELEVANCE_TAG: &str = "business_relevance";
pub const GOVERNANCE_RELEVANCE_TAG: &str = "governance_relevance";
pub const PROCESS_CODE_TAG: &str = "cobit5_process_code";

const BUSINESS_ENTITIES: &[&str] = &[
    "EnterpriseGoal", "ITGoal", "Goal", "Process", "Domain", "Enabler", "Control", "Framework",
    "Practice", "Activity", "Outcome", "Metric", "Stakeholder", "Role", "Responsibility",
    "RiskAssessment", "ComplianceRequirement", "AuditFinding",
];

const TECHNICAL_ENTITIES: &[&str] = &[
    "ObjectProperty", "DatatypeProperty", "AnnotationProperty", "Restriction", "Constraint",
    "ValidationRule", "InferenceRule",
];

const CORE_ENTITIES: &[&str] = &[
    "Organization", "Person", "System", "Application", "Information", "Service", "Resource",
    "Asset", "Time", "Date", "Status", "Type",
];

const HIGH_BUSINESS: &[&str] = &["goal", "process", "domain", "control", "audit", "compliance"];
const MEDIUM_BUSINESS: &[&str] = &["enabler", "framework", "practice", "activity", "metric"];
const GOVERNANCE_TERMS: &[&str] = &["governance", "control", "audit", "compliance", "risk", "monitor"];

const PROCESS_CODE_PATTERN: &str = r"(EDM|APO|BAI|DSS|MEA)\d{2}";

fn domains() -> Vec<FrameworkCode> {
    vec![
        FrameworkCode::new("EDM", "Evaluate, Direct and Monitor", "Governance", Some(1)),
        FrameworkCode::new("APO", "Align, Plan and Organize", "Management", Some(2)),
        FrameworkCode::new("BAI", "Build, Acquire and Implement", "Management", Some(2)),
        FrameworkCode::new("DSS", "Deliver, Service and Support", "Management", Some(2)),
        FrameworkCode::new("MEA", "Monitor, Evaluate and Assess", "Management", Some(2)),
    ]
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// COBIT5 governance-framework enhancer.
///
/// Readiness is rated on the number of business-layer entities after
/// enhancement.
#[derive(Debug, Clone)]
pub struct GovernanceEnhancer {
    lexicon: FrameworkLexicon,
    domains: Vec<FrameworkCode>,
    process_code: Option<Regex>,
    readiness: ReadinessThresholds,
}

impl GovernanceEnhancer {
    pub const DEFAULT_READINESS: ReadinessThresholds = ReadinessThresholds::new(20, 10);

    #[must_use]
    pub fn new() -> Self {
        Self {
            lexicon: FrameworkLexicon::new(BUSINESS_ENTITIES, TECHNICAL_ENTITIES, CORE_ENTITIES),
            domains: domains(),
            process_code: Regex::new(PROCESS_CODE_PATTERN).ok(),
            readiness: Self::DEFAULT_READINESS,
        }
    }

    #[must_use]
    pub fn with_lexicon(mut self, lexicon: FrameworkLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    #[must_use]
    pub fn with_readiness(mut self, readiness: ReadinessThresholds) -> Self {
        self.readiness = readiness;
        self
    }

    #[must_use]
    pub fn domains(&self) -> &[FrameworkCode] {
        &self.domains
    }

    fn entity_layers(&self, name: &str) -> BTreeSet<Layer> {
        let lower = name.to_lowercase();
        let mut layers = self.lexicon.layers_for(name);
        if self
            .domains
            .iter()
            .any(|d| lower.contains(&d.code.to_lowercase()))
        {
            layers.insert(Layer::Business);
        }
        layers
    }

    /// First domain code occurring in the upper-cased name.
    fn domain_code(&self, name: &str) -> Option<&str> {
        let upper = name.to_uppercase();
        self.domains
            .iter()
            .find(|d| upper.contains(d.code.as_str()))
            .map(|d| d.code.as_str())
    }

    fn process_code(&self, name: &str) -> Option<String> {
        let re = self.process_code.as_ref()?;
        re.find(&name.to_uppercase()).map(|m| m.as_str().to_string())
    }

    fn enhance_class(&self, class: &mut Classified<ClassEntity>) {
        let name = class.entity.header.local_name.clone();
        class.assignment.extend(self.entity_layers(&name));

        if let Some(code) = self.domain_code(&name) {
            class.set_tag(DOMAIN_TAG, code);
        }
        class.set_tag(BUSINESS_RELEVANCE_TAG, business_relevance(&name).as_str());
    }

    fn enhance_property(&self, property: &mut Classified<PropertyEntity>) {
        let name = property.entity.header.local_name.clone();
        let mut layers = self.entity_layers(&name);
        if property
            .entity
            .domain_and_range()
            .any(|r| self.lexicon.references_business(r))
        {
            layers.insert(Layer::Business);
        }
        property.assignment.extend(layers);
        property.set_tag(GOVERNANCE_RELEVANCE_TAG, governance_relevance(&name).as_str());
    }

    fn enhance_individual(&self, individual: &mut Classified<IndividualEntity>) {
        let name = individual.entity.header.local_name.clone();
        let mut layers = self.entity_layers(&name);
        if let Some(layer) = self.lexicon.type_layer(&individual.entity.type_local_name) {
            layers.insert(layer);
        }
        individual.assignment.extend(layers);

        if let Some(code) = self.process_code(&name) {
            individual.set_tag(PROCESS_CODE_TAG, code);
        }
    }

    /// Readiness reads the business total from `layer_statistics`, which
    /// already includes layers added by this enhancer, not the generic pass alone.
    fn analyze(&self, model: &ClassifiedModel) -> FrameworkAnalysis {
        let codes_found = distinct_tags(model, DOMAIN_TAG);
        let business_entities = model.layer_statistics.business.total;

        FrameworkAnalysis {
            framework: self.framework().to_string(),
            coverage_percentage: FrameworkAnalysis::coverage(codes_found.len(), self.domains.len()),
            codes_found,
            total_codes: self.domains.len(),
            readiness_basis: business_entities,
            readiness: self.readiness.tier(business_entities),
        }
    }
}

impl Default for GovernanceEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

fn business_relevance(name: &str) -> Tier {
    let lower = name.to_lowercase();
    if contains_any(&lower, HIGH_BUSINESS) {
        Tier::High
    } else if contains_any(&lower, MEDIUM_BUSINESS) {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn governance_relevance(name: &str) -> Tier {
    let lower = name.to_lowercase();
    if contains_any(&lower, GOVERNANCE_TERMS) {
        Tier::High
    } else if lower.contains("has") || lower.contains("is") {
        Tier::Medium
    } else {
        Tier::Low
    }
}

impl DomainEnhancer for GovernanceEnhancer {
    fn framework(&self) -> &str {
        "COBIT5"
    }

    fn enhance(&self, mut model: ClassifiedModel) -> ClassifiedModel {
        if self.lexicon.is_empty() {
            tracing::warn!("COBIT5 lexicon is empty, skipping enhancement");
            return model;
        }

        model.classes.par_iter_mut().for_each(|c| self.enhance_class(c));
        model
            .properties
            .par_iter_mut()
            .for_each(|p| self.enhance_property(p));
        model
            .individuals
            .par_iter_mut()
            .for_each(|i| self.enhance_individual(i));

        model.recompute_statistics();
        let analysis = self.analyze(&model);
        tracing::info!(
            domains = ?analysis.codes_found,
            readiness = %analysis.readiness,
            "COBIT5 enhancement completed"
        );
        model.analysis = Some(analysis);
        model
    }
}
