use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const TECHNICAL_KEYWORDS: &[&str] = &[
    "property", "class", "individual", "restriction", "constraint", "axiom", "assertion",
    "inference", "reasoning", "ontology", "namespace", "prefix", "uri", "iri", "rdf", "owl",
    "rdfs", "xsd", "domain", "range", "inverse", "functional", "transitive", "symmetric",
    "reflexive", "irreflexive", "asymmetric", "equivalent", "disjoint", "complement", "union",
    "intersection", "cardinality", "qualified", "some", "only", "exactly", "min", "max",
    "annotation", "comment", "label", "seealso", "isdefinedby", "datatype", "literal",
    "subclass", "subproperty", "onproperty", "valuesfrom", "hasvalue", "oneof", "sameas",
    "differentfrom", "deprecated", "versioninfo", "imports",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "domain", "process", "goal", "objective", "enabler", "control", "governance", "management",
    "audit", "compliance", "risk", "stakeholder", "framework", "practice", "activity", "outcome",
    "metric", "kpi", "performance", "maturity", "capability", "service", "resource", "asset",
    "value", "benefit", "requirement", "standard", "policy", "procedure", "guideline",
    "laboratory", "test", "sample", "analysis", "result", "calibration", "measurement",
    "uncertainty", "traceability", "quality", "assurance", "accreditation", "certification",
];

const CORE_KEYWORDS: &[&str] = &[
    "organization", "role", "responsibility", "person", "user", "system", "application", "data",
    "information", "document", "record", "identifier", "location", "time", "date", "period",
    "duration", "schedule", "event", "action", "status", "state", "type", "category",
    "classification",
];

const TECHNICAL_PATTERNS: &[&str] = &[
    r"^has[A-Z]",
    r"^is[A-Z]",
    r"(Property|Class|Restriction|Constraint|Axiom)$",
];

const BUSINESS_PATTERNS: &[&str] = &[
    r"(Goal|Process|Domain|Enabler|Control|Framework|Standard|Requirement|Practice|Activity|Outcome|Metric)$",
];

const SYSTEM_PREFIXES: &[&str] = &["owl:", "rdfs:", "rdf:", "xsd:"];
const DOMAIN_PREFIXES: &[&str] = &["cobit5:", "iso17025:", "bfo:", "sosa:"];
const BUSINESS_DOMAIN_REFS: &[&str] = &["Goal", "Process", "Domain", "Control", "Framework"];
const BUSINESS_INDIVIDUAL_TYPES: &[&str] =
    &["goal", "process", "domain", "control", "enabler", "framework"];

pub const DEFAULT_RELATIONSHIP_THRESHOLD: usize = 3;
pub const DEFAULT_HUB_SUBCLASS_THRESHOLD: usize = 3;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Serializable form of the classifier vocabulary.
///
/// Missing keys in a JSON file fall back to the built-in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub technical_keywords: Vec<String>,
    pub business_keywords: Vec<String>,
    pub core_keywords: Vec<String>,
    pub technical_patterns: Vec<String>,
    pub business_patterns: Vec<String>,
    pub system_prefixes: Vec<String>,
    pub domain_prefixes: Vec<String>,
    /// Case-sensitive fragments of domain/range URIs that mark an object
    /// property as business-facing.
    pub business_domain_refs: Vec<String>,
    pub business_individual_types: Vec<String>,
    pub relationship_threshold: usize,
    pub hub_subclass_threshold: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            technical_keywords: owned(TECHNICAL_KEYWORDS),
            business_keywords: owned(BUSINESS_KEYWORDS),
            core_keywords: owned(CORE_KEYWORDS),
            technical_patterns: owned(TECHNICAL_PATTERNS),
            business_patterns: owned(BUSINESS_PATTERNS),
            system_prefixes: owned(SYSTEM_PREFIXES),
            domain_prefixes: owned(DOMAIN_PREFIXES),
            business_domain_refs: owned(BUSINESS_DOMAIN_REFS),
            business_individual_types: owned(BUSINESS_INDIVIDUAL_TYPES),
            relationship_threshold: DEFAULT_RELATIONSHIP_THRESHOLD,
            hub_subclass_threshold: DEFAULT_HUB_SUBCLASS_THRESHOLD,
        }
    }
}

impl LexiconConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    #[must_use]
    pub fn with_relationship_threshold(mut self, threshold: usize) -> Self {
        self.relationship_threshold = threshold;
        self
    }

    /// Compiles the patterns, failing on the first invalid one.
    pub fn compile(&self) -> Result<Lexicon> {
        Ok(Lexicon {
            technical_patterns: compile_patterns(&self.technical_patterns)?,
            business_patterns: compile_patterns(&self.business_patterns)?,
            ..self.base()
        })
    }

    fn base(&self) -> Lexicon {
        Lexicon {
            technical_keywords: lowercase(&self.technical_keywords),
            business_keywords: lowercase(&self.business_keywords),
            core_keywords: lowercase(&self.core_keywords),
            technical_patterns: Vec::new(),
            business_patterns: Vec::new(),
            system_prefixes: self.system_prefixes.clone(),
            domain_prefixes: self.domain_prefixes.clone(),
            business_domain_refs: self.business_domain_refs.clone(),
            business_individual_types: lowercase(&self.business_individual_types),
            relationship_threshold: self.relationship_threshold,
            hub_subclass_threshold: self.hub_subclass_threshold,
        }
    }
}

fn lowercase(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| Error::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

/// Compiled, immutable classifier vocabulary.
#[derive(Debug, Clone)]
pub struct Lexicon {
    technical_keywords: Vec<String>,
    business_keywords: Vec<String>,
    core_keywords: Vec<String>,
    technical_patterns: Vec<Regex>,
    business_patterns: Vec<Regex>,
    system_prefixes: Vec<String>,
    domain_prefixes: Vec<String>,
    business_domain_refs: Vec<String>,
    business_individual_types: Vec<String>,
    relationship_threshold: usize,
    hub_subclass_threshold: usize,
}

impl Default for Lexicon {
    fn default() -> Self {
        let config = LexiconConfig::default();
        let mut lexicon = config.base();

        for pattern in &config.technical_patterns {
            if let Ok(re) = Regex::new(pattern) {
                lexicon.technical_patterns.push(re);
            }
        }
        for pattern in &config.business_patterns {
            if let Ok(re) = Regex::new(pattern) {
                lexicon.business_patterns.push(re);
            }
        }

        lexicon
    }
}

fn any_contained(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

impl Lexicon {
    /// `blob` must already be lowercased.
    #[must_use]
    pub fn has_technical_keyword(&self, blob: &str) -> bool {
        any_contained(blob, &self.technical_keywords)
    }

    #[must_use]
    pub fn has_business_keyword(&self, blob: &str) -> bool {
        any_contained(blob, &self.business_keywords)
    }

    #[must_use]
    pub fn has_core_keyword(&self, blob: &str) -> bool {
        any_contained(blob, &self.core_keywords)
    }

    #[must_use]
    pub fn technical_name(&self, local_name: &str) -> bool {
        self.technical_patterns.iter().any(|re| re.is_match(local_name))
    }

    #[must_use]
    pub fn business_name(&self, local_name: &str) -> bool {
        self.business_patterns.iter().any(|re| re.is_match(local_name))
    }

    #[must_use]
    pub fn system_namespace(&self, prefixed_name: &str) -> bool {
        self.system_prefixes
            .iter()
            .any(|p| prefixed_name.starts_with(p.as_str()))
    }

    #[must_use]
    pub fn domain_namespace(&self, prefixed_name: &str) -> bool {
        self.domain_prefixes
            .iter()
            .any(|p| prefixed_name.starts_with(p.as_str()))
    }

    #[must_use]
    pub fn business_reference(&self, uri: &str) -> bool {
        any_contained(uri, &self.business_domain_refs)
    }

    #[must_use]
    pub fn business_individual_type(&self, type_local_name: &str) -> bool {
        any_contained(&type_local_name.to_lowercase(), &self.business_individual_types)
    }

    #[must_use]
    pub fn relationship_threshold(&self) -> usize {
        self.relationship_threshold
    }

    #[must_use]
    pub fn hub_subclass_threshold(&self) -> usize {
        self.hub_subclass_threshold
    }
}
