//! Framework-specific second classification pass.
//!
//! An enhancer only ever adds layers to the generic assignment, attaches
//! framework tags to entities, and computes a coverage analysis. A lexicon
//! with no entries turns it into a no-op.

mod governance;
mod laboratory;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::Layer;
use crate::model::{ClassifiedModel, StageResult};

pub use governance::GovernanceEnhancer;
pub use laboratory::LaboratoryEnhancer;

pub trait DomainEnhancer: Send + Sync {
    /// Short framework name, e.g. `COBIT5`.
    fn framework(&self) -> &str;

    fn enhance(&self, model: ClassifiedModel) -> ClassifiedModel;
}

/// Optional enhancement over a stage result; an upstream error passes through.
pub fn enhance_stage(
    enhancer: Option<&dyn DomainEnhancer>,
    input: StageResult<ClassifiedModel>,
) -> StageResult<ClassifiedModel> {
    match enhancer {
        Some(enhancer) => input.map(|model| enhancer.enhance(model)),
        None => input,
    }
}

/// A code the framework defines: a COBIT5 domain or an ISO/IEC 17025 clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkCode {
    pub code: String,
    pub name: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl FrameworkCode {
    fn new(code: &str, name: &str, kind: &str, level: Option<u8>) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            level,
        }
    }
}

/// Entity-name vocabularies of one framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkLexicon {
    pub business: Vec<String>,
    pub technical: Vec<String>,
    pub core: Vec<String>,
}

impl FrameworkLexicon {
    #[must_use]
    pub fn new(business: &[&str], technical: &[&str], core: &[&str]) -> Self {
        Self {
            business: terms(business),
            technical: terms(technical),
            core: terms(core),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.business.is_empty() && self.technical.is_empty() && self.core.is_empty()
    }

    /// Case-insensitive containment of each vocabulary in `name`.
    #[must_use]
    pub fn layers_for(&self, name: &str) -> BTreeSet<Layer> {
        let name = name.to_lowercase();
        let mut layers = BTreeSet::new();

        if contains_any(&name, &self.business) {
            layers.insert(Layer::Business);
        }
        if contains_any(&name, &self.technical) {
            layers.insert(Layer::Technical);
        }
        if contains_any(&name, &self.core) {
            layers.insert(Layer::Core);
        }

        layers
    }

    /// Layer implied by an individual's declared type, by exact name.
    #[must_use]
    pub fn type_layer(&self, type_local_name: &str) -> Option<Layer> {
        if self.business.iter().any(|b| b == type_local_name) {
            Some(Layer::Business)
        } else if self.core.iter().any(|c| c == type_local_name) {
            Some(Layer::Core)
        } else {
            None
        }
    }

    #[must_use]
    pub fn references_business(&self, uri: &str) -> bool {
        contains_any(&uri.to_lowercase(), &self.business)
    }
}

/// `haystack` must already be lowercased.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| haystack.contains(n.to_lowercase().as_str()))
}

/// First keyword group whose terms occur in `text`.
fn first_match<'a>(text: &str, groups: &'a [(String, Vec<String>)]) -> Option<&'a str> {
    groups
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| text.contains(t.as_str())))
        .map(|(key, _)| key.as_str())
}

fn terms(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Distinct values of a tag across every entity, in discovery order.
fn distinct_tags(model: &ClassifiedModel, key: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let tags = model
        .classes
        .iter()
        .map(|c| c.tag(key))
        .chain(model.properties.iter().map(|p| p.tag(key)))
        .chain(model.individuals.iter().map(|i| i.tag(key)));

    for tag in tags.flatten() {
        if !found.iter().any(|f| f == tag) {
            found.push(tag.to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_for_is_case_insensitive() {
        let lexicon = FrameworkLexicon::new(&["TestMethod"], &["DataProcessing"], &["Person"]);

        let layers = lexicon.layers_for("ValidatedTESTMETHODPerson");
        assert!(layers.contains(&Layer::Business));
        assert!(layers.contains(&Layer::Core));
        assert!(!layers.contains(&Layer::Technical));
    }

    #[test]
    fn test_type_layer_prefers_business() {
        let lexicon = FrameworkLexicon::new(&["Role"], &[], &["Role", "Person"]);

        assert_eq!(lexicon.type_layer("Role"), Some(Layer::Business));
        assert_eq!(lexicon.type_layer("Person"), Some(Layer::Core));
        assert_eq!(lexicon.type_layer("person"), None);
    }

    #[test]
    fn test_first_match_respects_group_order() {
        let groups = vec![
            ("4".to_string(), terms(&["management"])),
            ("8".to_string(), terms(&["review"])),
        ];

        assert_eq!(first_match("managementreview", &groups), Some("4"));
        assert_eq!(first_match("review", &groups), Some("8"));
        assert_eq!(first_match("sample", &groups), None);
    }

    #[test]
    fn test_enhance_stage_without_enhancer_is_identity() {
        let input: StageResult<ClassifiedModel> = Err(crate::model::ErrorMarker::new("boom"));
        let output = enhance_stage(None, input.clone());
        assert_eq!(output, input);
    }
}
