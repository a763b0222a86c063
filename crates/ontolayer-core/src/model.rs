use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{
    ClassEntity, Classified, EntityCategory, IndividualEntity, Layer, OntologyEntity,
    PropertyEntity,
};
use crate::relationship::RelationshipEdge;

/// Fields of the first `owl:Ontology` declaration in a document.
///
/// Every field is absent when the document declares no ontology, so an
/// undeclared ontology serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,
}

impl OntologyMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uri.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStatistics {
    pub total_triples: usize,
    pub classes: usize,
    pub object_properties: usize,
    pub datatype_properties: usize,
    pub annotation_properties: usize,
    /// Distinct subjects carrying an `rdf:type` outside the OWL system types.
    pub individuals: usize,
    pub namespaces: usize,
    /// Distinct triples whose predicate is a declared object property.
    pub relationships: usize,
}

impl ExtractionStatistics {
    #[must_use]
    pub fn properties(&self) -> usize {
        self.object_properties + self.datatype_properties + self.annotation_properties
    }
}

/// Output of the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityModel {
    pub metadata: OntologyMetadata,
    pub classes: Vec<ClassEntity>,
    pub properties: Vec<PropertyEntity>,
    pub individuals: Vec<IndividualEntity>,
    pub relationships: Vec<RelationshipEdge>,
    pub statistics: ExtractionStatistics,
    pub namespaces: BTreeMap<String, String>,
}

impl EntityModel {
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.classes.len() + self.properties.len() + self.individuals.len()
    }
}

/// Replaces a whole model once a stage has failed. Downstream stages pass it
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{error}")]
pub struct ErrorMarker {
    pub error: String,
}

impl ErrorMarker {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub type StageResult<T> = Result<T, ErrorMarker>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCounts {
    pub classes: usize,
    pub properties: usize,
    pub individuals: usize,
    pub total: usize,
}

impl LayerCounts {
    fn record(&mut self, category: EntityCategory) {
        match category {
            EntityCategory::Class => self.classes += 1,
            EntityCategory::Property => self.properties += 1,
            EntityCategory::Individual => self.individuals += 1,
        }
        self.total += 1;
    }

    #[must_use]
    pub fn get(&self, category: EntityCategory) -> usize {
        match category {
            EntityCategory::Class => self.classes,
            EntityCategory::Property => self.properties,
            EntityCategory::Individual => self.individuals,
        }
    }
}

/// Entity counts per primary layer, plus how many entities carry more than
/// one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStatistics {
    pub business: LayerCounts,
    pub technical: LayerCounts,
    pub core: LayerCounts,
    pub multi_layer: LayerCounts,
}

impl LayerStatistics {
    #[must_use]
    pub fn layer(&self, layer: Layer) -> &LayerCounts {
        match layer {
            Layer::Business => &self.business,
            Layer::Technical => &self.technical,
            Layer::Core => &self.core,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut LayerCounts {
        match layer {
            Layer::Business => &mut self.business,
            Layer::Technical => &mut self.technical,
            Layer::Core => &mut self.core,
        }
    }

    pub fn tally<T: OntologyEntity>(&mut self, entities: &[Classified<T>]) {
        for entity in entities {
            self.layer_mut(entity.primary_layer()).record(T::CATEGORY);
            if entity.assignment.is_multi_layer() {
                self.multi_layer.record(T::CATEGORY);
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        Layer::ALL.iter().map(|l| self.layer(*l).total).sum()
    }
}

/// Coarse three-step tier used for readiness and relevance ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count boundaries for the `high` and `medium` readiness tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessThresholds {
    pub high: usize,
    pub medium: usize,
}

impl ReadinessThresholds {
    #[must_use]
    pub const fn new(high: usize, medium: usize) -> Self {
        Self { high, medium }
    }

    #[must_use]
    pub fn tier(&self, count: usize) -> Tier {
        if count >= self.high {
            Tier::High
        } else if count >= self.medium {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkAnalysis {
    pub framework: String,
    /// Distinct domain codes or clause numbers, in order of discovery.
    pub codes_found: Vec<String>,
    pub total_codes: usize,
    pub coverage_percentage: f64,
    /// Quantity the readiness thresholds were applied to.
    pub readiness_basis: usize,
    pub readiness: Tier,
}

impl FrameworkAnalysis {
    #[must_use]
    pub fn coverage(found: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = found as f64 / total as f64 * 100.0;
        pct
    }
}

/// Entity model after the generic pass and an optional framework pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedModel {
    pub metadata: OntologyMetadata,
    pub classes: Vec<Classified<ClassEntity>>,
    pub properties: Vec<Classified<PropertyEntity>>,
    pub individuals: Vec<Classified<IndividualEntity>>,
    pub relationships: Vec<RelationshipEdge>,
    pub statistics: ExtractionStatistics,
    pub namespaces: BTreeMap<String, String>,
    pub layer_statistics: LayerStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FrameworkAnalysis>,
}

impl ClassifiedModel {
    /// Rebuilds `layer_statistics` from the current assignments.
    pub fn recompute_statistics(&mut self) {
        let mut stats = LayerStatistics::default();
        stats.tally(&self.classes);
        stats.tally(&self.properties);
        stats.tally(&self.individuals);
        self.layer_statistics = stats;
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.classes.len() + self.properties.len() + self.individuals.len()
    }

    /// Every layer assignment in class, property, individual order.
    pub fn assignments(&self) -> impl Iterator<Item = &crate::entity::LayerAssignment> {
        self.classes
            .iter()
            .map(|c| &c.assignment)
            .chain(self.properties.iter().map(|p| &p.assignment))
            .chain(self.individuals.iter().map(|i| &i.assignment))
    }
}
