use std::collections::BTreeSet;

use rayon::prelude::*;

use super::lexicon::Lexicon;
use crate::entity::{
    ClassEntity, Classified, EntityHeader, IndividualEntity, Layer, LayerAssignment,
    OntologyEntity, PropertyEntity, PropertyKind,
};
use crate::model::{ClassifiedModel, EntityModel, LayerStatistics, StageResult};

/// Category-specific layer overrides, applied after the shared tests.
pub trait LayerRules: OntologyEntity {
    fn category_layers(&self, lexicon: &Lexicon) -> BTreeSet<Layer>;
}

impl LayerRules for ClassEntity {
    fn category_layers(&self, lexicon: &Lexicon) -> BTreeSet<Layer> {
        let mut layers = BTreeSet::new();
        if self.superclass_of.len() >= lexicon.hub_subclass_threshold() {
            layers.insert(Layer::Core);
        }
        if self.is_root() {
            layers.insert(Layer::Core);
        }
        layers
    }
}

impl LayerRules for PropertyEntity {
    fn category_layers(&self, lexicon: &Lexicon) -> BTreeSet<Layer> {
        let mut layers = BTreeSet::new();
        match self.kind {
            PropertyKind::ObjectProperty => {
                if self.domain_and_range().any(|r| lexicon.business_reference(r)) {
                    layers.insert(Layer::Business);
                }
            }
            PropertyKind::AnnotationProperty => {
                layers.insert(Layer::Technical);
            }
            PropertyKind::DatatypeProperty => {}
        }
        if self.characteristics.functional || self.characteristics.inverse_functional {
            layers.insert(Layer::Technical);
        }
        layers
    }
}

impl LayerRules for IndividualEntity {
    fn category_layers(&self, lexicon: &Lexicon) -> BTreeSet<Layer> {
        let mut layers = BTreeSet::new();
        if lexicon.business_individual_type(&self.type_local_name) {
            layers.insert(Layer::Business);
        }
        layers
    }
}

/// Lowercased local name, prefixed name, label, comment and description.
fn text_blob(header: &EntityHeader) -> String {
    format!(
        "{} {} {} {} {}",
        header.local_name, header.prefixed_name, header.label, header.comment, header.description
    )
    .to_lowercase()
}

fn is_construct_kind(kind: &str) -> bool {
    kind.contains("Property") || kind == "Class" || kind == "Restriction"
}

/// Domain-agnostic first classification pass.
#[derive(Debug, Clone, Default)]
pub struct LayerClassifier {
    lexicon: Lexicon,
}

impl LayerClassifier {
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Layer assignment for one entity. Pure and total.
    #[must_use]
    pub fn assign<T: LayerRules>(&self, entity: &T) -> LayerAssignment {
        let header = entity.header();
        let blob = text_blob(header);
        let mut layers = BTreeSet::new();

        if self.is_technical(entity, &blob) {
            layers.insert(Layer::Technical);
        }
        if self.is_business(header, &blob) {
            layers.insert(Layer::Business);
        }
        if self.is_core(entity, &blob) {
            layers.insert(Layer::Core);
        }
        layers.extend(entity.category_layers(&self.lexicon));

        LayerAssignment::new(layers)
    }

    fn is_technical<T: OntologyEntity>(&self, entity: &T, blob: &str) -> bool {
        let header = entity.header();
        self.lexicon.has_technical_keyword(blob)
            || self.lexicon.technical_name(&header.local_name)
            || entity.declared_kind().is_some_and(is_construct_kind)
            || self.lexicon.system_namespace(&header.prefixed_name)
    }

    fn is_business(&self, header: &EntityHeader, blob: &str) -> bool {
        self.lexicon.has_business_keyword(blob)
            || self.lexicon.business_name(&header.local_name)
            || self.lexicon.domain_namespace(&header.prefixed_name)
    }

    fn is_core<T: OntologyEntity>(&self, entity: &T, blob: &str) -> bool {
        self.lexicon.has_core_keyword(blob)
            || entity.relationship_count() >= self.lexicon.relationship_threshold()
    }

    /// Classifies entities in parallel, keeping input order.
    pub fn classify_all<T>(&self, entities: Vec<T>) -> Vec<Classified<T>>
    where
        T: LayerRules + Send,
    {
        entities
            .into_par_iter()
            .map(|entity| {
                let assignment = self.assign(&entity);
                Classified::new(entity, assignment)
            })
            .collect()
    }

    #[must_use]
    pub fn classify(&self, model: EntityModel) -> ClassifiedModel {
        let EntityModel {
            metadata,
            classes,
            properties,
            individuals,
            relationships,
            statistics,
            namespaces,
        } = model;

        let mut classified = ClassifiedModel {
            metadata,
            classes: self.classify_all(classes),
            properties: self.classify_all(properties),
            individuals: self.classify_all(individuals),
            relationships,
            statistics,
            namespaces,
            layer_statistics: LayerStatistics::default(),
            analysis: None,
        };
        classified.recompute_statistics();

        let stats = &classified.layer_statistics;
        tracing::info!(
            business = stats.business.total,
            technical = stats.technical.total,
            core = stats.core.total,
            multi_layer = stats.multi_layer.total,
            "layer classification completed"
        );

        classified
    }
}

/// Generic pass over a stage result; an upstream error passes through.
pub fn classify_stage(
    classifier: &LayerClassifier,
    input: StageResult<EntityModel>,
) -> StageResult<ClassifiedModel> {
    input.map(|model| classifier.classify(model))
}
