//! Groups a classified model into sink-ready payload bundles.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::entity::{Classified, EntityCategory, Layer, OntologyEntity};
use crate::error::Result;
use crate::model::{ClassifiedModel, LayerStatistics};
use crate::relationship::RelationshipEdge;

/// Submission order of the per-layer bundles.
const BUNDLE_LAYERS: [Layer; 3] = [Layer::Business, Layer::Technical, Layer::Core];

pub const SOURCE_KIND: &str = "json";

/// One episode handed to a knowledge sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadBundle {
    pub name: String,
    pub body: Value,
    pub group_id: String,
    pub source_kind: String,
    pub source_description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntitiesProcessed {
    pub classes: usize,
    pub properties: usize,
    pub individuals: usize,
    pub relationships: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub import_timestamp: DateTime<Utc>,
    /// Number of bundles produced.
    pub episodes: usize,
    pub entities_processed: EntitiesProcessed,
    pub layer_distribution: LayerStatistics,
    pub original_triples: usize,
    pub bundle_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadGroups {
    pub bundles: Vec<PayloadBundle>,
    pub summary: ImportSummary,
}

impl PayloadGroups {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PayloadBundle> {
        self.bundles.iter().find(|b| b.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    framework_name: String,
    group_id: String,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new("Generic", "default")
    }
}

impl SummaryBuilder {
    #[must_use]
    pub fn new(framework_name: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            framework_name: framework_name.into(),
            group_id: group_id.into(),
        }
    }

    #[must_use]
    pub fn framework_name(&self) -> &str {
        &self.framework_name
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    fn bundle(&self, name: String, body: Value, description: String) -> PayloadBundle {
        PayloadBundle {
            name,
            body,
            group_id: self.group_id.clone(),
            source_kind: SOURCE_KIND.to_string(),
            source_description: description,
        }
    }

    /// Builds every bundle for `model` plus the import summary.
    pub fn summarize(&self, model: &ClassifiedModel) -> Result<PayloadGroups> {
        let fw = &self.framework_name;
        let mut bundles = vec![self.bundle(
            format!("{fw} Ontology Metadata"),
            serde_json::to_value(&model.metadata)?,
            format!("Ontology metadata for {fw} framework"),
        )];

        bundles.extend(self.layer_bundles(&model.classes)?);
        bundles.extend(self.layer_bundles(&model.properties)?);
        bundles.extend(self.layer_bundles(&model.individuals)?);
        bundles.extend(self.relationship_bundles(&model.relationships)?);

        if let Some(analysis) = &model.analysis {
            bundles.push(self.bundle(
                format!("{fw} Framework Analysis"),
                serde_json::to_value(analysis)?,
                format!("{} coverage analysis", analysis.framework),
            ));
        }

        let summary = ImportSummary {
            import_timestamp: Utc::now(),
            episodes: bundles.len(),
            entities_processed: EntitiesProcessed {
                classes: model.classes.len(),
                properties: model.properties.len(),
                individuals: model.individuals.len(),
                relationships: model.relationships.len(),
            },
            layer_distribution: model.layer_statistics,
            original_triples: model.statistics.total_triples,
            bundle_names: bundles.iter().map(|b| b.name.clone()).collect(),
        };

        tracing::debug!(
            framework = %fw,
            bundles = summary.episodes,
            "payload bundles built"
        );

        Ok(PayloadGroups { bundles, summary })
    }

    /// One bundle per non-empty primary layer.
    fn layer_bundles<T>(&self, entities: &[Classified<T>]) -> Result<Vec<PayloadBundle>>
    where
        T: OntologyEntity + Serialize,
    {
        let category: EntityCategory = T::CATEGORY;
        let fw = &self.framework_name;
        let mut bundles = Vec::new();

        for layer in BUNDLE_LAYERS {
            let members: Vec<&Classified<T>> = entities
                .iter()
                .filter(|e| e.primary_layer() == layer)
                .collect();
            if members.is_empty() {
                continue;
            }

            let mut body = Map::new();
            body.insert("layer".into(), Value::from(layer.as_str()));
            body.insert("framework".into(), Value::from(fw.as_str()));
            body.insert(category.plural().into(), serde_json::to_value(&members)?);
            body.insert("count".into(), Value::from(members.len()));
            let body = Value::Object(body);
            bundles.push(self.bundle(
                format!("{fw} {} - {} Layer", category.title(), layer.title()),
                body,
                format!("{fw} {layer} layer {}", category.plural()),
            ));
        }

        Ok(bundles)
    }

    /// One bundle per predicate local name, sorted by name.
    fn relationship_bundles(&self, edges: &[RelationshipEdge]) -> Result<Vec<PayloadBundle>> {
        let fw = &self.framework_name;
        let mut groups: BTreeMap<&str, Vec<&RelationshipEdge>> = BTreeMap::new();
        for edge in edges {
            groups.entry(edge.kind()).or_default().push(edge);
        }

        groups
            .into_iter()
            .map(|(kind, members)| -> Result<PayloadBundle> {
                let body = json!({
                    "relationship_type": kind,
                    "framework": fw,
                    "relationships": serde_json::to_value(&members)?,
                    "count": members.len(),
                });
                Ok(self.bundle(
                    format!("{fw} Relationships - {kind}"),
                    body,
                    format!("{fw} {kind} relationships"),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ClassEntity, EntityHeader, LayerAssignment, PropertyEntity, PropertyKind};
    use crate::model::{ExtractionStatistics, FrameworkAnalysis, OntologyMetadata, Tier};

    fn header(local: &str) -> EntityHeader {
        EntityHeader::new(format!("http://example.org/x#{local}"), local, format!("x:{local}"))
    }

    fn edge(subject: &str, predicate: &str, object: &str) -> RelationshipEdge {
        RelationshipEdge {
            subject: format!("http://example.org/x#{subject}"),
            predicate: format!("http://example.org/x#{predicate}"),
            object: format!("http://example.org/x#{object}"),
            subject_local_name: subject.into(),
            predicate_local_name: predicate.into(),
            object_local_name: object.into(),
            subject_prefixed: format!("x:{subject}"),
            predicate_prefixed: format!("x:{predicate}"),
            object_prefixed: format!("x:{object}"),
        }
    }

    fn sample_model() -> ClassifiedModel {
        let mut model = ClassifiedModel {
            metadata: OntologyMetadata {
                uri: Some("http://example.org/x".into()),
                title: Some("Example".into()),
                ..OntologyMetadata::default()
            },
            classes: vec![
                Classified::new(
                    ClassEntity::new(header("Goal")),
                    LayerAssignment::new([Layer::Business, Layer::Core]),
                ),
                Classified::new(ClassEntity::new(header("Person")), LayerAssignment::new([Layer::Core])),
                Classified::new(ClassEntity::new(header("Zq")), LayerAssignment::new([Layer::Technical])),
                Classified::new(ClassEntity::new(header("Outcome")), LayerAssignment::new([Layer::Business])),
            ],
            properties: vec![Classified::new(
                PropertyEntity::new(header("hasComment"), PropertyKind::AnnotationProperty),
                LayerAssignment::new([Layer::Technical]),
            )],
            individuals: Vec::new(),
            relationships: vec![
                edge("a", "supports", "b"),
                edge("c", "dependsOn", "d"),
                edge("e", "supports", "f"),
            ],
            statistics: ExtractionStatistics {
                total_triples: 42,
                ..ExtractionStatistics::default()
            },
            namespaces: BTreeMap::new(),
            layer_statistics: LayerStatistics::default(),
            analysis: None,
        };
        model.recompute_statistics();
        model
    }

    #[test]
    fn test_bundle_names_and_order() {
        let groups = SummaryBuilder::new("COBIT5", "g1")
            .summarize(&sample_model())
            .unwrap();

        assert_eq!(
            groups.summary.bundle_names,
            vec![
                "COBIT5 Ontology Metadata",
                "COBIT5 Classes - Business Layer",
                "COBIT5 Classes - Technical Layer",
                "COBIT5 Classes - Core Layer",
                "COBIT5 Properties - Technical Layer",
                "COBIT5 Relationships - dependsOn",
                "COBIT5 Relationships - supports",
            ]
        );
        assert_eq!(groups.summary.episodes, 7);
        assert_eq!(groups.summary.original_triples, 42);
        assert_eq!(groups.summary.entities_processed.classes, 4);
        assert_eq!(groups.summary.entities_processed.relationships, 3);
    }

    #[test]
    fn test_layer_bundle_body() {
        let groups = SummaryBuilder::new("COBIT5", "g1")
            .summarize(&sample_model())
            .unwrap();
        let bundle = groups.find("COBIT5 Classes - Business Layer").unwrap();

        assert_eq!(bundle.group_id, "g1");
        assert_eq!(bundle.source_kind, "json");
        assert_eq!(bundle.source_description, "COBIT5 business layer classes");
        assert_eq!(bundle.body["layer"], "business");
        assert_eq!(bundle.body["count"], 2);
        assert_eq!(bundle.body["classes"][0]["local_name"], "Goal");
        assert_eq!(bundle.body["classes"][0]["primary_layer"], "business");
        assert_eq!(bundle.body["classes"][1]["local_name"], "Outcome");
    }

    #[test]
    fn test_relationships_grouped_by_predicate() {
        let groups = SummaryBuilder::new("COBIT5", "g1")
            .summarize(&sample_model())
            .unwrap();
        let bundle = groups.find("COBIT5 Relationships - supports").unwrap();

        assert_eq!(bundle.body["relationship_type"], "supports");
        assert_eq!(bundle.body["count"], 2);
        assert_eq!(bundle.body["relationships"][1]["subject_local_name"], "e");
    }

    #[test]
    fn test_empty_model_yields_metadata_only() {
        let mut model = sample_model();
        model.metadata = OntologyMetadata::default();
        model.classes.clear();
        model.properties.clear();
        model.relationships.clear();
        model.recompute_statistics();

        let groups = SummaryBuilder::default().summarize(&model).unwrap();

        assert_eq!(groups.bundles.len(), 1);
        assert_eq!(groups.bundles[0].name, "Generic Ontology Metadata");
        assert_eq!(groups.bundles[0].body, json!({}));
        assert_eq!(groups.summary.layer_distribution.total(), 0);
    }

    #[test]
    fn test_analysis_bundle_when_enhanced() {
        let mut model = sample_model();
        model.analysis = Some(FrameworkAnalysis {
            framework: "ISO17025".into(),
            codes_found: vec!["7".into()],
            total_codes: 5,
            coverage_percentage: 20.0,
            readiness_basis: 1,
            readiness: Tier::Low,
        });

        let groups = SummaryBuilder::new("ISO17025", "lab").summarize(&model).unwrap();
        let bundle = groups.find("ISO17025 Framework Analysis").unwrap();

        assert_eq!(bundle.body["codes_found"], json!(["7"]));
        assert_eq!(bundle.body["readiness"], "low");
        assert_eq!(groups.bundles.last().unwrap().name, "ISO17025 Framework Analysis");
    }
}
