use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;

use super::graph::{Term, TripleGraph};
use super::parser::{OntologyFormat, ParseError};
use crate::entity::{
    ClassEntity, EntityHeader, IndividualEntity, PropertyCharacteristics, PropertyEntity,
    PropertyKind, PropertyValue, ResourceRef, ValueItem,
};
use crate::model::{EntityModel, ExtractionStatistics, OntologyMetadata};
use crate::relationship::RelationshipEdge;
use crate::vocab::{self, local_name};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No triple parser available for {0} input")]
    LibraryUnavailable(OntologyFormat),
    #[error("Ontology file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Parsing failed: {0}")]
    Parse(ParseError),
    #[error("IO error: {0}")]
    Io(std::io::Error),
}

impl From<ParseError> for ExtractionError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::ParserUnavailable(format) => Self::LibraryUnavailable(format),
            ParseError::NotFound(path) => Self::FileNotFound(path),
            ParseError::Io(e) => Self::Io(e),
            other => Self::Parse(other),
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

fn kind_iri(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::ObjectProperty => vocab::OWL_OBJECT_PROPERTY,
        PropertyKind::DatatypeProperty => vocab::OWL_DATATYPE_PROPERTY,
        PropertyKind::AnnotationProperty => vocab::OWL_ANNOTATION_PROPERTY,
    }
}

/// Materializes typed entity records from a parsed triple graph.
///
/// Extraction never fails once the graph exists; the graph is only read.
#[derive(Debug, Clone, Copy, Default)]
pub struct TripleExtractor;

impl TripleExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn extract(&self, graph: &TripleGraph) -> EntityModel {
        let ctx = Context::new(graph);

        let model = EntityModel {
            metadata: ctx.metadata(),
            classes: ctx.classes(),
            properties: ctx.properties(),
            individuals: ctx.individuals(),
            relationships: ctx.relationships(),
            statistics: ctx.statistics(),
            namespaces: graph.namespaces().clone(),
        };

        tracing::debug!(
            classes = model.classes.len(),
            properties = model.properties.len(),
            individuals = model.individuals.len(),
            relationships = model.relationships.len(),
            "extracted entity model"
        );

        model
    }
}

struct Context<'g> {
    graph: &'g TripleGraph,
    /// `(prefix, namespace)` ordered longest namespace first.
    prefixes: Vec<(&'g str, &'g str)>,
}

impl<'g> Context<'g> {
    fn new(graph: &'g TripleGraph) -> Self {
        let mut prefixes: Vec<(&str, &str)> = graph
            .namespaces()
            .iter()
            .filter(|(_, ns)| !ns.is_empty())
            .map(|(p, ns)| (p.as_str(), ns.as_str()))
            .collect();
        prefixes.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

        Self { graph, prefixes }
    }

    fn prefixed_name(&self, uri: &str) -> String {
        for (prefix, ns) in &self.prefixes {
            if let Some(local) = uri.strip_prefix(ns) {
                return if prefix.is_empty() {
                    local.to_string()
                } else {
                    format!("{prefix}:{local}")
                };
            }
        }
        local_name(uri).to_string()
    }

    fn header(&self, term: &Term) -> EntityHeader {
        let uri = term.lexical();
        EntityHeader::new(uri, local_name(uri), self.prefixed_name(uri))
            .with_label(self.literal(term, vocab::RDFS_LABEL))
            .with_comment(self.literal(term, vocab::RDFS_COMMENT))
            .with_description(self.literal(term, vocab::DCTERMS_DESCRIPTION))
    }

    /// First object of `(subject, predicate, ?)`, or an empty string.
    fn literal(&self, subject: &Term, predicate: &str) -> String {
        self.graph
            .objects(subject, predicate)
            .next()
            .map(|o| o.lexical().to_string())
            .unwrap_or_default()
    }

    fn objects(&self, subject: &Term, predicate: &str) -> Vec<String> {
        self.graph
            .objects(subject, predicate)
            .map(|o| o.lexical().to_string())
            .collect()
    }

    fn subjects(&self, predicate: &str, object: &Term) -> Vec<String> {
        self.graph
            .subjects(predicate, object)
            .map(|s| s.lexical().to_string())
            .collect()
    }

    fn metadata(&self) -> OntologyMetadata {
        let Some(ontology) = self.graph.instances_of(vocab::OWL_ONTOLOGY).next() else {
            return OntologyMetadata::default();
        };

        OntologyMetadata {
            uri: Some(ontology.lexical().to_string()),
            title: Some(self.literal(ontology, vocab::DCTERMS_TITLE)),
            description: Some(self.literal(ontology, vocab::DCTERMS_DESCRIPTION)),
            version: Some(self.literal(ontology, vocab::OWL_VERSION_INFO)),
            creator: Some(self.literal(ontology, vocab::DCTERMS_CREATOR)),
            created: Some(self.literal(ontology, vocab::DCTERMS_CREATED)),
            modified: Some(self.literal(ontology, vocab::DCTERMS_MODIFIED)),
            imports: Some(self.objects(ontology, vocab::OWL_IMPORTS)),
        }
    }

    fn classes(&self) -> Vec<ClassEntity> {
        self.graph
            .instances_of(vocab::OWL_CLASS)
            .map(|class| ClassEntity {
                header: self.header(class),
                subclass_of: self.objects(class, vocab::RDFS_SUBCLASS_OF),
                superclass_of: self.subjects(vocab::RDFS_SUBCLASS_OF, class),
                equivalent_class: self.objects(class, vocab::OWL_EQUIVALENT_CLASS),
                disjoint_with: self.objects(class, vocab::OWL_DISJOINT_WITH),
            })
            .collect()
    }

    fn properties(&self) -> Vec<PropertyEntity> {
        PropertyKind::ALL
            .into_iter()
            .flat_map(|kind| {
                self.graph
                    .instances_of(kind_iri(kind))
                    .map(move |subject| self.property(subject, kind))
            })
            .collect()
    }

    fn property(&self, subject: &Term, kind: PropertyKind) -> PropertyEntity {
        let is = |type_iri: &str| self.graph.has_type(subject, type_iri);

        PropertyEntity {
            header: self.header(subject),
            kind,
            domain: self.objects(subject, vocab::RDFS_DOMAIN),
            range: self.objects(subject, vocab::RDFS_RANGE),
            subproperty_of: self.objects(subject, vocab::RDFS_SUBPROPERTY_OF),
            inverse_of: self.objects(subject, vocab::OWL_INVERSE_OF),
            characteristics: PropertyCharacteristics {
                functional: is(vocab::OWL_FUNCTIONAL_PROPERTY),
                inverse_functional: is(vocab::OWL_INVERSE_FUNCTIONAL_PROPERTY),
                transitive: is(vocab::OWL_TRANSITIVE_PROPERTY),
                symmetric: is(vocab::OWL_SYMMETRIC_PROPERTY),
                asymmetric: is(vocab::OWL_ASYMMETRIC_PROPERTY),
                reflexive: is(vocab::OWL_REFLEXIVE_PROPERTY),
                irreflexive: is(vocab::OWL_IRREFLEXIVE_PROPERTY),
            },
        }
    }

    /// One record per `(subject, declared class)` pair, grouped by class.
    fn individuals(&self) -> Vec<IndividualEntity> {
        let mut individuals = Vec::new();

        for class in self.graph.instances_of(vocab::OWL_CLASS) {
            let type_uri = class.lexical();
            for subject in self.graph.subjects(vocab::RDF_TYPE, class) {
                let mut individual =
                    IndividualEntity::new(self.header(subject), type_uri, local_name(type_uri));
                individual.properties = self.property_values(subject);
                individual.same_as = self.objects(subject, vocab::OWL_SAME_AS);
                individual.different_from = self.objects(subject, vocab::OWL_DIFFERENT_FROM);
                individuals.push(individual);
            }
        }

        individuals
    }

    fn property_values(&self, subject: &Term) -> BTreeMap<String, PropertyValue> {
        let mut values: BTreeMap<String, PropertyValue> = BTreeMap::new();

        for triple in self.graph.about(subject) {
            let name = local_name(&triple.predicate);
            if name == "type" {
                continue;
            }

            let item = match &triple.object {
                Term::Iri(uri) => ValueItem::Resource(ResourceRef {
                    uri: uri.clone(),
                    local_name: local_name(uri).to_string(),
                    prefixed_name: self.prefixed_name(uri),
                }),
                other => ValueItem::Literal(other.lexical().to_string()),
            };

            match values.entry(name.to_string()) {
                Entry::Occupied(mut entry) => entry.get_mut().push(item),
                Entry::Vacant(entry) => {
                    entry.insert(PropertyValue::Single(item));
                }
            }
        }

        values
    }

    fn object_properties(&self) -> Vec<&'g str> {
        let mut seen = HashSet::new();
        self.graph
            .instances_of(vocab::OWL_OBJECT_PROPERTY)
            .filter_map(Term::as_iri)
            .filter(|iri| seen.insert(*iri))
            .collect()
    }

    fn relationships(&self) -> Vec<RelationshipEdge> {
        self.object_properties()
            .into_iter()
            .flat_map(|predicate| self.graph.with_predicate(predicate))
            .map(|triple| {
                let subject = triple.subject.lexical();
                let object = triple.object.lexical();
                RelationshipEdge {
                    subject: subject.to_string(),
                    predicate: triple.predicate.clone(),
                    object: object.to_string(),
                    subject_local_name: local_name(subject).to_string(),
                    predicate_local_name: local_name(&triple.predicate).to_string(),
                    object_local_name: local_name(object).to_string(),
                    subject_prefixed: self.prefixed_name(subject),
                    predicate_prefixed: self.prefixed_name(&triple.predicate),
                    object_prefixed: self.prefixed_name(object),
                }
            })
            .collect()
    }

    fn statistics(&self) -> ExtractionStatistics {
        let count = |type_iri: &str| self.graph.instances_of(type_iri).count();

        let individuals: HashSet<&Term> = self
            .graph
            .with_predicate(vocab::RDF_TYPE)
            .filter(|t| !vocab::SYSTEM_TYPES.iter().any(|s| *s == t.object.lexical()))
            .map(|t| &t.subject)
            .collect();

        let object_properties: HashSet<&str> = self.object_properties().into_iter().collect();
        let relationships = self
            .graph
            .iter()
            .filter(|t| object_properties.contains(t.predicate.as_str()))
            .count();

        ExtractionStatistics {
            total_triples: self.graph.len(),
            classes: count(vocab::OWL_CLASS),
            object_properties: count(vocab::OWL_OBJECT_PROPERTY),
            datatype_properties: count(vocab::OWL_DATATYPE_PROPERTY),
            annotation_properties: count(vocab::OWL_ANNOTATION_PROPERTY),
            individuals: individuals.len(),
            namespaces: self.graph.namespaces().len(),
            relationships,
        }
    }
}
