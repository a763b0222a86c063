use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Audience tag attached to every classified entity.
///
/// Variant order is alphabetical so that a `BTreeSet<Layer>` serializes as a
/// sorted list of layer names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Business,
    Core,
    Technical,
}

impl Layer {
    pub const ALL: [Self; 3] = [Self::Business, Self::Core, Self::Technical];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Core => "core",
            Self::Technical => "technical",
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Core => "Core",
            Self::Technical => "Technical",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(Self::Business),
            "core" => Ok(Self::Core),
            "technical" => Ok(Self::Technical),
            _ => Err(crate::Error::InvalidLayer(s.to_string())),
        }
    }
}

/// Non-empty layer set plus the primary layer derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerAssignment {
    layers: BTreeSet<Layer>,
    primary_layer: Layer,
}

impl LayerAssignment {
    /// Builds an assignment; an empty input falls back to `technical`.
    #[must_use]
    pub fn new(layers: impl IntoIterator<Item = Layer>) -> Self {
        let mut layers: BTreeSet<Layer> = layers.into_iter().collect();
        if layers.is_empty() {
            layers.insert(Layer::Technical);
        }
        let primary_layer = primary_of(&layers);
        Self {
            layers,
            primary_layer,
        }
    }

    #[must_use]
    pub fn layers(&self) -> &BTreeSet<Layer> {
        &self.layers
    }

    #[must_use]
    pub fn primary(&self) -> Layer {
        self.primary_layer
    }

    #[must_use]
    pub fn contains(&self, layer: Layer) -> bool {
        self.layers.contains(&layer)
    }

    #[must_use]
    pub fn is_multi_layer(&self) -> bool {
        self.layers.len() > 1
    }

    /// Unions `extra` into the set. Never removes a layer.
    pub fn extend(&mut self, extra: impl IntoIterator<Item = Layer>) {
        self.layers.extend(extra);
        self.primary_layer = primary_of(&self.layers);
    }
}

/// Business wins over core, core over technical.
fn primary_of(layers: &BTreeSet<Layer>) -> Layer {
    if layers.contains(&Layer::Business) {
        Layer::Business
    } else if layers.contains(&Layer::Core) {
        Layer::Core
    } else {
        Layer::Technical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Class,
    Property,
    Individual,
}

impl EntityCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Property => "property",
            Self::Individual => "individual",
        }
    }

    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Class => "classes",
            Self::Property => "properties",
            Self::Individual => "individuals",
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Class => "Classes",
            Self::Property => "Properties",
            Self::Individual => "Individuals",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identification and documentation fields shared by every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHeader {
    pub uri: String,
    pub local_name: String,
    pub prefixed_name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub description: String,
}

impl EntityHeader {
    #[must_use]
    pub fn new(uri: impl Into<String>, local_name: impl Into<String>, prefixed_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            local_name: local_name.into(),
            prefixed_name: prefixed_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Read access the classifiers need, independent of entity category.
pub trait OntologyEntity {
    const CATEGORY: EntityCategory;

    fn header(&self) -> &EntityHeader;

    /// OWL construct name for properties, declared type URI for individuals.
    fn declared_kind(&self) -> Option<&str> {
        None
    }

    /// Sum of the subclass/superclass/domain/range references the entity carries.
    fn relationship_count(&self) -> usize {
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    #[serde(flatten)]
    pub header: EntityHeader,
    #[serde(default)]
    pub subclass_of: Vec<String>,
    #[serde(default)]
    pub superclass_of: Vec<String>,
    #[serde(default)]
    pub equivalent_class: Vec<String>,
    #[serde(default)]
    pub disjoint_with: Vec<String>,
}

impl ClassEntity {
    #[must_use]
    pub fn new(header: EntityHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.subclass_of.is_empty()
    }
}

impl OntologyEntity for ClassEntity {
    const CATEGORY: EntityCategory = EntityCategory::Class;

    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn relationship_count(&self) -> usize {
        self.subclass_of.len() + self.superclass_of.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    ObjectProperty,
    DatatypeProperty,
    AnnotationProperty,
}

impl PropertyKind {
    pub const ALL: [Self; 3] = [
        Self::ObjectProperty,
        Self::DatatypeProperty,
        Self::AnnotationProperty,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectProperty => "ObjectProperty",
            Self::DatatypeProperty => "DatatypeProperty",
            Self::AnnotationProperty => "AnnotationProperty",
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ObjectProperty" => Ok(Self::ObjectProperty),
            "DatatypeProperty" => Ok(Self::DatatypeProperty),
            "AnnotationProperty" => Ok(Self::AnnotationProperty),
            _ => Err(crate::Error::InvalidPropertyKind(s.to_string())),
        }
    }
}

/// OWL property characteristics, each set by an extra `rdf:type` triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PropertyCharacteristics {
    pub functional: bool,
    pub inverse_functional: bool,
    pub transitive: bool,
    pub symmetric: bool,
    pub asymmetric: bool,
    pub reflexive: bool,
    pub irreflexive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntity {
    #[serde(flatten)]
    pub header: EntityHeader,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub range: Vec<String>,
    #[serde(default)]
    pub subproperty_of: Vec<String>,
    #[serde(default)]
    pub inverse_of: Vec<String>,
    #[serde(flatten)]
    pub characteristics: PropertyCharacteristics,
}

impl PropertyEntity {
    #[must_use]
    pub fn new(header: EntityHeader, kind: PropertyKind) -> Self {
        Self {
            header,
            kind,
            domain: Vec::new(),
            range: Vec::new(),
            subproperty_of: Vec::new(),
            inverse_of: Vec::new(),
            characteristics: PropertyCharacteristics::default(),
        }
    }

    /// Domain followed by range references.
    pub fn domain_and_range(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().chain(&self.range).map(String::as_str)
    }
}

impl OntologyEntity for PropertyEntity {
    const CATEGORY: EntityCategory = EntityCategory::Property;

    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn declared_kind(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }

    fn relationship_count(&self) -> usize {
        self.domain.len() + self.range.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub uri: String,
    pub local_name: String,
    pub prefixed_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueItem {
    Resource(ResourceRef),
    Literal(String),
}

/// Value(s) recorded for one predicate on an individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(ValueItem),
    Many(Vec<ValueItem>),
}

impl PropertyValue {
    /// Appends a value, turning a single value into an ordered list.
    pub fn push(&mut self, item: ValueItem) {
        let previous = std::mem::replace(self, Self::Many(Vec::new()));
        *self = match previous {
            Self::Single(first) => Self::Many(vec![first, item]),
            Self::Many(mut items) => {
                items.push(item);
                Self::Many(items)
            }
        };
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualEntity {
    #[serde(flatten)]
    pub header: EntityHeader,
    #[serde(rename = "type")]
    pub type_uri: String,
    pub type_local_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub same_as: Vec<String>,
    #[serde(default)]
    pub different_from: Vec<String>,
}

impl IndividualEntity {
    #[must_use]
    pub fn new(header: EntityHeader, type_uri: impl Into<String>, type_local_name: impl Into<String>) -> Self {
        Self {
            header,
            type_uri: type_uri.into(),
            type_local_name: type_local_name.into(),
            properties: BTreeMap::new(),
            same_as: Vec::new(),
            different_from: Vec::new(),
        }
    }
}

impl OntologyEntity for IndividualEntity {
    const CATEGORY: EntityCategory = EntityCategory::Individual;

    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn declared_kind(&self) -> Option<&str> {
        Some(&self.type_uri)
    }
}

/// An entity with its layer assignment and any framework tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classified<T> {
    #[serde(flatten)]
    pub entity: T,
    #[serde(flatten)]
    pub assignment: LayerAssignment,
    #[serde(flatten)]
    pub tags: BTreeMap<String, String>,
}

impl<T: OntologyEntity> Classified<T> {
    #[must_use]
    pub fn new(entity: T, assignment: LayerAssignment) -> Self {
        Self {
            entity,
            assignment,
            tags: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn primary_layer(&self) -> Layer {
        self.assignment.primary()
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn set_tag(&mut self, key: &str, value: impl Into<String>) {
        self.tags.insert(key.to_string(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_roundtrip() {
        for layer in Layer::ALL {
            let parsed: Layer = layer.to_string().parse().unwrap();
            assert_eq!(parsed, layer);
        }
        assert!("presentation".parse::<Layer>().is_err());
    }

    #[test]
    fn test_empty_assignment_defaults_to_technical() {
        let assignment = LayerAssignment::new([]);
        assert_eq!(assignment.layers().len(), 1);
        assert_eq!(assignment.primary(), Layer::Technical);
    }

    #[test]
    fn test_primary_layer_priority() {
        let all = LayerAssignment::new(Layer::ALL);
        assert_eq!(all.primary(), Layer::Business);

        let core_technical = LayerAssignment::new([Layer::Technical, Layer::Core]);
        assert_eq!(core_technical.primary(), Layer::Core);

        let technical = LayerAssignment::new([Layer::Technical]);
        assert_eq!(technical.primary(), Layer::Technical);
    }

    #[test]
    fn test_extend_only_adds() {
        let mut assignment = LayerAssignment::new([Layer::Technical, Layer::Core]);
        assignment.extend([Layer::Business]);

        assert!(assignment.contains(Layer::Technical));
        assert!(assignment.contains(Layer::Core));
        assert_eq!(assignment.primary(), Layer::Business);
        assert!(assignment.is_multi_layer());
    }

    #[test]
    fn test_layers_serialize_sorted() {
        let assignment = LayerAssignment::new([Layer::Technical, Layer::Business, Layer::Core]);
        let json = serde_json::to_value(&assignment).unwrap();

        assert_eq!(json["layers"], serde_json::json!(["business", "core", "technical"]));
        assert_eq!(json["primary_layer"], "business");
    }

    #[test]
    fn test_property_value_collapses_into_list() {
        let mut value = PropertyValue::Single(ValueItem::Literal("a".into()));
        value.push(ValueItem::Literal("b".into()));
        value.push(ValueItem::Literal("c".into()));

        assert_eq!(value.len(), 3);
        assert_eq!(
            value,
            PropertyValue::Many(vec![
                ValueItem::Literal("a".into()),
                ValueItem::Literal("b".into()),
                ValueItem::Literal("c".into()),
            ])
        );
    }

    #[test]
    fn test_classified_flattens_record() {
        let class = ClassEntity::new(EntityHeader::new(
            "http://example.org/onto#Audit",
            "Audit",
            "ex:Audit",
        ));
        let mut classified = Classified::new(class, LayerAssignment::new([Layer::Business]));
        classified.set_tag("business_relevance", "high");

        let json = serde_json::to_value(&classified).unwrap();

        assert_eq!(json["uri"], "http://example.org/onto#Audit");
        assert_eq!(json["label"], "");
        assert_eq!(json["subclass_of"], serde_json::json!([]));
        assert_eq!(json["primary_layer"], "business");
        assert_eq!(json["business_relevance"], "high");
    }

    #[test]
    fn test_relationship_counts() {
        let mut class = ClassEntity::new(EntityHeader::default());
        class.subclass_of.push("a".into());
        class.superclass_of.push("b".into());
        assert_eq!(class.relationship_count(), 2);
        assert!(!class.is_root());

        let mut property = PropertyEntity::new(EntityHeader::default(), PropertyKind::ObjectProperty);
        property.domain.push("a".into());
        property.range.extend(["b".to_string(), "c".to_string()]);
        assert_eq!(property.relationship_count(), 3);
        assert_eq!(property.declared_kind(), Some("ObjectProperty"));
    }
}
