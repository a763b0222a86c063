use rayon::prelude::*;

use super::{distinct_tags, first_match, terms, DomainEnhancer, FrameworkCode, FrameworkLexicon};
use crate::entity::{ClassEntity, Classified, IndividualEntity, Layer, PropertyEntity};
use crate::model::{ClassifiedModel, FrameworkAnalysis, ReadinessThresholds, Tier};

pub const CLAUSE_TAG: &str = "iso17025_clause";
pub const LABORATORY_RELEVANCE_TAG: &str = "laboratory_relevance";
pub const MEASUREMENT_RELEVANCE_TAG: &str = "measurement_relevance";
pub const LABORATORY_FUNCTION_TAG: &str = "laboratory_function";

const BUSINESS_ENTITIES: &[&str] = &[
    "Laboratory", "TestMethod", "CalibrationMethod", "Sample", "Specimen", "TestResult",
    "CalibrationResult", "Certificate", "Report", "Equipment", "Instrument", "Standard",
    "ReferenceStandard", "Uncertainty", "Traceability", "Accreditation", "Competence",
    "QualityControl", "QualityAssurance", "Validation", "Verification", "NonConformity",
    "CorrectiveAction", "PreventiveAction", "CustomerComplaint", "InternalAudit",
    "ManagementReview",
];

const TECHNICAL_ENTITIES: &[&str] = &[
    "MeasurementProcedure", "TestProcedure", "CalibrationProcedure", "SamplingProcedure",
    "DataProcessing", "StatisticalAnalysis", "UncertaintyCalculation", "TraceabilityChain",
    "MeasurementModel", "EnvironmentalCondition", "SafetyRequirement", "TechnicalRecord",
];

const CORE_ENTITIES: &[&str] = &[
    "Person", "Staff", "TechnicalPersonnel", "Customer", "Client", "Supplier",
    "AccreditationBody", "RegulatoryAuthority", "Document", "Record", "Procedure", "Policy",
    "Manual", "Location", "Facility", "Environment", "Time", "Date",
];

const HIGH_LABORATORY: &[&str] =
    &["test", "calibration", "measurement", "sample", "result", "uncertainty"];
const MEDIUM_LABORATORY: &[&str] = &["equipment", "method", "procedure", "standard", "quality"];

/// Property-name stems that make a property business-facing.
const MEASUREMENT_STEMS: &[&str] = &["measure", "calibrat", "uncertain", "trace", "accura", "precis"];
const HIGH_MEASUREMENT: &[&str] = &["measure", "calibrat", "uncertain", "trace", "accura"];
const MEASURED_VALUES: &[&str] = &["value", "result", "data"];

fn clauses() -> Vec<FrameworkCode> {
    vec![
        FrameworkCode::new("4", "General requirements", "Management System", None),
        FrameworkCode::new("5", "Structural requirements", "Organization", None),
        FrameworkCode::new("6", "Resource requirements", "Resources", None),
        FrameworkCode::new("7", "Process requirements", "Processes", None),
        FrameworkCode::new("8", "Management system requirements", "System", None),
    ]
}

fn clause_keywords() -> Vec<(String, Vec<String>)> {
    vec![
        ("4".into(), terms(&["management", "system", "policy", "organization"])),
        ("5".into(), terms(&["structure", "personnel", "responsibility", "authority"])),
        ("6".into(), terms(&["resource", "equipment", "facility", "environment", "competence"])),
        ("7".into(), terms(&["process", "method", "procedure", "sample", "test", "calibration"])),
        ("8".into(), terms(&["record", "document", "review", "audit", "improvement"])),
    ]
}

fn function_keywords() -> Vec<(String, Vec<String>)> {
    vec![
        ("testing".into(), terms(&["test", "analysis", "examination"])),
        ("calibration".into(), terms(&["calibrat", "standard", "reference"])),
        ("sampling".into(), terms(&["sample", "specimen", "collection"])),
        ("quality".into(), terms(&["quality", "control", "assurance"])),
        ("management".into(), terms(&["management", "administration", "governance"])),
        ("technical".into(), terms(&["technical", "method", "procedure"])),
    ]
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// ISO/IEC 17025 laboratory-accreditation enhancer.
///
/// Readiness is rated on the number of distinct clauses touched.
#[derive(Debug, Clone)]
pub struct LaboratoryEnhancer {
    lexicon: FrameworkLexicon,
    clauses: Vec<FrameworkCode>,
    clause_keywords: Vec<(String, Vec<String>)>,
    function_keywords: Vec<(String, Vec<String>)>,
    readiness: ReadinessThresholds,
}

impl LaboratoryEnhancer {
    pub const DEFAULT_READINESS: ReadinessThresholds = ReadinessThresholds::new(4, 2);

    #[must_use]
    pub fn new() -> Self {
        Self {
            lexicon: FrameworkLexicon::new(BUSINESS_ENTITIES, TECHNICAL_ENTITIES, CORE_ENTITIES),
            clauses: clauses(),
            clause_keywords: clause_keywords(),
            function_keywords: function_keywords(),
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
    pub fn clauses(&self) -> &[FrameworkCode] {
        &self.clauses
    }

    fn clause(&self, name: &str) -> Option<&str> {
        first_match(&name.to_lowercase(), &self.clause_keywords)
    }

    fn function(&self, name: &str, type_name: &str) -> &str {
        let name = name.to_lowercase();
        let type_name = type_name.to_lowercase();
        self.function_keywords
            .iter()
            .find(|(_, terms)| {
                terms
                    .iter()
                    .any(|t| name.contains(t.as_str()) || type_name.contains(t.as_str()))
            })
            .map_or("general", |(function, _)| function.as_str())
    }

    fn enhance_class(&self, class: &mut Classified<ClassEntity>) {
        let name = class.entity.header.local_name.clone();
        class.assignment.extend(self.lexicon.layers_for(&name));

        if let Some(clause) = self.clause(&name) {
            class.set_tag(CLAUSE_TAG, clause);
        }
        class.set_tag(LABORATORY_RELEVANCE_TAG, laboratory_relevance(&name).as_str());
    }

    fn enhance_property(&self, property: &mut Classified<PropertyEntity>) {
        let name = property.entity.header.local_name.clone();
        let mut layers = self.lexicon.layers_for(&name);
        if contains_any(&name.to_lowercase(), MEASUREMENT_STEMS) {
            layers.insert(Layer::Business);
        }
        property.assignment.extend(layers);
        property.set_tag(MEASUREMENT_RELEVANCE_TAG, measurement_relevance(&name).as_str());
    }

    fn enhance_individual(&self, individual: &mut Classified<IndividualEntity>) {
        let name = individual.entity.header.local_name.clone();
        let mut layers = self.lexicon.layers_for(&name);
        if let Some(layer) = self.lexicon.type_layer(&individual.entity.type_local_name) {
            layers.insert(layer);
        }
        individual.assignment.extend(layers);

        let function = self
            .function(&name, &individual.entity.type_local_name)
            .to_string();
        individual.set_tag(LABORATORY_FUNCTION_TAG, function);
    }

    fn analyze(&self, model: &ClassifiedModel) -> FrameworkAnalysis {
        let mut codes_found = distinct_tags(model, CLAUSE_TAG);
        codes_found.sort();
        let covered = codes_found.len();

        FrameworkAnalysis {
            framework: self.framework().to_string(),
            codes_found,
            total_codes: self.clauses.len(),
            coverage_percentage: FrameworkAnalysis::coverage(covered, self.clauses.len()),
            readiness_basis: covered,
            readiness: self.readiness.tier(covered),
        }
    }
}

impl Default for LaboratoryEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

fn laboratory_relevance(name: &str) -> Tier {
    let lower = name.to_lowercase();
    if contains_any(&lower, HIGH_LABORATORY) {
        Tier::High
    } else if contains_any(&lower, MEDIUM_LABORATORY) {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn measurement_relevance(name: &str) -> Tier {
    let lower = name.to_lowercase();
    if contains_any(&lower, HIGH_MEASUREMENT) {
        Tier::High
    } else if lower.contains("has") && contains_any(&lower, MEASURED_VALUES) {
        Tier::Medium
    } else {
        Tier::Low
    }
}

impl DomainEnhancer for LaboratoryEnhancer {
    fn framework(&self) -> &str {
        "ISO17025"
    }

    fn enhance(&self, mut model: ClassifiedModel) -> ClassifiedModel {
        if self.lexicon.is_empty() {
            tracing::warn!("ISO17025 lexicon is empty, skipping enhancement");
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
            clauses = ?analysis.codes_found,
            readiness = %analysis.readiness,
            "ISO17025 enhancement completed"
        );
        model.analysis = Some(analysis);
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityHeader, LayerAssignment, PropertyKind};
    use crate::model::{ExtractionStatistics, LayerStatistics, OntologyMetadata};

    fn header(local: &str) -> EntityHeader {
        EntityHeader::new(format!("http://example.org/lab#{local}"), local, format!("lab:{local}"))
    }

    fn technical<T: crate::entity::OntologyEntity>(entity: T) -> Classified<T> {
        Classified::new(entity, LayerAssignment::new([Layer::Technical]))
    }

    fn empty_model() -> ClassifiedModel {
        ClassifiedModel {
            metadata: OntologyMetadata::default(),
            classes: Vec::new(),
            properties: Vec::new(),
            individuals: Vec::new(),
            relationships: Vec::new(),
            statistics: ExtractionStatistics::default(),
            namespaces: std::collections::BTreeMap::new(),
            layer_statistics: LayerStatistics::default(),
            analysis: None,
        }
    }

    #[test]
    fn test_calibration_certificate_gains_business_and_clause() {
        let enhancer = LaboratoryEnhancer::new();
        let mut model = empty_model();
        model.classes = vec![technical(ClassEntity::new(header("CalibrationCertificate")))];

        let model = enhancer.enhance(model);
        let class = &model.classes[0];

        assert!(class.assignment.contains(Layer::Business));
        assert!(class.assignment.contains(Layer::Technical));
        assert_eq!(class.primary_layer(), Layer::Business);
        assert_eq!(class.tag(CLAUSE_TAG), Some("7"));
        assert_eq!(class.tag(LABORATORY_RELEVANCE_TAG), Some("high"));
    }

    #[test]
    fn test_clause_order_first_match_wins() {
        let enhancer = LaboratoryEnhancer::new();

        assert_eq!(enhancer.clause("ManagementReview"), Some("4"));
        assert_eq!(enhancer.clause("PersonnelRecord"), Some("5"));
        assert_eq!(enhancer.clause("Widget"), None);
    }

    #[test]
    fn test_measurement_property() {
        let enhancer = LaboratoryEnhancer::new();
        let mut model = empty_model();
        model.properties = vec![
            technical(PropertyEntity::new(header("measuredAt"), PropertyKind::DatatypeProperty)),
            technical(PropertyEntity::new(header("hasValue"), PropertyKind::DatatypeProperty)),
            technical(PropertyEntity::new(header("label"), PropertyKind::AnnotationProperty)),
        ];

        let model = enhancer.enhance(model);

        assert!(model.properties[0].assignment.contains(Layer::Business));
        assert_eq!(model.properties[0].tag(MEASUREMENT_RELEVANCE_TAG), Some("high"));
        assert_eq!(model.properties[1].tag(MEASUREMENT_RELEVANCE_TAG), Some("medium"));
        assert_eq!(model.properties[2].tag(MEASUREMENT_RELEVANCE_TAG), Some("low"));
        assert_eq!(model.properties[2].assignment.layers().len(), 1);
    }

    #[test]
    fn test_individual_function_and_type_layer() {
        let enhancer = LaboratoryEnhancer::new();
        let mut model = empty_model();
        model.individuals = vec![
            technical(IndividualEntity::new(header("run42"), "http://example.org/lab#TestResult", "TestResult")),
            technical(IndividualEntity::new(header("alice"), "http://example.org/lab#Staff", "Staff")),
        ];

        let model = enhancer.enhance(model);

        assert!(model.individuals[0].assignment.contains(Layer::Business));
        assert_eq!(model.individuals[0].tag(LABORATORY_FUNCTION_TAG), Some("testing"));
        assert!(model.individuals[1].assignment.contains(Layer::Core));
        assert_eq!(model.individuals[1].tag(LABORATORY_FUNCTION_TAG), Some("general"));
    }

    #[test]
    fn test_clause_readiness() {
        let enhancer = LaboratoryEnhancer::new();
        let mut model = empty_model();
        model.classes = ["QualityPolicy", "StaffCompetence", "TestMethod", "AuditRecord"]
            .into_iter()
            .map(|n| technical(ClassEntity::new(header(n))))
            .collect();

        let analysis = enhancer.enhance(model).analysis.unwrap();

        assert_eq!(analysis.codes_found, vec!["4", "6", "7", "8"]);
        assert_eq!(analysis.readiness, Tier::High);
        assert!((analysis.coverage_percentage - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_lexicon_is_noop() {
        let enhancer = LaboratoryEnhancer::new().with_lexicon(FrameworkLexicon::default());
        let mut model = empty_model();
        model.classes = vec![technical(ClassEntity::new(header("CalibrationCertificate")))];

        assert_eq!(enhancer.enhance(model.clone()), model);
    }
}
