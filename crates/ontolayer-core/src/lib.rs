pub mod classify;
pub mod config;
pub mod enhance;
pub mod entity;
pub mod error;
pub mod ingest;
pub mod model;
pub mod relationship;
pub mod sink;
pub mod summary;
pub mod vocab;

pub use classify::{LayerClassifier, Lexicon, LexiconConfig};
pub use config::{Framework, PipelineConfig};
pub use enhance::{DomainEnhancer, FrameworkLexicon, GovernanceEnhancer, LaboratoryEnhancer};
pub use entity::{
    ClassEntity, Classified, EntityCategory, EntityHeader, IndividualEntity, Layer,
    LayerAssignment, OntologyEntity, PropertyEntity, PropertyKind, PropertyValue,
};
pub use error::{Error, Result};
pub use ingest::{
    ExtractionError, OntologyFormat, OntologyParser, OntologyPipeline, PipelineError,
    TripleExtractor, TripleGraph,
};
pub use model::{
    ClassifiedModel, EntityModel, ErrorMarker, FrameworkAnalysis, LayerStatistics, StageResult,
};
pub use relationship::RelationshipEdge;
pub use sink::{ImportReport, KnowledgeSink, MemorySink, OntologyImporter, SinkError};
pub use summary::{PayloadBundle, PayloadGroups, SummaryBuilder};
