use std::path::{Path, PathBuf};

use thiserror::Error;

use super::extractor::{ExtractionError, ExtractionResult, TripleExtractor};
use super::parser::{CompositeParser, OntologyFormat, OntologyParser};
use crate::classify::{classify_stage, LayerClassifier};
use crate::config::PipelineConfig;
use crate::enhance::{enhance_stage, DomainEnhancer};
use crate::model::{ClassifiedModel, EntityModel, ErrorMarker, StageResult};
use crate::summary::{PayloadGroups, SummaryBuilder};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Core(#[from] crate::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Source file, when the input came from disk.
    pub path: Option<PathBuf>,
    pub model: ClassifiedModel,
    pub payloads: PayloadGroups,
    pub duration_ms: u64,
}

impl PipelineOutput {
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.model.entity_count()
    }
}

/// Parser, extractor, classifier, optional enhancer and summary builder,
/// run in that order.
pub struct OntologyPipeline {
    parser: Box<dyn OntologyParser>,
    extractor: TripleExtractor,
    classifier: LayerClassifier,
    enhancer: Option<Box<dyn DomainEnhancer>>,
    summary: SummaryBuilder,
}

impl OntologyPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: Box::new(CompositeParser::default()),
            extractor: TripleExtractor::new(),
            classifier: LayerClassifier::default(),
            enhancer: None,
            summary: SummaryBuilder::default(),
        }
    }

    /// Builds the pipeline described by `config`, loading its lexicon.
    pub fn from_config(config: &PipelineConfig) -> crate::Result<Self> {
        let classifier = LayerClassifier::new(config.lexicon()?);
        let summary = SummaryBuilder::new(config.resolved_framework_name(), config.group_id.clone());

        Ok(Self {
            classifier,
            enhancer: config.framework.map(|f| f.enhancer()),
            summary,
            ..Self::new()
        })
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn OntologyParser>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: LayerClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_enhancer(mut self, enhancer: Box<dyn DomainEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: SummaryBuilder) -> Self {
        self.summary = summary;
        self
    }

    #[must_use]
    pub fn enhancer(&self) -> Option<&dyn DomainEnhancer> {
        self.enhancer.as_deref()
    }

    pub async fn extract_file(&self, path: &Path) -> ExtractionResult<EntityModel> {
        let graph = self.parser.parse_file(path).await?;
        Ok(self.extractor.extract(&graph))
    }

    pub async fn extract_bytes(
        &self,
        data: &[u8],
        format: OntologyFormat,
    ) -> ExtractionResult<EntityModel> {
        if !self.parser.can_parse(format) {
            return Err(ExtractionError::LibraryUnavailable(format));
        }
        let graph = self.parser.parse_bytes(data, format, None).await?;
        Ok(self.extractor.extract(&graph))
    }

    /// Generic classification followed by the configured enhancer, if any.
    #[must_use]
    pub fn classify(&self, model: EntityModel) -> ClassifiedModel {
        let classified = self.classifier.classify(model);
        match &self.enhancer {
            Some(enhancer) => enhancer.enhance(classified),
            None => classified,
        }
    }

    /// Runs the stages with failures carried as an [`ErrorMarker`].
    pub async fn run_stages(&self, path: &Path) -> StageResult<ClassifiedModel> {
        let extracted = self
            .extract_file(path)
            .await
            .map_err(|e| ErrorMarker::new(e.to_string()));

        let classified = classify_stage(&self.classifier, extracted);
        enhance_stage(self.enhancer(), classified)
    }

    pub async fn process_file(&self, path: &Path) -> PipelineResult<PipelineOutput> {
        let start = std::time::Instant::now();
        tracing::info!(path = %path.display(), "processing ontology");

        let model = self.extract_file(path).await?;
        self.finish(Some(path.to_path_buf()), model, start)
    }

    pub async fn process_bytes(
        &self,
        data: &[u8],
        format: OntologyFormat,
    ) -> PipelineResult<PipelineOutput> {
        let start = std::time::Instant::now();
        let model = self.extract_bytes(data, format).await?;
        self.finish(None, model, start)
    }

    fn finish(
        &self,
        path: Option<PathBuf>,
        model: EntityModel,
        start: std::time::Instant,
    ) -> PipelineResult<PipelineOutput> {
        let model = self.classify(model);
        let payloads = self.summary.summarize(&model)?;

        Ok(PipelineOutput {
            path,
            model,
            payloads,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}

impl Default for OntologyPipeline {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BatchResult {
    pub successful: Vec<PipelineOutput>,
    pub failed: Vec<(PathBuf, PipelineError)>,
}

impl BatchResult {
    #[must_use]
    pub fn new() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
        }
    }

    fn add_success(&mut self, output: PipelineOutput) {
        self.successful.push(output);
    }

    fn add_failure(&mut self, path: PathBuf, error: PipelineError) {
        tracing::warn!(path = %path.display(), error = %error, "ontology failed");
        self.failed.push((path, error));
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    #[must_use]
    pub fn total_entities(&self) -> usize {
        self.successful.iter().map(PipelineOutput::entity_count).sum()
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyPipeline {
    /// Processes every ontology file directly inside `dir`, in name order.
    /// Files with an unknown extension are skipped.
    pub async fn process_directory(&self, dir: &Path) -> PipelineResult<BatchResult> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if OntologyFormat::from_path(&path).is_ok() {
                paths.push(path);
            } else {
                tracing::warn!(path = %path.display(), "skipping non-ontology file");
            }
        }
        paths.sort();

        let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
        Ok(self.process_files(&refs).await)
    }

    pub async fn process_files(&self, paths: &[&Path]) -> BatchResult {
        let mut result = BatchResult::new();

        for path in paths {
            match self.process_file(path).await {
                Ok(output) => result.add_success(output),
                Err(e) => result.add_failure(path.to_path_buf(), e),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Framework;
    use crate::entity::Layer;

    const LAB: &str = r#"
@prefix lab: <http://example.org/lab#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/lab> a owl:Ontology ;
    rdfs:label "Lab" .

lab:CalibrationCertificate a owl:Class .
lab:Widget a owl:Class ;
    rdfs:subClassOf lab:CalibrationCertificate .
"#;

    fn lab_pipeline() -> OntologyPipeline {
        let config = PipelineConfig::default().with_framework(Framework::Laboratory);
        OntologyPipeline::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_process_bytes_with_enhancer() {
        let output = lab_pipeline()
            .process_bytes(LAB.as_bytes(), OntologyFormat::Turtle)
            .await
            .unwrap();

        let certificate = output
            .model
            .classes
            .iter()
            .find(|c| c.entity.header.local_name == "CalibrationCertificate")
            .unwrap();
        assert!(certificate.assignment.contains(Layer::Business));
        assert_eq!(certificate.tag("iso17025_clause"), Some("7"));
        assert!(output.model.analysis.is_some());
        assert!(output.payloads.find("ISO17025 Framework Analysis").is_some());
        assert!(output.path.is_none());
    }

    #[tokio::test]
    async fn test_empty_ontology_is_not_an_error() {
        let output = OntologyPipeline::new()
            .process_bytes(b"", OntologyFormat::Turtle)
            .await
            .unwrap();

        assert_eq!(output.entity_count(), 0);
        assert!(output.model.relationships.is_empty());
        assert!(output.model.metadata.is_empty());
        assert_eq!(output.model.statistics.total_triples, 0);
        assert_eq!(output.payloads.bundles.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_parser_reported_before_missing_file() {
        let pipeline = OntologyPipeline::new().with_parser(Box::new(CompositeParser::new()));

        let err = pipeline
            .extract_file(Path::new("/nonexistent/onto.ttl"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::LibraryUnavailable(OntologyFormat::Turtle)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = OntologyPipeline::new()
            .process_file(Path::new("/nonexistent/onto.ttl"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_with_unknown_extension() {
        let err = OntologyPipeline::new()
            .extract_file(Path::new("/nonexistent/onto.owl"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_relative_iris_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onto.owl");
        std::fs::write(
            &path,
            "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n<#Audit> a owl:Class .\n",
        )
        .unwrap();

        let output = OntologyPipeline::new().process_file(&path).await.unwrap();

        let audit = &output.model.classes[0];
        assert_eq!(audit.entity.header.local_name, "Audit");
        assert!(audit.entity.header.uri.starts_with("file://"));
        assert!(audit.entity.header.uri.ends_with("onto.owl#Audit"));
    }

    #[tokio::test]
    async fn test_run_stages_carries_error_marker() {
        let marker = OntologyPipeline::new()
            .run_stages(Path::new("/nonexistent/onto.ttl"))
            .await
            .unwrap_err();

        assert!(marker.error.contains("not found"));
    }

    #[tokio::test]
    async fn test_process_directory_partial_success() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_lab.ttl"), LAB).unwrap();
        std::fs::write(dir.path().join("b_broken.ttl"), "lab:Oops a ").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an ontology").unwrap();

        let result = lab_pipeline().process_directory(dir.path()).await.unwrap();

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failure_count(), 1);
        assert!(result.failed[0].0.ends_with("b_broken.ttl"));
        assert_eq!(result.total_entities(), 2);
    }
}
