//! Submission of payload bundles to an external knowledge sink.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::summary::{PayloadBundle, PayloadGroups};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("episode rejected: {0}")]
    Rejected(String),

    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SinkResult<T> = std::result::Result<T, SinkError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkReceipt {
    pub episode_id: Uuid,
    pub name: String,
}

impl SinkReceipt {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            episode_id: Uuid::now_v7(),
            name: name.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait KnowledgeSink: Send + Sync {
    async fn submit(&self, episode: &PayloadBundle) -> SinkResult<SinkReceipt>;
}

/// Keeps submitted episodes in memory. Named episodes can be made to fail.
#[derive(Debug, Default)]
pub struct MemorySink {
    episodes: Mutex<Vec<PayloadBundle>>,
    failing: Vec<String>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_failure(mut self, name: impl Into<String>) -> Self {
        self.failing.push(name.into());
        self
    }

    pub async fn episodes(&self) -> Vec<PayloadBundle> {
        self.episodes.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl KnowledgeSink for MemorySink {
    async fn submit(&self, episode: &PayloadBundle) -> SinkResult<SinkReceipt> {
        if self.failing.iter().any(|n| *n == episode.name) {
            return Err(SinkError::Rejected(episode.name.clone()));
        }
        self.episodes.lock().await.push(episode.clone());
        Ok(SinkReceipt::new(&episode.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-bundle outcomes, in bundle order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<SubmissionOutcome>,
}

impl ImportReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// At least one submission was attempted and none failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.attempted() > 0 && self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &SubmissionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Submits every bundle concurrently; one failure never affects another.
#[derive(Clone)]
pub struct OntologyImporter {
    sink: Arc<dyn KnowledgeSink>,
}

impl OntologyImporter {
    #[must_use]
    pub fn new(sink: Arc<dyn KnowledgeSink>) -> Self {
        Self { sink }
    }

    pub async fn import(&self, payloads: &PayloadGroups) -> ImportReport {
        let mut tasks = JoinSet::new();
        for (index, bundle) in payloads.bundles.iter().enumerate() {
            let sink = Arc::clone(&self.sink);
            let bundle = bundle.clone();
            tasks.spawn(async move {
                let result = sink.submit(&bundle).await;
                (index, result)
            });
        }

        let mut results: Vec<Option<SinkResult<SinkReceipt>>> =
            payloads.bundles.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::warn!(error = %e, "submission task failed to complete"),
            }
        }

        let outcomes = payloads
            .bundles
            .iter()
            .zip(results)
            .map(|(bundle, result)| match result {
                Some(Ok(receipt)) => SubmissionOutcome {
                    name: bundle.name.clone(),
                    episode_id: Some(receipt.episode_id),
                    error: None,
                },
                Some(Err(e)) => {
                    tracing::warn!(episode = %bundle.name, error = %e, "episode submission failed");
                    SubmissionOutcome {
                        name: bundle.name.clone(),
                        episode_id: None,
                        error: Some(e.to_string()),
                    }
                }
                None => SubmissionOutcome {
                    name: bundle.name.clone(),
                    episode_id: None,
                    error: Some("submission task aborted".to_string()),
                },
            })
            .collect();

        let report = ImportReport { outcomes };
        tracing::info!(
            attempted = report.attempted(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "ontology import finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayerStatistics;
    use crate::summary::{EntitiesProcessed, ImportSummary};

    fn bundle(name: &str) -> PayloadBundle {
        PayloadBundle {
            name: name.to_string(),
            body: serde_json::json!({"name": name}),
            group_id: "g1".to_string(),
            source_kind: "json".to_string(),
            source_description: format!("{name} description"),
        }
    }

    fn payloads(names: &[&str]) -> PayloadGroups {
        PayloadGroups {
            bundles: names.iter().map(|n| bundle(n)).collect(),
            summary: ImportSummary {
                import_timestamp: chrono::Utc::now(),
                episodes: names.len(),
                entities_processed: EntitiesProcessed::default(),
                layer_distribution: LayerStatistics::default(),
                original_triples: 0,
                bundle_names: names.iter().map(|n| (*n).to_string()).collect(),
            },
        }
    }

    #[tokio::test]
    async fn test_import_all_succeed() {
        let sink = Arc::new(MemorySink::new());
        let importer = OntologyImporter::new(sink.clone());

        let report = importer.import(&payloads(&["a", "b", "c"])).await;

        assert_eq!(report.attempted(), 3);
        assert!(report.is_complete());
        let names: Vec<String> = report.outcomes.iter().map(|o| o.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(sink.episodes().await.len(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let sink = Arc::new(MemorySink::new().with_failure("b"));
        let importer = OntologyImporter::new(sink.clone());

        let report = importer.import(&payloads(&["a", "b", "c"])).await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_complete());
        assert!(report.outcomes[1].error.as_deref().unwrap().contains('b'));
        assert!(report.outcomes[0].episode_id.is_some());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(sink.episodes().await.len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_attempted_is_not_complete() {
        let importer = OntologyImporter::new(Arc::new(MemorySink::new()));

        let report = importer.import(&payloads(&[])).await;

        assert_eq!(report.attempted(), 0);
        assert!(!report.is_complete());
    }
}
