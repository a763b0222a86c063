use serde::{Deserialize, Serialize};

/// A `(subject, predicate, object)` statement whose predicate is a declared
/// object property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub subject_local_name: String,
    pub predicate_local_name: String,
    pub object_local_name: String,
    pub subject_prefixed: String,
    pub predicate_prefixed: String,
    pub object_prefixed: String,
}

impl RelationshipEdge {
    /// Bucket key used when relationships are grouped for submission.
    #[must_use]
    pub fn kind(&self) -> &str {
        if self.predicate_local_name.is_empty() {
            "unknown"
        } else {
            &self.predicate_local_name
        }
    }
}
