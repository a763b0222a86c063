use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classify::{Lexicon, LexiconConfig, DEFAULT_RELATIONSHIP_THRESHOLD};
use crate::enhance::{DomainEnhancer, GovernanceEnhancer, LaboratoryEnhancer};
use crate::error::{Error, Result};

pub const FRAMEWORK_VAR: &str = "ONTOLAYER_FRAMEWORK";
pub const GROUP_ID_VAR: &str = "ONTOLAYER_GROUP_ID";
pub const FRAMEWORK_NAME_VAR: &str = "ONTOLAYER_FRAMEWORK_NAME";
pub const RELATIONSHIP_THRESHOLD_VAR: &str = "ONTOLAYER_RELATIONSHIP_THRESHOLD";

/// Domain enhancer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    /// COBIT5 governance framework.
    Governance,
    /// ISO/IEC 17025 laboratory accreditation.
    Laboratory,
}

impl Framework {
    /// Name used in bundle names when none is configured.
    #[must_use]
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Governance => "COBIT5",
            Self::Laboratory => "ISO17025",
        }
    }

    #[must_use]
    pub fn enhancer(&self) -> Box<dyn DomainEnhancer> {
        match self {
            Self::Governance => Box::new(GovernanceEnhancer::new()),
            Self::Laboratory => Box::new(LaboratoryEnhancer::new()),
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Governance => write!(f, "governance"),
            Self::Laboratory => write!(f, "laboratory"),
        }
    }
}

impl std::str::FromStr for Framework {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "governance" | "cobit5" => Ok(Self::Governance),
            "laboratory" | "iso17025" => Ok(Self::Laboratory),
            _ => Err(Error::InvalidFramework(s.to_string())),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub framework: Option<Framework>,
    /// Overrides the framework's default name in bundle names
    #[serde(default)]
    pub framework_name: Option<String>,
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_relationship_threshold")]
    pub relationship_threshold: usize,
    /// JSON lexicon replacing the built-in classifier vocabulary
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

fn default_group_id() -> String {
    "default".to_string()
}

const fn default_relationship_threshold() -> usize {
    DEFAULT_RELATIONSHIP_THRESHOLD
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            framework: None,
            framework_name: None,
            group_id: default_group_id(),
            relationship_threshold: default_relationship_threshold(),
            lexicon_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset or empty
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = var(FRAMEWORK_VAR) {
            config.framework = Some(value.parse()?);
        }
        if let Some(value) = var(FRAMEWORK_NAME_VAR) {
            config.framework_name = Some(value);
        }
        if let Some(value) = var(GROUP_ID_VAR) {
            config.group_id = value;
        }
        if let Some(value) = var(RELATIONSHIP_THRESHOLD_VAR) {
            config.relationship_threshold =
                value.trim().parse::<usize>().map_err(|_| Error::InvalidSetting {
                    key: RELATIONSHIP_THRESHOLD_VAR.to_string(),
                    value,
                })?;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = Some(framework);
        self
    }

    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    #[must_use]
    pub fn with_framework_name(mut self, name: impl Into<String>) -> Self {
        self.framework_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_lexicon_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lexicon_path = Some(path.into());
        self
    }

    /// Explicit name, else the framework default, else `Generic`.
    #[must_use]
    pub fn resolved_framework_name(&self) -> String {
        match (&self.framework_name, self.framework) {
            (Some(name), _) => name.clone(),
            (None, Some(framework)) => framework.default_name().to_string(),
            (None, None) => "Generic".to_string(),
        }
    }

    /// Loads and compiles the classifier vocabulary.
    pub fn lexicon(&self) -> Result<Lexicon> {
        let config = match &self.lexicon_path {
            Some(path) => LexiconConfig::from_json_file(path)?,
            None => LexiconConfig::default(),
        };
        config
            .with_relationship_threshold(self.relationship_threshold)
            .compile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_framework_aliases() {
        assert_eq!("cobit5".parse::<Framework>().unwrap(), Framework::Governance);
        assert_eq!("ISO17025".parse::<Framework>().unwrap(), Framework::Laboratory);
        assert!(matches!(
            "itil".parse::<Framework>(),
            Err(Error::InvalidFramework(_))
        ));
    }

    #[test]
    fn test_enhancer_selection() {
        assert_eq!(Framework::Governance.enhancer().framework(), "COBIT5");
        assert_eq!(Framework::Laboratory.enhancer().framework(), "ISO17025");
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.resolved_framework_name(), "Generic");
    }

    #[test]
    fn test_from_lookup_reads_vars() {
        let config = PipelineConfig::from_lookup(lookup(&[
            (FRAMEWORK_VAR, "iso17025"),
            (GROUP_ID_VAR, "lab-kb"),
            (RELATIONSHIP_THRESHOLD_VAR, " 5 "),
            (FRAMEWORK_NAME_VAR, ""),
        ]))
        .unwrap();

        assert_eq!(config.framework, Some(Framework::Laboratory));
        assert_eq!(config.group_id, "lab-kb");
        assert_eq!(config.relationship_threshold, 5);
        assert_eq!(config.resolved_framework_name(), "ISO17025");
    }

    #[test]
    fn test_from_lookup_rejects_bad_threshold() {
        let err = PipelineConfig::from_lookup(lookup(&[(RELATIONSHIP_THRESHOLD_VAR, "many")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { .. }));
    }

    #[test]
    fn test_lexicon_uses_threshold() {
        let config = PipelineConfig {
            relationship_threshold: 7,
            ..PipelineConfig::default()
        };
        assert_eq!(config.lexicon().unwrap().relationship_threshold(), 7);
    }
}
