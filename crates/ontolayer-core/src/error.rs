use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid layer: {0}")]
    InvalidLayer(String),

    #[error("Invalid framework: {0}")]
    InvalidFramework(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },

    #[error("Invalid property kind: {0}")]
    InvalidPropertyKind(String),

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
