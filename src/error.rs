use std::path::PathBuf;
use thiserror::Error;

use crate::locate::RequestSelector;

#[derive(Debug, Error)]
pub enum ReqscopeError {
    #[error("No request matches {selector}")]
    TargetNotFound { selector: RequestSelector },

    #[error("{count} requests match {selector}; use a request id or set lookup.ambiguous = \"first-match\"")]
    AmbiguousTarget {
        selector: RequestSelector,
        count: usize,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in settings file")]
    UnknownKeys(Vec<ReqscopeError>),

    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to parse collection {path}: {source}")]
    CollectionParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
