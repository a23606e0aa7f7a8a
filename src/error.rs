use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TinaError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to parse document {path}: {message}")]
    DocumentParse { path: PathBuf, message: String },

    #[error("Capability already registered: {0}")]
    DuplicateCapability(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TinaError {
    /// Short category name used as the heading of error output.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Schema(_) => "Schema",
            Self::FileRead { .. } => "FileRead",
            Self::FileWrite { .. } => "FileWrite",
            Self::InvalidPattern { .. } => "Pattern",
            Self::DocumentParse { .. } => "Document",
            Self::DuplicateCapability(_) => "Registry",
            Self::Telemetry(_) => "Telemetry",
            Self::Prompt(_) => "Prompt",
            Self::Io(_) => "IO",
            Self::TomlParse(_) | Self::TomlSerialize(_) => "TOML",
            Self::Json(_) => "JSON",
            Self::Yaml(_) => "YAML",
        }
    }

    /// Actionable hint shown under the error, when one exists.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Schema(_) | Self::TomlParse(_) => {
                Some("check .tina/schema.toml or pass --schema <PATH>")
            }
            Self::FileWrite { .. } => {
                Some("content may be partially rewritten; restore it from git before retrying")
            }
            Self::DuplicateCapability(_) => Some("each capability name can be registered once"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TinaError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
