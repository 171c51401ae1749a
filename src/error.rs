//! @ai:module:intent Define error types for configuration, templates and workspace access
//! @ai:module:layer domain
//! @ai:module:public_api Error, ConfigError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Malformed template or placeholder in the toolchain configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("template `{template}` uses unknown placeholder `{{{name}}}`")]
    UnknownPlaceholder { template: String, name: String },

    #[error("template `{template}` is missing required placeholder `{{{name}}}`")]
    MissingPlaceholder { template: String, name: String },

    #[error("naming template `{template}` must contain exactly one `{{}}`, found {found}")]
    PlaceholderCount { template: String, found: usize },

    #[error("command template `{template}` renders to an empty command")]
    EmptyCommand { template: String },

    #[error("command template `{template}` has a `<` redirect without a file")]
    DanglingRedirect { template: String },
}

/// @ai:intent Unified error type for all library operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot derive an executable path from {0}: source file has no extension")]
    ArtifactPath(PathBuf),

    #[error("Invalid contest name: {0:?}")]
    InvalidContest(String),

    #[error("Invalid problem letter: {0:?}")]
    InvalidProblem(String),

    #[error("File not found: {path}")]
    MissingFile { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
