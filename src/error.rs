//! Error types for spec loading and tool synthesis.
//!
//! Both are startup errors: a server is never started with a partially
//! loaded document or a partially synthesized tool set. Per-invocation
//! failures are not errors at this level, see
//! [`InvocationOutcome`](crate::tools::InvocationOutcome).

use std::path::PathBuf;

/// Failure to turn a file on disk into a [`Document`](crate::spec::Document).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("OpenAPI spec must be in JSON or YAML format (.json, .yaml, .yml): {}", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("Failed to read spec file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse spec as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse spec as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to derive a usable tool set from a loaded document.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Duplicate tool name '{name}' ({first} and {second})")]
    DuplicateToolName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid tool names specified: {}", .0.join(", "))]
    UnknownTools(Vec<String>),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Umbrella error for building a server from a spec file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
