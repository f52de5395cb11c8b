//! Spec file loading.
//!
//! The file extension decides the parser:
//! - `.json` → JSON
//! - `.yaml` or `.yml` → YAML
//! - anything else → [`LoadError::UnsupportedExtension`]
//!
//! No schema validation or normalization happens here.

use std::path::Path;

use serde_json::Value;

use super::Document;
use crate::error::LoadError;

/// Serialization format of a spec document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Load an API description from disk.
pub fn load(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let format = SpecFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedExtension {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = parse_str(&content, format)?;
    log::info!(
        "Loaded {:?} spec from {} ({} paths)",
        format,
        path.display(),
        document.paths().map_or(0, |paths| paths.len())
    );
    Ok(document)
}

/// Parse an in-memory document in the given format.
pub fn parse_str(content: &str, format: SpecFormat) -> Result<Document, LoadError> {
    let root: Value = match format {
        SpecFormat::Json => serde_json::from_str(content)?,
        SpecFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(Document::from_value(root))
}
