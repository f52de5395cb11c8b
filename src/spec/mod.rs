//! OpenAPI document loading and typed operation views.
//!
//! The loader returns the parsed tree unchanged; [`model`] walks it to
//! produce the [`Operation`] list the tool synthesizer consumes.

pub mod loader;
pub mod model;

pub use loader::{load, parse_str, SpecFormat};
pub use model::{BodyField, HttpMethod, Operation, Parameter, ParameterLocation, RequestBody};

use serde_json::{Map, Value};

/// Maximum number of `$ref` hops followed before giving up on a chain.
const MAX_REF_DEPTH: usize = 8;

/// A parsed API description.
///
/// Immutable after construction. Holds the generic JSON tree exactly as it
/// came out of the JSON or YAML parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// `servers[0].url`, if the document declares one.
    pub fn server_url(&self) -> Option<&str> {
        self.root
            .get("servers")?
            .as_array()?
            .first()?
            .get("url")?
            .as_str()
    }

    /// The `paths` object, keyed by path template.
    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.root.get("paths")?.as_object()
    }

    /// Follow local `$ref` pointers (`#/components/...`) starting at `value`.
    ///
    /// Returns `value` itself when it is not a reference. Remote references
    /// and dangling pointers are returned unresolved.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> &'a Value {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return current;
            };
            let Some(pointer) = reference.strip_prefix('#') else {
                log::debug!("Skipping non-local reference '{reference}'");
                return current;
            };
            match self.root.pointer(pointer) {
                Some(target) => current = target,
                None => {
                    log::warn!("Unresolvable reference '{reference}'");
                    return current;
                }
            }
        }
        log::warn!("Reference chain exceeded {MAX_REF_DEPTH} hops");
        current
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}
