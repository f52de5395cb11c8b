//! Name → tool lookup handed to the tool host.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::types::ApiTool;
use crate::error::SynthesisError;

/// Immutable set of synthesized tools, keyed by name.
///
/// Tools keep their synthesis order for listing.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<ApiTool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting duplicate tool names.
    ///
    /// A duplicate usually means two operations share an `operationId`, or
    /// a derived `{method}_{path}` name collides with an explicit one.
    pub fn new(tools: Vec<ApiTool>) -> Result<Self, SynthesisError> {
        let mut registry = Self::default();
        for tool in tools {
            if let Some(&index) = registry.by_name.get(tool.name()) {
                return Err(SynthesisError::DuplicateToolName {
                    name: tool.name().to_string(),
                    first: registry.tools[index].endpoint(),
                    second: tool.endpoint(),
                });
            }
            registry
                .by_name
                .insert(tool.name().to_string(), registry.tools.len());
            registry.tools.push(Arc::new(tool));
        }
        Ok(registry)
    }

    /// Keep only the named tools. Every name must exist.
    pub fn retain_enabled(self, enabled: &HashSet<String>) -> Result<Self, SynthesisError> {
        let mut unknown: Vec<String> = enabled
            .iter()
            .filter(|name| !self.by_name.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(SynthesisError::UnknownTools(unknown));
        }

        let kept = self
            .tools
            .into_iter()
            .filter(|tool| enabled.contains(tool.name()))
            .map(Arc::unwrap_or_clone)
            .collect();
        Self::new(kept)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ApiTool>> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ApiTool>> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
