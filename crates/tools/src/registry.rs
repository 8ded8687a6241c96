//! Insertion-time-built tool registry.
//!
//! Built once at process start (see `autosage-gateway`'s bootstrap), then
//! frozen — no runtime mutation, which is what guarantees stable ordering
//! across every `/v1/tools` response (spec.md §4.1).

use std::collections::BTreeMap;

use autosage_core::schema::validate_descriptor;
use autosage_core::tool::{ToolDescriptor, ToolFilter};
use autosage_core::{Error, Result};

/// A builder used while assembling the registry; call [`ToolRegistryBuilder::build`]
/// once all built-ins are registered to get the frozen [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails with [`Error::DuplicateTool`] on name
    /// collision, or [`Error::InvalidDescriptor`] if the descriptor itself
    /// is malformed (see `schema::validate_descriptor`).
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        if self.tools.contains_key(&descriptor.name) {
            return Err(Error::DuplicateTool(descriptor.name));
        }
        validate_descriptor(&descriptor).map_err(Error::InvalidDescriptor)?;
        self.tools.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

/// Frozen, insertion-validated mapping from tool name to descriptor.
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Lexicographic listing (guaranteed by the `BTreeMap` backing store),
    /// narrowed by `filter`.
    pub fn list(&self, filter: &ToolFilter) -> Vec<&ToolDescriptor> {
        self.tools
            .values()
            .filter(|d| filter.matches(d))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
