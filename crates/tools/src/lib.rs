//! Tool registry and execution engine: validates, dispatches, sandboxes
//! and bounds every solver invocation, plus the built-in solver stand-ins.

pub mod builtin;
pub mod engine;
pub mod mime;
pub mod registry;

pub use engine::{http_status_for_error_code, ExecutionEngine};
pub use registry::{ToolRegistry, ToolRegistryBuilder};

/// Build the frozen registry containing every built-in tool. The usual
/// entry point for a fresh gateway process.
pub fn default_registry() -> autosage_core::Result<ToolRegistry> {
    let mut builder = ToolRegistryBuilder::new();
    builtin::register_all(&mut builder)?;
    Ok(builder.build())
}
