//! Shared error type used across every AutoSage crate.

/// Stable error-kind identifiers used in `metrics.error_code` / `error.code`.
///
/// These mirror the "Error kinds" table in the tool-execution spec: every
/// variant here is in-band (surfaced inside a `ToolResult`), never a bare
/// HTTP 500.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate tool: {0}")]
    DuplicateTool(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("config: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
