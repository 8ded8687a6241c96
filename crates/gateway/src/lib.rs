//! AutoSage gateway: the axum process that exposes tools, jobs, and
//! sessions over HTTP (spec.md §6). Split into a library so `main.rs` and
//! the integration tests share the same router/state construction.

pub mod api;
pub mod cli;
pub mod state;
