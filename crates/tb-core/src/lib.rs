//! # tb-core
//!
//! Core crate for tickerbar, providing:
//!
//! - **Types** (`types`): quotes, tracked symbols, the position-indexed result table
//! - **Configuration** (`config`): ticker specs, output format, JSON config loading
//! - **Error types** (`error`): domain-specific `TbError` via thiserror
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export types at crate root for convenience.
pub use error::TbError;
pub use types::*;
