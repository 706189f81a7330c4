//! High-level operations.
//!
//! This module contains the implementation of quay commands.

pub mod clean;
pub mod export;
pub mod lifecycle;

pub use clean::{clean, CleanOptions};
pub use export::{export, ExportResult};
pub use lifecycle::Lifecycle;
