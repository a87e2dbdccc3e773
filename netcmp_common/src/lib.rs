//! Common types shared across the netcmp workspace.
//!
//! This crate provides the graph selector, configuration handling, the
//! finding model produced by a comparison, the error taxonomy, and the
//! canonical scenarios used by tests across the project.

mod config;
mod error;
mod finding;
mod graph;
mod test_cases;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::finding::*;
pub use crate::graph::*;
pub use crate::test_cases::*;
