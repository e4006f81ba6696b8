//! Grocer Tools module
//!
//! MCP tool implementations for quantity standardization and density data.

pub mod densities;
pub mod engine;
pub mod standardize;
pub mod status;

pub use engine::ActiveEngine;
