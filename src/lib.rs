//! Grocer Library
//!
//! Ingredient quantity standardization for shopping lists: unit conversion,
//! density lookups, and the MCP tools that expose them.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod quantity;
pub mod tools;

pub use quantity::{
    convert_units, standardize_ingredient_quantity, Confidence, ConversionError, Scale,
    StandardizedQuantity, Standardizer,
};
