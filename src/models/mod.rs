//! Data models
//!
//! Rust structs representing database entities.

mod ingredient_density;

pub use ingredient_density::{load_density_table, StoredDensity, StoredDensityCreate};
