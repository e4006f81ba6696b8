//! Error types for unit conversion and density records

use thiserror::Error;

use super::units::{Scale, Unit};

/// Conversion error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Unknown {scale} unit: '{unit}'")]
    UnknownUnit { unit: String, scale: Scale },

    #[error("Cannot convert {from} ({}) to {to} ({})", .from.scale(), .to.scale())]
    ScaleMismatch { from: Unit, to: Unit },
}

/// Density record validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DensityError {
    #[error("Ingredient name cannot be empty")]
    EmptyName,

    #[error("Density for '{name}' must be a positive number of grams per milliliter, got {density}")]
    InvalidDensity { name: String, density: f64 },

    #[error("Standard size for '{name}' must be a positive number of grams, got {standard_size}")]
    InvalidStandardSize { name: String, standard_size: f64 },

    #[error("Unknown standard unit: '{0}' (expected g, ml, whole or clove)")]
    UnknownStandardUnit(String),
}
