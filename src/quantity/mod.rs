//! Quantity standardization module
//!
//! Unit conversion tables, ingredient densities, and the standardizer that
//! turns raw recipe quantities into shopping-list quantities.

pub mod converter;
pub mod density;
pub mod error;
pub mod units;

pub use converter::{
    convert_units, standardize_ingredient_quantity, Confidence, RawIngredient,
    StandardizedQuantity, Standardizer, VolumeStandard, FALLBACK_UNIT,
};
pub use density::{DensityRecord, DensitySource, DensityTable, StandardUnit};
pub use error::{ConversionError, DensityError};
pub use units::{categorize_unit, grams_per_unit, ml_per_unit, Scale, Unit};
