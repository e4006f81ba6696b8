//! Unit types and conversion constants
//!
//! Two independent scales, each converting through a single base unit:
//! milliliters for volume and grams for mass.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConversionError;

/// Measurement scale a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Volume units, base unit milliliters
    Volume,
    /// Mass units, base unit grams
    Mass,
}

impl Scale {
    /// The base unit every factor in this scale converts into
    pub fn base_unit(&self) -> Unit {
        match self {
            Scale::Volume => Unit::Milliliter,
            Scale::Mass => Unit::Gram,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Volume => "volume",
            Scale::Mass => "mass",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "volume" => Some(Scale::Volume),
            "mass" | "weight" => Some(Scale::Mass),
            _ => None,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 4.92892;
/// Milliliters per tablespoon
pub const ML_PER_TBSP: f64 = 14.7868;
/// Milliliters per fluid ounce
pub const ML_PER_FL_OZ: f64 = 29.5735;
/// Milliliters per cup (US)
pub const ML_PER_CUP: f64 = 236.588;
/// Milliliters per pint (US)
pub const ML_PER_PINT: f64 = 473.176;
/// Milliliters per quart (US)
pub const ML_PER_QUART: f64 = 946.353;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;
/// Milliliters per gallon (US)
pub const ML_PER_GALLON: f64 = 3785.41;

// ============================================================================
// Mass Conversion Constants (to grams)
// ============================================================================

/// Grams per milligram
pub const G_PER_MG: f64 = 0.001;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per pound
pub const G_PER_LB: f64 = 453.592;

/// A unit that can be converted within its scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Milliliter,
    Liter,
    Teaspoon,
    Tablespoon,
    FluidOunce,
    Cup,
    Pint,
    Quart,
    Gallon,
    Milligram,
    Gram,
    Kilogram,
    Ounce,
    Pound,
}

/// Every convertible unit, volume first
pub const ALL_UNITS: [Unit; 14] = [
    Unit::Milliliter,
    Unit::Liter,
    Unit::Teaspoon,
    Unit::Tablespoon,
    Unit::FluidOunce,
    Unit::Cup,
    Unit::Pint,
    Unit::Quart,
    Unit::Gallon,
    Unit::Milligram,
    Unit::Gram,
    Unit::Kilogram,
    Unit::Ounce,
    Unit::Pound,
];

impl Unit {
    pub fn scale(&self) -> Scale {
        match self {
            Unit::Milliliter
            | Unit::Liter
            | Unit::Teaspoon
            | Unit::Tablespoon
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Pint
            | Unit::Quart
            | Unit::Gallon => Scale::Volume,
            Unit::Milligram | Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => {
                Scale::Mass
            }
        }
    }

    /// Conversion factor into the base unit of this unit's scale
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Milliliter => 1.0,
            Unit::Liter => ML_PER_LITER,
            Unit::Teaspoon => ML_PER_TSP,
            Unit::Tablespoon => ML_PER_TBSP,
            Unit::FluidOunce => ML_PER_FL_OZ,
            Unit::Cup => ML_PER_CUP,
            Unit::Pint => ML_PER_PINT,
            Unit::Quart => ML_PER_QUART,
            Unit::Gallon => ML_PER_GALLON,
            Unit::Milligram => G_PER_MG,
            Unit::Gram => 1.0,
            Unit::Kilogram => G_PER_KG,
            Unit::Ounce => G_PER_OZ,
            Unit::Pound => G_PER_LB,
        }
    }

    /// Canonical symbol (e.g. "ml", "tbsp", "g")
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::FluidOunce => "fl oz",
            Unit::Cup => "cup",
            Unit::Pint => "pint",
            Unit::Quart => "quart",
            Unit::Gallon => "gallon",
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
        }
    }

    /// Spellings recognized for this unit, all lower case
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Unit::Milliliter => &["ml", "milliliter", "milliliters", "millilitre", "millilitres"],
            Unit::Liter => &["l", "liter", "liters", "litre", "litres"],
            Unit::Teaspoon => &["tsp", "teaspoon", "teaspoons"],
            Unit::Tablespoon => &["tbsp", "tablespoon", "tablespoons"],
            Unit::FluidOunce => &["fl oz", "floz", "fluid ounce", "fluid ounces"],
            Unit::Cup => &["cup", "cups"],
            Unit::Pint => &["pint", "pints"],
            Unit::Quart => &["quart", "quarts"],
            Unit::Gallon => &["gallon", "gallons"],
            Unit::Milligram => &["mg", "milligram", "milligrams"],
            Unit::Gram => &["g", "gram", "grams"],
            Unit::Kilogram => &["kg", "kilogram", "kilograms"],
            Unit::Ounce => &["oz", "ounce", "ounces"],
            Unit::Pound => &["lb", "lbs", "pound", "pounds"],
        }
    }

    /// Parse a unit string in any scale (case-insensitive, trimmed)
    pub fn parse(unit: &str) -> Option<Self> {
        let lower = unit.to_lowercase();
        let trimmed = lower.trim();

        ALL_UNITS
            .into_iter()
            .find(|u| u.aliases().contains(&trimmed))
    }

    /// Parse a unit string, accepting only units of the given scale
    pub fn parse_in(unit: &str, scale: Scale) -> Result<Self, ConversionError> {
        match Self::parse(unit) {
            Some(u) if u.scale() == scale => Ok(u),
            _ => Err(ConversionError::UnknownUnit {
                unit: unit.to_string(),
                scale,
            }),
        }
    }

    /// Convert a quantity of this unit into `to`, which must share the scale
    pub fn convert(&self, quantity: f64, to: Unit) -> Result<f64, ConversionError> {
        if self.scale() != to.scale() {
            return Err(ConversionError::ScaleMismatch { from: *self, to });
        }
        if *self == to {
            return Ok(quantity);
        }
        Ok(quantity * self.factor() / to.factor())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Grams per unit for a mass unit string
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    Unit::parse_in(unit, Scale::Mass).ok().map(|u| u.factor())
}

/// Milliliters per unit for a volume unit string
pub fn ml_per_unit(unit: &str) -> Option<f64> {
    Unit::parse_in(unit, Scale::Volume).ok().map(|u| u.factor())
}

/// Determine which scale a unit string belongs to, if any.
///
/// Volume is checked first.
pub fn categorize_unit(unit: &str) -> Option<Scale> {
    if ml_per_unit(unit).is_some() {
        return Some(Scale::Volume);
    }
    if grams_per_unit(unit).is_some() {
        return Some(Scale::Mass);
    }
    None
}
