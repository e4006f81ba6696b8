//! Unit conversion and quantity standardization
//!
//! `convert_units` is strict and reports unknown units. The standardizer built
//! on top of it never fails: anything it cannot handle comes back as a
//! low-confidence passthrough of the input.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::density::{DensityRecord, DensityTable, StandardUnit};
use super::error::ConversionError;
use super::units::{categorize_unit, Scale, Unit};

/// Unit reported when the caller supplied none
pub const FALLBACK_UNIT: &str = "item";

/// How much to trust a standardized quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A shopping-list ready quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizedQuantity {
    pub quantity: u64,
    pub unit: String,
    pub confidence: Confidence,
}

/// A raw quantity as extracted from a recipe line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIngredient {
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    pub ingredient_name: String,
}

/// How to report ingredients whose standard unit is milliliters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeStandard {
    /// Report the gram figure as the milliliter count
    #[default]
    #[serde(rename = "grams-as-ml")]
    GramsAsMilliliters,
    /// Divide grams by density to get milliliters
    DensityCorrected,
}

impl VolumeStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeStandard::GramsAsMilliliters => "grams-as-ml",
            VolumeStandard::DensityCorrected => "density-corrected",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "grams-as-ml" | "parity" => Some(VolumeStandard::GramsAsMilliliters),
            "density-corrected" | "corrected" => Some(VolumeStandard::DensityCorrected),
            _ => None,
        }
    }
}

/// Internal reasons a standardization degrades to a passthrough
#[derive(Debug, thiserror::Error)]
enum StandardizeError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("non-finite intermediate quantity {0}")]
    NonFinite(f64),
}

/// Convert `quantity` between two units of the same scale.
///
/// Fails with `UnknownUnit` when either unit is not part of `scale`.
pub fn convert_units(
    quantity: f64,
    from_unit: &str,
    to_unit: &str,
    scale: Scale,
) -> Result<f64, ConversionError> {
    let from = Unit::parse_in(from_unit, scale)?;
    let to = Unit::parse_in(to_unit, scale)?;
    from.convert(quantity, to)
}

/// Standardize against the built-in density table with default settings
pub fn standardize_ingredient_quantity(
    quantity: f64,
    unit: &str,
    ingredient_name: &str,
) -> StandardizedQuantity {
    Standardizer::default().standardize(quantity, unit, ingredient_name)
}

/// Round up to a non-negative whole number
fn ceil_count(quantity: f64) -> u64 {
    // `as` saturates and maps NaN to 0
    quantity.ceil().max(0.0) as u64
}

fn passthrough(quantity: f64, unit: &str) -> StandardizedQuantity {
    let unit = if unit.trim().is_empty() {
        FALLBACK_UNIT.to_string()
    } else {
        unit.to_string()
    };
    StandardizedQuantity {
        quantity: ceil_count(quantity),
        unit,
        confidence: Confidence::Low,
    }
}

/// Standardization engine over an immutable density table
#[derive(Debug, Clone)]
pub struct Standardizer {
    table: Arc<DensityTable>,
    volume_standard: VolumeStandard,
}

impl Default for Standardizer {
    fn default() -> Self {
        Self::new(DensityTable::builtin(), VolumeStandard::default())
    }
}

impl Standardizer {
    pub fn new(table: Arc<DensityTable>, volume_standard: VolumeStandard) -> Self {
        Self {
            table,
            volume_standard,
        }
    }

    pub fn table(&self) -> &DensityTable {
        &self.table
    }

    pub fn volume_standard(&self) -> VolumeStandard {
        self.volume_standard
    }

    /// Standardize one quantity. Never fails; see module docs.
    pub fn standardize(
        &self,
        quantity: f64,
        unit: &str,
        ingredient_name: &str,
    ) -> StandardizedQuantity {
        let Some(record) = self.table.get(ingredient_name) else {
            tracing::debug!("No density data for '{}', passing through", ingredient_name);
            return passthrough(quantity, unit);
        };

        let Some(scale) = categorize_unit(unit) else {
            tracing::debug!(
                "Unit '{}' for '{}' is not convertible, passing through",
                unit,
                ingredient_name
            );
            return passthrough(quantity, unit);
        };

        match self.try_standardize(quantity, unit, scale, record) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    "Standardization failed for {} '{}' of '{}': {}. Passing through.",
                    quantity,
                    unit,
                    ingredient_name,
                    e
                );
                passthrough(quantity, unit)
            }
        }
    }

    fn try_standardize(
        &self,
        quantity: f64,
        unit: &str,
        scale: Scale,
        record: &DensityRecord,
    ) -> Result<StandardizedQuantity, StandardizeError> {
        let base = convert_units(quantity, unit, scale.base_unit().symbol(), scale)?;
        let grams = match scale {
            Scale::Mass => base,
            Scale::Volume => base * record.density,
        };

        let count = if record.standard_unit.is_counted() {
            grams / record.standard_size
        } else {
            match (record.standard_unit, self.volume_standard, scale) {
                // volume input is already in milliliters
                (StandardUnit::Milliliters, VolumeStandard::DensityCorrected, Scale::Volume) => {
                    base
                }
                (StandardUnit::Milliliters, VolumeStandard::DensityCorrected, Scale::Mass) => {
                    grams / record.density
                }
                // grams, or grams reported as milliliters (exact only at density 1)
                _ => grams,
            }
        };

        if !count.is_finite() {
            return Err(StandardizeError::NonFinite(count));
        }

        Ok(StandardizedQuantity {
            quantity: ceil_count(count),
            unit: record.standard_unit.as_str().to_string(),
            confidence: Confidence::High,
        })
    }

    /// Standardize several ingredients, preserving order
    pub fn standardize_batch(&self, ingredients: &[RawIngredient]) -> Vec<StandardizedQuantity> {
        ingredients
            .iter()
            .map(|i| self.standardize(i.quantity, &i.unit, &i.ingredient_name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::units::ALL_UNITS;

    fn units_in(scale: Scale) -> Vec<Unit> {
        ALL_UNITS.into_iter().filter(|u| u.scale() == scale).collect()
    }

    #[test]
    fn test_identity_conversion_mass() {
        for unit in units_in(Scale::Mass) {
            for q in [0.0, 1.0, 2.5, -4.0, 1234.5] {
                let out = convert_units(q, unit.symbol(), unit.symbol(), Scale::Mass).unwrap();
                assert_eq!(out, q, "{} -> {}", unit, unit);
            }
        }
    }

    #[test]
    fn test_round_trip_within_scale() {
        for scale in [Scale::Volume, Scale::Mass] {
            let units = units_in(scale);
            for a in &units {
                for b in &units {
                    let there = convert_units(3.7, a.symbol(), b.symbol(), scale).unwrap();
                    let back = convert_units(there, b.symbol(), a.symbol(), scale).unwrap();
                    assert!((back - 3.7).abs() < 1e-9, "{} <-> {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_known_conversions() {
        assert_eq!(convert_units(1.0, "l", "ml", Scale::Volume).unwrap(), 1000.0);
        assert_eq!(convert_units(1.0, "kg", "g", Scale::Mass).unwrap(), 1000.0);
        let ml = convert_units(2.0, "cups", "ml", Scale::Volume).unwrap();
        assert!((ml - 473.176).abs() < 1e-9);
        let tsp = convert_units(1.0, "tbsp", "tsp", Scale::Volume).unwrap();
        assert!((tsp - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_unknown_unit_is_reported() {
        let err = convert_units(1.0, "cup", "g", Scale::Mass).unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnknownUnit {
                unit: "cup".to_string(),
                scale: Scale::Mass,
            }
        );

        let err = convert_units(1.0, "ml", "smidgen", Scale::Volume).unwrap_err();
        assert!(matches!(err, ConversionError::UnknownUnit { ref unit, .. } if unit == "smidgen"));
    }

    #[test]
    fn test_unknown_unit_known_ingredient_passes_through() {
        let result = standardize_ingredient_quantity(1.0, "unknownunit", "flour");
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.quantity, 1);
        assert_eq!(result.unit, "unknownunit");
    }

    #[test]
    fn test_unknown_ingredient_passes_through_rounded_up() {
        let result = standardize_ingredient_quantity(2.2, "cups", "dragonfruit");
        assert_eq!(
            result,
            StandardizedQuantity {
                quantity: 3,
                unit: "cups".to_string(),
                confidence: Confidence::Low,
            }
        );
    }

    #[test]
    fn test_empty_unit_falls_back_to_item() {
        let result = standardize_ingredient_quantity(3.0, "", "dragonfruit");
        assert_eq!(result.unit, FALLBACK_UNIT);
        assert_eq!(result.quantity, 3);

        let result = standardize_ingredient_quantity(3.0, "  ", "flour");
        assert_eq!(result.unit, FALLBACK_UNIT);
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_milk_gram_figure_reported_as_ml() {
        // 2 cups = 473.176 ml, x 1.03 = 487.37 "ml"
        let result = standardize_ingredient_quantity(2.0, "cups", "milk");
        assert_eq!(
            result,
            StandardizedQuantity {
                quantity: 488,
                unit: "ml".to_string(),
                confidence: Confidence::High,
            }
        );
    }

    #[test]
    fn test_milk_density_corrected() {
        let engine = Standardizer::new(DensityTable::builtin(), VolumeStandard::DensityCorrected);
        let result = engine.standardize(2.0, "cups", "milk");
        assert_eq!(result.quantity, 474);
        assert_eq!(result.unit, "ml");
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_density_corrected_keeps_exact_milliliters() {
        let engine = Standardizer::new(DensityTable::builtin(), VolumeStandard::DensityCorrected);
        let ml_ingredients: Vec<String> = engine
            .table()
            .entries()
            .into_iter()
            .filter(|(_, record, _)| record.standard_unit == StandardUnit::Milliliters)
            .map(|(name, _, _)| name.to_string())
            .collect();
        assert!(!ml_ingredients.is_empty());

        for name in &ml_ingredients {
            for n in 1..=2000u64 {
                let result = engine.standardize(n as f64, "ml", name);
                assert_eq!(result.quantity, n, "{} ml {}", n, name);
                assert_eq!(result.confidence, Confidence::High);
            }
        }
        assert_eq!(engine.standardize(249.0, "ml", "milk").quantity, 249);
        assert_eq!(engine.standardize(1.0, "l", "milk").quantity, 1000);
    }

    #[test]
    fn test_density_corrected_mass_input() {
        let engine = Standardizer::new(DensityTable::builtin(), VolumeStandard::DensityCorrected);
        let result = engine.standardize(0.5, "kg", "water");
        assert_eq!(result.unit, "ml");
        assert_eq!(result.quantity, 500);

        // 200 g milk / 1.03 g/ml = 194.17 ml
        assert_eq!(engine.standardize(200.0, "g", "milk").quantity, 195);
    }

    #[test]
    fn test_counted_input_unit_never_reaches_density_path() {
        let result = standardize_ingredient_quantity(1.0, "whole", "onion");
        assert_eq!(
            result,
            StandardizedQuantity {
                quantity: 1,
                unit: "whole".to_string(),
                confidence: Confidence::Low,
            }
        );
    }

    #[test]
    fn test_mass_to_counted_unit() {
        let result = standardize_ingredient_quantity(227.0, "g", "chicken breast");
        assert_eq!(
            result,
            StandardizedQuantity {
                quantity: 1,
                unit: "whole".to_string(),
                confidence: Confidence::High,
            }
        );

        // 1 lb = 453.592 g = 1.998 breasts
        let result = standardize_ingredient_quantity(1.0, "lb", "Chicken Breast");
        assert_eq!(result.quantity, 2);
    }

    #[test]
    fn test_volume_to_grams() {
        // 1 cup flour = 236.588 * 0.53 = 125.39 g
        let result = standardize_ingredient_quantity(1.0, "cup", "flour");
        assert_eq!(result.quantity, 126);
        assert_eq!(result.unit, "g");
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_mass_unit_for_gram_ingredient() {
        let result = standardize_ingredient_quantity(0.5, "kg", "sugar");
        assert_eq!(result.quantity, 500);
        assert_eq!(result.unit, "g");
    }

    #[test]
    fn test_counted_cloves_from_volume() {
        // 1 tbsp garlic = 14.7868 * 0.6 = 8.87 g / 5 g per clove = 1.77
        let result = standardize_ingredient_quantity(1.0, "tbsp", "garlic");
        assert_eq!(result.quantity, 2);
        assert_eq!(result.unit, "clove");
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        assert_eq!(standardize_ingredient_quantity(-5.0, "g", "sugar").quantity, 0);
        assert_eq!(standardize_ingredient_quantity(-2.5, "pinch", "sugar").quantity, 0);
        assert_eq!(standardize_ingredient_quantity(f64::NAN, "pinch", "nothing").quantity, 0);
        assert_eq!(standardize_ingredient_quantity(0.0, "g", "sugar").quantity, 0);
    }

    #[test]
    fn test_non_finite_intermediate_degrades() {
        let result = standardize_ingredient_quantity(f64::INFINITY, "g", "sugar");
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.unit, "g");
    }

    #[test]
    fn test_batch_preserves_order() {
        let engine = Standardizer::default();
        let batch = vec![
            RawIngredient {
                quantity: 227.0,
                unit: "g".to_string(),
                ingredient_name: "chicken breast".to_string(),
            },
            RawIngredient {
                quantity: 1.0,
                unit: "pinch".to_string(),
                ingredient_name: "salt".to_string(),
            },
        ];
        let results = engine.standardize_batch(&batch);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].unit, "whole");
        assert_eq!(results[0].confidence, Confidence::High);
        assert_eq!(results[1].unit, "pinch");
        assert_eq!(results[1].confidence, Confidence::Low);
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        let result = standardize_ingredient_quantity(1.0, "whole", "onion");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_volume_standard_from_str() {
        assert_eq!(
            VolumeStandard::from_str("density-corrected"),
            Some(VolumeStandard::DensityCorrected)
        );
        assert_eq!(
            VolumeStandard::from_str("grams-as-ml"),
            Some(VolumeStandard::GramsAsMilliliters)
        );
        assert_eq!(VolumeStandard::from_str("lol"), None);
    }
}
