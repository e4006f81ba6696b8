//! Ingredient density data
//!
//! Densities are grams per milliliter. Each record also names the unit an
//! ingredient is bought in on a shopping list, and for counted units how many
//! grams one of them weighs.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use super::error::DensityError;

/// Unit an ingredient is standardized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardUnit {
    /// Sold by weight
    #[serde(rename = "g")]
    Grams,
    /// Sold by volume
    #[serde(rename = "ml")]
    Milliliters,
    /// Counted whole items (onions, eggs)
    Whole,
    /// Counted cloves (garlic)
    Clove,
}

impl StandardUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardUnit::Grams => "g",
            StandardUnit::Milliliters => "ml",
            StandardUnit::Whole => "whole",
            StandardUnit::Clove => "clove",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Result<Self, DensityError> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(StandardUnit::Grams),
            "ml" | "milliliter" | "milliliters" => Ok(StandardUnit::Milliliters),
            "whole" => Ok(StandardUnit::Whole),
            "clove" | "cloves" => Ok(StandardUnit::Clove),
            _ => Err(DensityError::UnknownStandardUnit(s.to_string())),
        }
    }

    /// Whether quantities are counted rather than measured
    pub fn is_counted(&self) -> bool {
        matches!(self, StandardUnit::Whole | StandardUnit::Clove)
    }
}

impl fmt::Display for StandardUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Density and shopping unit for one ingredient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRecord {
    /// Grams per milliliter
    pub density: f64,
    pub standard_unit: StandardUnit,
    /// Grams per one standard unit (1 for g and ml)
    pub standard_size: f64,
}

impl DensityRecord {
    /// Build a validated record. `standard_size` defaults to 1 and is only
    /// meaningful for counted units.
    pub fn new(
        name: &str,
        density: f64,
        standard_unit: StandardUnit,
        standard_size: Option<f64>,
    ) -> Result<Self, DensityError> {
        if !density.is_finite() || density <= 0.0 {
            return Err(DensityError::InvalidDensity {
                name: name.to_string(),
                density,
            });
        }

        let standard_size = standard_size.unwrap_or(1.0);
        if !standard_size.is_finite() || standard_size <= 0.0 {
            return Err(DensityError::InvalidStandardSize {
                name: name.to_string(),
                standard_size,
            });
        }

        Ok(Self {
            density,
            standard_unit,
            standard_size,
        })
    }

    const fn measured(density: f64, standard_unit: StandardUnit) -> Self {
        Self {
            density,
            standard_unit,
            standard_size: 1.0,
        }
    }

    const fn counted(density: f64, standard_unit: StandardUnit, standard_size: f64) -> Self {
        Self {
            density,
            standard_unit,
            standard_size,
        }
    }
}

/// Normalize an ingredient name for lookup
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Built-in reference densities. Sources: USDA FoodData Central and
/// King Arthur Baking ingredient weight chart.
const BUILTIN_DENSITIES: &[(&str, DensityRecord)] = &[
    // Pantry
    ("flour", DensityRecord::measured(0.53, StandardUnit::Grams)),
    ("all-purpose flour", DensityRecord::measured(0.53, StandardUnit::Grams)),
    ("bread flour", DensityRecord::measured(0.54, StandardUnit::Grams)),
    ("sugar", DensityRecord::measured(0.85, StandardUnit::Grams)),
    ("brown sugar", DensityRecord::measured(0.93, StandardUnit::Grams)),
    ("powdered sugar", DensityRecord::measured(0.51, StandardUnit::Grams)),
    ("salt", DensityRecord::measured(1.2, StandardUnit::Grams)),
    ("rice", DensityRecord::measured(0.85, StandardUnit::Grams)),
    ("rolled oats", DensityRecord::measured(0.34, StandardUnit::Grams)),
    ("cocoa powder", DensityRecord::measured(0.36, StandardUnit::Grams)),
    ("honey", DensityRecord::measured(1.42, StandardUnit::Grams)),
    ("butter", DensityRecord::measured(0.911, StandardUnit::Grams)),
    // Liquids
    ("milk", DensityRecord::measured(1.03, StandardUnit::Milliliters)),
    ("water", DensityRecord::measured(1.0, StandardUnit::Milliliters)),
    ("heavy cream", DensityRecord::measured(1.01, StandardUnit::Milliliters)),
    ("olive oil", DensityRecord::measured(0.91, StandardUnit::Milliliters)),
    ("vegetable oil", DensityRecord::measured(0.92, StandardUnit::Milliliters)),
    ("chicken broth", DensityRecord::measured(1.01, StandardUnit::Milliliters)),
    // Produce and proteins
    ("onion", DensityRecord::counted(0.64, StandardUnit::Whole, 150.0)),
    ("garlic", DensityRecord::counted(0.6, StandardUnit::Clove, 5.0)),
    ("egg", DensityRecord::counted(1.03, StandardUnit::Whole, 50.0)),
    ("chicken breast", DensityRecord::counted(1.05, StandardUnit::Whole, 227.0)),
    ("potato", DensityRecord::counted(0.75, StandardUnit::Whole, 213.0)),
    ("tomato", DensityRecord::counted(0.67, StandardUnit::Whole, 123.0)),
    ("lemon", DensityRecord::counted(0.9, StandardUnit::Whole, 58.0)),
    ("carrot", DensityRecord::counted(0.64, StandardUnit::Whole, 61.0)),
];

/// Where an active record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensitySource {
    Builtin,
    Stored,
}

/// Immutable ingredient name -> density record mapping
#[derive(Debug, Clone, Default)]
pub struct DensityTable {
    entries: HashMap<String, (DensityRecord, DensitySource)>,
}

/// The built-in table, constructed on first use
pub static BUILTIN_TABLE: LazyLock<Arc<DensityTable>> = LazyLock::new(|| {
    let entries = BUILTIN_DENSITIES
        .iter()
        .map(|(name, record)| (name.to_string(), (*record, DensitySource::Builtin)))
        .collect();
    Arc::new(DensityTable { entries })
});

impl DensityTable {
    /// Shared handle to the built-in table
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN_TABLE)
    }

    /// Built-in entries overlaid with stored records; stored records win on
    /// name collisions.
    pub fn with_overrides<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, DensityRecord)>,
        S: AsRef<str>,
    {
        let mut entries = BUILTIN_TABLE.entries.clone();
        for (name, record) in records {
            entries.insert(normalize_name(name.as_ref()), (record, DensitySource::Stored));
        }
        Self { entries }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&DensityRecord> {
        self.entries.get(&normalize_name(name)).map(|(record, _)| record)
    }

    /// Lookup that also reports whether the record is built in or stored
    pub fn get_with_source(&self, name: &str) -> Option<(DensityRecord, DensitySource)> {
        self.entries.get(&normalize_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sorted by name
    pub fn entries(&self) -> Vec<(&str, DensityRecord, DensitySource)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(name, (record, source))| (name.as_str(), *record, *source))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}
