//! Grocer Status Tool
//!
//! Provides runtime status information about the Grocer service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::quantity::Standardizer;

/// Standardization instructions for AI assistants
pub const STANDARDIZATION_INSTRUCTIONS: &str = r#"
# Grocer Quantity Standardization Instructions

Grocer turns recipe quantities into shopping-list quantities so the same
ingredient from different recipes can be added together.

## Overview

Every ingredient line needs three values:
1. **quantity** - the number from the recipe (fractions as decimals: 1/2 -> 0.5)
2. **unit** - the unit exactly as written ("cups", "tbsp", "g"), or "" if none
3. **ingredient_name** - the plain ingredient ("onion", not "1 large onion, diced")

Call `standardize_ingredients` once per recipe with all lines. Use
`standardize_ingredient` only for a single line.

## Reading Results

| confidence | Meaning |
|------------|---------|
| high | Converted with density data. Safe to add to other high results with the same unit. |
| low | Passed through unchanged (rounded up). Unknown ingredient or unit. |

Quantities are always rounded **up** to a whole number. Buying slightly more
beats running out.

### Units You Will See

- `g` - sold by weight (flour, sugar, butter)
- `ml` - sold by volume (milk, oil, broth)
- `whole` / `clove` - counted items (onions, eggs, garlic)

## Known Gaps

- Counted inputs ("1 whole onion", "2 cloves garlic") are returned as-is with
  low confidence. They are already in shopping units; do not re-convert them.
- For ml ingredients the default reports the gram figure as milliliters
  (about 3% high for milk). Start the server with
  `GROCER_VOLUME_STANDARD=density-corrected` for exact milliliters.

## Adding Ingredients

If an ingredient keeps coming back low confidence, add it with
`add_ingredient_density`:
- `density` - grams per milliliter (water = 1.0)
- `standard_unit` - g, ml, whole, or clove
- `standard_size` - grams per whole/clove (omit for g/ml)

Stored records take effect immediately and override built-in entries with the
same name. `delete_ingredient_density` removes a stored record; built-in
entries cannot be deleted.

## Direct Conversion

`convert_units` converts between units of one scale (`volume` or `mass`). It
fails on units outside that scale instead of guessing.
"#;

/// Runtime status of the Grocer service
#[derive(Debug, Clone, Serialize)]
pub struct GrocerStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Engine information
    pub density_entries: usize,
    pub volume_standard: &'static str,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: chrono::DateTime<chrono::Utc>,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: chrono::Utc::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, engine: &Standardizer) -> GrocerStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        GrocerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            density_entries: engine.table().len(),
            volume_standard: engine.volume_standard().as_str(),
            started_at: self.started_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_engine() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/grocer.db"));
        let engine = Standardizer::default();
        let status = tracker.get_status(&engine);
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.volume_standard, "grams-as-ml");
        assert!(status.density_entries > 0);
        assert_eq!(status.process_id, std::process::id());
    }
}
