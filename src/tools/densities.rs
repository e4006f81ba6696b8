//! Ingredient density MCP tools
//!
//! Lookups read the active snapshot; writes go through `ActiveEngine::write`,
//! which stores the change and swaps in a refreshed snapshot.

use serde::Serialize;

use super::engine::ActiveEngine;
use crate::db::Database;
use crate::models::{StoredDensity, StoredDensityCreate};
use crate::quantity::density::normalize_name;
use crate::quantity::{DensityRecord, DensitySource, DensityTable, StandardUnit};

/// One active density entry
#[derive(Debug, Serialize)]
pub struct DensityDetail {
    pub name: String,
    pub density: f64,
    pub standard_unit: StandardUnit,
    pub standard_size: f64,
    pub source: DensitySource,
}

impl DensityDetail {
    fn new(name: &str, record: DensityRecord, source: DensitySource) -> Self {
        Self {
            name: name.to_string(),
            density: record.density,
            standard_unit: record.standard_unit,
            standard_size: record.standard_size,
            source,
        }
    }
}

/// Response for list_ingredient_densities
#[derive(Debug, Serialize)]
pub struct ListDensitiesResponse {
    pub items: Vec<DensityDetail>,
    pub total: usize,
}

/// Response for add_ingredient_density
#[derive(Debug, Serialize)]
pub struct AddDensityResponse {
    pub id: i64,
    pub name: String,
    pub overrides_builtin: bool,
    pub active_entries: usize,
    pub updated_at: String,
}

/// Response for delete_ingredient_density blocked
#[derive(Debug, Serialize)]
pub struct DeleteDensityBlockedResponse {
    pub error: String,
    pub name: String,
}

/// Response for successful delete_ingredient_density
#[derive(Debug, Serialize)]
pub struct DeleteDensitySuccessResponse {
    pub success: bool,
    pub deleted: String,
    /// Built-in record now in effect again, if any
    pub builtin_restored: bool,
    pub active_entries: usize,
}

/// Look up the active record for an ingredient
pub fn lookup_density(engine: &ActiveEngine, name: &str) -> Option<DensityDetail> {
    let current = engine.current();
    current
        .table()
        .get_with_source(name)
        .map(|(record, source)| DensityDetail::new(&normalize_name(name), record, source))
}

/// List active records, optionally restricted to one source
pub fn list_densities(
    engine: &ActiveEngine,
    source: Option<&str>,
) -> Result<ListDensitiesResponse, String> {
    let filter = match source.map(|s| s.trim().to_lowercase()) {
        None => None,
        Some(s) if s == "builtin" => Some(DensitySource::Builtin),
        Some(s) if s == "stored" => Some(DensitySource::Stored),
        Some(s) => return Err(format!("Unknown source '{}': expected 'builtin' or 'stored'", s)),
    };

    let current = engine.current();
    let items: Vec<DensityDetail> = current
        .table()
        .entries()
        .into_iter()
        .filter(|(_, _, src)| filter.map_or(true, |f| f == *src))
        .map(|(name, record, src)| DensityDetail::new(name, record, src))
        .collect();
    let total = items.len();

    Ok(ListDensitiesResponse { items, total })
}

/// Add or replace a stored density and refresh the active table
pub fn add_density(
    db: &Database,
    engine: &ActiveEngine,
    data: StoredDensityCreate,
) -> Result<AddDensityResponse, String> {
    let (stored, active_entries) = engine
        .write(db, |conn| StoredDensity::upsert(conn, &data))
        .map_err(|e| format!("Failed to store density: {}", e))?;

    Ok(AddDensityResponse {
        id: stored.id,
        overrides_builtin: DensityTable::builtin().get(&stored.name).is_some(),
        name: stored.name,
        active_entries,
        updated_at: stored.updated_at,
    })
}

/// Delete a stored density (built-in entries cannot be deleted)
pub fn delete_density(
    db: &Database,
    engine: &ActiveEngine,
    name: &str,
) -> Result<Result<DeleteDensitySuccessResponse, DeleteDensityBlockedResponse>, String> {
    let name = normalize_name(name);
    let (deleted, active_entries) = engine
        .write(db, |conn| StoredDensity::delete_by_name(conn, &name))
        .map_err(|e| format!("Failed to delete density: {}", e))?;

    let is_builtin = DensityTable::builtin().get(&name).is_some();
    if !deleted {
        if is_builtin {
            return Ok(Err(DeleteDensityBlockedResponse {
                error: "Cannot delete a built-in density; add a stored record to override it"
                    .to_string(),
                name,
            }));
        }
        return Err(format!("No stored density named '{}'", name));
    }

    Ok(Ok(DeleteDensitySuccessResponse {
        success: true,
        deleted: name,
        builtin_restored: is_builtin,
        active_entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::quantity::VolumeStandard;

    fn setup() -> (Database, ActiveEngine) {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        let engine = ActiveEngine::load(&db, VolumeStandard::default()).unwrap();
        (db, engine)
    }

    fn shallot() -> StoredDensityCreate {
        StoredDensityCreate {
            name: "Shallot".to_string(),
            density: 0.6,
            standard_unit: "whole".to_string(),
            standard_size: Some(25.0),
            notes: None,
        }
    }

    #[test]
    fn test_add_then_lookup_and_standardize() {
        let (db, engine) = setup();
        let resp = add_density(&db, &engine, shallot()).unwrap();
        assert_eq!(resp.name, "shallot");
        assert!(!resp.overrides_builtin);

        let detail = lookup_density(&engine, "SHALLOT").unwrap();
        assert_eq!(detail.source, DensitySource::Stored);
        assert_eq!(detail.standard_size, 25.0);

        let result = engine.current().standardize(50.0, "g", "shallot");
        assert_eq!(result.quantity, 2);
        assert_eq!(result.unit, "whole");
    }

    #[test]
    fn test_list_filters_by_source() {
        let (db, engine) = setup();
        add_density(&db, &engine, shallot()).unwrap();

        let stored = list_densities(&engine, Some("stored")).unwrap();
        assert_eq!(stored.total, 1);
        assert_eq!(stored.items[0].name, "shallot");

        let all = list_densities(&engine, None).unwrap();
        assert_eq!(all.total, DensityTable::builtin().len() + 1);

        assert!(list_densities(&engine, Some("imported")).is_err());
    }

    #[test]
    fn test_concurrent_adds_all_become_active() {
        let dir = std::env::temp_dir().join(format!("grocer-adds-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let db = Database::new(dir.join("grocer.db")).unwrap();
        db.with_conn(run_migrations).unwrap();
        let engine = ActiveEngine::load(&db, VolumeStandard::default()).unwrap();

        let names: Vec<String> = (0..8).map(|i| format!("test spice {}", i)).collect();
        std::thread::scope(|s| {
            for name in &names {
                let (db, engine) = (&db, &engine);
                s.spawn(move || {
                    for round in 0..5 {
                        let data = StoredDensityCreate {
                            name: name.clone(),
                            density: 0.5 + round as f64 * 0.1,
                            standard_unit: "g".to_string(),
                            standard_size: None,
                            notes: None,
                        };
                        add_density(db, engine, data).unwrap();
                    }
                });
            }
        });

        for name in &names {
            let detail = lookup_density(&engine, name).unwrap();
            assert_eq!(detail.source, DensitySource::Stored);
            assert!((detail.density - 0.9).abs() < 1e-9, "{}", name);
        }
        let stored = list_densities(&engine, Some("stored")).unwrap();
        assert_eq!(stored.total, names.len());

        drop(db);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rejected_add_leaves_table_unchanged() {
        let (db, engine) = setup();
        let mut bad = shallot();
        bad.density = -1.0;
        assert!(add_density(&db, &engine, bad).is_err());
        assert!(lookup_density(&engine, "shallot").is_none());
        assert_eq!(
            list_densities(&engine, None).unwrap().total,
            DensityTable::builtin().len()
        );
    }

    #[test]
    fn test_delete_builtin_is_blocked() {
        let (db, engine) = setup();
        let resp = delete_density(&db, &engine, "milk").unwrap();
        assert!(resp.is_err());
        assert!(delete_density(&db, &engine, "unobtainium").is_err());
    }

    #[test]
    fn test_delete_override_restores_builtin() {
        let (db, engine) = setup();
        let mut onion = shallot();
        onion.name = "onion".to_string();
        let added = add_density(&db, &engine, onion).unwrap();
        assert!(added.overrides_builtin);
        assert_eq!(lookup_density(&engine, "onion").unwrap().standard_size, 25.0);

        let resp = delete_density(&db, &engine, "onion").unwrap().unwrap();
        assert!(resp.builtin_restored);
        let detail = lookup_density(&engine, "onion").unwrap();
        assert_eq!(detail.source, DensitySource::Builtin);
        assert_eq!(detail.standard_size, 150.0);
    }
}
