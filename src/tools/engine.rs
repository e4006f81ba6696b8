//! Active standardizer shared by the tools
//!
//! Holds the standardizer built from the built-in table plus stored records.
//! Tables are never edited in place: a write builds a new one and swaps it in.

use std::sync::{Arc, Mutex, RwLock};

use rusqlite::Connection;

use crate::db::{Database, DbResult};
use crate::models::load_density_table;
use crate::quantity::{Standardizer, VolumeStandard};

/// Shared handle to the current standardizer snapshot
#[derive(Clone)]
pub struct ActiveEngine {
    current: Arc<RwLock<Arc<Standardizer>>>,
    /// Held across store write, table load and swap
    writer: Arc<Mutex<()>>,
    volume_standard: VolumeStandard,
}

impl ActiveEngine {
    /// Build the initial snapshot from the database
    pub fn load(db: &Database, volume_standard: VolumeStandard) -> Result<Self, String> {
        let table = db
            .with_conn(load_density_table)
            .map_err(|e| format!("Failed to load stored densities: {}", e))?;
        Ok(Self {
            current: Arc::new(RwLock::new(Arc::new(Standardizer::new(
                Arc::new(table),
                volume_standard,
            )))),
            writer: Arc::new(Mutex::new(())),
            volume_standard,
        })
    }

    /// The snapshot in effect right now
    pub fn current(&self) -> Arc<Standardizer> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Run a store write and swap in a table that includes it.
    ///
    /// The write and the reload share one transaction, so when either fails
    /// nothing is committed and the snapshot stays as it was. Writers are
    /// serialized, so the last swap always holds the latest committed rows.
    /// Returns the write's result and the number of active density entries.
    pub fn write<T, F>(&self, db: &Database, f: F) -> DbResult<(T, usize)>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let (out, table) = db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            let table = load_density_table(&tx)?;
            tx.commit()?;
            Ok((out, table))
        })?;

        let entries = table.len();
        let standardizer = Standardizer::new(Arc::new(table), self.volume_standard);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(standardizer);

        tracing::info!("Density table refreshed: {} entries", entries);
        Ok((out, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::DbError;
    use crate::models::{StoredDensity, StoredDensityCreate};
    use crate::quantity::DensityError;

    fn saffron() -> StoredDensityCreate {
        StoredDensityCreate {
            name: "saffron".to_string(),
            density: 0.2,
            standard_unit: "g".to_string(),
            standard_size: None,
            notes: None,
        }
    }

    #[test]
    fn test_write_swaps_snapshot() {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();

        let engine = ActiveEngine::load(&db, VolumeStandard::default()).unwrap();
        let before = engine.current();
        assert!(before.table().get("saffron").is_none());

        let (stored, entries) = engine
            .write(&db, |conn| StoredDensity::upsert(conn, &saffron()))
            .unwrap();
        assert_eq!(stored.name, "saffron");
        assert_eq!(entries, before.table().len() + 1);

        assert!(engine.current().table().get("saffron").is_some());
        // the old snapshot is unchanged
        assert!(before.table().get("saffron").is_none());
    }

    #[test]
    fn test_failed_write_rolls_back_and_keeps_snapshot() {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        let engine = ActiveEngine::load(&db, VolumeStandard::default()).unwrap();
        let before = engine.current();

        let result: DbResult<((), usize)> = engine.write(&db, |conn| {
            StoredDensity::upsert(conn, &saffron())?;
            Err(DbError::Density(DensityError::EmptyName))
        });
        assert!(result.is_err());

        assert!(Arc::ptr_eq(&before, &engine.current()));
        let stored = db
            .with_conn(|conn| StoredDensity::get_by_name(conn, "saffron"))
            .unwrap();
        assert!(stored.is_none());
    }
}
