//! Stored ingredient density model
//!
//! User-supplied density records persisted in SQLite. Loaded at startup and
//! layered over the built-in density table.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::quantity::density::normalize_name;
use crate::quantity::{DensityError, DensityRecord, DensityTable, StandardUnit};

/// A stored density record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDensity {
    pub id: i64,
    pub name: String,
    pub density: f64,
    pub standard_unit: StandardUnit,
    pub standard_size: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding or replacing a stored density
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDensityCreate {
    pub name: String,
    /// Grams per milliliter
    pub density: f64,
    pub standard_unit: String,
    /// Grams per standard unit; defaults to 1
    #[serde(default)]
    pub standard_size: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StoredDensityCreate {
    /// Normalized name plus validated record
    pub fn validate(&self) -> Result<(String, DensityRecord), DensityError> {
        let name = normalize_name(&self.name);
        if name.is_empty() {
            return Err(DensityError::EmptyName);
        }
        let unit = StandardUnit::from_str(&self.standard_unit)?;
        let record = DensityRecord::new(&name, self.density, unit, self.standard_size)?;
        Ok((name, record))
    }
}

impl StoredDensity {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit: String = row.get("standard_unit")?;
        let standard_unit = StandardUnit::from_str(&unit).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            density: row.get("density")?,
            standard_unit,
            standard_size: row.get("standard_size")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The engine-facing record
    pub fn record(&self) -> DensityRecord {
        DensityRecord {
            density: self.density,
            standard_unit: self.standard_unit,
            standard_size: self.standard_size,
        }
    }

    /// Insert a record, replacing any stored record with the same name
    pub fn upsert(conn: &Connection, data: &StoredDensityCreate) -> DbResult<Self> {
        let (name, record) = data.validate()?;

        conn.execute(
            r#"
            INSERT INTO ingredient_densities (name, density, standard_unit, standard_size, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name) DO UPDATE SET
                density = excluded.density,
                standard_unit = excluded.standard_unit,
                standard_size = excluded.standard_size,
                notes = excluded.notes,
                updated_at = datetime('now')
            "#,
            params![
                name,
                record.density,
                record.standard_unit.as_str(),
                record.standard_size,
                data.notes,
            ],
        )?;

        Self::get_by_name(conn, &name)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a stored record by name (case-insensitive)
    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_densities WHERE name = ?1")?;

        let result = stmt.query_row([normalize_name(name)], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All stored records, alphabetical
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_densities ORDER BY name ASC")?;

        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Count stored records
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM ingredient_densities", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a stored record by name.
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete_by_name(conn: &Connection, name: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM ingredient_densities WHERE name = ?1",
            [normalize_name(name)],
        )?;
        Ok(rows > 0)
    }
}

/// Build a fresh density table from the built-in data plus every stored record
pub fn load_density_table(conn: &Connection) -> DbResult<DensityTable> {
    let stored = StoredDensity::list(conn)?;
    Ok(DensityTable::with_overrides(
        stored.iter().map(|s| (s.name.as_str(), s.record())),
    ))
}
