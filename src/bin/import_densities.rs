//! Bulk-load ingredient densities from a JSON file
//!
//! Usage: import_densities <file.json>
//!
//! The file holds an array of `{ name, density, standard_unit, standard_size?, notes? }`.
//! Valid rows are upserted in one transaction; invalid rows are reported and skipped.

use grocer::config::Config;
use grocer::db::{migrations, Database, DbError};
use grocer::models::{StoredDensity, StoredDensityCreate};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("grocer=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let Some(file_path) = std::env::args().nth(1) else {
        eprintln!("Usage: import_densities <file.json>");
        std::process::exit(2);
    };

    let contents = std::fs::read_to_string(&file_path)?;
    let rows: Vec<StoredDensityCreate> = serde_json::from_str(&contents)?;
    println!("Read {} rows from {}", rows.len(), file_path);

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    let (imported, rejected) = database.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        let mut imported = 0usize;
        let mut rejected = Vec::new();

        for row in &rows {
            match StoredDensity::upsert(&tx, row) {
                Ok(_) => imported += 1,
                Err(DbError::Density(e)) => rejected.push(format!("{}: {}", row.name, e)),
                Err(e) => return Err(e),
            }
        }

        tx.commit()?;
        Ok((imported, rejected))
    })?;

    println!("Imported: {}", imported);
    println!("Rejected: {}", rejected.len());
    for reason in &rejected {
        println!("  {}", reason);
    }

    Ok(())
}
