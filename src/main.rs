//! Grocer
//!
//! An MCP server for recipe quantity standardization.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use grocer::config::Config;
use grocer::db;
use grocer::mcp::GrocerService;
use grocer::tools::ActiveEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr so it does not interfere with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("grocer=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    grocer::build_info::print_startup_banner();

    let config = Config::from_env();
    tracing::info!("Database path: {}", config.database_path.display());
    tracing::info!("Volume standard: {}", config.volume_standard.as_str());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        tracing::info!("Database schema version: {}", version);
        Ok(())
    })?;

    let engine = ActiveEngine::load(&database, config.volume_standard)?;
    tracing::info!(
        "Loaded {} ingredient densities",
        engine.current().table().len()
    );

    let service = GrocerService::new(config.database_path, database, engine);

    tracing::info!("Starting MCP server on stdio...");
    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
