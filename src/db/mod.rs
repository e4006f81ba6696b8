//! Database module
//!
//! SQLite store for user-supplied ingredient densities: connection pooling
//! and migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
