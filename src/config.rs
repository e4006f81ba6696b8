//! Runtime configuration
//!
//! Read once from the environment at startup.

use std::path::PathBuf;

use crate::quantity::VolumeStandard;

/// Environment variable naming the SQLite database file
pub const DATABASE_PATH_VAR: &str = "GROCER_DATABASE_PATH";
/// Environment variable selecting how ml ingredients are reported
pub const VOLUME_STANDARD_VAR: &str = "GROCER_VOLUME_STANDARD";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub volume_standard: VolumeStandard,
}

impl Config {
    /// Build from environment variables, falling back to defaults.
    ///
    /// An unrecognized volume standard is logged and replaced by the default.
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let volume_standard = match std::env::var(VOLUME_STANDARD_VAR) {
            Ok(value) => parse_volume_standard(&value),
            Err(_) => VolumeStandard::default(),
        };

        Self {
            database_path,
            volume_standard,
        }
    }
}

fn parse_volume_standard(value: &str) -> VolumeStandard {
    VolumeStandard::from_str(value).unwrap_or_else(|| {
        tracing::warn!(
            "Ignoring {}='{}': expected 'grams-as-ml' or 'density-corrected'",
            VOLUME_STANDARD_VAR,
            value
        );
        VolumeStandard::default()
    })
}

/// `<project root>/data/grocer.db`, where the project root is found by
/// walking up from `target/release` or `target/debug`
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("grocer.db");
    path
}
