//! Default file locations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Resolve the database path, falling back to the platform data directory.
pub fn database(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(data_dir()?.join("roster.db")),
    }
}

/// Resolve the session file path, falling back to the platform data directory.
pub fn sessions(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(data_dir()?.join("sessions.json")),
    }
}

fn data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "roster").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
