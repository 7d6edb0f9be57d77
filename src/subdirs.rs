//! Per-individual output directories under the studies root.
use crate::metadata::MetadataRow;
use crate::paths::StudyPaths;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Outcome of ensuring one per-individual directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndividualDir {
    pub path: PathBuf,
    pub created: bool,
}

/// Ensure `<studies_dir>/<individual_id>` exists for every row.
pub fn make_individual_dirs(paths: &StudyPaths, rows: &[MetadataRow]) -> Result<Vec<IndividualDir>> {
    let mut dirs = Vec::with_capacity(rows.len());
    for row in rows {
        let path = paths.individual_dir(&row.individual_id);
        let created = if path.is_dir() {
            println!("{} already exists", path.display());
            false
        } else {
            println!("Creation of {} directory", path.display());
            fs::create_dir_all(&path).with_context(|| format!("create {}", path.display()))?;
            true
        };
        dirs.push(IndividualDir { path, created });
    }
    Ok(dirs)
}
