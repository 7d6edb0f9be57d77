//! Machine-readable run report.
use crate::aggregate::{SumOutcome, SumStatus};
use crate::metadata::MetadataRow;
use crate::subdirs::IndividualDir;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub studies_dir: PathBuf,
    pub data_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub dry_run: bool,
    pub individuals: Vec<MetadataRow>,
    pub individual_dirs: Vec<IndividualDir>,
    pub matrices_collected: usize,
    pub sums: Vec<SumOutcome>,
}

impl RunReport {
    pub fn failed_sums(&self) -> usize {
        self.sums
            .iter()
            .filter(|outcome| outcome.status == SumStatus::Failed)
            .count()
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize run report")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
