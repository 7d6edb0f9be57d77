//! Typed paths into a studies layout.
//!
//! Inputs (trio dirs, hicexplorer results) and outputs (metadata, summed
//! matrices) may live under different roots, so both are carried here.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.tsv";
pub const CONFIG_FILE: &str = "hicsum.json";

/// Convenience wrapper for locating study inputs and outputs.
#[derive(Debug, Clone)]
pub struct StudyPaths {
    studies_dir: PathBuf,
    data_dir: PathBuf,
    matrix_subdir: PathBuf,
}

impl StudyPaths {
    pub fn new(studies_dir: PathBuf, data_dir: PathBuf, matrix_subdir: impl Into<PathBuf>) -> Self {
        Self {
            studies_dir,
            data_dir,
            matrix_subdir: matrix_subdir.into(),
        }
    }

    /// Output root.
    pub fn studies_dir(&self) -> &Path {
        &self.studies_dir
    }

    /// Input root holding `trio.*` and results directories.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Return the `metadata.tsv` path.
    pub fn metadata_path(&self) -> PathBuf {
        self.studies_dir.join(METADATA_FILE)
    }

    /// Return the per-individual output directory.
    pub fn individual_dir(&self, individual_id: &str) -> PathBuf {
        self.studies_dir.join(individual_id)
    }

    /// Return the hicexplorer h5 matrix directory for one individual and protocol.
    pub fn results_dir(&self, individual_id: &str, protocol: &str) -> PathBuf {
        self.data_dir
            .join(format!("{individual_id}.{protocol}"))
            .join(&self.matrix_subdir)
    }

    /// Return the summed matrix output for a protocol at a resolution.
    pub fn summed_matrix_path(&self, protocol: &str, resolution: u32) -> PathBuf {
        self.studies_dir.join(format!("{protocol}_{resolution}.h5"))
    }
}

/// Create the studies root when missing and return whether it was created.
pub fn ensure_studies_root(path: &Path) -> Result<bool> {
    println!("Verifying studies directory exists:");
    if path.is_dir() {
        println!("{} found.", path.display());
        return Ok(false);
    }
    println!("studies directory not found, creating {}", path.display());
    fs::create_dir_all(path)
        .with_context(|| format!("create studies directory {}", path.display()))?;
    Ok(true)
}

/// Default studies directory next to the running executable.
pub fn default_studies_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locate current executable")?;
    let base = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join(crate::cli::DEFAULT_STUDIES_DIR))
}
