//! Matrix path collection.
//!
//! hicexplorer writes one `<...><resolution>.matrix.h5` file per bin size
//! into each individual's results directory. Collection groups them by
//! resolution then protocol, appending across individuals so each sum
//! covers every matching matrix.
use crate::metadata::MetadataRow;
use crate::paths::StudyPaths;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Matrices collected for one resolution, keyed by protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionMatrices {
    pub resolution: u32,
    pub protocols: BTreeMap<String, Vec<PathBuf>>,
}

/// Every configured resolution, in configured order.
///
/// A protocol key exists under a resolution only when at least one matrix
/// was found for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixIndex {
    pub resolutions: Vec<ResolutionMatrices>,
}

impl MatrixIndex {
    fn new(resolutions: &[u32]) -> Self {
        Self {
            resolutions: resolutions
                .iter()
                .map(|&resolution| ResolutionMatrices {
                    resolution,
                    protocols: BTreeMap::new(),
                })
                .collect(),
        }
    }

    pub fn matrix_count(&self) -> usize {
        self.resolutions
            .iter()
            .flat_map(|entry| entry.protocols.values())
            .map(Vec::len)
            .sum()
    }
}

struct ResolutionMatcher {
    resolution: u32,
    pattern: Regex,
}

impl ResolutionMatcher {
    fn new(resolution: u32) -> Result<Self> {
        // A leading digit would make 150000 look like 50000.
        let pattern = Regex::new(&format!(r"(?:^|[^0-9]){resolution}\.matrix\.h5$"))
            .map_err(|err| anyhow!("build matcher for resolution {resolution}: {err}"))?;
        Ok(Self {
            resolution,
            pattern,
        })
    }

    fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

/// Collect matrix paths for every (individual, protocol) row.
pub fn collect_matrices(
    paths: &StudyPaths,
    rows: &[MetadataRow],
    resolutions: &[u32],
) -> Result<MatrixIndex> {
    let matchers = resolutions
        .iter()
        .map(|&resolution| ResolutionMatcher::new(resolution))
        .collect::<Result<Vec<_>>>()?;
    let mut index = MatrixIndex::new(resolutions);

    for row in rows {
        for protocol in &row.protocols {
            let dir = paths.results_dir(&row.individual_id, protocol);
            let Some(files) = list_results_dir(&dir)? else {
                tracing::debug!(dir = %dir.display(), "results directory missing; skipping");
                continue;
            };
            for (matcher, slot) in matchers.iter().zip(index.resolutions.iter_mut()) {
                let found: Vec<PathBuf> = files
                    .iter()
                    .filter(|name| matcher.matches(name))
                    .map(|name| dir.join(name))
                    .collect();
                if found.is_empty() {
                    continue;
                }
                tracing::debug!(
                    resolution = matcher.resolution,
                    protocol = %protocol,
                    individual = %row.individual_id,
                    matrices = found.len(),
                    "collected matrices"
                );
                slot.protocols
                    .entry(protocol.clone())
                    .or_default()
                    .extend(found);
            }
        }
    }

    tracing::info!(matrices = index.matrix_count(), "matrix collection complete");
    Ok(index)
}

/// Sorted file names in a results dir, or `None` when it does not exist.
fn list_results_dir(dir: &Path) -> Result<Option<Vec<String>>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("read {}", dir.display())),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                tracing::warn!(dir = %dir.display(), name = ?raw, "skipping non-UTF-8 file name");
            }
        }
    }
    names.sort();
    Ok(Some(names))
}

#[cfg(test)]
#[path = "matrices_tests.rs"]
mod tests;
