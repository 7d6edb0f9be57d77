//! Trio directory discovery.
//!
//! hicexplorer runs are laid out as `trio.<family>.<individual>.<protocol>`
//! directories; names are parsed up front so malformed entries fail loudly.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// One parsed `trio.<family>.<individual>.<protocol>` directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrioEntry {
    pub name: String,
    pub family: String,
    pub individual: String,
    pub protocol: String,
}

impl TrioEntry {
    /// Parse a directory name, requiring exactly four non-empty fields free of
    /// whitespace and commas.
    pub fn parse(name: &str, prefix: &str) -> Result<Self> {
        let fields: Vec<&str> = name.split('.').collect();
        let [head, family, individual, protocol] = fields.as_slice() else {
            return Err(anyhow!(
                "malformed trio directory {name:?}: expected {prefix}.<family>.<individual>.<protocol>, found {} fields",
                fields.len()
            ));
        };
        if *head != prefix {
            return Err(anyhow!(
                "malformed trio directory {name:?}: expected prefix {prefix:?}"
            ));
        }
        for field in [family, individual, protocol] {
            if field.is_empty() {
                return Err(anyhow!("malformed trio directory {name:?}: empty field"));
            }
            // metadata.tsv separates rows by newline, columns by tab, protocols by comma.
            if let Some(bad) = field.chars().find(|c| *c == ',' || c.is_whitespace()) {
                return Err(anyhow!(
                    "malformed trio directory {name:?}: field {field:?} contains {bad:?}"
                ));
            }
        }
        Ok(Self {
            name: name.to_string(),
            family: family.to_string(),
            individual: individual.to_string(),
            protocol: protocol.to_string(),
        })
    }

    /// `<family>.<individual>`, the key used in metadata.tsv and output dirs.
    pub fn individual_id(&self) -> String {
        format!("{}.{}", self.family, self.individual)
    }
}

/// List `<prefix>.*` directories under `data_dir`, sorted by name.
pub fn discover_trios(data_dir: &Path, prefix: &str) -> Result<Vec<TrioEntry>> {
    let marker = format!("{prefix}.");
    let mut names = Vec::new();
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("read data directory {}", data_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", data_dir.display()))?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) if raw.to_string_lossy().starts_with(&marker) => {
                return Err(anyhow!("trio directory name is not valid UTF-8: {raw:?}"));
            }
            Err(_) => continue,
        };
        if !name.starts_with(&marker) {
            continue;
        }
        // Follows symlinks; staged runs are often linked in.
        if !entry.path().is_dir() {
            tracing::debug!(name = %name, "skipping non-directory trio entry");
            continue;
        }
        names.push(name);
    }
    names.sort();
    tracing::info!(trios = names.len(), dir = %data_dir.display(), "discovered trio directories");
    names
        .iter()
        .map(|name| TrioEntry::parse(name, prefix))
        .collect()
}
