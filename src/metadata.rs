//! `metadata.tsv` writer and reader.
//!
//! The file is the hand-off between discovery and matrix collection; the
//! collector re-reads it instead of reusing the discovered entries.
use crate::trio::TrioEntry;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const METADATA_HEADER: &str = "indiv \t protocols \n";

/// One individual and the protocols sequenced for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRow {
    pub individual_id: String,
    pub protocols: Vec<String>,
}

impl MetadataRow {
    fn render(&self) -> String {
        format!("{}\t{}", self.individual_id, self.protocols.join(","))
    }
}

/// Group entries per individual, keeping first-appearance order.
pub fn group_individuals(entries: &[TrioEntry]) -> Vec<MetadataRow> {
    let mut rows: Vec<MetadataRow> = Vec::new();
    for entry in entries {
        let id = entry.individual_id();
        tracing::debug!(trio = %entry.name, individual = %id, protocol = %entry.protocol, "grouping trio");
        match rows.iter_mut().find(|row| row.individual_id == id) {
            Some(row) => {
                if !row.protocols.contains(&entry.protocol) {
                    row.protocols.push(entry.protocol.clone());
                }
            }
            None => rows.push(MetadataRow {
                individual_id: id,
                protocols: vec![entry.protocol.clone()],
            }),
        }
    }
    rows
}

/// Write the header and one row per individual.
pub fn write_metadata(path: &Path, rows: &[MetadataRow]) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(METADATA_HEADER.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "no trio directories found; metadata has header only");
    }
    for row in rows {
        let line = row.render();
        println!("Write : {line} on {}", path.display());
        writeln!(out, "{line}").with_context(|| format!("write {}", path.display()))?;
    }
    out.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Read rows back from a file produced by [`write_metadata`].
pub fn read_metadata(path: &Path) -> Result<Vec<MetadataRow>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_metadata(&text).with_context(|| format!("parse {}", path.display()))
}

fn parse_metadata(text: &str) -> Result<Vec<MetadataRow>> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header.trim() == METADATA_HEADER.trim() => {}
        Some((_, other)) => return Err(anyhow!("unexpected metadata header {other:?}")),
        None => return Err(anyhow!("metadata file is empty")),
    }

    let mut rows = Vec::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let (id, protocols) = line
            .split_once('\t')
            .ok_or_else(|| anyhow!("line {line_no}: expected <indiv>\\t<protocols>"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(anyhow!("line {line_no}: empty individual id"));
        }
        let protocols: Vec<String> = protocols
            .split(',')
            .map(str::trim)
            .filter(|protocol| !protocol.is_empty())
            .map(str::to_string)
            .collect();
        if protocols.is_empty() {
            return Err(anyhow!("line {line_no}: no protocols for {id}"));
        }
        rows.push(MetadataRow {
            individual_id: id.to_string(),
            protocols,
        });
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
