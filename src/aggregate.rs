//! Summation of collected matrices through an external tool.
//!
//! The tool (`hicSumMatrices` unless configured otherwise) is invoked once
//! per non-empty (resolution, protocol) pair. Failures are recorded and the
//! remaining sums still run.
use crate::config::SUM_COMMAND_ENV;
use crate::matrices::MatrixIndex;
use crate::paths::StudyPaths;
use crate::util::{display_command_line, first_line, truncate_bytes};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

const MAX_STDERR_BYTES: usize = 4096;

/// One planned invocation of the summation tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SumJob {
    pub resolution: u32,
    pub protocol: String,
    pub matrices: Vec<PathBuf>,
    pub out_file: PathBuf,
}

impl SumJob {
    /// Tool arguments appended after the configured command tokens.
    pub fn tool_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.matrices.len() + 3);
        args.push("--matrices".to_string());
        args.extend(self.matrices.iter().map(|path| path.display().to_string()));
        args.push("--outFileName".to_string());
        args.push(self.out_file.display().to_string());
        args
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SumStatus {
    Ok,
    Failed,
    DryRun,
}

/// Result of running (or skipping) one [`SumJob`].
#[derive(Debug, Clone, Serialize)]
pub struct SumOutcome {
    #[serde(flatten)]
    pub job: SumJob,
    pub command_line: String,
    pub status: SumStatus,
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    pub elapsed_ms: u64,
}

/// Turn the index into jobs; pairs with no matrices produce none.
pub fn plan_sums(index: &MatrixIndex, paths: &StudyPaths) -> Vec<SumJob> {
    index
        .resolutions
        .iter()
        .flat_map(|entry| {
            entry
                .protocols
                .iter()
                .filter(|(_, matrices)| !matrices.is_empty())
                .map(move |(protocol, matrices)| SumJob {
                    resolution: entry.resolution,
                    protocol: protocol.clone(),
                    matrices: matrices.clone(),
                    out_file: paths.summed_matrix_path(protocol, entry.resolution),
                })
        })
        .collect()
}

/// Split a configured command into program and leading arguments.
pub fn parse_sum_command(command: &str) -> Result<Vec<String>> {
    let tokens = shell_words::split(command)
        .with_context(|| format!("parse sum command: {command}"))?;
    if tokens.is_empty() {
        return Err(anyhow!("sum command is empty"));
    }
    Ok(tokens)
}

/// Run every job in order, returning one outcome per job.
pub fn run_sums(jobs: &[SumJob], command: &str, dry_run: bool) -> Result<Vec<SumOutcome>> {
    if jobs.is_empty() {
        tracing::info!("no matrices collected; nothing to sum");
        return Ok(Vec::new());
    }
    let tokens = parse_sum_command(command)?;
    let (program, base_args) = tokens
        .split_first()
        .ok_or_else(|| anyhow!("sum command is empty"))?;
    if !dry_run {
        which::which(program).with_context(|| {
            format!(
                "sum tool {program:?} not found on PATH (set --sum-command or {SUM_COMMAND_ENV})"
            )
        })?;
    }

    let mut outcomes = Vec::with_capacity(jobs.len());
    for job in jobs {
        let mut argv = tokens.clone();
        argv.extend(job.tool_args());
        let command_line = display_command_line(&argv);
        if dry_run {
            println!("{command_line}");
            outcomes.push(SumOutcome {
                job: job.clone(),
                command_line,
                status: SumStatus::DryRun,
                exit_code: None,
                stderr: String::new(),
                elapsed_ms: 0,
            });
            continue;
        }

        println!(
            "Summing {} {} matrices at {} into {}",
            job.matrices.len(),
            job.protocol,
            job.resolution,
            job.out_file.display()
        );
        let start = Instant::now();
        let result = Command::new(program)
            .args(base_args)
            .args(job.tool_args())
            .output();
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let message = format!("spawn sum command {program}: {err}");
                tracing::warn!(
                    out_file = %job.out_file.display(),
                    error = %err,
                    "sum command could not start"
                );
                outcomes.push(SumOutcome {
                    job: job.clone(),
                    command_line,
                    status: SumStatus::Failed,
                    exit_code: None,
                    stderr: message,
                    elapsed_ms,
                });
                continue;
            }
        };

        tracing::info!(
            elapsed_ms,
            resolution = job.resolution,
            protocol = %job.protocol,
            matrices = job.matrices.len(),
            "sum command complete"
        );

        let stderr = truncate_bytes(&output.stderr, MAX_STDERR_BYTES);
        let status = if output.status.success() {
            SumStatus::Ok
        } else {
            tracing::warn!(
                status = %output.status,
                out_file = %job.out_file.display(),
                stderr = first_line(&stderr),
                "sum command failed"
            );
            SumStatus::Failed
        };
        outcomes.push(SumOutcome {
            job: job.clone(),
            command_line,
            status,
            exit_code: output.status.code(),
            stderr,
            elapsed_ms,
        });
    }
    Ok(outcomes)
}
