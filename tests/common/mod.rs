//! Shared test infrastructure for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Fake summation tool: writes every `--matrices` argument, one per line,
/// to the `--outFileName` target.
const FAKE_SUM_SCRIPT: &str = r#"#!/bin/sh
out=""
mats=""
mode=""
while [ $# -gt 0 ]; do
  case "$1" in
    --matrices) mode="m" ;;
    --outFileName) mode="o" ;;
    *)
      if [ "$mode" = "o" ]; then out="$1"; else mats="$mats$1
"; fi
      ;;
  esac
  shift
done
printf '%s' "$mats" > "$out"
"#;

/// Temporary studies directory with a fake sum tool alongside it.
pub struct StudyFixture {
    _temp: TempDir,
    pub root: PathBuf,
    pub script: PathBuf,
}

impl StudyFixture {
    pub fn create() -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("hic_studies");
        fs::create_dir_all(&root).expect("create studies dir");
        let script = temp.path().join("fake_sum.sh");
        fs::write(&script, FAKE_SUM_SCRIPT).expect("write fake sum script");
        Self {
            _temp: temp,
            root,
            script,
        }
    }

    pub fn trio(&self, name: &str) -> &Self {
        fs::create_dir_all(self.root.join(name)).expect("create trio dir");
        self
    }

    /// Create matrix files under `<root>/<id>.<protocol>/hic_results/matrix/h5df/`.
    pub fn matrices(&self, id: &str, protocol: &str, names: &[&str]) -> PathBuf {
        let dir = self
            .root
            .join(format!("{id}.{protocol}"))
            .join("hic_results/matrix/h5df");
        fs::create_dir_all(&dir).expect("create results dir");
        for name in names {
            fs::write(dir.join(name), b"h5").expect("write matrix");
        }
        dir
    }

    pub fn sum_command(&self) -> String {
        format!("sh {}", self.script.display())
    }

    /// Run hicsum on the fixture root with the fake sum tool.
    pub fn run(&self, extra: &[&str]) -> Output {
        self.run_with_command(&self.sum_command(), extra)
    }

    pub fn run_with_command(&self, sum_command: &str, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_hicsum"))
            .arg(&self.root)
            .arg("--sum-command")
            .arg(sum_command)
            .args(extra)
            .env_remove("HICSUM_SUM_COMMAND")
            .output()
            .expect("run hicsum")
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read output file")
    }

    pub fn child_dirs(&self) -> Vec<String> {
        list_dirs(&self.root)
    }
}

pub fn list_dirs(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .expect("list dir")
        .map(|entry| entry.expect("dir entry"))
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "hicsum failed: status={:?}\nstdout:\n{}\nstderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}
