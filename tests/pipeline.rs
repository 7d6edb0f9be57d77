//! End-to-end runs of `hicsum` against temporary studies directories.
//!
//! The summation tool is replaced by a shell script that records the
//! matrices it was given, so these tests need `sh` on PATH.
#![cfg(unix)]

mod common;

use common::{assert_success, list_dirs, StudyFixture};
use std::fs;

fn h5_outputs(fixture: &StudyFixture) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(&fixture.root)
        .expect("list root")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".h5"))
        .collect();
    names.sort();
    names
}

#[test]
fn organizes_trios_and_sums_matrices_per_resolution_and_protocol() {
    let fixture = StudyFixture::create();
    fixture
        .trio("trio.A.001.HiC")
        .trio("trio.A.001.Capture")
        .trio("trio.B.002.HiC");
    let a_hic = fixture.matrices(
        "A.001",
        "HiC",
        &["r1_1000000.matrix.h5", "r2_1000000.matrix.h5", "r1_50000.matrix.h5"],
    );
    let b_hic = fixture.matrices("B.002", "HiC", &["r1_1000000.matrix.h5"]);

    let output = fixture.run(&[]);
    assert_success(&output);

    assert_eq!(
        fixture.read("metadata.tsv"),
        "indiv \t protocols \nA.001\tCapture,HiC\nB.002\tHiC\n"
    );
    assert!(fixture.root.join("A.001").is_dir());
    assert!(fixture.root.join("B.002").is_dir());

    assert_eq!(h5_outputs(&fixture), vec!["HiC_1000000.h5", "HiC_50000.h5"]);

    let a_hic = a_hic.canonicalize().expect("canonical A.001.HiC");
    let b_hic = b_hic.canonicalize().expect("canonical B.002.HiC");
    let summed: Vec<String> = fixture
        .read("HiC_1000000.h5")
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(
        summed,
        vec![
            a_hic.join("r1_1000000.matrix.h5").display().to_string(),
            a_hic.join("r2_1000000.matrix.h5").display().to_string(),
            b_hic.join("r1_1000000.matrix.h5").display().to_string(),
        ]
    );
    assert_eq!(fixture.read("HiC_50000.h5").lines().count(), 1);
}

#[test]
fn second_run_is_idempotent() {
    let fixture = StudyFixture::create();
    fixture.trio("trio.A.001.HiC").trio("trio.B.002.HiC");

    assert_success(&fixture.run(&[]));
    let first = fixture.child_dirs();
    let output = fixture.run(&[]);
    assert_success(&output);

    assert_eq!(fixture.child_dirs(), first);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("already exists"), "stdout: {stdout}");
}

#[test]
fn empty_root_completes_without_sums() {
    let fixture = StudyFixture::create();

    let output = fixture.run_with_command("definitely-not-installed-hic-tool", &[]);
    assert_success(&output);

    assert_eq!(fixture.read("metadata.tsv"), "indiv \t protocols \n");
    assert!(fixture.child_dirs().is_empty());
    assert!(h5_outputs(&fixture).is_empty());
}

#[test]
fn missing_studies_directory_is_created() {
    let fixture = StudyFixture::create();
    fs::remove_dir_all(&fixture.root).expect("remove studies dir");

    assert_success(&fixture.run(&[]));
    assert!(fixture.root.join("metadata.tsv").is_file());
}

#[test]
fn malformed_trio_name_fails_with_its_name() {
    let fixture = StudyFixture::create();
    fixture.trio("trio.A.HiC");

    let output = fixture.run(&[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("trio.A.HiC"), "stderr: {stderr}");
}

#[test]
fn protocol_without_results_produces_no_invocation() {
    let fixture = StudyFixture::create();
    fixture.trio("trio.A.001.HiC").trio("trio.A.001.Capture");
    fixture.matrices("A.001", "HiC", &["200000.matrix.h5"]);

    assert_success(&fixture.run(&[]));

    assert_eq!(h5_outputs(&fixture), vec!["HiC_200000.h5"]);
}

#[test]
fn dry_run_reports_commands_without_running_them() {
    let fixture = StudyFixture::create();
    fixture.trio("trio.A.001.HiC");
    fixture.matrices("A.001", "HiC", &["500000.matrix.h5"]);
    let report_path = fixture.root.join("reports").join("run.json");
    let report_arg = report_path.display().to_string();

    let output = fixture.run_with_command(
        "definitely-not-installed-hic-tool",
        &["--dry-run", "--report", &report_arg],
    );
    assert_success(&output);

    assert!(h5_outputs(&fixture).is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("definitely-not-installed-hic-tool --matrices"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("read report"))
            .expect("parse report");
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["matrices_collected"], 1);
    assert_eq!(report["sums"][0]["status"], "dry_run");
    assert_eq!(report["sums"][0]["protocol"], "HiC");
    assert_eq!(report["sums"][0]["resolution"], 500000);
    assert_eq!(report["individuals"][0]["individual_id"], "A.001");
}

#[test]
fn failing_sum_tool_exits_non_zero_after_writing_report() {
    let fixture = StudyFixture::create();
    fixture.trio("trio.A.001.HiC");
    fixture.matrices("A.001", "HiC", &["1000000.matrix.h5", "50000.matrix.h5"]);
    let report_path = fixture.root.join("run.json");
    let report_arg = report_path.display().to_string();

    let output =
        fixture.run_with_command("sh -c 'exit 2' fake", &["--report", &report_arg]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 of 2 matrix sums failed"), "stderr: {stderr}");

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("read report"))
            .expect("parse report");
    assert_eq!(report["sums"][0]["status"], "failed");
    assert_eq!(report["sums"][0]["exit_code"], 2);
}

#[test]
fn sum_tool_that_cannot_start_still_writes_report() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = StudyFixture::create();
    fixture.trio("trio.A.001.HiC");
    fixture.matrices("A.001", "HiC", &["1000000.matrix.h5", "50000.matrix.h5"]);
    let tool = fixture.root.join("broken_sum");
    fs::write(&tool, "#!/nonexistent/interpreter/python\n").expect("write tool");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod tool");
    let report_path = fixture.root.join("run.json");
    let report_arg = report_path.display().to_string();

    let output = fixture.run_with_command(&tool.display().to_string(), &["--report", &report_arg]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 of 2 matrix sums failed"), "stderr: {stderr}");

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("read report"))
            .expect("parse report");
    assert_eq!(report["sums"].as_array().map(Vec::len), Some(2));
    for sum in report["sums"].as_array().expect("sums array") {
        assert_eq!(sum["status"], "failed");
        assert!(sum["exit_code"].is_null());
        assert!(sum["stderr"].as_str().is_some_and(|text| !text.is_empty()));
    }
}

#[test]
fn separate_data_dir_keeps_outputs_in_studies_dir() {
    let fixture = StudyFixture::create();
    let data = fixture.root.parent().expect("temp root").join("runs");
    fs::create_dir_all(data.join("trio.A.001.HiC")).expect("create trio");
    let results = data.join("A.001.HiC/hic_results/matrix/h5df");
    fs::create_dir_all(&results).expect("create results");
    fs::write(results.join("50000.matrix.h5"), b"h5").expect("write matrix");
    let data_arg = data.display().to_string();

    assert_success(&fixture.run(&["--data-dir", &data_arg]));

    assert_eq!(list_dirs(&fixture.root), vec!["A.001"]);
    assert_eq!(h5_outputs(&fixture), vec!["HiC_50000.h5"]);
    assert!(!data.join("metadata.tsv").exists());
}
