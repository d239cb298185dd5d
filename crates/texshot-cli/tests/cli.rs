use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use std::fs;

#[test]
fn check_accepts_valid_source_from_stdin() {
    let mut command = cargo_bin_cmd!("texshot");
    command
        .arg("check")
        .write_stdin(r"\begin{aligned}x &= 1\end{aligned}");
    command.assert().success().stdout(contains("OK"));
}

#[test]
fn check_reports_first_defect_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("formula.tex");
    fs::write(&source, r"\end{foo}").unwrap();

    let mut command = cargo_bin_cmd!("texshot");
    command.arg("check").arg(&source);
    command
        .assert()
        .failure()
        .stdout(contains(r"TeX error: \\end{foo} without matching \\begin{foo}"))
        .stdout(contains(r#""EndWithoutBegin": "foo""#))
        .stdout(contains(r#""offset": 0"#));
}

#[test]
fn render_rejects_invalid_source_and_writes_error_log() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tex.jpg");
    let error_log = dir.path().join("err.txt");
    fs::write(&output, "stale").unwrap();

    let mut command = cargo_bin_cmd!("texshot");
    command
        .current_dir(dir.path())
        .arg("render")
        .arg("--output")
        .arg(&output)
        .arg("--error-log")
        .arg(&error_log)
        .write_stdin("x}");
    command.assert().failure();

    let log = fs::read_to_string(&error_log).unwrap();
    assert!(log.contains("TeX error: Unexpected close brace"));
    assert!(!output.exists());
}

#[test]
fn render_rejects_out_of_range_quality() {
    let mut command = cargo_bin_cmd!("texshot");
    command.args(["render", "--quality", "0"]).write_stdin("x");
    command.assert().failure().stderr(contains("quality"));
}

#[test]
fn init_config_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("texshot.json");

    let mut command = cargo_bin_cmd!("texshot");
    command.arg("init-config").arg(&path);
    command.assert().success();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#""output_image": "tex.jpg""#));
    assert!(written.contains(r#""jpeg_quality": 100"#));
}
