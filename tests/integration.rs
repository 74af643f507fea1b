use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_tooldat")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

/// Copy a fixture into a scratch directory, keeping its name.
fn scratch_copy(name: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::copy(fixture_path(name), &path).unwrap();
    (dir, path)
}

// -- detect --

#[test]
fn detect_prints_kind_per_file() {
    cmd()
        .args(["detect", &fixtures_dir()])
        .assert()
        .success()
        .stdout(predicate::str::contains("holder_database.dat\tHolders"))
        .stdout(predicate::str::contains("segmented_tool_database.dat\tSegmentedTools"))
        .stdout(predicate::str::contains("tool_database.dat\tTools"));
}

#[test]
fn detect_by_content() {
    let mut file = tempfile::Builder::new().suffix(".dat").tempfile().unwrap();
    writeln!(file, "# library export").unwrap();
    writeln!(file, "FORMAT LIBRF DEFTYPE X Y").unwrap();
    cmd()
        .args(["detect", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("\tTrackpoints\n"));
}

#[test]
fn detect_glob_without_matches_warns() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.dat", dir.path().display());
    cmd()
        .args(["detect", &pattern])
        .assert()
        .success()
        .stderr(predicate::str::contains("no files matched"));
}

// -- check --

#[test]
fn check_fixtures_round_trip() {
    cmd()
        .args(["check", &fixtures_dir()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok\t").count(5));
}

#[test]
fn check_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tool_database.dat");
    fs::write(&path, "#CLASS A\nDATA | 1\n").unwrap();
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("DATA found before FORMAT"))
        .stderr(predicate::str::contains("1 of 1 files failed"));
}

// -- dump --

#[test]
fn dump_text() {
    cmd()
        .args(["dump", &fixture_path("tool_database.dat")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kind: Tools\n"))
        .stdout(predicate::str::contains("END_MILL (3)"))
        .stdout(predicate::str::contains("DRILL (2)"));
}

#[test]
fn dump_json() {
    let assert = cmd()
        .args(["dump", "-f", "json", &fixture_path("holder_database.dat")])
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["kind"], "Holders");
    assert_eq!(value["classes"][0]["name"], "HOLDER_INDEX");
    assert_eq!(value["classes"][1]["name"], "HOLDER_SHAPE");
    assert_eq!(value["classes"][1]["rows"].as_array().unwrap().len(), 5);
}

#[test]
fn dump_with_forced_kind_and_grouping() {
    cmd()
        .args([
            "dump",
            "--kind",
            "shanks",
            "--grouping",
            "discriminator",
            &fixture_path("shank_database.dat"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SHANK_INDEX (2) [synthetic]"))
        .stdout(predicate::str::contains("SHANK_SHAPE (3) [synthetic]"));
}

#[test]
fn dump_unknown_format_fails() {
    cmd()
        .args(["dump", "-f", "xml", &fixture_path("tool_database.dat")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

// -- set --

#[test]
fn set_rewrites_one_line_in_place() {
    let (_dir, path) = scratch_copy("tool_database.dat");
    let before = fs::read_to_string(&path).unwrap();

    cmd()
        .args([
            "set",
            path.to_str().unwrap(),
            "--class",
            "end_mill",
            "--row",
            "1",
            "--field",
            "DIA",
            "--value",
            "12.5",
        ])
        .assert()
        .success();

    let after = fs::read_to_string(&path).unwrap();
    let changed: Vec<(&str, &str)> = before
        .lines()
        .zip(after.lines())
        .filter(|(a, b)| a != b)
        .collect();
    assert_eq!(changed.len(), 1);
    assert!(changed[0].1.contains("| Mill D10 | 12.5 | 75.0 |"));
}

#[test]
fn set_with_output_leaves_input_alone() {
    let (dir, path) = scratch_copy("trackpoint_database.dat");
    let out = dir.path().join("trackpoint_edited.dat");
    cmd()
        .args([
            "set",
            path.to_str().unwrap(),
            "--class",
            "DRILL",
            "--row",
            "1",
            "--field",
            "Y",
            "--value=-2.0",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        fs::read_to_string(fixture_path("trackpoint_database.dat")).unwrap()
    );
    let edited = fs::read_to_string(&out).unwrap();
    assert!(edited.contains("DATA | TP_DRILL_01 | 1 | TIP | 0.0 | -2.0 | 1\n"));
}

#[test]
fn set_rejects_unknown_class_field_and_row() {
    let (_dir, path) = scratch_copy("tool_database.dat");
    let base = ["set", path.to_str().unwrap()];

    cmd()
        .args(base)
        .args(["--class", "REAMER", "--row", "1", "--field", "DIA", "--value", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no class named REAMER"));

    cmd()
        .args(base)
        .args(["--class", "DRILL", "--row", "1", "--field", "FLEN", "--value", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no field FLEN"));

    cmd()
        .args(base)
        .args(["--class", "DRILL", "--row", "9", "--field", "DIA", "--value", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn set_same_value_does_not_rewrite() {
    let (_dir, path) = scratch_copy("tool_database.dat");
    cmd()
        .args([
            "set",
            path.to_str().unwrap(),
            "--class",
            "DRILL",
            "--row",
            "1",
            "--field",
            "DIA",
            "--value",
            "5.0",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("not rewritten"));
}

// -- shapes --

#[test]
fn shapes_of_a_holder_in_seq_order() {
    let assert = cmd()
        .args(["shapes", &fixture_path("holder_database.dat"), "hld0_00002"])
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].trim_start().starts_with("LIBRF"));
    assert!(lines[1].contains("63.0"));
    assert!(lines[2].contains("32.0"));
}

#[test]
fn shapes_of_a_segmented_tool() {
    cmd()
        .args(["shapes", &fixture_path("segmented_tool_database.dat"), "FORM_T2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FORM_T2").count(1));
}

#[test]
fn shapes_on_tool_file_fails() {
    cmd()
        .args(["shapes", &fixture_path("tool_database.dat"), "ugt0201_001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no shape rows"));
}
