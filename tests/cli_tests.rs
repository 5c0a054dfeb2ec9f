use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn categorize() -> Command {
    Command::new(env!("CARGO_BIN_EXE_categorize"))
}

#[test]
fn default_output_name_in_working_directory() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    fs::create_dir_all(input.join("sub")).unwrap();
    fs::write(input.join("a.txt"), "a").unwrap();
    fs::write(input.join("sub/b.TXT"), "b").unwrap();
    fs::write(input.join("noext"), "n").unwrap();

    categorize()
        .current_dir(td.path())
        .args(["-c", "suffix", "-p", "copy", "in"])
        .assert()
        .success();

    let out = td.path().join("in_categorized_by_suffix");
    assert!(out.join("txt/a.txt").is_file());
    assert!(out.join("txt/b.TXT").is_file());
    assert!(out.join("unknown/noext").is_file());
}

#[test]
fn output_inside_input_exits_with_one() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.txt"), "a").unwrap();

    categorize()
        .args(["-c", "suffix", "-p", "move", "-o"])
        .arg(input.join("out"))
        .arg(&input)
        .assert()
        .code(1);

    assert!(!input.join("out").exists());
    assert!(input.join("a.txt").is_file());
}

#[test]
fn missing_input_exits_with_one() {
    let td = tempdir().unwrap();
    categorize()
        .current_dir(td.path())
        .args(["-c", "mime_name", "-p", "copy", "does_not_exist"])
        .assert()
        .code(1);
    assert!(!td.path().join("does_not_exist_categorized_by_mime_name").exists());
}

#[test]
fn existing_output_exits_with_one() {
    let td = tempdir().unwrap();
    fs::create_dir(td.path().join("in")).unwrap();
    fs::create_dir(td.path().join("in_categorized_by_suffix")).unwrap();

    categorize()
        .current_dir(td.path())
        .args(["-c", "suffix", "-p", "copy", "in"])
        .assert()
        .code(1);
}

#[test]
fn bad_filter_file_exits_with_one() {
    let td = tempdir().unwrap();
    fs::create_dir(td.path().join("in")).unwrap();
    fs::write(td.path().join("filters.toml"), "[filters.exclude]\nregex = [\"(\"]\n").unwrap();

    categorize()
        .current_dir(td.path())
        .args(["-c", "suffix", "-p", "copy", "--config", "filters.toml", "in"])
        .assert()
        .code(1);
    assert!(!td.path().join("in_categorized_by_suffix").exists());
}

#[test]
fn dry_run_prints_plan_and_writes_nothing() {
    let td = tempdir().unwrap();
    let input = td.path().join("in");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.txt"), "a").unwrap();

    let output = categorize()
        .current_dir(td.path())
        .args(["-c", "suffix", "-p", "move", "--dry-run", "in"])
        .output()
        .expect("spawn binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("would move"), "stdout was: {stdout}");
    assert!(stdout.contains("a.txt"));
    assert!(input.join("a.txt").is_file());
    assert!(!td.path().join("in_categorized_by_suffix").exists());
}

#[test]
fn unknown_choice_is_a_usage_error() {
    categorize()
        .args(["-c", "size", "-p", "copy", "."])
        .assert()
        .failure();
}
