use std::fs;

use assert_cmd::Command;

fn elemap() -> Command {
    Command::cargo_bin("elemap").unwrap()
}

#[test]
fn counts_a_trajectory() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("table.svg");

    let assert = elemap()
        .arg("./src/tests-data/xyz/structures.extxyz")
        .arg(&output)
        .args(["--frame", "-1", "--print-data", "--cmap", "viridis"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.starts_with("Frames counted: 1/1\nTotal frames in input: 1\nElement counts:\n  O: 3\n  Fe: 1\n"));
    assert!(stdout.contains(&format!("Saved: {}\n", output.display())));
    assert!(output.exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("table_counts.csv")).unwrap(),
        "Element,element_count\nO,3\nFe,1\n"
    );
}

#[test]
fn counts_csv_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("table.html");

    let assert = elemap()
        .arg("./src/tests-data/csv/positional.csv")
        .arg(&output)
        .args(["--fraction", "--log-fraction", "--exclude-elements", "Cu"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("Frames counted: N/A (CSV input)\n"));
    assert!(stdout.contains("Visualization mode: log(Element fraction)"));
    assert!(stdout.contains("Excluded elements (white + black border): Cu\n"));
    assert!(stdout.contains("Element counts:\n  O: 5\n  Fe: 3\n"));
    assert!(fs::read_to_string(&output).unwrap().contains("elemap-data"));
    assert!(dir.path().join("table_fraction_log.csv").exists());
}

#[test]
fn reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("table.svg");

    let assert = elemap()
        .arg("./src/tests-data/missing.xyz")
        .arg(&output)
        .assert()
        .failure()
        .code(1);
    assert_eq!(
        String::from_utf8(assert.get_output().stderr.clone()).unwrap(),
        "Error: Input file not found: ./src/tests-data/missing.xyz\n"
    );

    let assert = elemap()
        .arg("./src/tests-data/csv/counts.csv")
        .arg(&output)
        .args(["--frame", "2"])
        .assert()
        .failure()
        .code(1);
    assert_eq!(
        String::from_utf8(assert.get_output().stderr.clone()).unwrap(),
        "Error: --frame can only be used with structure file input.\n"
    );

    let assert = elemap()
        .arg("./src/tests-data/xyz/bad_extended.xyz")
        .arg(&output)
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.starts_with("Error: XYZ format: line 3: expected 7 columns, found 6"));
    assert!(!output.exists());
}
