use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn run(args: &[PathBuf]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xpmload"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run xpmload")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout).lines().map(str::to_string).collect()
}

#[test]
fn prints_black_pixel() {
    let output = run(&[fixture("black1x1.xpm")]);
    assert_eq!(output.status.code(), Some(0));
    let lines = stdout_lines(&output);
    let aa = lines.iter().filter(|l| l.starts_with("AA=")).collect::<Vec<_>>();
    assert_eq!(aa, vec!["AA=1 1 1 1=AA"]);
    assert_eq!(lines, vec![
        "AA=1 1 1 1=AA",
        "BB=~1 1 1 1=~",
        "BB=~.\tc #000000=~",
        "BB=~.=~",
    ]);
}

#[test]
fn row_count_follows_the_image() {
    let output = run(&[fixture("arrow.xpm")]);
    assert_eq!(output.status.code(), Some(0));
    let lines = stdout_lines(&output);
    // values line, 3 colors, 4 pixel rows
    assert_eq!(lines.iter().filter(|l| l.starts_with("BB=~")).count(), 1 + 3 + 4);
    assert_eq!(lines[0], "AA=5 4 3 1 2 1=AA");
    assert_eq!(lines[1 + 1 + 2], "BB=~#\tc Navy Blue=~");
    assert_eq!(lines.last().map(String::as_str), Some("BB=~ooooo=~"));
}

#[test]
fn missing_file_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[dir.path().join("nope.xpm")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.trim().is_empty());
    assert!(stderr.contains("XpmOpenFailed"));
}

#[test]
fn malformed_file_exits_with_one() {
    let output = run(&[fixture("truncated.xpm")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout_lines(&output).iter().any(|l| l.starts_with("AA=") || l.starts_with("BB=")));
    assert!(String::from_utf8_lossy(&output.stderr).contains("XpmFileInvalid"));
}

#[test]
fn missing_argument_fails() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn output_is_repeatable() {
    let first = run(&[fixture("arrow.xpm")]);
    let second = run(&[fixture("arrow.xpm")]);
    assert_eq!(first.stdout, second.stdout);
    assert!(!first.stdout.is_empty());
}

#[test]
fn prints_rebuilt_rows_and_extensions() {
    let output = run(&[fixture("extension.xpm")]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_lines(&output), vec![
        "AA=2 1 1 1 XPMEXT=AA",
        "BB=~2 1 1 1 XPMEXT=~",
        "BB=~.\tc red=~",
        "BB=~..=~",
        "BB=~XPMEXT author=~",
        "BB=~somebody=~",
        "BB=~XPMENDEXT=~",
    ]);
}
