use std::io::Write;
use std::process::Command;

use tempfile::TempDir;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cardstack"))
        .args(args)
        .env_remove("CARDSTACK_STATE_DIR")
        .env_remove("CARDSTACK_LOG")
        .output()
        .expect("failed to run cardstack")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone())
        .expect("non-utf8 output")
        .trim_end()
        .to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn run_lines(lines: &[&str]) -> String {
    let mut args = Vec::new();
    for line in lines {
        args.push("-e");
        args.push(*line);
    }
    let output = run(&args);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    stdout(&output)
}

#[test]
fn exec_prints_each_response() {
    assert_eq!(
        run_lines(&["go next", r#"get field "Title""#, "beep"]),
        "→ went to next card\nNotes\n🔔 (beep)"
    );
}

#[test]
fn exec_reports_failures_as_text() {
    assert_eq!(
        run_lines(&["go card 99", "put the result into field \"Body\""]),
        "Can't go to card 99\nCan't go to card 99"
    );
}

#[test]
fn exec_fallback() {
    assert_eq!(run_lines(&["hello there"]), "sent line: hello there");
}

#[test]
fn script_file_skips_blanks_and_comments() {
    let mut tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
    writeln!(tmp, "-- tour the stack").unwrap();
    writeln!(tmp, "go last").unwrap();
    writeln!(tmp).unwrap();
    writeln!(tmp, "answer the name of this card").unwrap();
    tmp.flush().unwrap();

    let output = run(&[tmp.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "→ went to last card\nanswer \"Index\" (simulated)"
    );
}

#[test]
fn missing_script_is_an_error() {
    let output = run(&["/nonexistent/path/lines.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot read"));
}

#[test]
fn custom_stack_definition() {
    let dir = TempDir::new().unwrap();
    let mut stack = cardstack::stack::Stack::builtin();
    stack.cards.truncate(1);
    stack.cards[0].name = "Only".into();
    let path = dir.path().join("stack.json");
    std::fs::write(&path, stack.to_json().unwrap()).unwrap();

    let output = run(&[
        "--stack",
        path.to_str().unwrap(),
        "-e",
        "go next",
        "-e",
        "the number of cards",
        "-e",
        "answer the number of cards",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "→ went to next card\nsent line: the number of cards\nanswer \"1\" (simulated)"
    );
}

#[test]
fn invalid_stack_definition_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.json");
    std::fs::write(&path, "{\"name\": \"broken\"}").unwrap();
    let output = run(&["--stack", path.to_str().unwrap(), "-e", "beep"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid stack definition"));
}

#[test]
fn state_dir_persists_between_runs() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().to_str().unwrap();

    let first = run(&["--state-dir", state, "-e", "go card 3"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));

    let second = run(&["--state-dir", state, "-e", "answer the name of this card"]);
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert_eq!(stdout(&second), "answer \"Index\" (simulated)");

    let fresh = run(&["--no-save", "--state-dir", state, "-e", "answer the name of this card"]);
    assert_eq!(stdout(&fresh), "answer \"Home\" (simulated)");
}
