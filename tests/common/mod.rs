//! Shared helpers for integration tests: spawn the built binary, feed it
//! a command script on stdin, and compare the observed streams.

use std::io::Write;
use std::process::{Command, Output, Stdio};

pub struct TestPlan {
    pub args: Vec<String>,
    pub stdin_data: String,
    pub expected_out: String,
    pub expected_err: String,
    pub expected_exit_code: i32,
}

pub fn run_editor(args: &[String], stdin_data: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_red"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn red");

    if let Some(mut stdin) = child.stdin.take() {
        // a quit command can end the process before the script is fully
        // delivered; a broken pipe here is not a test failure
        let _ = stdin.write_all(stdin_data);
    }

    child.wait_with_output().expect("failed to wait for red")
}

pub fn run_test(plan: TestPlan) {
    let output = run_editor(&plan.args, plan.stdin_data.as_bytes());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr, plan.expected_err);

    assert_eq!(output.status.code(), Some(plan.expected_exit_code));
}
