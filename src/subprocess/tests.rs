use super::*;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_production_runner_success() {
    let runner = TokioProcessRunner;
    let command = ProcessCommand::new("echo", ["hello world"]);

    let output = runner.run(command).await.unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout.trim(), "hello world");
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn test_production_runner_failure() {
    let runner = TokioProcessRunner;
    let command = ProcessCommand::new("false", Vec::<String>::new());

    let output = runner.run(command).await.unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_production_runner_command_not_found() {
    let runner = TokioProcessRunner;
    let command = ProcessCommand::new("nonexistent-command-12345", Vec::<String>::new());

    let result = runner.run(command).await;
    assert!(matches!(
        result.unwrap_err(),
        ProcessError::CommandNotFound(_)
    ));
}

#[tokio::test]
async fn test_production_runner_timeout_kills_process() {
    let runner = TokioProcessRunner;
    let mut command = ProcessCommand::new("sleep", ["5"]);
    command.timeout = Some(Duration::from_millis(100));

    let start = Instant::now();
    let result = runner.run(command).await;
    assert!(start.elapsed() < Duration::from_secs(4));

    let err = result.unwrap_err();
    assert!(err.is_timeout());
    assert!(!err.is_exit_code());
}

#[tokio::test]
async fn test_executor_reports_timeout_separately_from_exit_code() {
    let executor = ShellExecutor::new(Duration::from_millis(100), None);
    let dir = std::env::temp_dir();

    let timed_out = executor
        .exec("sleep", &dir, &["5".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(timed_out, ProcessError::Timeout(_)));

    let failed = executor
        .exec("sh", &dir, &["-c".to_string(), "exit 3".to_string()])
        .await
        .unwrap_err();
    assert_eq!(failed.exit_code(), Some(3));
}

#[tokio::test]
async fn test_mock_runner_basic() {
    let mock = MockProcessRunner::new();

    mock.expect_command("git")
        .with_args(|args| args == ["status"])
        .returns_stdout("On branch main\n")
        .returns_success()
        .finish();

    let output = mock
        .run(ProcessCommand::new("git", ["status"]))
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, "On branch main\n");
    assert!(mock.verify_called("git", 1));
}

#[tokio::test]
async fn test_mock_runner_times_limit() {
    let mock = MockProcessRunner::new();

    mock.expect_command("git")
        .with_args(|args| args == ["add", "."])
        .returns_success()
        .times(2)
        .finish();

    for _ in 0..2 {
        let result = mock
            .run(ProcessCommand::new("git", ["add", "."]))
            .await;
        assert!(result.is_ok());
    }

    // Third call exceeds the expectation
    let result = mock
        .run(ProcessCommand::new("git", ["add", "."]))
        .await;
    assert!(matches!(
        result.unwrap_err(),
        ProcessError::MockExpectationNotMet(_)
    ));
}

#[tokio::test]
async fn test_mock_runner_unmatched_command() {
    let mock = MockProcessRunner::new();
    mock.expect_command("git")
        .with_subcommand("push")
        .returns_success()
        .finish();

    let result = mock
        .run(ProcessCommand::new("git", ["pull"]))
        .await;
    assert!(result.is_err());
    // Unmatched calls are still recorded
    assert_eq!(mock.count_subcommand("pull"), 1);
}

#[tokio::test]
async fn test_mock_runner_first_match_wins() {
    let mock = MockProcessRunner::new();
    mock.expect_command("git")
        .with_subcommand("diff")
        .returns_exit_code(1)
        .finish();
    mock.expect_command("git").returns_success().finish();

    let diff = mock
        .run(ProcessCommand::new("git", ["diff", "--cached"]))
        .await
        .unwrap();
    assert_eq!(diff.status, ExitStatus::Error(1));

    let push = mock
        .run(ProcessCommand::new("git", ["push"]))
        .await
        .unwrap();
    assert!(push.status.success());

    mock.reset();
    assert!(mock.get_call_history().is_empty());
}

#[test]
fn test_process_command_new_defaults() {
    let command = ProcessCommand::new("git", ["diff", "--cached", "--quiet"]);

    assert_eq!(command.program, "git");
    assert_eq!(command.args, vec!["diff", "--cached", "--quiet"]);
    assert!(command.env.is_empty());
    assert_eq!(command.working_dir, None);
    assert_eq!(command.timeout, None);
    assert_eq!(command.output, OutputMode::Capture);
}

/// Live and not a zombie waiting to be reaped.
#[cfg(target_os = "linux")]
fn process_running(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| !rest.trim_start().starts_with('Z')),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_processes_spawned_by_child() {
    let dir = tempfile::TempDir::new().unwrap();
    let executor = ShellExecutor::new(Duration::from_millis(500), None);

    // Stands in for git waiting on the ssh it started
    let err = executor
        .exec(
            "sh",
            dir.path(),
            &[
                "-c".to_string(),
                "sleep 31 & echo $! > sleep.pid; wait".to_string(),
            ],
        )
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    let pid = std::fs::read_to_string(dir.path().join("sleep.pid")).unwrap();
    let pid = pid.trim();
    let deadline = Instant::now() + Duration::from_secs(5);
    while process_running(pid) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!process_running(pid), "sleep {pid} outlived the timeout");
}
