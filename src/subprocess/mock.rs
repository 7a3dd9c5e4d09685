use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};

/// Recording test double for [`ProcessRunner`].
///
/// Every command is appended to the call history, then answered by the first
/// expectation whose program and argument matcher accept it. No process is
/// ever spawned.
#[derive(Clone)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    call_history: Arc<Mutex<Vec<ProcessCommand>>>,
}

type ArgsMatcher = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

struct MockExpectation {
    program: String,
    args_matcher: Option<ArgsMatcher>,
    response: MockResponse,
    times_called: usize,
    expected_times: Option<usize>,
}

enum MockResponse {
    Output(ProcessOutput),
    NotFound,
    Timeout(Duration),
}

pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: MockExpectation,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn expect_command(&self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: MockExpectation {
                program: program.to_string(),
                args_matcher: None,
                response: MockResponse::Output(ProcessOutput {
                    status: ExitStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration: Duration::from_millis(10),
                }),
                times_called: 0,
                expected_times: None,
            },
        }
    }

    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        let history = self.call_history.lock().unwrap();
        let count = history.iter().filter(|cmd| cmd.program == program).count();
        count == times
    }

    /// Number of recorded calls whose first argument is `subcommand`.
    pub fn count_subcommand(&self, subcommand: &str) -> usize {
        self.call_history
            .lock()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.args.first().map(String::as_str) == Some(subcommand))
            .count()
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.expectations.lock().unwrap().clear();
        self.call_history.lock().unwrap().clear();
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.call_history.lock().unwrap().push(command.clone());

        let mut expectations = self.expectations.lock().unwrap();

        for expectation in expectations.iter_mut() {
            if expectation.program != command.program {
                continue;
            }

            if let Some(ref args_matcher) = expectation.args_matcher {
                if !(args_matcher)(&command.args) {
                    continue;
                }
            }

            expectation.times_called += 1;

            if let Some(expected) = expectation.expected_times {
                if expectation.times_called > expected {
                    return Err(ProcessError::MockExpectationNotMet(format!(
                        "Command '{}' called {} times, expected {}",
                        command.display(),
                        expectation.times_called,
                        expected
                    )));
                }
            }

            return match &expectation.response {
                MockResponse::Output(output) => Ok(output.clone()),
                MockResponse::NotFound => Err(ProcessError::CommandNotFound(command.program)),
                MockResponse::Timeout(duration) => Err(ProcessError::Timeout(*duration)),
            };
        }

        Err(ProcessError::MockExpectationNotMet(format!(
            "No expectation found for command: {} {:?}",
            command.program, command.args
        )))
    }
}

impl MockCommandConfig {
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.expectation.args_matcher = Some(Box::new(matcher));
        self
    }

    /// Match calls whose first argument is `subcommand`.
    pub fn with_subcommand(self, subcommand: &str) -> Self {
        let subcommand = subcommand.to_string();
        self.with_args(move |args| args.first() == Some(&subcommand))
    }

    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        if let MockResponse::Output(ref mut output) = self.expectation.response {
            output.stdout = stdout.to_string();
        }
        self
    }

    pub fn returns_stderr(mut self, stderr: &str) -> Self {
        if let MockResponse::Output(ref mut output) = self.expectation.response {
            output.stderr = stderr.to_string();
        }
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        let status = if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        };
        self.set_status(status);
        self
    }

    pub fn returns_success(mut self) -> Self {
        self.set_status(ExitStatus::Success);
        self
    }

    /// Answer as if the program could not be found on PATH.
    pub fn returns_not_found(mut self) -> Self {
        self.expectation.response = MockResponse::NotFound;
        self
    }

    /// Answer as if the invocation exceeded its time budget.
    pub fn returns_timeout(mut self, duration: Duration) -> Self {
        self.expectation.response = MockResponse::Timeout(duration);
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.expectation.expected_times = Some(n);
        self
    }

    pub fn finish(self) {
        self.runner
            .expectations
            .lock()
            .unwrap()
            .push(self.expectation);
    }

    fn set_status(&mut self, status: ExitStatus) {
        match self.expectation.response {
            MockResponse::Output(ref mut output) => output.status = status,
            _ => {
                self.expectation.response = MockResponse::Output(ProcessOutput {
                    status,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration: Duration::from_millis(10),
                })
            }
        }
    }
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}
