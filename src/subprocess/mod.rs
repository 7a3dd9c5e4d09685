//! Subprocess abstraction layer
//!
//! [`ProcessRunner`] is the single seam where external processes are
//! launched. [`TokioProcessRunner`] spawns real processes and
//! [`MockProcessRunner`] records calls and replays programmed results.

pub mod error;
pub mod executor;
pub mod mock;
pub mod runner;

#[cfg(test)]
mod tests;

pub use error::ProcessError;
pub use executor::ShellExecutor;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{
    ExitStatus, OutputMode, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner,
};
