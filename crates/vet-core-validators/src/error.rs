//! Validator and lifecycle errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Why a validator run did not succeed.
///
/// Every variant ends up as diagnostic text; [`ValidationError::problem`] is the string the
/// extraction pipeline works on.
pub enum ValidationError {
    #[error("{0}")]
    /// The validator wrote its report to stderr.
    Reported(String),

    #[error("failed to launch `{command}`: {source}")]
    /// The process could not be started.
    Launch {
        /// The shell command line.
        command: String,
        /// The spawn error.
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stage {}: {source}", .path.display())]
    /// Writing the staged copy of the document failed.
    Staging {
        /// Path of the staged file.
        path: PathBuf,
        /// The write error.
        #[source]
        source: std::io::Error,
    },

    #[error("{provider} is not activated")]
    /// A staged-mode run was requested before `on_start` (or after `on_stop`).
    NotActivated {
        /// Provider label.
        provider: &'static str,
    },

    #[error("`{command}` exited with {} and no output", describe_exit(.code))]
    /// The process failed without writing anything.
    Exited {
        /// The shell command line.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    #[error("validator panicked: {0}")]
    /// The provider panicked while running; the payload message is kept.
    Panicked(String),

    #[error("I/O error while reading validator output: {0}")]
    /// Reading the child's pipes or waiting for it failed.
    Output(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl ValidationError {
    /// The raw problem text fed to suppression, reduction and range resolution.
    pub fn problem(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Error)]
/// Provider setup/teardown failures.
pub enum LifecycleError {
    #[error("failed to create staging directory: {0}")]
    /// The staging directory could not be created.
    TempDir(#[source] std::io::Error),
}
