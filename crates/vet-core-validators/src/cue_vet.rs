//! `cue vet` provider.
//!
//! Definitions are templates that reference a `context` injected at runtime, so `cue vet`
//! cannot check the raw file. The provider stages the current text plus [`MOCK_CONTEXT`] in a
//! private temp directory and validates that copy. The mock context leaves fields
//! unconstrained, which makes `cue vet` report incomplete instances; that advisory is
//! suppressed.
//!
//! Reports look like:
//!
//! ```text
//! template.parameter.foo: reference "boo" not found:
//!     ./dummy.cue:32:8
//! ```

use crate::anchor::resolve_by_coordinates;
use crate::config::{StagingConfig, ValidatorConfig};
use crate::error::{LifecycleError, ValidationError};
use crate::patterns::{PatternList, PatternRule};
use crate::provider::{ValidatorKind, ValidatorProvider};
use crate::runner::CommandRunner;
use regex::Regex;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, PoisonError};
use tempfile::TempDir;
use vet_core::{Document, TextRange};

/// Shape of the runtime-injected `context`, appended to every staged document.
pub const MOCK_CONTEXT: &str = "\
context: {
\tappRevision:    string
\tappRevisionNum: int
\tappName:        string
\tname:           string
\tnamespace:      string
\toutput:         _
}
";

static SUPPRESSIONS: LazyLock<PatternList> = LazyLock::new(|| {
    PatternList::new(vec![PatternRule::literal(
        "incomplete-instances",
        "some instances are incomplete",
    )])
});

static LOCATION_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s):\r?\n.*$").expect("valid location block regex"));

/// Strip the `:\n<path>:<line>:<col>` block (and everything after it) from a `cue vet` report.
///
/// Messages without such a block are returned unchanged.
pub fn reduce_cue_problem(problem: &str) -> String {
    match LOCATION_BLOCK.find(problem) {
        Some(block) => problem[..block.start()].trim_end().to_string(),
        None => problem.to_string(),
    }
}

/// Whether `problem` is the expected incomplete-instances advisory.
pub fn is_incomplete_advisory(problem: &str) -> bool {
    SUPPRESSIONS.any_match(problem)
}

/// Staged-mode `cue vet` provider.
#[derive(Debug)]
pub struct CueVetProvider {
    runner: CommandRunner,
    staging: StagingConfig,
    workspace: Mutex<Option<TempDir>>,
}

impl CueVetProvider {
    /// Create a provider. It cannot validate until [`ValidatorProvider::on_start`] ran.
    pub fn new(config: ValidatorConfig, staging: StagingConfig) -> Self {
        Self {
            runner: CommandRunner::new(config),
            staging,
            workspace: Mutex::new(None),
        }
    }

    /// Path of the staging directory while activated.
    pub fn staging_dir(&self) -> Option<PathBuf> {
        self.workspace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|dir| dir.path().to_path_buf())
    }
}

impl Default for CueVetProvider {
    fn default() -> Self {
        Self::new(ValidatorConfig::cue_vet(), StagingConfig::default())
    }
}

impl ValidatorProvider for CueVetProvider {
    fn identify(&self) -> ValidatorKind {
        ValidatorKind::CueVet
    }

    fn extension(&self) -> &str {
        &self.runner.config().extension
    }

    fn run_validation(&self, document: &dyn Document) -> Result<String, ValidationError> {
        let dir = self
            .staging_dir()
            .ok_or(ValidationError::NotActivated {
                provider: ValidatorKind::CueVet.label(),
            })?;
        self.runner
            .run_staged(&dir, &document.text(), MOCK_CONTEXT)
    }

    fn is_suppressed(&self, problem: &str) -> bool {
        is_incomplete_advisory(problem)
    }

    fn reduce_message(&self, problem: &str) -> String {
        reduce_cue_problem(problem)
    }

    fn resolve_range(&self, document: &dyn Document, problem: &str) -> TextRange {
        resolve_by_coordinates(document, problem)
    }

    fn on_start(&self) -> Result<(), LifecycleError> {
        let dir = tempfile::Builder::new()
            .prefix(&self.staging.temp_prefix)
            .tempdir()
            .map_err(LifecycleError::TempDir)?;
        tracing::debug!(path = %dir.path().display(), "created staging directory");

        let previous = self
            .workspace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(dir);
        if let Some(previous) = previous {
            close_staging_dir(previous);
        }
        Ok(())
    }

    fn on_stop(&self) {
        let dir = self
            .workspace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(dir) = dir {
            close_staging_dir(dir);
        }
    }
}

fn close_staging_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => tracing::debug!(path = %path.display(), "removed staging directory"),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove staging directory")
        }
    }
}
