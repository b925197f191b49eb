//! `vela def vet` provider.
//!
//! Runs against the saved file. Reports carry no coordinates, only a wrapper naming the file:
//!
//! ```text
//! Error: failed to parse CUE: /defs/dummy.cue: invalid definition spec: json: unknown field "podDisruptive"
//! ```
//!
//! The range is found by searching the document for a keyword taken from the message.

use crate::anchor::{VELA_KEYWORDS, resolve_by_keyword};
use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::provider::{ValidatorKind, ValidatorProvider};
use crate::runner::CommandRunner;
use regex::Regex;
use std::sync::LazyLock;
use vet_core::{Document, TextRange};

static PARSE_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Error: failed to parse \w+:\s.+\.\w+:\s").expect("valid parse wrapper regex")
});

/// Strip the `Error: failed to parse <language>: <path>: ` wrapper.
///
/// Messages without the wrapper are returned unchanged.
pub fn reduce_vela_problem(problem: &str) -> String {
    match PARSE_WRAPPER.find(problem) {
        Some(wrapper) => {
            let mut reduced = String::with_capacity(problem.len() - wrapper.len());
            reduced.push_str(&problem[..wrapper.start()]);
            reduced.push_str(&problem[wrapper.end()..]);
            reduced.trim_end().to_string()
        }
        None => problem.to_string(),
    }
}

/// Direct-mode `vela def vet` provider.
#[derive(Debug, Clone)]
pub struct VelaVetProvider {
    runner: CommandRunner,
}

impl VelaVetProvider {
    /// Create a provider.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            runner: CommandRunner::new(config),
        }
    }
}

impl Default for VelaVetProvider {
    fn default() -> Self {
        Self::new(ValidatorConfig::vela_def_vet())
    }
}

impl ValidatorProvider for VelaVetProvider {
    fn identify(&self) -> ValidatorKind {
        ValidatorKind::VelaDefVet
    }

    fn extension(&self) -> &str {
        &self.runner.config().extension
    }

    fn run_validation(&self, document: &dyn Document) -> Result<String, ValidationError> {
        self.runner.run(document.path())
    }

    fn reduce_message(&self, problem: &str) -> String {
        reduce_vela_problem(problem)
    }

    fn resolve_range(&self, document: &dyn Document, problem: &str) -> TextRange {
        resolve_by_keyword(document, problem, &VELA_KEYWORDS)
    }
}
