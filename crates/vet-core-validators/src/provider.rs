//! The validator provider contract.

use crate::error::{LifecycleError, ValidationError};
use std::fmt;
use vet_core::{Document, TextRange};

/// Which external validator a provider wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    /// `cue vet`, run against a staged copy with mock context.
    CueVet,
    /// `vela def vet`, run against the saved file.
    VelaDefVet,
}

impl ValidatorKind {
    /// Source label attached to published diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::CueVet => "cue vet",
            Self::VelaDefVet => "vela def vet",
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validator that turns documents into raw problems and problems into anchored messages.
///
/// Providers are shared with worker threads, so every method takes `&self`.
pub trait ValidatorProvider: Send + Sync {
    /// The validator this provider wraps.
    fn identify(&self) -> ValidatorKind;

    /// File extension (without the dot) of documents this provider validates.
    fn extension(&self) -> &str;

    /// Whether `document` should be validated at all.
    fn accepts(&self, document: &dyn Document) -> bool {
        document.has_extension(self.extension())
    }

    /// Run the validator. `Ok` carries stdout, `Err` the reason the document failed.
    fn run_validation(&self, document: &dyn Document) -> Result<String, ValidationError>;

    /// Whether a raw problem is an expected advisory to be treated as success.
    fn is_suppressed(&self, _problem: &str) -> bool {
        false
    }

    /// Strip tool boilerplate from a raw problem.
    fn reduce_message(&self, problem: &str) -> String;

    /// Locate a raw problem in `document`. Never fails; falls back to the whole document.
    fn resolve_range(&self, document: &dyn Document, problem: &str) -> TextRange;

    /// Acquire provider resources.
    fn on_start(&self) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Release provider resources. Safe to call repeatedly or without `on_start`.
    fn on_stop(&self) {}
}
