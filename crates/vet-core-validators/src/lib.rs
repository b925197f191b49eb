#![warn(missing_docs)]
//! `vet-core-validators` - `cue vet` / `vela def vet` diagnostics for `vet-core`.
//!
//! Both validators report problems as unstructured text. This crate runs them, decides whether
//! a report should be surfaced, shortens it to a core message, and anchors it to a range in the
//! document:
//!
//! | | `cue vet` | `vela def vet` |
//! |---|---|---|
//! | input | staged copy + mock `context` | saved file |
//! | suppression | "some instances are incomplete" | none |
//! | message | strip `:\n<path>:<line>:<col>` | strip `Error: failed to parse CUE: <path>: ` |
//! | range | trailing `line:col` to end of line | first occurrence of a keyword |
//!
//! Extraction misses never fail: the range degrades to the whole document.
//!
//! # Example
//!
//! ```rust
//! use vet_core::{Position, TextDocument};
//! use vet_core_validators::{CueVetProvider, ValidatorProvider};
//!
//! let provider = CueVetProvider::default();
//! let doc = TextDocument::new("/defs/dummy.cue", &"x: 1\n".repeat(40));
//! let problem = "template.parameter.foo: reference \"boo\" not found:\n./dummy.cue:32:8";
//!
//! assert_eq!(
//!     provider.reduce_message(problem),
//!     "template.parameter.foo: reference \"boo\" not found"
//! );
//! assert_eq!(provider.resolve_range(&doc, problem).start, Position::new(31, 7));
//! ```

pub mod anchor;
pub mod config;
pub mod cue_vet;
pub mod error;
pub mod orchestrator;
pub mod patterns;
pub mod provider;
pub mod runner;
pub mod vela_vet;

pub use anchor::{
    VELA_KEYWORDS, coordinate_suffix, keyword_range, line_tail_range, resolve_by_coordinates,
    resolve_by_keyword,
};
pub use config::{StagingConfig, ValidatorConfig};
pub use cue_vet::{CueVetProvider, MOCK_CONTEXT, is_incomplete_advisory, reduce_cue_problem};
pub use error::{LifecycleError, ValidationError};
pub use orchestrator::{DiagnosticsOrchestrator, DocumentEvent, ValidationOutcome};
pub use patterns::{PatternList, PatternMatch, PatternRule};
pub use provider::{ValidatorKind, ValidatorProvider};
pub use runner::{CommandRunner, shell_quote, stage_document};
pub use vela_vet::{VelaVetProvider, reduce_vela_problem};
