//! Validator configuration.
//!
//! Defaults match the upstream tools; every field can be overridden from the environment so a
//! host can point at a vendored binary without code changes.

use std::env;

/// `VET_CUE_CMD`: binary used for `cue vet`.
pub const CUE_CMD_ENV: &str = "VET_CUE_CMD";
/// `VET_CUE_SUBCOMMAND`: subcommand used for `cue vet`.
pub const CUE_SUBCOMMAND_ENV: &str = "VET_CUE_SUBCOMMAND";
/// `VET_VELA_CMD`: binary used for `vela def vet`.
pub const VELA_CMD_ENV: &str = "VET_VELA_CMD";
/// `VET_VELA_SUBCOMMAND`: subcommand used for `vela def vet`.
pub const VELA_SUBCOMMAND_ENV: &str = "VET_VELA_SUBCOMMAND";

/// How to invoke one validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Binary (or shell fragment) placed first on the command line.
    pub binary: String,
    /// Subcommand placed between the binary and the file path. May be empty.
    pub subcommand: String,
    /// File extension (without the dot) of documents this validator accepts.
    pub extension: String,
}

impl ValidatorConfig {
    /// Create a config.
    pub fn new(
        binary: impl Into<String>,
        subcommand: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            subcommand: subcommand.into(),
            extension: extension.into(),
        }
    }

    /// `cue vet <file>`.
    pub fn cue_vet() -> Self {
        Self::new("cue", "vet", "cue")
    }

    /// `vela def vet <file>`.
    pub fn vela_def_vet() -> Self {
        Self::new("vela", "def vet", "cue")
    }

    /// [`Self::cue_vet`] with `VET_CUE_*` overrides applied.
    pub fn cue_vet_from_env() -> Self {
        Self::cue_vet().with_env_overrides(CUE_CMD_ENV, CUE_SUBCOMMAND_ENV)
    }

    /// [`Self::vela_def_vet`] with `VET_VELA_*` overrides applied.
    pub fn vela_def_vet_from_env() -> Self {
        Self::vela_def_vet().with_env_overrides(VELA_CMD_ENV, VELA_SUBCOMMAND_ENV)
    }

    fn with_env_overrides(mut self, binary_var: &str, subcommand_var: &str) -> Self {
        if let Some(binary) = non_empty_env(binary_var) {
            self.binary = binary;
        }
        if let Some(subcommand) = non_empty_env(subcommand_var) {
            self.subcommand = subcommand;
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Staged-mode settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingConfig {
    /// Prefix of the staging directory name.
    pub temp_prefix: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_prefix: "vet-cue-".to_string(),
        }
    }
}
