use crate::naming::DEFAULT_PREFIX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Copy,
    Move,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Copy => "copy",
            Mode::Move => "move",
        }
    }

    /// Exact, case-sensitive match on `copy` / `move`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "copy" => Some(Mode::Copy),
            "move" => Some(Mode::Move),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when one file cannot be copied or moved.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and go on with the next file.
    #[default]
    Continue,
    /// Stop the run at the first failure.
    Abort,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ApplyOptions {
    pub mode: Mode,
    pub failure_policy: FailurePolicy,
}

/// Settings for one run. Built from command-line flags only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: Mode,
    pub prefix: String,
    pub recursive: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            mode: Mode::Copy,
            prefix: DEFAULT_PREFIX.to_string(),
            recursive: false,
            failure_policy: FailurePolicy::Continue,
        }
    }
}

impl SequencerOptions {
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            mode: self.mode,
            failure_policy: self.failure_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FailurePolicy, Mode, SequencerOptions};

    #[test]
    fn defaults_copy_with_dsc_prefix() {
        let options = SequencerOptions::default();
        assert_eq!(options.mode, Mode::Copy);
        assert_eq!(options.prefix, "DSC");
        assert!(!options.recursive);
        assert_eq!(options.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn mode_parse_is_exact() {
        assert_eq!(Mode::parse("copy"), Some(Mode::Copy));
        assert_eq!(Mode::parse("move"), Some(Mode::Move));
        assert_eq!(Mode::parse("Move"), None);
        assert_eq!(Mode::parse(" copy"), None);
        assert_eq!(Mode::Move.to_string(), "move");
    }
}
