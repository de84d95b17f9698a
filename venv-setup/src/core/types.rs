//! Shared deterministic types for interpreter resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interpreter/package-manager names of the secondary preference level.
pub const SECONDARY_PYTHON: &str = "python3";
pub const SECONDARY_PIP: &str = "pip3";

/// Interpreter/package-manager names of the default (lowest) preference level.
pub const DEFAULT_PYTHON: &str = "python";
pub const DEFAULT_PIP: &str = "pip";

/// A resolved pair of executable names.
///
/// Both names are non-empty: they always originate from a [`PreferenceLevel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterChoice {
    pub python_exec: String,
    pub pip_exec: String,
}

/// User-supplied preferences. Read once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionConfig {
    pub custom_python_exec: Option<String>,
    pub custom_pip_exec: Option<String>,
    /// Version pin for the tool to install.
    pub package_version: Option<String>,
    pub allow_fallback: bool,
}

impl ResolutionConfig {
    /// Drop custom names that are empty or whitespace-only.
    pub fn normalized(mut self) -> Self {
        self.custom_python_exec = non_blank(self.custom_python_exec);
        self.custom_pip_exec = non_blank(self.custom_pip_exec);
        self.package_version = non_blank(self.package_version);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Which row of the preference table a level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Custom,
    Secondary,
    Default,
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Custom => "custom",
            Self::Secondary => "secondary",
            Self::Default => "default",
        };
        f.write_str(label)
    }
}

/// One entry of the ordered interpreter/package-manager table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceLevel {
    pub kind: LevelKind,
    pub python: String,
    pub pip: String,
}

impl PreferenceLevel {
    pub fn new(kind: LevelKind, python: impl Into<String>, pip: impl Into<String>) -> Self {
        Self {
            kind,
            python: python.into(),
            pip: pip.into(),
        }
    }

    pub fn choice(&self) -> InterpreterChoice {
        InterpreterChoice {
            python_exec: self.python.clone(),
            pip_exec: self.pip.clone(),
        }
    }

    /// `python/pip` label used in messages.
    pub fn label(&self) -> String {
        format!("{}/{}", self.python, self.pip)
    }
}
