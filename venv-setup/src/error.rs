//! Terminal failures of the resolve → install → save sequence.
//!
//! None of these are retried. They propagate through `anyhow` context chains
//! up to the binary, which downcasts to [`SetupError`] to pick an exit code.

use thiserror::Error;

use crate::exit_codes;

/// Bare classification of a [`SetupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoInterpreterFound,
    NoFallbackAllowed,
    PermissionDenied,
    VersionNotFound,
    InstallFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Every preference level was probed and none had both executables.
    #[error("no suitable python/pip found (tried {})", .tried.join(", "))]
    NoInterpreterFound { tried: Vec<String> },

    /// The first attempted level failed and fallback is disabled.
    #[error("preferred python/pip ({python}/{pip}) not found; fallback disabled")]
    NoFallbackAllowed { python: String, pip: String },

    #[error("{pip} could not install {package}: permission denied (are you root?)")]
    PermissionDenied { pip: String, package: String },

    #[error("{pip} could not install {package}: version {version} does not exist")]
    VersionNotFound {
        pip: String,
        package: String,
        version: String,
    },

    #[error("{pip} failed to install {package} ({reason})")]
    InstallFailed {
        pip: String,
        package: String,
        reason: String,
    },
}

impl SetupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoInterpreterFound { .. } => ErrorKind::NoInterpreterFound,
            Self::NoFallbackAllowed { .. } => ErrorKind::NoFallbackAllowed,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::VersionNotFound { .. } => ErrorKind::VersionNotFound,
            Self::InstallFailed { .. } => ErrorKind::InstallFailed,
        }
    }

    /// Process exit code reported by the binary for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NoInterpreterFound | ErrorKind::NoFallbackAllowed => {
                exit_codes::NO_INTERPRETER
            }
            ErrorKind::PermissionDenied
            | ErrorKind::VersionNotFound
            | ErrorKind::InstallFailed => exit_codes::INSTALL_FAILED,
        }
    }
}
