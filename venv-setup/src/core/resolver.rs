//! Interpreter resolution over an ordered preference table.
//!
//! Levels, highest first: custom (only when a custom interpreter is named),
//! secondary (`python3`/`pip3`), default (`python`/`pip`). The scan returns
//! the first level whose interpreter *and* package manager are both present.

use crate::core::types::{
    DEFAULT_PIP, DEFAULT_PYTHON, InterpreterChoice, LevelKind, PreferenceLevel, ResolutionConfig,
    SECONDARY_PIP, SECONDARY_PYTHON,
};
use crate::error::SetupError;

/// Build the preference table for `config`, highest level first.
///
/// A custom interpreter without a custom package manager is paired with the
/// default package manager. A custom package manager on its own is ignored.
pub fn preference_levels(config: &ResolutionConfig) -> Vec<PreferenceLevel> {
    let mut levels = Vec::with_capacity(3);
    if let Some(python) = config.custom_python_exec.as_deref() {
        let pip = config.custom_pip_exec.as_deref().unwrap_or(DEFAULT_PIP);
        levels.push(PreferenceLevel::new(LevelKind::Custom, python, pip));
    }
    levels.push(PreferenceLevel::new(
        LevelKind::Secondary,
        SECONDARY_PYTHON,
        SECONDARY_PIP,
    ));
    levels.push(PreferenceLevel::new(
        LevelKind::Default,
        DEFAULT_PYTHON,
        DEFAULT_PIP,
    ));
    levels
}

/// Resolve the interpreter/package-manager pair for `config`.
///
/// `is_present` is called once per executable, in order, and must report
/// whether `<exe> --version` exited with status 0.
pub fn resolve<P>(config: &ResolutionConfig, is_present: P) -> Result<InterpreterChoice, SetupError>
where
    P: FnMut(&str) -> bool,
{
    let levels = preference_levels(config);
    first_available(&levels, config.allow_fallback, is_present).map(PreferenceLevel::choice)
}

/// Scan `levels` in order and return the first with both executables present.
///
/// The package manager is not probed when the interpreter is missing. With
/// `allow_fallback == false` only the first level is ever tried.
pub fn first_available<'a, P>(
    levels: &'a [PreferenceLevel],
    allow_fallback: bool,
    mut is_present: P,
) -> Result<&'a PreferenceLevel, SetupError>
where
    P: FnMut(&str) -> bool,
{
    let mut tried = Vec::with_capacity(levels.len());
    for level in levels {
        if is_present(&level.python) && is_present(&level.pip) {
            return Ok(level);
        }
        if !allow_fallback {
            return Err(SetupError::NoFallbackAllowed {
                python: level.python.clone(),
                pip: level.pip.clone(),
            });
        }
        tried.push(level.label());
    }
    Err(SetupError::NoInterpreterFound { tried })
}
