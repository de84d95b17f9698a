//! Input configuration: the `python-venv` section of a project's `package.json`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::install::InstallExitCodes;
use crate::core::types::ResolutionConfig;

/// Key of the hook's section inside `package.json`.
pub const SECTION_KEY: &str = "python-venv";

/// Settings read from the `python-venv` section.
///
/// Every key is optional. `pythonExecFallback` defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageSettings {
    pub python_exec_name: Option<String>,
    pub pip_exec_name: Option<String>,
    pub venv_version: Option<String>,
    /// Passed through to the saved config untouched.
    pub venv_flags: Option<Value>,
    pub python_exec_fallback: bool,
    pub install_exit_codes: InstallExitCodes,
}

impl PackageSettings {
    pub fn resolution_config(&self) -> ResolutionConfig {
        ResolutionConfig {
            custom_python_exec: self.python_exec_name.clone(),
            custom_pip_exec: self.pip_exec_name.clone(),
            package_version: self.venv_version.clone(),
            allow_fallback: self.python_exec_fallback,
        }
        .normalized()
    }
}

/// Load the `python-venv` section from `package_json`.
///
/// A missing file is an error. A missing section yields defaults.
pub fn load_package_settings(package_json: &Path) -> Result<PackageSettings> {
    let contents = fs::read_to_string(package_json)
        .with_context(|| format!("read {}", package_json.display()))?;
    parse_package_settings(&contents)
        .with_context(|| format!("parse {}", package_json.display()))
}

/// Parse the `python-venv` section out of `package.json` contents.
pub fn parse_package_settings(contents: &str) -> Result<PackageSettings> {
    let manifest: Value = serde_json::from_str(contents).context("parse package json")?;
    let object = manifest
        .as_object()
        .ok_or_else(|| anyhow!("package json must be an object"))?;
    match object.get(SECTION_KEY) {
        None | Some(Value::Null) => {
            warn!("no \"{SECTION_KEY}\" section; using defaults");
            Ok(PackageSettings::default())
        }
        Some(section) => serde_json::from_value(section.clone())
            .with_context(|| format!("parse \"{SECTION_KEY}\" section")),
    }
}
