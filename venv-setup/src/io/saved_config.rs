//! Saved configuration consumed by the runtime loader (`.python_venv_config.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::core::types::InterpreterChoice;

/// File name of the saved config inside the project root.
pub const SAVED_CONFIG_FILE: &str = ".python_venv_config.json";

/// Mode applied to a freshly written config on unix unless `private` is requested.
///
/// World-writable so a later unprivileged run can update a file first written
/// under `sudo`.
pub const SHARED_MODE: u32 = 0o666;
pub const PRIVATE_MODE: u32 = 0o644;

pub fn saved_config_path(root: &Path) -> PathBuf {
    root.join(SAVED_CONFIG_FILE)
}

/// Contents of the saved config.
///
/// Keys this crate does not know about are kept as-is across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfig {
    pub python_exec_name: String,
    pub pip_exec_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venv_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venv_flags: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SavedConfig {
    pub fn choice(&self) -> InterpreterChoice {
        InterpreterChoice {
            python_exec: self.python_exec_name.clone(),
            pip_exec: self.pip_exec_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write with [`PRIVATE_MODE`] instead of [`SHARED_MODE`].
    pub private: bool,
}

/// Load the saved config written by a previous install.
pub fn load_saved_config(path: &Path) -> Result<SavedConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Record `choice` in the saved config at `path`.
///
/// Known keys are overwritten. Other keys of an existing, parseable file are
/// preserved; an unparseable file is replaced.
pub fn save_choice(
    path: &Path,
    choice: &InterpreterChoice,
    venv_version: Option<&str>,
    venv_flags: Option<&Value>,
    options: SaveOptions,
) -> Result<SavedConfig> {
    let extra = existing_extra_keys(path);
    let saved = SavedConfig {
        python_exec_name: choice.python_exec.clone(),
        pip_exec_name: choice.pip_exec.clone(),
        venv_version: venv_version.map(str::to_string),
        venv_flags: venv_flags.cloned(),
        extra,
    };
    write_saved_config(path, &saved, options)?;
    Ok(saved)
}

/// Atomically write `saved` to `path` (temp file + rename).
pub fn write_saved_config(path: &Path, saved: &SavedConfig, options: SaveOptions) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(saved).context("serialize saved config")?;
    buf.push('\n');
    write_atomic(path, &buf, options)
}

fn existing_extra_keys(path: &Path) -> Map<String, Value> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Map::new();
    };
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(&contents) else {
        warn!(path = %path.display(), "existing saved config unreadable; replacing");
        return Map::new();
    };
    for key in [
        "pythonExecName",
        "pipExecName",
        "venvVersion",
        "venvFlags",
    ] {
        object.remove(key);
    }
    object
}

fn write_atomic(path: &Path, contents: &str, options: SaveOptions) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("saved config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    let replaced = set_mode(&tmp_path, options).and_then(|()| {
        fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))
    });
    if replaced.is_err()
        && let Err(err) = fs::remove_file(&tmp_path)
    {
        warn!(path = %tmp_path.display(), err = %err, "failed to remove temp config");
    }
    replaced
}

#[cfg(unix)]
fn set_mode(path: &Path, options: SaveOptions) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if options.private {
        PRIVATE_MODE
    } else {
        SHARED_MODE
    };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _options: SaveOptions) -> Result<()> {
    Ok(())
}
