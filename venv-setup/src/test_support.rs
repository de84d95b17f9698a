//! Test-only helpers: a scripted process runner and scratch projects.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::Value;
use tempfile::TempDir;

use crate::io::process::{ProcessRequest, ProcessRunner, ProcessStatus};
use crate::setup::SetupOptions;

/// Process runner answering from a script instead of spawning children.
///
/// - Executables not listed as present fail to spawn.
/// - `--version` probes of present executables exit 0 unless overridden.
/// - `install` requests return the configured install status (default exit 0).
///
/// Every request is recorded in call order.
pub struct ScriptedRunner {
    present: Vec<String>,
    probe_status: HashMap<String, ProcessStatus>,
    install_status: ProcessStatus,
    calls: RefCell<Vec<ProcessRequest>>,
}

impl ScriptedRunner {
    pub fn new(present: &[&str]) -> Self {
        Self {
            present: present.iter().map(|name| name.to_string()).collect(),
            probe_status: HashMap::new(),
            install_status: ProcessStatus::exited(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_probe_status(mut self, exe: &str, status: ProcessStatus) -> Self {
        self.probe_status.insert(exe.to_string(), status);
        self
    }

    pub fn with_install_status(mut self, status: ProcessStatus) -> Self {
        self.install_status = status;
        self
    }

    pub fn calls(&self) -> Vec<ProcessRequest> {
        self.calls.borrow().clone()
    }

    /// Programs probed with `--version`, in order.
    pub fn probed(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.args.first().map(String::as_str) == Some("--version"))
            .map(|call| call.program.clone())
            .collect()
    }

    /// Install requests as `program args...` lines.
    pub fn installs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.args.first().map(String::as_str) == Some("install"))
            .map(|call| format!("{} {}", call.program, call.args.join(" ")))
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, request: &ProcessRequest) -> Result<ProcessStatus> {
        self.calls.borrow_mut().push(request.clone());
        if !self.present.iter().any(|name| *name == request.program) {
            return Err(anyhow!("spawn {}: not found", request.program));
        }
        if request.args.first().map(String::as_str) == Some("install") {
            return Ok(self.install_status);
        }
        Ok(self
            .probe_status
            .get(&request.program)
            .copied()
            .unwrap_or_else(|| ProcessStatus::exited(0)))
    }
}

/// Scratch project directory with a `package.json`.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Create a project whose `package.json` has `section` under `python-venv`.
    pub fn with_section(section: Value) -> Result<Self> {
        let project = Self::empty()?;
        project.write_package_json(&serde_json::json!({
            "name": "demo",
            "version": "1.0.0",
            "python-venv": section,
        }))?;
        Ok(project)
    }

    /// Create a project without a `package.json`.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn options(&self) -> SetupOptions {
        SetupOptions::new(self.path())
    }

    pub fn write_package_json(&self, manifest: &Value) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(manifest)?;
        buf.push('\n');
        fs::write(self.path().join("package.json"), buf)?;
        Ok(())
    }

    /// Create `bin/<name>`: a shell script that exits with `install_code` when
    /// called with `install` and with `probe_code` otherwise.
    #[cfg(unix)]
    pub fn fake_executable(&self, name: &str, probe_code: i32, install_code: i32) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.bin_dir();
        fs::create_dir_all(&bin)?;
        let path = bin.join(name);
        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"install\" ]; then exit {install_code}; fi\necho \"{name} 1.0\"\nexit {probe_code}\n"
        );
        fs::write(&path, script)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    /// Directory holding fake executables; use it as the whole `PATH`.
    pub fn bin_dir(&self) -> PathBuf {
        self.path().join("bin")
    }
}
