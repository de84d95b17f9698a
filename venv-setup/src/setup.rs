//! Orchestration for `venv-setup install`, `resolve` and `show`.
//!
//! `install` runs resolve → install → save in that order and stops at the
//! first failure; the saved config is only written once the tool is
//! installed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::install::{
    DEFAULT_PACKAGE, InstallExitCodes, InstallStatus, classify_install, install_args,
    install_failed, package_spec,
};
use crate::core::resolver::resolve;
use crate::core::types::{InterpreterChoice, ResolutionConfig};
use crate::error::SetupError;
use crate::io::package_config::{PackageSettings, load_package_settings};
use crate::io::process::{
    DEFAULT_INSTALL_TIMEOUT, DEFAULT_PROBE_TIMEOUT, ProcessRequest, ProcessRunner, ProcessStatus,
};
use crate::io::saved_config::{
    SaveOptions, SavedConfig, load_saved_config, save_choice, saved_config_path,
};

/// Canonical file locations for a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPaths {
    pub root: PathBuf,
    pub package_json: PathBuf,
    pub saved_config: PathBuf,
}

impl SetupPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            package_json: root.join("package.json"),
            saved_config: saved_config_path(&root),
            root,
        }
    }
}

/// Values given on the command line; each one replaces the `package.json` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub python: Option<String>,
    pub pip: Option<String>,
    pub venv_version: Option<String>,
    pub fallback: Option<bool>,
}

impl Overrides {
    fn apply(&self, settings: &mut PackageSettings) {
        if let Some(python) = &self.python {
            settings.python_exec_name = Some(python.clone());
            // The file's pip belongs to the file's interpreter.
            settings.pip_exec_name = None;
        }
        if let Some(pip) = &self.pip {
            settings.pip_exec_name = Some(pip.clone());
        }
        if let Some(version) = &self.venv_version {
            settings.venv_version = Some(version.clone());
        }
        if let Some(fallback) = self.fallback {
            settings.python_exec_fallback = fallback;
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub paths: SetupPaths,
    pub overrides: Overrides,
    /// Package installed through the chosen package manager.
    pub package: String,
    pub probe_timeout: Duration,
    pub install_timeout: Duration,
    pub save: SaveOptions,
}

impl SetupOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: SetupPaths::new(root),
            overrides: Overrides::default(),
            package: DEFAULT_PACKAGE.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            save: SaveOptions::default(),
        }
    }
}

/// Result of a successful `install`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupReport {
    pub choice: InterpreterChoice,
    /// Argument handed to the package manager, e.g. `virtualenv==20.25.0`.
    pub package_spec: String,
    pub saved_path: PathBuf,
    pub saved: SavedConfig,
}

/// Load `package.json` settings and apply command-line overrides.
pub fn load_settings(options: &SetupOptions) -> Result<PackageSettings> {
    let mut settings = load_package_settings(&options.paths.package_json)
        .context("load package settings")?;
    options.overrides.apply(&mut settings);
    debug!(?settings, "effective settings");
    Ok(settings)
}

/// Probe the preference levels for `config` with real `--version` invocations.
pub fn resolve_interpreter<R: ProcessRunner>(
    config: &ResolutionConfig,
    runner: &R,
    probe_timeout: Duration,
) -> Result<InterpreterChoice, SetupError> {
    let probe = |exe: &str| {
        info!(exe, "testing for presence");
        match runner.run(&ProcessRequest::version_probe(exe, probe_timeout)) {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!(exe, exit_code = ?status.code, timed_out = status.timed_out, "probe failed");
                false
            }
            Err(err) => {
                warn!(exe, err = %format!("{err:#}"), "probe could not run");
                false
            }
        }
    };
    let choice = resolve(config, probe)?;
    info!(
        python = %choice.python_exec,
        pip = %choice.pip_exec,
        "interpreter resolved"
    );
    Ok(choice)
}

/// Install `package` (pinned to `version` when given) with the chosen package manager.
///
/// A single attempt; any failure is terminal.
pub fn install_tool<R: ProcessRunner>(
    choice: &InterpreterChoice,
    package: &str,
    version: Option<&str>,
    runner: &R,
    codes: &InstallExitCodes,
    timeout: Duration,
) -> Result<(), SetupError> {
    let pip = choice.pip_exec.as_str();
    info!(pip, package = %package_spec(package, version), "installing");
    let request = ProcessRequest::new(pip, install_args(package, version), timeout);
    let status = match runner.run(&request) {
        Ok(status) => install_status(status),
        Err(err) => return Err(install_failed(pip, package, format!("{err:#}"))),
    };
    classify_install(status, pip, package, version, codes)
}

fn install_status(status: ProcessStatus) -> InstallStatus {
    if status.timed_out {
        return InstallStatus::TimedOut;
    }
    match status.code {
        Some(code) => InstallStatus::Exited(code),
        None => InstallStatus::Terminated,
    }
}

/// Resolve, install and save. The saved config is written last.
#[instrument(skip_all, fields(root = %options.paths.root.display()))]
pub fn run_setup<R: ProcessRunner>(options: &SetupOptions, runner: &R) -> Result<SetupReport> {
    let settings = load_settings(options)?;
    let config = settings.resolution_config();
    let version = config.package_version.as_deref();

    let choice = resolve_interpreter(&config, runner, options.probe_timeout)?;
    install_tool(
        &choice,
        &options.package,
        version,
        runner,
        &settings.install_exit_codes,
        options.install_timeout,
    )?;
    info!(package = %options.package, "package installed");

    let saved_path = options.paths.saved_config.clone();
    let saved = save_choice(
        &saved_path,
        &choice,
        version,
        settings.venv_flags.as_ref(),
        options.save,
    )
    .context("save configuration")?;
    debug!(path = %saved_path.display(), "saved configuration");

    Ok(SetupReport {
        choice,
        package_spec: package_spec(&options.package, version),
        saved_path,
        saved,
    })
}

/// Resolve only. Installs nothing and writes nothing.
pub fn run_resolve<R: ProcessRunner>(
    options: &SetupOptions,
    runner: &R,
) -> Result<InterpreterChoice> {
    let settings = load_settings(options)?;
    let choice = resolve_interpreter(&settings.resolution_config(), runner, options.probe_timeout)?;
    Ok(choice)
}

/// Load the saved config the runtime loader reads.
pub fn show_saved(paths: &SetupPaths) -> Result<SavedConfig> {
    load_saved_config(&paths.saved_config).context("load saved configuration")
}

/// Exit code for an error produced by any command.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SetupError>())
        .map_or(crate::exit_codes::INVALID, SetupError::exit_code)
}

/// Project root to use when none is given: the current directory.
pub fn default_root() -> Result<PathBuf> {
    std::env::current_dir().context("read current directory")
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn rooted(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::exit_codes;
    use crate::test_support::ScriptedRunner;

    fn choice() -> InterpreterChoice {
        InterpreterChoice {
            python_exec: "python3".to_string(),
            pip_exec: "pip3".to_string(),
        }
    }

    #[test]
    fn install_pins_version_in_request() {
        let runner = ScriptedRunner::new(&["python3", "pip3"]);
        install_tool(
            &choice(),
            "virtualenv",
            Some("20.25.0"),
            &runner,
            &InstallExitCodes::default(),
            Duration::from_secs(1),
        )
        .expect("install");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "pip3");
        assert_eq!(calls[0].args, vec!["install", "virtualenv==20.25.0"]);
    }

    #[test]
    fn install_spawn_failure_is_install_failed() {
        let runner = ScriptedRunner::new(&[]);
        let err = install_tool(
            &choice(),
            "virtualenv",
            None,
            &runner,
            &InstallExitCodes::default(),
            Duration::from_secs(1),
        )
        .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::InstallFailed);
    }

    #[test]
    fn install_timeout_is_install_failed() {
        let runner = ScriptedRunner::new(&["pip3"]).with_install_status(ProcessStatus {
            code: None,
            timed_out: true,
        });
        let err = install_tool(
            &choice(),
            "virtualenv",
            Some("1.0"),
            &runner,
            &InstallExitCodes::default(),
            Duration::from_secs(1),
        )
        .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::InstallFailed);
    }

    #[test]
    fn probe_exit_failure_counts_as_missing() {
        let runner = ScriptedRunner::new(&["python3", "pip3", "python", "pip"])
            .with_probe_status("pip3", ProcessStatus::exited(1));
        let config = ResolutionConfig {
            allow_fallback: true,
            ..ResolutionConfig::default()
        };
        let choice = resolve_interpreter(&config, &runner, Duration::from_secs(1)).expect("resolve");
        assert_eq!(choice.pip_exec, "pip");
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut settings = PackageSettings {
            python_exec_name: Some("python3.9".to_string()),
            python_exec_fallback: false,
            ..PackageSettings::default()
        };
        Overrides {
            python: Some("python3.12".to_string()),
            pip: None,
            venv_version: Some("1.2.3".to_string()),
            fallback: Some(true),
        }
        .apply(&mut settings);

        assert_eq!(settings.python_exec_name.as_deref(), Some("python3.12"));
        assert_eq!(settings.pip_exec_name, None);
        assert_eq!(settings.venv_version.as_deref(), Some("1.2.3"));
        assert!(settings.python_exec_fallback);
    }

    #[test]
    fn python_override_drops_file_pip() {
        let mut settings = PackageSettings {
            python_exec_name: Some("python3.9".to_string()),
            pip_exec_name: Some("pip3.9".to_string()),
            ..PackageSettings::default()
        };
        Overrides {
            python: Some("python3.12".to_string()),
            ..Overrides::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.python_exec_name.as_deref(), Some("python3.12"));
        assert_eq!(settings.pip_exec_name, None);

        Overrides {
            python: Some("python3.12".to_string()),
            pip: Some("pip3.12".to_string()),
            ..Overrides::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.pip_exec_name.as_deref(), Some("pip3.12"));
    }

    #[test]
    fn exit_code_for_maps_setup_errors() {
        let err = anyhow::Error::new(SetupError::NoFallbackAllowed {
            python: "foo".to_string(),
            pip: "bar".to_string(),
        })
        .context("resolve");
        assert_eq!(exit_code_for(&err), exit_codes::NO_INTERPRETER);
        assert_eq!(
            exit_code_for(&anyhow::anyhow!("read package.json")),
            exit_codes::INVALID
        );
    }

    #[test]
    fn rooted_keeps_absolute_paths() {
        let root = Path::new("/project");
        assert_eq!(
            rooted(root, Path::new("pkg/package.json")),
            PathBuf::from("/project/pkg/package.json")
        );
        assert_eq!(
            rooted(root, Path::new("/elsewhere/package.json")),
            PathBuf::from("/elsewhere/package.json")
        );
    }
}
