//! Package spec construction and classification of install exit statuses.

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Package installed by the hook unless overridden.
pub const DEFAULT_PACKAGE: &str = "virtualenv";

/// Exit statuses the package manager uses for recognizable failures.
///
/// The defaults follow pip's conventions. Other package managers may need
/// different values, so both are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallExitCodes {
    /// Commonly means the install needs elevated privileges.
    pub permission_denied: i32,
    /// With a version pin, commonly means the pinned version is not in the index.
    pub version_not_found: i32,
}

impl Default for InstallExitCodes {
    fn default() -> Self {
        Self {
            permission_denied: 2,
            version_not_found: 1,
        }
    }
}

/// Build the install argument: `name` or `name==version`.
pub fn package_spec(package: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("{package}=={version}"),
        None => package.to_string(),
    }
}

/// Arguments passed to the package manager for an install.
pub fn install_args(package: &str, version: Option<&str>) -> Vec<String> {
    vec!["install".to_string(), package_spec(package, version)]
}

/// Terminal state of an install child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Exited(i32),
    /// Killed by a signal, or no exit code available.
    Terminated,
    TimedOut,
}

/// Map an install outcome onto success or a [`SetupError`].
pub fn classify_install(
    status: InstallStatus,
    pip: &str,
    package: &str,
    version: Option<&str>,
    codes: &InstallExitCodes,
) -> Result<(), SetupError> {
    let code = match status {
        InstallStatus::Exited(0) => return Ok(()),
        InstallStatus::Exited(code) => code,
        InstallStatus::Terminated => {
            return Err(install_failed(pip, package, "terminated by signal".to_string()));
        }
        InstallStatus::TimedOut => {
            return Err(install_failed(pip, package, "timed out".to_string()));
        }
    };

    if code == codes.permission_denied {
        return Err(SetupError::PermissionDenied {
            pip: pip.to_string(),
            package: package.to_string(),
        });
    }
    if let Some(version) = version
        && code == codes.version_not_found
    {
        return Err(SetupError::VersionNotFound {
            pip: pip.to_string(),
            package: package.to_string(),
            version: version.to_string(),
        });
    }
    Err(install_failed(pip, package, format!("exit status {code}")))
}

pub(crate) fn install_failed(pip: &str, package: &str, reason: String) -> SetupError {
    SetupError::InstallFailed {
        pip: pip.to_string(),
        package: package.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn classify(status: InstallStatus, version: Option<&str>) -> Result<(), SetupError> {
        classify_install(
            status,
            "pip3",
            DEFAULT_PACKAGE,
            version,
            &InstallExitCodes::default(),
        )
    }

    #[test]
    fn spec_pins_version_when_given() {
        assert_eq!(package_spec("virtualenv", None), "virtualenv");
        assert_eq!(
            package_spec("virtualenv", Some("20.25.0")),
            "virtualenv==20.25.0"
        );
        assert_eq!(
            install_args("virtualenv", Some("1.0")),
            vec!["install", "virtualenv==1.0"]
        );
    }

    #[test]
    fn exit_zero_succeeds_regardless_of_version() {
        assert!(classify(InstallStatus::Exited(0), None).is_ok());
        assert!(classify(InstallStatus::Exited(0), Some("1.0")).is_ok());
    }

    #[test]
    fn exit_two_is_permission_denied() {
        let err = classify(InstallStatus::Exited(2), Some("1.0")).expect_err("fail");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        let err = classify(InstallStatus::Exited(2), None).expect_err("fail");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn exit_one_depends_on_version_pin() {
        let err = classify(InstallStatus::Exited(1), Some("99.0")).expect_err("fail");
        assert_eq!(
            err,
            SetupError::VersionNotFound {
                pip: "pip3".to_string(),
                package: "virtualenv".to_string(),
                version: "99.0".to_string(),
            }
        );
        let err = classify(InstallStatus::Exited(1), None).expect_err("fail");
        assert_eq!(err.kind(), ErrorKind::InstallFailed);
    }

    #[test]
    fn other_failures_are_install_failed() {
        for status in [
            InstallStatus::Exited(127),
            InstallStatus::Terminated,
            InstallStatus::TimedOut,
        ] {
            let err = classify(status, Some("1.0")).expect_err("fail");
            assert_eq!(err.kind(), ErrorKind::InstallFailed);
        }
    }

    #[test]
    fn custom_exit_codes_are_honored() {
        let codes = InstallExitCodes {
            permission_denied: 77,
            version_not_found: 3,
        };
        let err = classify_install(InstallStatus::Exited(77), "uv", "virtualenv", None, &codes)
            .expect_err("fail");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        let err = classify_install(
            InstallStatus::Exited(3),
            "uv",
            "virtualenv",
            Some("1.0"),
            &codes,
        )
        .expect_err("fail");
        assert_eq!(err.kind(), ErrorKind::VersionNotFound);
        let err = classify_install(InstallStatus::Exited(2), "uv", "virtualenv", None, &codes)
            .expect_err("fail");
        assert_eq!(err.kind(), ErrorKind::InstallFailed);
    }
}
