//! Stable exit codes for `venv-setup` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid configuration, unreadable files or other I/O errors.
pub const INVALID: i32 = 1;
/// No usable interpreter/package-manager pair was found (or fallback was disabled).
pub const NO_INTERPRETER: i32 = 2;
/// The package manager failed to install the requested tool.
pub const INSTALL_FAILED: i32 = 3;
