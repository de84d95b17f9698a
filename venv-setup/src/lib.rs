//! Install-time hook that prepares a Python virtual-environment tool.
//!
//! The hook probes the host for a usable interpreter/package-manager pair,
//! installs `virtualenv` through the chosen package manager, and records the
//! chosen executable names in `.python_venv_config.json` for the runtime
//! loader. The crate keeps the same split throughout:
//!
//! - **[`core`]**: Pure, deterministic logic (preference table, resolution scan,
//!   install status classification). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (process execution, config files).
//!   Isolated behind small seams so tests can script them.
//!
//! [`setup`] coordinates core logic with I/O to implement the CLI commands.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod setup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
