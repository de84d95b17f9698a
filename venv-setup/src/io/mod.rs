//! I/O helpers for `venv-setup` commands.

pub mod package_config;
pub mod process;
pub mod saved_config;
