//! Deterministic, pure logic behind the install hook.
//!
//! Core modules must be free of I/O side effects. Probing and process
//! execution are supplied by callers, so everything here is testable with
//! plain closures.

pub mod install;
pub mod resolver;
pub mod types;
