//! Logging setup.
//!
//! The crate logs through the `log` facade only; `env_logger` is installed
//! here for binaries that want it.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
