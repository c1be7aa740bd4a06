//! Logging setup.
//!
//! The crate logs through the `log` facade; `env_logger` is the only backend
//! installed, once, from the binary.

mod init;

pub use init::{init_logging, LoggingConfig};
