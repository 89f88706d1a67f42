//! Command line frontend for the perch placement engine
//!
//! A one-shot `resolve` command and an interactive session driving the
//! headless host, plus the logging and configuration they share.

pub mod args;
pub mod config;
pub mod logging;
pub mod repl;
pub mod session;

pub use config::{ConfigError, PerchConfig};
pub use session::{CommandError, Session};
