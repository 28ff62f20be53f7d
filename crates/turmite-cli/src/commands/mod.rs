//! CLI command implementations.

pub mod init;
pub mod presets;
pub mod rules;
pub mod run;
pub mod session;
pub mod stats;
pub mod watch;
