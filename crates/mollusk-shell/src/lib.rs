//! Interactive shell for the mollusk filesystem game.
//!
//! - [`Shell`] - Session state and verb dispatch
//! - [`Command`] / [`Verb`] - Input parsing and the alias table
//! - [`ShellConfig`] - RON configuration
//! - [`persist`] - JSON save files for the filesystem and cache
//! - [`Timers`] - Named countdowns on background threads

pub mod command;
pub mod config;
pub mod persist;
pub mod shell;
pub mod timer;

pub use command::{Command, Verb};
pub use config::{config_file_path, ConfigError, ShellConfig};
pub use persist::PersistError;
pub use shell::{Shell, ShellError};
pub use timer::{TimerError, TimerStatus, Timers};
