mod args;
mod commands;
mod handlers;
pub mod logging;
pub mod terminal;

pub use args::{CacheCommand, Cli, Commands, ConfigCommand, LogLevel, OutputFormat};
pub use commands::run;
