use super::args::{CacheCommand, Cli, Commands, ConfigCommand};
use super::handlers;
use crate::logging;
use anyhow::Result;
use livedisplay_runtime::config::expand_tilde;
use livedisplay_runtime::{DisplayConfig, LOG_FILE, resolve_data_path};

pub fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_path(cli.data_dir.as_deref())?;
    let config_path = match cli.config.as_deref() {
        Some(path) => expand_tilde(path),
        None => DisplayConfig::default_path(&data_dir),
    };

    let command = cli.command.unwrap_or(Commands::Run);

    if matches!(command, Commands::Run) {
        logging::init_file(cli.log_level, &data_dir.join(LOG_FILE))?;
    } else {
        logging::init_stderr(cli.log_level)?;
    }
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    match command {
        Commands::Run => handlers::run::handle(&data_dir, &config_path),

        Commands::Render { text, lit, unlit } => handlers::render::handle(&text, lit, unlit),

        Commands::Cache { command } => match command {
            CacheCommand::Show { format } => handlers::cache::show(&data_dir, format),
            CacheCommand::Clear => handlers::cache::clear(&data_dir),
        },

        Commands::Config { command } => match command {
            ConfigCommand::Show { format } => {
                handlers::config::show(&data_dir, &config_path, format)
            }
            ConfigCommand::SetTimeout { secs } => handlers::config::set_timeout(&data_dir, secs),
            ConfigCommand::QuickChange { state } => {
                handlers::config::quick_change(&data_dir, state.is_on())
            }
            ConfigCommand::Theme { theme } => handlers::config::theme(&data_dir, theme.into()),
        },
    }
}
