mod commands;
mod enums;

pub use commands::*;
pub use enums::*;

use clap::Parser;

#[derive(Parser)]
#[command(name = "livedisplay")]
#[command(
    about = "Dot-matrix metric display for the terminal",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Data directory (default: $LIVEDISPLAY_PATH or the XDG data dir)"
    )]
    pub data_dir: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Display configuration file (default: <data-dir>/livedisplay.toml)"
    )]
    pub config: Option<String>,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
