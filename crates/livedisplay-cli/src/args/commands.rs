use super::enums::{OutputFormat, Switch, ThemeName};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the display full-screen (default)")]
    Run,

    #[command(about = "Print the dot-matrix rendering of a string")]
    Render {
        text: String,

        #[arg(long, default_value = "#", help = "Character for lit pixels")]
        lit: char,

        #[arg(long, default_value = ".", help = "Character for unlit pixels")]
        unlit: char,
    },

    #[command(about = "Inspect or clear cached metric values")]
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    #[command(about = "Inspect or change display settings")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    #[command(about = "List cached values per page and row")]
    Show {
        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },

    #[command(about = "Drop every cached value")]
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Show settings, configured pages and available producers")]
    Show {
        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },

    #[command(about = "Seconds each page stays on screen (1-600)")]
    SetTimeout {
        #[arg(allow_negative_numbers = true)]
        secs: i64,
    },

    #[command(about = "Replace transitions with instant updates")]
    QuickChange { state: Switch },

    #[command(about = "Normal or inverted colors")]
    Theme { theme: ThemeName },
}
