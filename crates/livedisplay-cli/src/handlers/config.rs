use crate::args::OutputFormat;
use anyhow::Result;
use livedisplay_engine::Settings;
use livedisplay_engine::settings::clamp_timeout;
use livedisplay_runtime::{
    DisplayConfig, FetcherMetadata, FileStore, MetricConfig, STORE_FILE, get_all_fetchers,
};
use livedisplay_types::{KeyValueStore, Theme, keys};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ConfigReport<'a> {
    data_dir: String,
    config_file: String,
    config_exists: bool,
    timeout_secs: u64,
    quick_change: bool,
    theme: Theme,
    rows: usize,
    pages: &'a [livedisplay_runtime::PageConfig],
    producers: &'static [FetcherMetadata],
}

fn describe_metric(metric: &MetricConfig) -> String {
    let args: Vec<String> = metric.args.iter().map(|arg| arg.to_string()).collect();
    format!("{}({})", metric.fetch, args.join(", "))
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

pub fn show(data_dir: &Path, config_path: &Path, format: OutputFormat) -> Result<()> {
    let store = FileStore::open(data_dir.join(STORE_FILE));
    let settings = Settings::load(&store);
    let config = DisplayConfig::load_from(config_path)?;

    match format {
        OutputFormat::Json => {
            let report = ConfigReport {
                data_dir: data_dir.display().to_string(),
                config_file: config_path.display().to_string(),
                config_exists: config_path.exists(),
                timeout_secs: settings.timeout_secs,
                quick_change: settings.quick_change,
                theme: settings.theme,
                rows: config.rows,
                pages: &config.pages,
                producers: get_all_fetchers(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            println!("Data directory: {}", data_dir.display());
            if config_path.exists() {
                println!("Config file:    {}", config_path.display());
            } else {
                println!(
                    "Config file:    {} (not found, using built-in pages)",
                    config_path.display()
                );
            }
            println!();
            println!("Timeout:        {}s", settings.timeout_secs);
            println!("Quick change:   {}", on_off(settings.quick_change));
            println!("Theme:          {}", settings.theme);
            println!();
            println!("Rows: {}", config.rows);
            for (index, page) in config.pages.iter().enumerate() {
                let metrics: Vec<String> = page.metrics.iter().map(describe_metric).collect();
                println!("  Page {}: {}", index + 1, metrics.join(" | "));
            }
            println!();
            println!("Available producers:");
            for meta in get_all_fetchers() {
                println!("  {:<10} {:<26} {}", meta.name, meta.description, meta.args);
            }
        }
    }
    Ok(())
}

pub fn set_timeout(data_dir: &Path, secs: i64) -> Result<()> {
    let mut store = FileStore::open(data_dir.join(STORE_FILE));
    let mut settings = Settings::load(&store);
    settings.timeout_secs = clamp_timeout(secs);
    settings.save_timeout(&mut store)?;

    if settings.timeout_secs as i64 != secs {
        eprintln!("Warning: timeout clamped to {}s", settings.timeout_secs);
    }
    println!("Timeout set to {}s", settings.timeout_secs);
    Ok(())
}

pub fn quick_change(data_dir: &Path, on: bool) -> Result<()> {
    let mut store = FileStore::open(data_dir.join(STORE_FILE));
    if on {
        let mut settings = Settings::load(&store);
        settings.quick_change = true;
        settings.save_quick_change(&mut store)?;
    } else {
        // any stored string loads as on, so off means no key at all
        store.remove(keys::QUICK_CHANGE)?;
    }

    println!("Quick change: {}", on_off(on));
    Ok(())
}

pub fn theme(data_dir: &Path, theme: Theme) -> Result<()> {
    let mut store = FileStore::open(data_dir.join(STORE_FILE));
    let mut settings = Settings::load(&store);
    settings.theme = theme;
    settings.save_theme(&mut store)?;

    println!("Theme: {}", theme);
    Ok(())
}
