use crate::args::OutputFormat;
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use livedisplay_engine::MetricCache;
use livedisplay_runtime::{FileStore, STORE_FILE};
use livedisplay_types::{KeyValueStore, keys};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CacheListing {
    entries: Vec<CacheRow>,
}

#[derive(Serialize)]
struct CacheRow {
    page: usize,
    row: usize,
    value: String,
    expires_at: i64,
    fresh: bool,
}

fn format_expiry(expires_at: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(expires_at)
        .map(|at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| expires_at.to_string())
}

pub fn show(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let store = FileStore::open(data_dir.join(STORE_FILE));
    let cache = MetricCache::load(&store);
    let now = Utc::now().timestamp_millis();

    let entries: Vec<CacheRow> = cache
        .entries()
        .map(|(page, row, entry)| CacheRow {
            page,
            row,
            value: entry.value.clone(),
            expires_at: entry.expires_at,
            fresh: entry.is_fresh(now),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let listing = CacheListing { entries };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No cached values.");
                return Ok(());
            }
            for entry in &entries {
                let state = if entry.fresh {
                    "fresh until"
                } else {
                    "expired"
                };
                println!(
                    "page {:>2}  row {:>2}  {:<24}  {} {}",
                    entry.page + 1,
                    entry.row + 1,
                    entry.value,
                    state,
                    format_expiry(entry.expires_at)
                );
            }
        }
    }
    Ok(())
}

pub fn clear(data_dir: &Path) -> Result<()> {
    let mut store = FileStore::open(data_dir.join(STORE_FILE));
    let count = MetricCache::load(&store).len();
    store.remove(keys::CONTENT_CACHE)?;
    tracing::info!(entries = count, "content cache cleared");
    println!("Cleared {} cached value(s)", count);
    Ok(())
}
