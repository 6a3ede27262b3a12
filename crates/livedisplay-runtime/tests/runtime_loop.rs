//! The tokio loop against a paused clock.

use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use livedisplay_engine::metrics::Fetcher;
use livedisplay_runtime::{
    Clock, Command, DisplayConfig, FetcherRegistry, FileStore, MetricConfig, PageConfig, Runtime,
    STORE_FILE, command_channel,
};
use livedisplay_testing::{RecordingSurface, T0};
use livedisplay_types::{FetchResult, KeyValueStore, MemoryStore, Theme, keys};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedSender;

const COLUMNS: usize = 48;

fn static_page(text: &str) -> PageConfig {
    PageConfig {
        metrics: vec![MetricConfig::new("static", "", vec![json!(text)])],
    }
}

fn config(pages: Vec<PageConfig>) -> DisplayConfig {
    DisplayConfig {
        rows: 2,
        pages,
        ..DisplayConfig::default()
    }
}

fn quit_after(commands: UnboundedSender<Command>, ms: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        let _ = commands.send(Command::Quit);
    });
}

/// Answers half a second after being asked
struct SlowFetcher;

impl Fetcher for SlowFetcher {
    fn name(&self) -> &str {
        "slow"
    }

    fn fetch(&self, _args: &[Value], _now_ms: i64) -> BoxFuture<'static, FetchResult> {
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok("Late".to_string())
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_loop_advances_pages_on_schedule() -> Result<()> {
    let config = config(vec![static_page("Alpha"), static_page("Beta")]);
    let runtime = Runtime::build(
        RecordingSurface::new(COLUMNS),
        Box::new(MemoryStore::new()),
        &config,
        Clock::new(T0),
    )?;

    let (tx, rx) = command_channel();
    quit_after(tx, 5_000);
    let engine = runtime.run(rx).await;
    assert_eq!(engine.page_index(), Some(0));
    assert!(engine.surface().shows(0, "Alpha"));

    let runtime = Runtime::build(
        RecordingSurface::new(COLUMNS),
        Box::new(MemoryStore::new()),
        &config,
        Clock::new(T0),
    )?;
    let (tx, rx) = command_channel();
    quit_after(tx, 13_000);
    let engine = runtime.run(rx).await;
    assert_eq!(engine.page_index(), Some(1));
    assert!(engine.surface().shows(0, "Beta"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_pending_fetch_completes_on_the_loop() -> Result<()> {
    let config = config(vec![PageConfig {
        metrics: vec![MetricConfig::new("slow", "./img/slow.svg", Vec::new())],
    }]);
    let mut registry = FetcherRegistry::from_config(&config);
    registry.register("slow", Arc::new(SlowFetcher));

    let runtime = Runtime::with_registry(
        RecordingSurface::new(COLUMNS),
        Box::new(MemoryStore::new()),
        &config,
        &registry,
        Clock::new(T0),
    )?;

    let (tx, rx) = command_channel();
    quit_after(tx, 3_000);
    let engine = runtime.run(rx).await;

    assert!(engine.surface().shows(0, "Late"));
    assert_eq!(engine.surface().icon(0), Some("./img/slow.svg"));
    assert_eq!(engine.cache().len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_commands_update_and_persist_settings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join(STORE_FILE);
    let config = config(vec![static_page("Alpha")]);

    let runtime = Runtime::build(
        RecordingSurface::new(COLUMNS),
        Box::new(FileStore::open(&store_path)),
        &config,
        Clock::new(T0),
    )?;

    let (tx, rx) = command_channel();
    tx.send(Command::ToggleTheme)?;
    tx.send(Command::AdjustTimeout(5))?;
    tx.send(Command::ToggleQuickChange)?;
    tx.send(Command::Quit)?;
    let engine = runtime.run(rx).await;

    let settings = engine.settings();
    assert_eq!(settings.theme, Theme::Invert);
    assert_eq!(settings.timeout_secs, 15);
    assert!(settings.quick_change);
    assert_eq!(engine.surface().theme(), Theme::Invert);

    let reopened = FileStore::open(&store_path);
    assert_eq!(reopened.get(keys::THEME).as_deref(), Some("invert"));
    assert_eq!(reopened.get(keys::TIMEOUT).as_deref(), Some("15"));
    assert_eq!(reopened.get(keys::QUICK_CHANGE).as_deref(), Some("true"));
    assert!(reopened.get(keys::CONTENT_CACHE).is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropping_senders_stops_the_loop() -> Result<()> {
    let config = config(vec![static_page("Alpha")]);
    let runtime = Runtime::build(
        RecordingSurface::new(COLUMNS),
        Box::new(MemoryStore::new()),
        &config,
        Clock::new(T0),
    )?;

    let (tx, rx) = command_channel();
    drop(tx);
    let engine = runtime.run(rx).await;
    assert_eq!(engine.page_index(), Some(0));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_unknown_fetcher_fails_build() {
    let config = config(vec![PageConfig {
        metrics: vec![MetricConfig::new("stocks", "", Vec::new())],
    }]);
    let built = Runtime::build(
        RecordingSurface::new(COLUMNS),
        Box::new(MemoryStore::new()),
        &config,
        Clock::new(T0),
    );
    assert!(matches!(built, Err(livedisplay_runtime::Error::Config(_))));
}
