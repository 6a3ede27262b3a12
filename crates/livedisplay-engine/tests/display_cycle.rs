//! End-to-end behavior of the engine against a recording surface.

use anyhow::Result;
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use livedisplay_engine::animator::{QUICK_CHANGE_DELAY_MS, sweep_duration_ms};
use livedisplay_engine::metrics::{StaticText, WeatherFetcher, WeatherReport, WeatherSource};
use livedisplay_engine::{Engine, MetricCache, MetricDescriptor, render, to_ascii};
use livedisplay_testing::assertions::{
    assert_icon, assert_max_flips, assert_row_dark, assert_row_shows,
};
use livedisplay_testing::{CountingFetcher, ManualFetcher, RecordingSurface, T0};
use livedisplay_types::{FetchError, MemoryStore, PLACEHOLDER_ICON};
use serde_json::json;
use std::sync::Arc;

const COLUMNS: usize = 48;

fn engine_with(store: MemoryStore) -> Engine<RecordingSurface> {
    Engine::new(RecordingSurface::new(COLUMNS), Box::new(store), 2)
}

fn engine() -> Engine<RecordingSurface> {
    engine_with(MemoryStore::new())
}

fn text(value: &str) -> MetricDescriptor {
    MetricDescriptor::new(Arc::new(StaticText)).with_args(vec![json!(value)])
}

/// First check-loop tick strictly past the default 10 s dwell
const NEXT_ADVANCE: i64 = 10_200;

#[test]
fn test_two_page_cycle() -> Result<()> {
    let a = Arc::new(CountingFetcher::new("aa"));
    let b = Arc::new(CountingFetcher::new("bb"));
    let mut engine = engine();
    engine.add_page(vec![MetricDescriptor::new(a.clone())])?;
    engine.add_page(vec![MetricDescriptor::new(b.clone())])?;

    engine.start(T0);
    assert_eq!(engine.page_index(), Some(0));

    engine.run_due(T0 + NEXT_ADVANCE - 200);
    assert_eq!(engine.page_index(), Some(0));
    assert_row_shows(engine.surface(), 0, "aa")?;

    engine.run_due(T0 + NEXT_ADVANCE);
    assert_eq!(engine.page_index(), Some(1));
    engine.run_due(T0 + NEXT_ADVANCE + sweep_duration_ms(COLUMNS));
    assert_row_shows(engine.surface(), 0, "bb")?;

    engine.run_due(T0 + 2 * NEXT_ADVANCE + sweep_duration_ms(COLUMNS));
    assert_eq!(engine.page_index(), Some(0));
    assert_row_shows(engine.surface(), 0, "aa")?;

    // the second visit is served from the cache
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    Ok(())
}

#[test]
fn test_short_page_blanks_trailing_rows() -> Result<()> {
    let mut engine = engine();
    engine.add_page(vec![text("one"), text("two")])?;
    engine.add_page(vec![text("three")])?;

    engine.start(T0);
    engine.run_due(T0 + 2_000);
    assert_row_shows(engine.surface(), 1, "two")?;

    engine.run_due(T0 + NEXT_ADVANCE + sweep_duration_ms(COLUMNS));
    assert_row_shows(engine.surface(), 0, "three")?;
    assert_row_dark(engine.surface(), 1)?;
    assert_icon(engine.surface(), 1, PLACEHOLDER_ICON)?;
    Ok(())
}

#[test]
fn test_fresh_cache_skips_producer() -> Result<()> {
    let mut store = MemoryStore::new();
    let mut cache = MetricCache::new();
    cache.insert(0, 0, "cached", T0 - 1_000, false);
    cache.persist(&mut store)?;

    let fetcher = Arc::new(CountingFetcher::new("live"));
    let mut engine = engine_with(store);
    let bracketed = MetricDescriptor::new(fetcher.clone())
        .with_prepend("[")
        .with_append("]");
    engine.add_page(vec![bracketed])?;
    engine.start(T0);
    engine.run_due(T0 + 2_000);

    assert_eq!(fetcher.calls(), 0);
    assert_row_shows(engine.surface(), 0, "[cached]")?;
    Ok(())
}

#[test]
fn test_stale_cache_dispatches_and_rewrites_entry() -> Result<()> {
    let mut store = MemoryStore::new();
    let mut cache = MetricCache::new();
    cache.insert(0, 0, "old", T0 - 61_000, true);
    cache.persist(&mut store)?;

    let fetcher = Arc::new(CountingFetcher::new("12:00").as_clock());
    let mut engine = engine_with(store);
    engine.add_page(vec![MetricDescriptor::new(fetcher.clone())])?;
    engine.start(T0);

    assert_eq!(fetcher.calls(), 1);
    let entry = engine.cache().get(0, 0).cloned();
    let expected = ("12:00".to_string(), T0 + 60_000);
    assert_eq!(entry.map(|e| (e.value, e.expires_at)), Some(expected));
    Ok(())
}

#[test]
fn test_missing_glyph_renders_block() -> Result<()> {
    assert_eq!(render("¿").len(), 28);

    let mut engine = engine();
    engine.add_page(vec![text("¿")])?;
    engine.start(T0);
    engine.run_due(T0 + 2_000);
    assert_row_shows(engine.surface(), 0, "¿")?;
    Ok(())
}

#[test]
fn test_quick_mode_interrupts_running_sweep() -> Result<()> {
    let mut engine = engine();
    engine.add_page(vec![text("1234")])?;
    engine.start(T0);
    engine.run_due(T0 + 120);

    engine.set_quick_change(true, T0 + 120);
    engine.run_due(T0 + 120 + QUICK_CHANGE_DELAY_MS);
    assert_row_shows(engine.surface(), 0, "1234")?;
    assert!(!engine.is_transitioning(0));
    Ok(())
}

#[test]
fn test_sweep_flips_cells_at_most_twice() -> Result<()> {
    let mut engine = engine();
    engine.set_message(0, "88:88", &Default::default(), T0);
    engine.run_due(T0 + 2_000);
    engine.surface_mut().clear_events();

    engine.set_message(0, "12:34", &Default::default(), T0 + 2_000);
    engine.run_due(T0 + 4_000);
    assert_row_shows(engine.surface(), 0, "12:34")?;
    assert_max_flips(engine.surface(), 0, 2)?;
    Ok(())
}

#[test]
fn test_resize_preserves_lit_cells() -> Result<()> {
    let mut engine = engine();
    engine.add_page(vec![text("hi")])?;
    engine.start(T0);
    engine.run_due(T0 + 2_000);

    engine.surface_mut().set_viewport_columns(40);
    engine.request_resize(T0 + 2_000);
    engine.run_due(T0 + 3_000);

    assert_eq!(engine.columns(), 40);
    assert_eq!(engine.surface().columns(), 40);
    assert_row_shows(engine.surface(), 0, "hi")?;
    Ok(())
}

#[test]
fn test_hidden_surface_does_not_advance() -> Result<()> {
    let mut engine = engine();
    engine.add_page(vec![text("a")])?;
    engine.add_page(vec![text("b")])?;
    engine.start(T0);

    engine.set_visible(false);
    engine.run_due(T0 + 60_000);
    assert_eq!(engine.page_index(), Some(0));

    engine.set_visible(true);
    engine.run_due(T0 + 60_200);
    assert_eq!(engine.page_index(), Some(1));
    Ok(())
}

#[test]
fn test_late_completion_updates_row() -> Result<()> {
    let manual = Arc::new(ManualFetcher::new());
    let mut engine = engine();
    let usd = MetricDescriptor::new(manual.clone()).with_append(" USD");
    engine.add_page(vec![usd])?;
    engine.start(T0);

    let mut pending = engine.take_pending_fetches();
    assert_eq!(pending.len(), 1);
    assert!(manual.complete(0, Ok("1.25".to_string())));

    let fetch = pending.remove(0);
    let result = fetch
        .future
        .now_or_never()
        .expect("completed fetch is ready");
    engine.complete_fetch(fetch.ticket, result, T0 + 3_000);
    engine.run_due(T0 + 5_000);

    assert_row_shows(engine.surface(), 0, "1.25 USD")?;
    assert_eq!(engine.cache().fresh(0, 0, T0 + 5_000), Some("1.25"));
    Ok(())
}

struct Sunny;

impl WeatherSource for Sunny {
    fn current(
        &self,
        _key: &str,
        _city: &str,
        _country: &str,
    ) -> BoxFuture<'static, Result<WeatherReport, FetchError>> {
        ready(Ok(WeatherReport {
            temp: 21.0,
            pres: 1020.0,
            sunrise: "05:01".to_string(),
            sunset: "21:10".to_string(),
            wind_spd: 1.0,
            wind_dir: 180.0,
            icon: "c01d".to_string(),
        }))
        .boxed()
    }
}

#[test]
fn test_weather_icon_resolves_from_report() -> Result<()> {
    let weather = Arc::new(WeatherFetcher::new(Arc::new(Sunny)));
    let mut engine = engine().with_weather_memo(weather.memo());
    engine.add_page(vec![
        MetricDescriptor::new(weather.clone())
            .with_icon("WEATHER")
            .with_args(vec![
                json!("key"),
                json!("London"),
                json!("GB"),
                json!("temperature"),
            ]),
    ])?;
    engine.start(T0);
    engine.run_due(T0 + 2_000);

    assert_icon(engine.surface(), 0, "./img/weather/c01d.png")?;
    assert_row_shows(engine.surface(), 0, "21°C")?;
    Ok(())
}

#[test]
fn test_ascii_rendering() {
    insta::assert_snapshot!(to_ascii(&render("Hi!"), '#', '.'), @r"
    #..#.#.#.
    #..#...#.
    #..#.#.#.
    ####.#.#.
    #..#.#.#.
    #..#.#...
    #..#.#.#.
    ");
}
