//! Async driver for the engine.
//!
//! The engine itself never sleeps or polls. [`Runtime::run`] sleeps until the
//! engine's next deadline, drives producer futures on the tokio runtime, and
//! applies [`Command`]s from the user interface between ticks.

use crate::Result;
use crate::config::DisplayConfig;
use crate::registry::FetcherRegistry;
use livedisplay_engine::{DisplaySurface, Engine, FetchTicket, PendingFetch};
use livedisplay_types::{FetchResult, KeyValueStore};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, sleep_until};

/// Requests from the user interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextPage,
    ToggleQuickChange,
    SetQuickChange(bool),
    ToggleTheme,
    AdjustTimeout(i64),
    /// The surface changed size; re-measured after a quiet period
    Resize,
    Visibility(bool),
    ClearCache,
    Quit,
}

pub fn command_channel() -> (UnboundedSender<Command>, UnboundedReceiver<Command>) {
    mpsc::unbounded_channel()
}

/// Wall-clock milliseconds pinned to a tokio instant.
///
/// Under a paused tokio clock, time moves only as the runtime auto-advances,
/// so the engine sees exactly the deadlines it asked for.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    base_ms: i64,
    origin: Instant,
}

impl Clock {
    pub fn system() -> Self {
        Self::new(chrono::Utc::now().timestamp_millis())
    }

    pub fn new(base_ms: i64) -> Self {
        Self {
            base_ms,
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.base_ms + self.origin.elapsed().as_millis() as i64
    }

    pub fn instant_at(&self, at_ms: i64) -> Instant {
        let offset = (at_ms - self.base_ms).max(0) as u64;
        self.origin + Duration::from_millis(offset)
    }
}

type Completion = (FetchTicket, FetchResult);

pub struct Runtime<S: DisplaySurface> {
    engine: Engine<S>,
    clock: Clock,
}

impl<S: DisplaySurface> Runtime<S> {
    /// Build the engine for `config` with producers answering from the config.
    pub fn build(
        surface: S,
        store: Box<dyn KeyValueStore>,
        config: &DisplayConfig,
        clock: Clock,
    ) -> Result<Self> {
        let registry = FetcherRegistry::from_config(config);
        Self::with_registry(surface, store, config, &registry, clock)
    }

    pub fn with_registry(
        surface: S,
        store: Box<dyn KeyValueStore>,
        config: &DisplayConfig,
        registry: &FetcherRegistry,
        clock: Clock,
    ) -> Result<Self> {
        config.validate()?;
        let mut engine =
            Engine::new(surface, store, config.rows).with_weather_memo(registry.weather_memo());
        for page in &config.pages {
            engine.add_page(registry.page(page)?)?;
        }
        tracing::info!(
            pages = engine.page_count(),
            rows = engine.row_count(),
            "display built"
        );

        Ok(Self { engine, clock })
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<S> {
        &mut self.engine
    }

    /// Run until [`Command::Quit`] or until every command sender is dropped,
    /// then hand the engine back.
    pub async fn run(mut self, mut commands: UnboundedReceiver<Command>) -> Engine<S> {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

        self.engine.start(self.clock.now_ms());
        spawn_fetches(self.engine.take_pending_fetches(), &done_tx);

        loop {
            let deadline = self
                .engine
                .next_deadline()
                .map(|at| self.clock.instant_at(at));

            tokio::select! {
                _ = async {
                    if let Some(deadline) = deadline {
                        sleep_until(deadline).await;
                    }
                }, if deadline.is_some() => {
                    self.engine.run_due(self.clock.now_ms());
                }
                Some((ticket, result)) = done_rx.recv() => {
                    let now = self.clock.now_ms();
                    self.engine.complete_fetch(ticket, result, now);
                }
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(command) => self.apply(command),
                },
            }

            spawn_fetches(self.engine.take_pending_fetches(), &done_tx);
        }

        tracing::info!("display stopped");
        self.engine
    }

    fn apply(&mut self, command: Command) {
        let now = self.clock.now_ms();
        tracing::debug!(?command, "applying command");
        match command {
            Command::NextPage => {
                if !self.engine.next_page(now) {
                    tracing::debug!("page change ignored while the last one settles");
                }
            }
            Command::ToggleQuickChange => {
                self.engine.toggle_quick_change(now);
            }
            Command::SetQuickChange(on) => self.engine.set_quick_change(on, now),
            Command::ToggleTheme => {
                self.engine.toggle_theme();
            }
            Command::AdjustTimeout(delta) => {
                self.engine.adjust_timeout(delta);
            }
            Command::Resize => self.engine.request_resize(now),
            Command::Visibility(visible) => self.engine.set_visible(visible),
            Command::ClearCache => self.engine.clear_cache(),
            Command::Quit => {}
        }
    }
}

fn spawn_fetches(pending: Vec<PendingFetch>, done: &UnboundedSender<Completion>) {
    for PendingFetch { ticket, future } in pending {
        let done = done.clone();
        tokio::spawn(async move {
            let result = future.await;
            // The loop only drops its receiver on shutdown.
            let _ = done.send((ticket, result));
        });
    }
}
