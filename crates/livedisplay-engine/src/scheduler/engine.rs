use super::timers::{Task, TimerQueue};
use crate::Result;
use crate::animator::{self, Step, Transition, TransitionMode};
use crate::cache::MetricCache;
use crate::glyph;
use crate::grid::PixelGrid;
use crate::layout::{self, RESIZE_DEBOUNCE_MS};
use crate::metrics::SharedWeatherMemo;
use crate::page::{MetricDescriptor, Page};
use crate::settings::{self, Settings};
use crate::surface::DisplaySurface;
use futures::FutureExt;
use futures::future::BoxFuture;
use livedisplay_types::{CLOUD_ICON, FetchResult, Icon, KeyValueStore, PLACEHOLDER_ICON, Theme};
use std::collections::VecDeque;
use std::fmt;

/// Period of the page advance check
pub const CHECK_INTERVAL_MS: i64 = 200;

/// How often a row retries messages that arrived mid-transition
pub const MESSAGE_RETRY_MS: i64 = 500;

pub const DEFAULT_ROWS: usize = 4;

/// Identifies the slot an outstanding fetch will fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub page: usize,
    pub row: usize,
}

/// A producer future that did not resolve during dispatch.
///
/// The owner drives it to completion and reports back through
/// [`Engine::complete_fetch`].
pub struct PendingFetch {
    pub ticket: FetchTicket,
    pub future: BoxFuture<'static, FetchResult>,
}

impl fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct Message {
    text: String,
    icon: Icon,
}

#[derive(Debug)]
struct RowState {
    grid: PixelGrid,
    transition: Option<Transition>,
    /// Bumped on every (re)start; ticks carrying an older value are dropped
    generation: u64,
    queue: VecDeque<Message>,
    retry_pending: bool,
}

impl RowState {
    fn new(columns: usize) -> Self {
        Self {
            grid: PixelGrid::new(columns),
            transition: None,
            generation: 0,
            queue: VecDeque::new(),
            retry_pending: false,
        }
    }

    fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    fn is_sweeping(&self) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|transition| transition.mode() == TransitionMode::Sweep)
    }
}

fn follow_up(timers: &mut TimerQueue, state: &mut RowState, row: usize, step: Step, now: i64) {
    match step {
        Step::After(delay) => timers.schedule(
            now + delay,
            Task::TransitionStep {
                row,
                generation: state.generation,
            },
        ),
        Step::Done => state.transition = None,
    }
}

/// Cycles pages across the display rows.
///
/// The engine is synchronous: every operation takes the current time in epoch
/// milliseconds and deferred work is queued until [`Engine::run_due`] is called
/// with a time at or past its deadline. Producer futures that are not ready on
/// dispatch are handed out through [`Engine::take_pending_fetches`].
pub struct Engine<S: DisplaySurface> {
    surface: S,
    store: Box<dyn KeyValueStore>,
    rows: Vec<RowState>,
    columns: usize,
    pages: Vec<Page>,
    page_index: Option<usize>,
    last_advance_at: i64,
    settings: Settings,
    visible: bool,
    cache: MetricCache,
    weather: Option<SharedWeatherMemo>,
    timers: TimerQueue,
    resize_generation: u64,
    pending: Vec<PendingFetch>,
    started: bool,
}

impl<S: DisplaySurface> Engine<S> {
    /// Build an engine with `rows` display rows, restoring settings and the
    /// value cache from `store`.
    pub fn new(surface: S, store: Box<dyn KeyValueStore>, rows: usize) -> Self {
        let settings = Settings::load(store.as_ref());
        let cache = MetricCache::load(store.as_ref());
        let (width, height) = surface.measure();
        let columns = layout::columns_for(width, height);

        let mut engine = Self {
            surface,
            store,
            rows: (0..rows).map(|_| RowState::new(columns)).collect(),
            columns,
            pages: Vec::new(),
            page_index: None,
            last_advance_at: 0,
            settings,
            visible: true,
            cache,
            weather: None,
            timers: TimerQueue::default(),
            resize_generation: 0,
            pending: Vec::new(),
            started: false,
        };
        engine.surface.set_theme(settings.theme);
        engine.surface.settings_changed(&settings);
        engine.surface.columns_changed(columns);
        engine
    }

    /// Resolve `WEATHER` icons from this memo.
    pub fn with_weather_memo(mut self, memo: SharedWeatherMemo) -> Self {
        self.weather = Some(memo);
        self
    }

    /// Append a page; descriptors beyond the row count are dropped.
    pub fn add_page(&mut self, metrics: Vec<MetricDescriptor>) -> Result<()> {
        let page = Page::new(metrics, self.rows.len())?;
        self.pages.push(page);
        Ok(())
    }

    /// Run the first check immediately and keep checking every
    /// [`CHECK_INTERVAL_MS`].
    pub fn start(&mut self, now: i64) {
        if self.started {
            return;
        }
        self.started = true;
        self.check(now);
        self.surface.flush();
    }

    /// Execute every deferred tick due at or before `now`, each at its own
    /// deadline.
    pub fn run_due(&mut self, now: i64) {
        while let Some((at, task)) = self.timers.pop_due(now) {
            self.execute(at, task);
        }
        self.surface.flush();
    }

    pub fn next_deadline(&self) -> Option<i64> {
        self.timers.next_deadline()
    }

    fn execute(&mut self, at: i64, task: Task) {
        match task {
            Task::TransitionStep { row, generation } => self.step_transition(row, generation, at),
            Task::RetryMessage { row } => self.retry_messages(row, at),
            Task::ResizeDebounce { generation } => {
                if generation == self.resize_generation {
                    self.apply_resize();
                }
            }
            Task::Check => self.check(at),
        }
    }

    fn check(&mut self, now: i64) {
        let dwell_ms = self.settings.timeout_secs as i64 * 1000;
        if !self.pages.is_empty() && self.visible && now - self.last_advance_at > dwell_ms {
            self.advance(now);
            self.last_advance_at = now + self.advance_guard_ms();
        }
        self.timers.schedule(now + CHECK_INTERVAL_MS, Task::Check);
    }

    /// Extra hold after an advance or a completed fetch.
    ///
    /// Only applied in quick mode, where it spans one full sweep.
    fn advance_guard_ms(&self) -> i64 {
        if self.settings.quick_change {
            animator::sweep_duration_ms(self.columns)
        } else {
            0
        }
    }

    /// Skip to the next page unless an advance is still settling.
    pub fn next_page(&mut self, now: i64) -> bool {
        if now <= self.last_advance_at {
            return false;
        }
        self.advance(now);
        self.surface.flush();
        true
    }

    fn advance(&mut self, now: i64) {
        if self.pages.is_empty() {
            return;
        }
        let page_index = self
            .page_index
            .map_or(0, |index| (index + 1) % self.pages.len());
        self.page_index = Some(page_index);
        tracing::info!(
            page = page_index,
            pages = self.pages.len(),
            "advancing page"
        );

        let page = self.pages[page_index].clone();
        for row in 0..self.rows.len() {
            let Some(metric) = page.get(row) else {
                self.set_message(row, "", &Icon::url(PLACEHOLDER_ICON), now);
                continue;
            };

            let cached = self
                .cache
                .fresh(page_index, row, now)
                .map(|value| metric.decorate(value));
            match cached {
                Some(text) => {
                    tracing::debug!(page = page_index, row, "using cached value");
                    self.set_message(row, &text, metric.icon(), now);
                }
                None => {
                    let ticket = FetchTicket {
                        page: page_index,
                        row,
                    };
                    self.dispatch(ticket, metric, now);
                }
            }
        }
    }

    fn dispatch(&mut self, ticket: FetchTicket, metric: &MetricDescriptor, now: i64) {
        tracing::debug!(
            page = ticket.page,
            row = ticket.row,
            fetcher = metric.fetcher_name(),
            "dispatching fetch"
        );
        let mut future = metric.fetcher().fetch(metric.args(), now);
        match (&mut future).now_or_never() {
            Some(result) => self.complete_fetch(ticket, result, now),
            None => self.pending.push(PendingFetch { ticket, future }),
        }
    }

    /// Fetches dispatched since the last call that are still running
    pub fn take_pending_fetches(&mut self) -> Vec<PendingFetch> {
        std::mem::take(&mut self.pending)
    }

    /// Apply a producer result to its slot.
    ///
    /// Values are cached and shown decorated; invalid arguments show
    /// `invalid`; failures leave the row and the cache as they are.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: FetchResult, now: i64) {
        let Some(metric) = self
            .pages
            .get(ticket.page)
            .and_then(|page| page.get(ticket.row))
            .cloned()
        else {
            tracing::warn!(
                page = ticket.page,
                row = ticket.row,
                "fetch completed for unknown slot"
            );
            return;
        };

        match result {
            Ok(value) => {
                self.cache.insert(
                    ticket.page,
                    ticket.row,
                    value.as_str(),
                    now,
                    metric.is_clock(),
                );
                if let Err(err) = self.cache.persist(self.store.as_mut()) {
                    tracing::warn!(error = %err, "failed to persist content cache");
                }
                self.set_message(ticket.row, &metric.decorate(&value), metric.icon(), now);
                self.last_advance_at = now + self.advance_guard_ms();
            }
            Err(err) => match err.display_text() {
                Some(text) => {
                    tracing::warn!(
                        page = ticket.page,
                        row = ticket.row,
                        fetcher = metric.fetcher_name(),
                        error = %err,
                        "producer rejected its arguments"
                    );
                    self.set_message(ticket.row, text, metric.icon(), now);
                    self.last_advance_at = now + self.advance_guard_ms();
                }
                None => {
                    tracing::warn!(
                        page = ticket.page,
                        row = ticket.row,
                        fetcher = metric.fetcher_name(),
                        error = %err,
                        "fetch failed"
                    );
                }
            },
        }
        self.surface.flush();
    }

    /// Show `text` on `row`, queueing it behind a running transition.
    pub fn set_message(&mut self, row: usize, text: &str, icon: &Icon, now: i64) {
        let Some(state) = self.rows.get_mut(row) else {
            return;
        };

        if state.is_transitioning() || !state.queue.is_empty() {
            state.queue.push_back(Message {
                text: text.to_string(),
                icon: icon.clone(),
            });
            if !state.retry_pending {
                state.retry_pending = true;
                self.timers
                    .schedule(now + MESSAGE_RETRY_MS, Task::RetryMessage { row });
            }
            return;
        }

        self.start_transition(row, text, icon, now);
    }

    fn resolve_icon(&self, icon: &Icon) -> String {
        match icon {
            Icon::Url(url) => url.clone(),
            Icon::Weather => match &self.weather {
                Some(memo) => memo
                    .lock()
                    .map(|memo| memo.icon())
                    .unwrap_or_else(|poisoned| poisoned.into_inner().icon()),
                None => CLOUD_ICON.to_string(),
            },
        }
    }

    fn start_transition(&mut self, row: usize, text: &str, icon: &Icon, now: i64) {
        let target = glyph::render(text);
        let icon = self.resolve_icon(icon);
        let mode = if self.settings.quick_change {
            TransitionMode::Quick
        } else {
            TransitionMode::Sweep
        };
        let columns = self.columns;

        let Some(state) = self.rows.get_mut(row) else {
            return;
        };
        if target.is_empty() && !state.grid.any_lit() {
            return;
        }

        self.surface.set_icon(row, &icon);
        let mut transition = Transition::new(mode, target, columns);
        let surface = &mut self.surface;
        let step = transition.begin(&mut state.grid, &mut |index, on| {
            surface.set_cell(row, index, on)
        });
        state.generation += 1;
        state.transition = Some(transition);
        follow_up(&mut self.timers, state, row, step, now);
    }

    fn step_transition(&mut self, row: usize, generation: u64, now: i64) {
        let quick = self.settings.quick_change;
        let Some(state) = self.rows.get_mut(row) else {
            return;
        };
        if state.generation != generation {
            return;
        }
        let Some(transition) = state.transition.as_mut() else {
            return;
        };
        if quick && transition.mode() == TransitionMode::Sweep {
            self.restart_quick(row, now);
            return;
        }

        let surface = &mut self.surface;
        let step = transition.step(&mut state.grid, &mut |index, on| {
            surface.set_cell(row, index, on)
        });
        follow_up(&mut self.timers, state, row, step, now);
    }

    /// Abort the row's sweep and finish it in quick mode.
    fn restart_quick(&mut self, row: usize, now: i64) {
        let Some(state) = self.rows.get_mut(row) else {
            return;
        };
        let Some(transition) = state.transition.take() else {
            return;
        };
        state.generation += 1;

        let mut transition = transition.into_quick();
        if transition.target().is_empty() && !state.grid.any_lit() {
            return;
        }
        let surface = &mut self.surface;
        let step = transition.begin(&mut state.grid, &mut |index, on| {
            surface.set_cell(row, index, on)
        });
        state.transition = Some(transition);
        follow_up(&mut self.timers, state, row, step, now);
    }

    fn retry_messages(&mut self, row: usize, now: i64) {
        let Some(state) = self.rows.get_mut(row) else {
            return;
        };
        state.retry_pending = false;

        loop {
            let state = &mut self.rows[row];
            if state.is_transitioning() {
                break;
            }
            let Some(message) = state.queue.pop_front() else {
                break;
            };
            self.start_transition(row, &message.text, &message.icon, now);
        }

        let state = &mut self.rows[row];
        if !state.queue.is_empty() && !state.retry_pending {
            state.retry_pending = true;
            self.timers
                .schedule(now + MESSAGE_RETRY_MS, Task::RetryMessage { row });
        }
    }

    /// Re-measure the surface after [`RESIZE_DEBOUNCE_MS`] of quiet.
    pub fn request_resize(&mut self, now: i64) {
        self.resize_generation += 1;
        self.timers.schedule(
            now + RESIZE_DEBOUNCE_MS,
            Task::ResizeDebounce {
                generation: self.resize_generation,
            },
        );
    }

    /// Re-measure the surface now and resize every row grid.
    pub fn apply_resize(&mut self) {
        let (width, height) = self.surface.measure();
        let columns = layout::columns_for(width, height);
        tracing::debug!(width, height, columns, "resizing display");

        self.columns = columns;
        for state in &mut self.rows {
            state.grid.resize(columns);
        }
        self.surface.columns_changed(columns);
        self.surface.flush();
    }

    fn persist_settings(
        &mut self,
        save: impl FnOnce(&Settings, &mut dyn KeyValueStore) -> Result<()>,
    ) {
        if let Err(err) = save(&self.settings, self.store.as_mut()) {
            tracing::warn!(error = %err, "failed to persist settings");
        }
        self.surface.settings_changed(&self.settings);
    }

    /// Switch quick mode; running sweeps restart in quick mode at once.
    pub fn set_quick_change(&mut self, on: bool, now: i64) {
        self.settings.quick_change = on;
        self.persist_settings(Settings::save_quick_change);
        tracing::info!(quick_change = on, "quick change updated");

        if on {
            for row in 0..self.rows.len() {
                if self.rows[row].is_sweeping() {
                    self.restart_quick(row, now);
                }
            }
        }
        self.surface.flush();
    }

    pub fn toggle_quick_change(&mut self, now: i64) -> bool {
        let on = !self.settings.quick_change;
        self.set_quick_change(on, now);
        on
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        self.persist_settings(Settings::save_theme);
        tracing::info!(%theme, "theme updated");
        self.surface.set_theme(theme);
        self.surface.flush();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.settings.theme.toggled();
        self.set_theme(theme);
        theme
    }

    /// Set the dwell time per page, clamped to the supported range.
    pub fn set_timeout(&mut self, secs: u64) -> u64 {
        let secs = settings::clamp_timeout(i64::try_from(secs).unwrap_or(i64::MAX));
        self.settings.timeout_secs = secs;
        self.persist_settings(Settings::save_timeout);
        tracing::info!(timeout_secs = secs, "timeout updated");
        secs
    }

    pub fn adjust_timeout(&mut self, delta: i64) -> u64 {
        let secs = settings::clamp_timeout(self.settings.timeout_secs as i64 + delta);
        self.set_timeout(secs)
    }

    /// Hidden surfaces never advance; running transitions still finish.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::debug!(visible, "visibility changed");
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        if let Err(err) = self.cache.persist(self.store.as_mut()) {
            tracing::warn!(error = %err, "failed to persist content cache");
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn cache(&self) -> &MetricCache {
        &self.cache
    }

    pub fn page_index(&self) -> Option<usize> {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn last_advance_at(&self) -> i64 {
        self.last_advance_at
    }

    pub fn grid(&self, row: usize) -> Option<&PixelGrid> {
        self.rows.get(row).map(|state| &state.grid)
    }

    pub fn is_transitioning(&self, row: usize) -> bool {
        self.rows.get(row).is_some_and(RowState::is_transitioning)
    }

    pub fn queued_messages(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |state| state.queue.len())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
