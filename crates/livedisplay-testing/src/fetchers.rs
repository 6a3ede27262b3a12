//! Producers with predictable behavior for engine and runtime tests.

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{BoxFuture, ready};
use livedisplay_engine::Fetcher;
use livedisplay_types::{FetchError, FetchResult};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Always yields the same value immediately and counts calls.
pub struct CountingFetcher {
    name: String,
    value: String,
    clock: bool,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            name: "counting".to_string(),
            value: value.into(),
            clock: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Give the fetcher clock TTL semantics.
    pub fn as_clock(mut self) -> Self {
        self.name = "clock".to_string();
        self.clock = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for CountingFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_clock(&self) -> bool {
        self.clock
    }

    fn fetch(&self, _args: &[Value], _now_ms: i64) -> BoxFuture<'static, FetchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(self.value.clone())).boxed()
    }
}

/// Yields preset results in order, then repeats the last one.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<FetchResult>>,
    last: Mutex<Option<FetchResult>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(results: Vec<FetchResult>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn values(values: &[&str]) -> Self {
        Self::new(values.iter().map(|v| Ok(v.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for ScriptedFetcher {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, _args: &[Value], _now_ms: i64) -> BoxFuture<'static, FetchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        let result = match next {
            Some(result) => {
                *last = Some(result.clone());
                result
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(FetchError::Failed("script exhausted".to_string()))),
        };
        ready(result).boxed()
    }
}

/// Every fetch stays pending until the test completes it by call index.
#[derive(Default)]
pub struct ManualFetcher {
    senders: Mutex<Vec<Option<oneshot::Sender<FetchResult>>>>,
}

impl ManualFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.senders.lock().unwrap().len()
    }

    /// Resolve the `call`-th fetch; returns false if it was already resolved
    /// or never made.
    pub fn complete(&self, call: usize, result: FetchResult) -> bool {
        let sender = self
            .senders
            .lock()
            .unwrap()
            .get_mut(call)
            .and_then(Option::take);
        match sender {
            Some(sender) => sender.send(result).is_ok(),
            None => false,
        }
    }
}

impl Fetcher for ManualFetcher {
    fn name(&self) -> &str {
        "manual"
    }

    fn fetch(&self, _args: &[Value], _now_ms: i64) -> BoxFuture<'static, FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.senders.lock().unwrap().push(Some(tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(FetchError::Failed("fetch dropped".to_string())))
        }
        .boxed()
    }
}
