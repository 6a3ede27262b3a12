//! World clock producer.

use super::{Fetcher, string_arg, truthy};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use livedisplay_types::{FetchError, FetchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// What a timezone lookup remembers for a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub abbreviation: String,
    pub utc_offset_secs: i32,
}

/// Resolves `area/location` zone names
pub trait TimezoneSource: Send + Sync {
    fn lookup(
        &self,
        area: &str,
        location: &str,
    ) -> BoxFuture<'static, Result<ZoneInfo, FetchError>>;
}

/// Zones looked up so far, keyed by `(area, location)`; never expires
pub type TimezoneMemo = Arc<Mutex<HashMap<(String, String), ZoneInfo>>>;

pub struct ClockFetcher {
    source: Arc<dyn TimezoneSource>,
    memo: TimezoneMemo,
    local_offset: FixedOffset,
}

impl ClockFetcher {
    pub const NAME: &'static str = "clock";

    pub fn new(source: Arc<dyn TimezoneSource>) -> Self {
        Self {
            source,
            memo: TimezoneMemo::default(),
            local_offset: Local::now().offset().fix(),
        }
    }

    /// Compare calendar days against `offset` instead of the host zone.
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    pub fn memo(&self) -> TimezoneMemo {
        Arc::clone(&self.memo)
    }

    fn cached_zone(&self, key: &(String, String)) -> Option<ZoneInfo> {
        let memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        memo.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ClockOptions {
    omit_timezone: bool,
    omit_day_indicator: bool,
}

/// `HH:MM[ tmw| yda][ ABBR]` for `zone` at `now_ms`.
fn format_clock(
    now_ms: i64,
    zone: &ZoneInfo,
    local_offset: FixedOffset,
    options: ClockOptions,
) -> FetchResult {
    let utc: DateTime<Utc> = DateTime::from_timestamp_millis(now_ms)
        .ok_or_else(|| FetchError::Failed(format!("timestamp out of range: {}", now_ms)))?;
    let remote_offset = FixedOffset::east_opt(zone.utc_offset_secs).ok_or_else(|| {
        FetchError::Failed(format!("invalid UTC offset: {}s", zone.utc_offset_secs))
    })?;

    let remote = utc.with_timezone(&remote_offset);
    let mut text = remote.format("%H:%M").to_string();

    if !options.omit_day_indicator {
        let remote_day = remote.date_naive();
        let local_day = utc.with_timezone(&local_offset).date_naive();
        if local_day.succ_opt() == Some(remote_day) {
            text.push_str(" tmw");
        } else if local_day.pred_opt() == Some(remote_day) {
            text.push_str(" yda");
        }
    }

    if !options.omit_timezone {
        text.push(' ');
        text.push_str(&zone.abbreviation);
    }
    Ok(text)
}

impl Fetcher for ClockFetcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_clock(&self) -> bool {
        true
    }

    fn fetch(&self, args: &[Value], now_ms: i64) -> BoxFuture<'static, FetchResult> {
        let area = string_arg(args, 0, "area");
        let location = string_arg(args, 1, "location");
        let (area, location) = match (area, location) {
            (Ok(area), Ok(location)) => (area.to_string(), location.to_string()),
            (Err(err), _) | (_, Err(err)) => return ready(Err(err)).boxed(),
        };
        let options = ClockOptions {
            omit_timezone: truthy(args.get(2)),
            omit_day_indicator: truthy(args.get(3)),
        };
        let local_offset = self.local_offset;
        let key = (area, location);

        if let Some(zone) = self.cached_zone(&key) {
            return ready(format_clock(now_ms, &zone, local_offset, options)).boxed();
        }

        tracing::debug!(area = %key.0, location = %key.1, "looking up timezone");
        let lookup = self.source.lookup(&key.0, &key.1);
        let memo = Arc::clone(&self.memo);
        async move {
            let zone = lookup.await?;
            memo.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, zone.clone());
            format_clock(now_ms, &zone, local_offset, options)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingZones {
        calls: AtomicUsize,
    }

    impl TimezoneSource for CountingZones {
        fn lookup(
            &self,
            area: &str,
            location: &str,
        ) -> BoxFuture<'static, Result<ZoneInfo, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let zone = match (area, location) {
                ("Asia", "Tokyo") => Ok(ZoneInfo {
                    abbreviation: "JST".to_string(),
                    utc_offset_secs: 9 * 3600,
                }),
                ("America", "New_York") => Ok(ZoneInfo {
                    abbreviation: "EST".to_string(),
                    utc_offset_secs: -5 * 3600,
                }),
                _ => Err(FetchError::Failed(format!("unknown zone {}/{}", area, location))),
            };
            ready(zone).boxed()
        }
    }

    fn fetcher() -> (ClockFetcher, Arc<CountingZones>) {
        let source = Arc::new(CountingZones {
            calls: AtomicUsize::new(0),
        });
        let utc = FixedOffset::east_opt(0).unwrap();
        let clock = ClockFetcher::new(source.clone()).with_local_offset(utc);
        (clock, source)
    }

    // 2021-03-01T20:30:00Z
    const EVENING_UTC: i64 = 1_614_630_600_000;

    #[test]
    fn test_clock_reports_next_day() {
        let (clock, _) = fetcher();
        let result = clock
            .fetch(&[json!("Asia"), json!("Tokyo")], EVENING_UTC)
            .now_or_never();
        assert_eq!(result, Some(Ok("05:30 tmw JST".to_string())));
    }

    #[test]
    fn test_clock_reports_previous_day() {
        let (clock, _) = fetcher();
        // 2021-03-01T02:00:00Z
        let result = clock
            .fetch(&[json!("America"), json!("New_York")], 1_614_564_000_000)
            .now_or_never();
        assert_eq!(result, Some(Ok("21:00 yda EST".to_string())));
    }

    #[test]
    fn test_clock_omits_suffixes() {
        let (clock, _) = fetcher();
        let args = [json!("Asia"), json!("Tokyo"), json!(true), json!(true)];
        let result = clock.fetch(&args, EVENING_UTC).now_or_never();
        assert_eq!(result, Some(Ok("05:30".to_string())));
    }

    #[test]
    fn test_zone_lookups_are_memoized() {
        let (clock, source) = fetcher();
        let args = [json!("Asia"), json!("Tokyo")];
        let _ = clock.fetch(&args, EVENING_UTC).now_or_never();
        let _ = clock.fetch(&args, EVENING_UTC + 60_000).now_or_never();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(clock.memo().lock().unwrap().len(), 1);
    }

    #[test]
    fn test_non_string_zone_is_invalid() {
        let (clock, source) = fetcher();
        let result = clock.fetch(&[json!("Asia"), json!(5)], 0).now_or_never();
        assert!(matches!(result, Some(Err(FetchError::InvalidArgs(_)))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lookup_failure_is_not_memoized() {
        let (clock, _) = fetcher();
        let result = clock
            .fetch(&[json!("Mars"), json!("Olympus")], 0)
            .now_or_never();
        assert!(matches!(result, Some(Err(FetchError::Failed(_)))));
        assert!(clock.memo().lock().unwrap().is_empty());
    }
}
