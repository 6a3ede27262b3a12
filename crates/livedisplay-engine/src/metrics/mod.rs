//! Value producers for page rows.
//!
//! A producer turns its row's argument list into one display string. Producers
//! backed by a remote service take a source trait object, so the engine never
//! depends on a particular transport.

pub mod clock;
pub mod currency;
pub mod static_text;
pub mod weather;

pub use clock::{ClockFetcher, TimezoneMemo, TimezoneSource, ZoneInfo};
pub use currency::{CurrencyFetcher, ROBUX, ROBUX_USD_RATE, RateSource, Rates};
pub use static_text::StaticText;
pub use weather::{
    SharedWeatherMemo, WEATHER_MEMO_MS, WeatherFetcher, WeatherKind, WeatherMemo, WeatherReport,
    WeatherSource,
};

use futures::future::BoxFuture;
use livedisplay_types::{FetchError, FetchResult};
use serde_json::Value;

/// Asynchronous producer of a row's display string
pub trait Fetcher: Send + Sync {
    /// Registry name, e.g. `clock`
    fn name(&self) -> &str;

    /// Clock readings expire after a minute instead of ten
    fn is_clock(&self) -> bool {
        false
    }

    /// Start producing a value for `args` at `now_ms`.
    ///
    /// Producers that can answer without I/O return an already-ready future.
    fn fetch(&self, args: &[Value], now_ms: i64) -> BoxFuture<'static, FetchResult>;
}

pub(crate) fn string_arg<'a>(
    args: &'a [Value],
    index: usize,
    what: &str,
) -> Result<&'a str, FetchError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::InvalidArgs(format!("{} must be a string", what)))
}

/// Loose truthiness used for optional flag arguments
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!("yes"))));
    }

    #[test]
    fn test_string_arg() {
        let args = vec![json!("Europe"), json!(3)];
        assert_eq!(string_arg(&args, 0, "area"), Ok("Europe"));
        assert!(matches!(
            string_arg(&args, 1, "location"),
            Err(FetchError::InvalidArgs(_))
        ));
        assert!(string_arg(&args, 2, "x").is_err());
    }
}
