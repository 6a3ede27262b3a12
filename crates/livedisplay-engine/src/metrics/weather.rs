//! Current weather producer and the report memo shared with the engine for
//! `WEATHER` icons.

use super::{Fetcher, string_arg};
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use livedisplay_types::{CLOUD_ICON, FetchError, FetchResult, weather_icon_path};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// How long a report is reused before the source is asked again
pub const WEATHER_MEMO_MS: i64 = 1_800_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Degrees Celsius
    pub temp: f64,
    /// Millibar
    pub pres: f64,
    pub sunrise: String,
    pub sunset: String,
    /// Metres per second
    pub wind_spd: f64,
    /// Degrees
    pub wind_dir: f64,
    /// Condition code, e.g. `c04d`
    #[serde(default)]
    pub icon: String,
}

pub trait WeatherSource: Send + Sync {
    fn current(
        &self,
        api_key: &str,
        city: &str,
        country: &str,
    ) -> BoxFuture<'static, Result<WeatherReport, FetchError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    Temperature,
    Pressure,
    Sunrise,
    Sunset,
    Wind,
}

impl WeatherKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "temperature" => Some(WeatherKind::Temperature),
            "pressure" => Some(WeatherKind::Pressure),
            "sunrise" => Some(WeatherKind::Sunrise),
            "sunset" => Some(WeatherKind::Sunset),
            "wind" => Some(WeatherKind::Wind),
            _ => None,
        }
    }

    fn describe(self, report: &WeatherReport) -> String {
        match self {
            WeatherKind::Temperature => format!("{}°C", report.temp),
            WeatherKind::Pressure => format!("{} mb", report.pres),
            WeatherKind::Sunrise => report.sunrise.clone(),
            WeatherKind::Sunset => report.sunset.clone(),
            WeatherKind::Wind => {
                let places = if report.wind_spd < 10.0 { 2 } else { 1 };
                format!("{:.*} m/s, {}°", places, report.wind_spd, report.wind_dir)
            }
        }
    }
}

/// `kind` argument: one name or a list of names
fn parse_kinds(value: Option<&Value>) -> Result<Vec<WeatherKind>, FetchError> {
    let unknown = |name: &str| FetchError::InvalidArgs(format!("unknown weather type: {}", name));
    match value {
        Some(Value::String(name)) => WeatherKind::parse(name)
            .map(|kind| vec![kind])
            .ok_or_else(|| unknown(name)),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                let name = name.as_str().unwrap_or_default();
                WeatherKind::parse(name).ok_or_else(|| unknown(name))
            })
            .collect(),
        _ => Err(FetchError::InvalidArgs(
            "weather type must be a string or a list of strings".to_string(),
        )),
    }
}

pub fn describe(report: &WeatherReport, kinds: &[WeatherKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.describe(report))
        .collect::<Vec<_>>()
        .join(" / ")
}

type Place = (String, String);

/// Reports per `(city, country)`, plus which place was shown last
#[derive(Debug, Default)]
pub struct WeatherMemo {
    reports: HashMap<Place, (i64, WeatherReport)>,
    last: Option<Place>,
}

pub type SharedWeatherMemo = Arc<Mutex<WeatherMemo>>;

impl WeatherMemo {
    fn fresh(&self, place: &Place, now_ms: i64) -> Option<WeatherReport> {
        self.reports
            .get(place)
            .filter(|(fetched_at, _)| now_ms - fetched_at <= WEATHER_MEMO_MS)
            .map(|(_, report)| report.clone())
    }

    pub fn record(&mut self, city: &str, country: &str, report: WeatherReport, now_ms: i64) {
        let place = (city.to_string(), country.to_string());
        self.reports.insert(place.clone(), (now_ms, report));
        self.last = Some(place);
    }

    /// Most recently shown report
    pub fn latest(&self) -> Option<&WeatherReport> {
        let place = self.last.as_ref()?;
        self.reports.get(place).map(|(_, report)| report)
    }

    /// Icon for `WEATHER` rows: the last report's condition, else a cloud
    pub fn icon(&self) -> String {
        match self.latest() {
            Some(report) if !report.icon.is_empty() => weather_icon_path(&report.icon),
            _ => CLOUD_ICON.to_string(),
        }
    }
}

pub struct WeatherFetcher {
    source: Arc<dyn WeatherSource>,
    memo: SharedWeatherMemo,
}

impl WeatherFetcher {
    pub const NAME: &'static str = "weather";

    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            memo: SharedWeatherMemo::default(),
        }
    }

    pub fn memo(&self) -> SharedWeatherMemo {
        Arc::clone(&self.memo)
    }
}

impl Fetcher for WeatherFetcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, args: &[Value], now_ms: i64) -> BoxFuture<'static, FetchResult> {
        let parsed = string_arg(args, 0, "apiKey").and_then(|api_key| {
            let city = string_arg(args, 1, "city")?;
            let country = string_arg(args, 2, "country")?;
            let kinds = parse_kinds(args.get(3))?;
            Ok((api_key, (city.to_string(), country.to_string()), kinds))
        });
        let (api_key, place, kinds) = match parsed {
            Ok(parsed) => parsed,
            Err(err) => return ready(Err(err)).boxed(),
        };

        {
            let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(report) = memo.fresh(&place, now_ms) {
                memo.last = Some(place);
                return ready(Ok(describe(&report, &kinds))).boxed();
            }
        }

        tracing::debug!(city = %place.0, country = %place.1, "fetching weather report");
        let current = self.source.current(api_key, &place.0, &place.1);
        let memo = Arc::clone(&self.memo);
        async move {
            let report = current.await?;
            let text = describe(&report, &kinds);
            memo.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record(&place.0, &place.1, report, now_ms);
            Ok(text)
        }
        .boxed()
    }
}
