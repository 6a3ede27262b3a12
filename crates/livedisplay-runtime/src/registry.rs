use crate::config::{DisplayConfig, MetricConfig, PageConfig};
use crate::sources::{ConfiguredRates, ConfiguredWeather, ConfiguredZones};
use crate::{Error, Result};
use livedisplay_engine::MetricDescriptor;
use livedisplay_engine::metrics::{
    ClockFetcher, CurrencyFetcher, Fetcher, SharedWeatherMemo, StaticText, WeatherFetcher,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// What a producer shows and the `args` it takes, for listings
#[derive(Debug, Clone, Serialize)]
pub struct FetcherMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static str,
}

const FETCHERS: &[FetcherMetadata] = &[
    FetcherMetadata {
        name: StaticText::NAME,
        description: "Fixed text or number",
        args: "[value]",
    },
    FetcherMetadata {
        name: ClockFetcher::NAME,
        description: "Time in another zone",
        args: "[area, location, omit_timezone?, omit_day?]",
    },
    FetcherMetadata {
        name: CurrencyFetcher::NAME,
        description: "Exchange rate conversion",
        args: "[from, to, multiplier?, decimal_places?]",
    },
    FetcherMetadata {
        name: WeatherFetcher::NAME,
        description: "Current weather readings",
        args: "[api_key, city, country, kinds]",
    },
];

pub fn get_all_fetchers() -> &'static [FetcherMetadata] {
    FETCHERS
}

pub fn get_fetcher_names() -> Vec<&'static str> {
    FETCHERS.iter().map(|f| f.name).collect()
}

/// Producers by name, wired to the configured data sources
pub struct FetcherRegistry {
    fetchers: HashMap<&'static str, Arc<dyn Fetcher>>,
    weather_memo: SharedWeatherMemo,
}

impl FetcherRegistry {
    pub fn from_config(config: &DisplayConfig) -> Self {
        let clock = ClockFetcher::new(Arc::new(ConfiguredZones::from_config(config)));
        let currency = CurrencyFetcher::new(Arc::new(ConfiguredRates::from_config(config)));
        let weather = WeatherFetcher::new(Arc::new(ConfiguredWeather::from_config(config)));
        let weather_memo = weather.memo();

        let mut fetchers: HashMap<&'static str, Arc<dyn Fetcher>> = HashMap::new();
        fetchers.insert(StaticText::NAME, Arc::new(StaticText));
        fetchers.insert(ClockFetcher::NAME, Arc::new(clock));
        fetchers.insert(CurrencyFetcher::NAME, Arc::new(currency));
        fetchers.insert(WeatherFetcher::NAME, Arc::new(weather));

        Self {
            fetchers,
            weather_memo,
        }
    }

    /// Replace or add a producer, e.g. one backed by a network client.
    pub fn register(&mut self, name: &'static str, fetcher: Arc<dyn Fetcher>) {
        self.fetchers.insert(name, fetcher);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Fetcher>> {
        self.fetchers.get(name).cloned().ok_or_else(|| {
            Error::Config(format!(
                "Unknown fetcher '{}'. Available: {}",
                name,
                get_fetcher_names().join(", ")
            ))
        })
    }

    /// Memo the weather producer fills, for `WEATHER` icons
    pub fn weather_memo(&self) -> SharedWeatherMemo {
        Arc::clone(&self.weather_memo)
    }

    pub fn descriptor(&self, metric: &MetricConfig) -> Result<MetricDescriptor> {
        Ok(MetricDescriptor::new(self.get(&metric.fetch)?)
            .with_icon(metric.icon.as_str())
            .with_args(metric.args.clone())
            .with_prepend(metric.prepend.as_str())
            .with_append(metric.append.as_str()))
    }

    pub fn page(&self, page: &PageConfig) -> Result<Vec<MetricDescriptor>> {
        page.metrics
            .iter()
            .map(|metric| self.descriptor(metric))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_builtin_fetchers_resolve() {
        let registry = FetcherRegistry::from_config(&DisplayConfig::builtin());
        for name in get_fetcher_names() {
            let fetcher = registry.get(name).map(|f| f.name().to_string());
            assert_eq!(fetcher.ok().as_deref(), Some(name));
        }
        assert!(registry.get("clock").is_ok_and(|f| f.is_clock()));
    }

    #[test]
    fn test_metadata_covers_every_registered_fetcher() {
        let registry = FetcherRegistry::from_config(&DisplayConfig::builtin());
        assert_eq!(get_all_fetchers().len(), registry.fetchers.len());
        for meta in get_all_fetchers() {
            assert!(registry.get(meta.name).is_ok());
            assert!(meta.args.starts_with('['));
        }
    }

    #[test]
    fn test_unknown_fetcher_is_config_error() {
        let registry = FetcherRegistry::from_config(&DisplayConfig::builtin());
        let metric = MetricConfig::new("stocks", "", vec![Value::from("AAPL")]);
        match registry.descriptor(&metric) {
            Err(Error::Config(msg)) => assert!(msg.contains("stocks")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_descriptor_carries_decoration() -> anyhow::Result<()> {
        let registry = FetcherRegistry::from_config(&DisplayConfig::builtin());
        let mut metric = MetricConfig::new("static", "WEATHER", vec![Value::from(5)]);
        metric.prepend = "~".to_string();
        metric.append = "C".to_string();

        let descriptor = registry.descriptor(&metric)?;
        assert_eq!(descriptor.decorate("5"), "~5C");
        assert!(descriptor.icon().is_weather());
        Ok(())
    }
}
