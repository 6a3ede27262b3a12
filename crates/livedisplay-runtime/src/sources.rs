//! Sources answering from the display configuration instead of the network.

use crate::config::{DisplayConfig, split_key};
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use livedisplay_engine::metrics::{
    RateSource, Rates, TimezoneSource, WeatherReport, WeatherSource, ZoneInfo,
};
use livedisplay_types::FetchError;
use std::collections::{BTreeMap, HashMap};

type Place = (String, String);

fn index_by_place<T: Clone>(table: &BTreeMap<String, T>, what: &str) -> HashMap<Place, T> {
    table
        .iter()
        .filter_map(|(key, value)| match split_key(key) {
            Some((a, b)) => Some(((a.to_string(), b.to_string()), value.clone())),
            None => {
                tracing::warn!(key = %key, "ignoring {} entry without a slash", what);
                None
            }
        })
        .collect()
}

/// Zones from `[zones."Area/Location"]`
#[derive(Debug, Clone, Default)]
pub struct ConfiguredZones {
    zones: HashMap<Place, ZoneInfo>,
}

impl ConfiguredZones {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            zones: index_by_place(&config.zones, "zone"),
        }
    }
}

impl TimezoneSource for ConfiguredZones {
    fn lookup(
        &self,
        area: &str,
        location: &str,
    ) -> BoxFuture<'static, Result<ZoneInfo, FetchError>> {
        let zone = self
            .zones
            .get(&(area.to_string(), location.to_string()))
            .cloned()
            .ok_or_else(|| {
                FetchError::Failed(format!("no zone configured for {}/{}", area, location))
            });
        ready(zone).boxed()
    }
}

/// Rates from `[rates]`
#[derive(Debug, Clone, Default)]
pub struct ConfiguredRates {
    rates: Rates,
}

impl ConfiguredRates {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            rates: config
                .rates
                .iter()
                .map(|(code, rate)| (code.clone(), *rate))
                .collect(),
        }
    }
}

impl RateSource for ConfiguredRates {
    fn latest(&self) -> BoxFuture<'static, Result<Rates, FetchError>> {
        let result = if self.rates.is_empty() {
            Err(FetchError::Failed("no exchange rates configured".to_string()))
        } else {
            Ok(self.rates.clone())
        };
        ready(result).boxed()
    }
}

/// Reports from `[weather."City/Country"]`; the API key is not needed
#[derive(Debug, Clone, Default)]
pub struct ConfiguredWeather {
    reports: HashMap<Place, WeatherReport>,
}

impl ConfiguredWeather {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            reports: index_by_place(&config.weather, "weather"),
        }
    }
}

impl WeatherSource for ConfiguredWeather {
    fn current(
        &self,
        _api_key: &str,
        city: &str,
        country: &str,
    ) -> BoxFuture<'static, Result<WeatherReport, FetchError>> {
        let report = self
            .reports
            .get(&(city.to_string(), country.to_string()))
            .cloned()
            .ok_or_else(|| {
                FetchError::Failed(format!("no weather configured for {}/{}", city, country))
            });
        ready(report).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DisplayConfig {
        let mut config = DisplayConfig::default();
        config.zones.insert(
            "Asia/Tokyo".to_string(),
            ZoneInfo {
                abbreviation: "JST".to_string(),
                utc_offset_secs: 32_400,
            },
        );
        config.zones.insert(
            "broken".to_string(),
            ZoneInfo {
                abbreviation: "X".to_string(),
                utc_offset_secs: 0,
            },
        );
        config.rates.insert("USD".to_string(), 1.0);
        config
    }

    #[test]
    fn test_configured_zone_lookup() {
        let zones = ConfiguredZones::from_config(&config());
        let found = zones.lookup("Asia", "Tokyo").now_or_never();
        assert!(matches!(found, Some(Ok(zone)) if zone.abbreviation == "JST"));

        let missing = zones.lookup("Europe", "Paris").now_or_never();
        assert!(matches!(missing, Some(Err(FetchError::Failed(_)))));
        assert_eq!(zones.zones.len(), 1);
    }

    #[test]
    fn test_rates_and_weather() {
        let config = config();
        let source = ConfiguredRates::from_config(&config);
        let rates = source.latest().now_or_never();
        assert!(matches!(rates, Some(Ok(rates)) if rates.get("USD") == Some(&1.0)));

        let weather = ConfiguredWeather::from_config(&config)
            .current("key", "London", "GB")
            .now_or_never();
        assert!(matches!(weather, Some(Err(FetchError::Failed(_)))));
    }
}
