use serde::{Deserialize, Serialize};

/// Literal icon value that resolves to the current weather condition image
pub const WEATHER_SENTINEL: &str = "WEATHER";

/// Icon shown on rows the current page leaves empty
pub const PLACEHOLDER_ICON: &str = "./img/placeholder.svg";

/// Weather icon used before any weather report has been cached
pub const CLOUD_ICON: &str = "./img/cloud.svg";

/// Image path for a weather condition code reported by the weather backend
pub fn weather_icon_path(code: &str) -> String {
    format!("./img/weather/{}.png", code)
}

/// Row icon as declared on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Icon {
    /// Fixed image location
    Url(String),
    /// Resolved from the most recent weather report when the row animates
    Weather,
}

impl Icon {
    pub fn url(url: impl Into<String>) -> Self {
        Icon::Url(url.into())
    }

    pub fn is_weather(&self) -> bool {
        matches!(self, Icon::Weather)
    }
}

impl Default for Icon {
    fn default() -> Self {
        Icon::Url(String::new())
    }
}

impl From<String> for Icon {
    fn from(value: String) -> Self {
        if value == WEATHER_SENTINEL {
            Icon::Weather
        } else {
            Icon::Url(value)
        }
    }
}

impl From<&str> for Icon {
    fn from(value: &str) -> Self {
        Icon::from(value.to_string())
    }
}

impl From<Icon> for String {
    fn from(icon: Icon) -> Self {
        match icon {
            Icon::Url(url) => url,
            Icon::Weather => WEATHER_SENTINEL.to_string(),
        }
    }
}
