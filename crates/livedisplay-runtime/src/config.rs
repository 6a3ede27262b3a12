use crate::{Error, Result};
use livedisplay_engine::metrics::{WeatherReport, ZoneInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Display configuration file inside the data directory
pub const CONFIG_FILE: &str = "livedisplay.toml";

/// Persisted key-value store inside the data directory
pub const STORE_FILE: &str = "store.json";

/// Log file used while the display owns the terminal
pub const LOG_FILE: &str = "livedisplay.log";

/// Environment variable overriding the data directory
pub const PATH_ENV: &str = "LIVEDISPLAY_PATH";

/// Resolve the data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. LIVEDISPLAY_PATH environment variable (with tilde expansion)
/// 3. XDG data directory (recommended default)
/// 4. ~/.livedisplay (fallback for systems without XDG)
pub fn resolve_data_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(PATH_ENV) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("livedisplay"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".livedisplay"));
    }

    Err(Error::Config(
        "Could not determine data path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// One row of a configured page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Producer name: `static`, `clock`, `currency` or `weather`
    pub fetch: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prepend: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub append: String,
}

impl MetricConfig {
    pub fn new(fetch: &str, icon: &str, args: Vec<Value>) -> Self {
        Self {
            fetch: fetch.to_string(),
            icon: icon.to_string(),
            args,
            prepend: String::new(),
            append: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

fn default_rows() -> usize {
    livedisplay_engine::DEFAULT_ROWS
}

/// Contents of `livedisplay.toml`.
///
/// `zones` and `weather` are keyed `"Area/Location"` and `"City/Country"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneInfo>,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub weather: BTreeMap<String, WeatherReport>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            pages: Vec::new(),
            zones: BTreeMap::new(),
            rates: BTreeMap::new(),
            weather: BTreeMap::new(),
        }
    }
}

impl DisplayConfig {
    /// Configuration used when no file exists: a banner page and a UTC clock.
    pub fn builtin() -> Self {
        let mut config = Self::default();
        config.add_builtin_pages();
        config
    }

    fn add_builtin_pages(&mut self) {
        self.pages = vec![
            PageConfig {
                metrics: vec![
                    MetricConfig::new("static", "", vec![Value::from("LiveDisplay")]),
                    MetricConfig::new("static", "", vec![Value::from("Press s for settings")]),
                ],
            },
            PageConfig {
                metrics: vec![MetricConfig::new(
                    "clock",
                    "",
                    vec![Value::from("Etc"), Value::from("UTC")],
                )],
            },
        ];
        self.zones
            .entry("Etc/UTC".to_string())
            .or_insert_with(|| ZoneInfo {
                abbreviation: "UTC".to_string(),
                utc_offset_secs: 0,
            });
    }

    /// Load from `path`; a missing file yields [`DisplayConfig::builtin`] and a
    /// file without pages gets the built-in pages.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::builtin());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: DisplayConfig = toml::from_str(&content)?;
        if config.pages.is_empty() {
            config.add_builtin_pages();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::Config("rows must be at least 1".to_string()));
        }
        for (index, page) in self.pages.iter().enumerate() {
            if page.metrics.is_empty() {
                return Err(Error::Config(format!("page {} has no metrics", index + 1)));
            }
        }
        Ok(())
    }
}

/// Split an `"A/B"` table key at its first slash.
pub(crate) fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('/')
}
