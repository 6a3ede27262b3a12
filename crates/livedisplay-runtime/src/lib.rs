//! Runtime layer for livedisplay.
//!
//! Loads the display configuration, persists settings and cached values to a
//! JSON file, wires producer names to their data sources, and drives the
//! engine on a tokio event loop.

pub mod config;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod store;

pub use config::{
    CONFIG_FILE, DisplayConfig, LOG_FILE, MetricConfig, PATH_ENV, PageConfig, STORE_FILE,
    resolve_data_path,
};
pub use error::{Error, Result};
pub use registry::{FetcherMetadata, FetcherRegistry, get_all_fetchers, get_fetcher_names};
pub use runtime::{Clock, Command, Runtime, command_channel};
pub use sources::{ConfiguredRates, ConfiguredWeather, ConfiguredZones};
pub use store::FileStore;
