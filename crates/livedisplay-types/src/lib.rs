pub mod error;
pub mod fetch;
pub mod icon;
pub mod store;
pub mod theme;

pub use error::{Error, Result};
pub use fetch::{FetchError, FetchResult};
pub use icon::{CLOUD_ICON, Icon, PLACEHOLDER_ICON, WEATHER_SENTINEL, weather_icon_path};
pub use store::{KeyValueStore, MemoryStore, keys};
pub use theme::Theme;
