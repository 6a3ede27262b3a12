//! Dot-matrix display engine.
//!
//! Text is rasterised with a fixed 7-pixel bitmap font into column-major pixel
//! streams, and each display row animates from what it shows to the next
//! stream. The [`Engine`] cycles pages of metrics across the rows, calling
//! each row's producer or reusing its cached value.
//!
//! Everything here is synchronous and clock-free: callers pass the current
//! time in epoch milliseconds, which keeps animation and scheduling
//! deterministic under test.

pub mod animator;
pub mod cache;
pub mod error;
pub mod format;
pub mod glyph;
pub mod grid;
pub mod layout;
pub mod metrics;
pub mod page;
pub mod scheduler;
pub mod settings;
pub mod surface;

pub use cache::{CLOCK_TTL_MS, CacheEntry, DEFAULT_TTL_MS, MetricCache};
pub use error::{Error, Result};
pub use glyph::{PixelStream, ROWS, render, to_ascii};
pub use grid::PixelGrid;
pub use metrics::Fetcher;
pub use page::{MetricDescriptor, Page};
pub use scheduler::{DEFAULT_ROWS, Engine, FetchTicket, PendingFetch};
pub use settings::Settings;
pub use surface::DisplaySurface;
