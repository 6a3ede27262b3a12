//! Page scheduling and row animation on a deferred-tick queue.

mod engine;
mod timers;

pub use engine::{
    CHECK_INTERVAL_MS, DEFAULT_ROWS, Engine, FetchTicket, MESSAGE_RETRY_MS, PendingFetch,
};
