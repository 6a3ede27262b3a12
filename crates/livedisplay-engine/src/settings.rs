//! User preferences persisted in the key-value store.

use crate::Result;
use livedisplay_types::{KeyValueStore, Theme, keys};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 600;

pub fn clamp_timeout(secs: i64) -> u64 {
    secs.clamp(MIN_TIMEOUT_SECS as i64, MAX_TIMEOUT_SECS as i64) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Dwell time per page
    pub timeout_secs: u64,
    pub quick_change: bool,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            quick_change: false,
            theme: Theme::Normal,
        }
    }
}

impl Settings {
    /// Read persisted settings, falling back to defaults per key.
    ///
    /// `quickChange` is restored from its stored string and any non-empty
    /// value counts as on, including `"false"`.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let timeout_secs = store
            .get(keys::TIMEOUT)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(clamp_timeout)
            .unwrap_or(defaults.timeout_secs);

        let quick_change = store
            .get(keys::QUICK_CHANGE)
            .map(|raw| !raw.is_empty())
            .unwrap_or(defaults.quick_change);

        let theme = Theme::from_stored(store.get(keys::THEME).as_deref());

        Self {
            timeout_secs,
            quick_change,
            theme,
        }
    }

    pub fn save_timeout(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(keys::TIMEOUT, &self.timeout_secs.to_string())?;
        Ok(())
    }

    pub fn save_quick_change(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(keys::QUICK_CHANGE, &self.quick_change.to_string())?;
        Ok(())
    }

    pub fn save_theme(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        match self.theme.stored_value() {
            Some(value) => store.set(keys::THEME, value)?,
            None => store.remove(keys::THEME)?,
        }
        Ok(())
    }

    /// Label of the quick-change toggle; names the mode it switches to
    pub fn quick_change_label(&self) -> &'static str {
        if self.quick_change {
            "Use Transitions"
        } else {
            "Use Quick Changes"
        }
    }
}
