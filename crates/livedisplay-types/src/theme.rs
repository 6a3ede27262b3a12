use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Normal,
    Invert,
}

impl Theme {
    /// Value persisted under the `theme` key; `None` means the key is absent.
    pub fn stored_value(self) -> Option<&'static str> {
        match self {
            Theme::Normal => None,
            Theme::Invert => Some("invert"),
        }
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("invert") => Theme::Invert,
            _ => Theme::Normal,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Normal => Theme::Invert,
            Theme::Invert => Theme::Normal,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Normal => write!(f, "normal"),
            Theme::Invert => write!(f, "invert"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_round_trips_through_stored_value() {
        for theme in [Theme::Invert, Theme::Normal] {
            assert_eq!(Theme::from_stored(theme.stored_value()), theme);
        }
        assert_eq!(Theme::from_stored(Some("null")), Theme::Normal);
    }
}
