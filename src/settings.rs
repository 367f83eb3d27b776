//! User options and visual theme
//!
//! Persisted as individual LocalStorage keys so the options page and the
//! overlay can read them independently.

use serde::{Deserialize, Serialize};

use crate::consts::{KEY_NOTIFICATIONS, KEY_QUEUE_NOTIFICATIONS, KEY_THEME};
use crate::error::StorageError;
use crate::persistence::{KeyValueStore, load_flag, save_flag};

/// Visual theme applied as a `theme-*` class on the page body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Default, Theme::Dark];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "" => Some(Theme::Default),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Body class for this theme
    pub fn class_name(&self) -> String {
        format!("theme-{}", self.as_str())
    }
}

/// Overlay options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Match-found notifications
    pub notifications: bool,
    /// Queue-size notifications
    pub queue_notifications: bool,
    pub theme: Theme,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            notifications: false,
            queue_notifications: false,
            theme: Theme::Default,
        }
    }
}

impl Options {
    /// Load options; missing or unreadable keys fall back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        let theme = match store.get(KEY_THEME) {
            Some(name) => Theme::from_str(&name).unwrap_or_else(|| {
                log::warn!("Unknown stored theme {:?}, using default", name);
                defaults.theme
            }),
            None => defaults.theme,
        };
        Self {
            notifications: load_flag(store, KEY_NOTIFICATIONS).unwrap_or(defaults.notifications),
            queue_notifications: load_flag(store, KEY_QUEUE_NOTIFICATIONS)
                .unwrap_or(defaults.queue_notifications),
            theme,
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_flag(store, KEY_NOTIFICATIONS, self.notifications)?;
        save_flag(store, KEY_QUEUE_NOTIFICATIONS, self.queue_notifications)?;
        store.set(KEY_THEME, self.theme.as_str())?;
        log::info!("Options saved: {:?}", self);
        Ok(())
    }
}
