//! Persisted overlay state: panel open flag, active section, bird position

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::HostConfig;
use crate::consts::{KEY_ACTIVE_SECTION, KEY_BIRD_POSITION, KEY_SIDEBAR_OPEN};
use crate::error::StorageError;
use crate::persistence::{KeyValueStore, load_flag, load_json, save_flag, save_json};

/// Open/closed flag and active section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub is_open: bool,
    pub active_section: String,
}

impl UiState {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            is_open: config.open_by_default,
            active_section: config.default_section.clone(),
        }
    }

    /// Restore from storage, falling back to config defaults per key
    pub fn load(store: &dyn KeyValueStore, config: &HostConfig) -> Self {
        let defaults = Self::new(config);
        let active_section = store
            .get(KEY_ACTIVE_SECTION)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.active_section);
        Self {
            is_open: load_flag(store, KEY_SIDEBAR_OPEN).unwrap_or(defaults.is_open),
            active_section,
        }
    }

    pub fn save_active(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.set(KEY_ACTIVE_SECTION, &self.active_section)
    }

    pub fn save_open(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_flag(store, KEY_SIDEBAR_OPEN, self.is_open)
    }
}

/// Bird widget offsets from the viewport's top-left corner, in CSS pixels
///
/// Stored as `{"top":"120px","left":"40px"}`; bare numbers are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetPosition {
    #[serde(with = "px")]
    pub top: f64,
    #[serde(with = "px")]
    pub left: f64,
}

impl WidgetPosition {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        load_json(store, KEY_BIRD_POSITION)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, KEY_BIRD_POSITION, self)
    }

    /// CSS length for `top`
    pub fn top_css(&self) -> String {
        px::format(self.top)
    }

    /// CSS length for `left`
    pub fn left_css(&self) -> String {
        px::format(self.left)
    }
}

/// Serde adapter for CSS pixel lengths
mod px {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Length {
        Number(f64),
        Text(String),
    }

    pub fn format(value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{}px", value as i64)
        } else {
            format!("{:.1}px", value)
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Length::deserialize(deserializer)? {
            Length::Number(n) => Ok(n),
            Length::Text(s) => s
                .trim()
                .trim_end_matches("px")
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid pixel length: {s}"))),
        }
    }
}
