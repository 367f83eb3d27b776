//! Host configuration
//!
//! Resource locations and startup defaults. User-facing preferences live in
//! [`crate::settings`] instead.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SECTION;
use crate::section::SectionId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directory holding `<section>.html` fragments
    pub markup_root: String,
    /// Card catalog resource
    pub cards_path: String,
    /// Trivia lines resource
    pub trivia_path: String,
    /// Section used when storage has none
    pub default_section: String,
    /// Whether the panel starts open when storage has no flag
    pub open_by_default: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            markup_root: "./html/sections".to_string(),
            cards_path: "./json/cards.json".to_string(),
            trivia_path: "./json/trivia.json".to_string(),
            default_section: DEFAULT_SECTION.to_string(),
            open_by_default: false,
        }
    }
}

impl HostConfig {
    /// Resource path for a section's markup fragment
    pub fn markup_path(&self, id: &SectionId) -> String {
        format!("{}/{}.html", self.markup_root.trim_end_matches('/'), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_path() {
        let config = HostConfig::default();
        let id = SectionId::new("battleRecord").unwrap();
        assert_eq!(config.markup_path(&id), "./html/sections/battleRecord.html");

        let config = HostConfig {
            markup_root: "/static/".to_string(),
            ..HostConfig::default()
        };
        assert_eq!(config.markup_path(&id), "/static/battleRecord.html");
    }
}
