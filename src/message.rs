//! Cross-document messages
//!
//! The popup and options pages talk to the overlay with `postMessage`:
//!
//! ```json
//! {"type": "SHOW_SECTION", "section": "memo", "forceOpenSidebar": true}
//! {"type": "APPLY_THEME", "theme": "dark"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::section::SectionId;
use crate::settings::Theme;

/// Raw wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
enum WireMessage {
    #[serde(rename = "SHOW_SECTION")]
    ShowSection {
        section: String,
        #[serde(rename = "forceOpenSidebar", default)]
        force_open: bool,
    },
    #[serde(rename = "APPLY_THEME")]
    ApplyTheme { theme: String },
}

/// A validated request to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    ShowSection { section: SectionId, force_open: bool },
    ApplyTheme(Theme),
}

impl HostMessage {
    pub fn parse(json: &str) -> Result<Self, MessageError> {
        match serde_json::from_str::<WireMessage>(json)? {
            WireMessage::ShowSection {
                section,
                force_open,
            } => {
                let section = SectionId::new(&section).ok_or(MessageError::EmptySection)?;
                Ok(HostMessage::ShowSection {
                    section,
                    force_open,
                })
            }
            WireMessage::ApplyTheme { theme } => Theme::from_str(&theme)
                .map(HostMessage::ApplyTheme)
                .ok_or(MessageError::UnknownTheme(theme)),
        }
    }

    pub fn to_json(&self) -> String {
        let wire = match self {
            HostMessage::ShowSection {
                section,
                force_open,
            } => WireMessage::ShowSection {
                section: section.to_string(),
                force_open: *force_open,
            },
            HostMessage::ApplyTheme(theme) => WireMessage::ApplyTheme {
                theme: theme.as_str().to_string(),
            },
        };
        // Plain strings and bools always serialize
        serde_json::to_string(&wire).unwrap_or_default()
    }
}
