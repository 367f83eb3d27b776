//! TCG Assistant - companion overlay for a trading-card game
//!
//! Core modules:
//! - `host`: Section host (active section, lazy markup/behavior loading, persistence)
//! - `section`: Section registry, load phases and behavior initializers
//! - `events`: Host notifications with drop-to-unsubscribe handles
//! - `persistence`: Durable key-value storage (LocalStorage on web)
//! - `platform`: Browser surface and resource fetching
//! - `widget`: Floating bird toggle (drag + click resolution)

pub mod catalog;
pub mod chatter;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod message;
pub mod persistence;
pub mod platform;
pub mod section;
pub mod sections;
pub mod settings;
pub mod ui_state;
pub mod widget;

pub use config::HostConfig;
pub use error::{BehaviorError, CatalogError, FetchError, MessageError, StorageError};
pub use events::{EventBus, HostEvent, Subscription};
pub use host::{LoadOutcome, SectionHost};
pub use message::HostMessage;
pub use section::{BehaviorRegistry, InitContext, SectionId, SectionPhase};
pub use settings::{Options, Theme};
pub use ui_state::{UiState, WidgetPosition};

/// Application constants
pub mod consts {
    /// Section shown when nothing has been persisted yet
    pub const DEFAULT_SECTION: &str = "home";

    /// Durable storage keys
    pub const KEY_ACTIVE_SECTION: &str = "activeSection";
    pub const KEY_SIDEBAR_OPEN: &str = "isSidebarOpen";
    pub const KEY_BIRD_POSITION: &str = "birdPosition";
    pub const KEY_THEME: &str = "selectedTheme";
    pub const KEY_NOTIFICATIONS: &str = "notifications";
    pub const KEY_QUEUE_NOTIFICATIONS: &str = "queueNotifications";

    /// Window in which a second click on the bird counts as a double click
    pub const DBLCLICK_DELAY_MS: i32 = 300;
    /// Interval between unprompted chatter bubbles
    pub const CHATTER_INTERVAL_MS: i32 = 90_000;
    /// How long a plain chatter bubble stays up
    pub const CHATTER_HIDE_MS: i32 = 7_000;
    /// How long a revealed quiz answer stays up
    pub const ANSWER_HIDE_MS: i32 = 5_000;

    /// Starting rate for a fresh session
    pub const DEFAULT_RATE: u32 = 1500;
}

/// Escape text for insertion into markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
