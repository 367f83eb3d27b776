//! Platform abstraction layer
//!
//! The host only talks to the page through these traits:
//! - [`Surface`]: containers, navigation markers, panel/widget/theme classes
//! - [`ResourceFetcher`]: text resources (section markup, JSON data)
//!
//! The browser implementations live in `web` (wasm32 only); tests use the
//! recording doubles in `mock`.

#[cfg(test)]
pub(crate) mod mock;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::future::Future;

use crate::chatter::ChatterLine;
use crate::error::FetchError;
use crate::section::SectionId;
use crate::settings::Theme;
use crate::ui_state::WidgetPosition;

/// Where the overlay renders
pub trait Surface {
    /// Handle to a section container
    type Container: Clone;

    /// Create and attach an empty container for a section
    fn create_container(&self, id: &SectionId) -> Self::Container;
    /// Replace a container's markup
    fn set_markup(&self, container: &Self::Container, html: &str);
    /// Add or remove the container's active marker
    fn set_active(&self, container: &Self::Container, active: bool);
    /// Mark the navigation control for `id` active and every other inactive
    fn mark_nav(&self, id: &SectionId);
    /// Show or hide the sidebar panel
    fn set_panel_open(&self, open: bool);
    fn apply_theme(&self, theme: Theme);
    /// Move the bird widget to a stored position
    fn place_widget(&self, position: &WidgetPosition);
    /// Modal notice (data load failures)
    fn show_notice(&self, title: &str, message: &str);
    fn show_chatter(&self, line: &ChatterLine);
}

/// Fetches text resources by path
pub trait ResourceFetcher {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>>;
}
