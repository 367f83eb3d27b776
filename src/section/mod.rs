//! Sections of the overlay panel
//!
//! Each section moves through a small load lifecycle:
//! `Unloaded -> MarkupLoading -> BehaviorLoading -> Loaded`, or
//! `MarkupLoading -> Failed` when its markup cannot be fetched. Whether a
//! section is shown is tracked separately and toggles freely once created.

pub mod behavior;
pub mod registry;

pub use behavior::{BehaviorRegistry, InitContext, Initializer};
pub use registry::{SectionRecord, SectionRegistry};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Section identifier (`home`, `search`, `battleRecord`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Trimmed, non-empty identifier
    pub fn new(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// DOM id of the section's container
    pub fn container_id(&self) -> String {
        format!("tcg-{}-section", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Load lifecycle of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionPhase {
    /// Container exists but nothing has been requested
    Unloaded,
    /// Markup fetch in flight
    MarkupLoading,
    /// Markup in place, initializer running
    BehaviorLoading,
    /// Markup in place and initializer has run (or none is registered)
    Loaded,
    /// Last markup fetch failed; container shows the error
    Failed { reason: String },
}

impl SectionPhase {
    /// A new markup fetch may start from this phase
    pub fn needs_fetch(&self) -> bool {
        matches!(self, SectionPhase::Unloaded | SectionPhase::Failed { .. })
    }
}
