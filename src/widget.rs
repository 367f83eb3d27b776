//! Floating bird toggle
//!
//! Pure pointer logic; the browser glue feeds it mouse coordinates and timer
//! callbacks and applies the results to the DOM.

use crate::ui_state::WidgetPosition;

/// Viewport or element size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Drag tracking for the bird container
#[derive(Debug, Clone, Default)]
pub struct DragController {
    /// Pointer offset inside the widget while a drag is in progress
    grab: Option<(f64, f64)>,
    position: Option<WidgetPosition>,
    moved: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mouse down on the bird; `rect_*` is the container's current client rect origin
    pub fn press(&mut self, client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) {
        self.grab = Some((client_x - rect_left, client_y - rect_top));
        self.position = Some(WidgetPosition::new(rect_top, rect_left));
        self.moved = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Pointer moved; returns the clamped position to apply, if dragging
    pub fn drag_to(
        &mut self,
        client_x: f64,
        client_y: f64,
        viewport: Size,
        widget: Size,
    ) -> Option<WidgetPosition> {
        let (offset_x, offset_y) = self.grab?;
        let max_left = (viewport.width - widget.width).max(0.0);
        let max_top = (viewport.height - widget.height).max(0.0);
        let left = (client_x - offset_x).clamp(0.0, max_left);
        let top = (client_y - offset_y).clamp(0.0, max_top);
        let position = WidgetPosition::new(top, left);
        self.position = Some(position);
        self.moved = true;
        Some(position)
    }

    /// Mouse up; returns the final position to persist, if a drag was in progress
    pub fn release(&mut self) -> Option<WidgetPosition> {
        self.grab.take()?;
        self.position
    }

    /// Whether the last press turned into a drag; cleared by reading
    pub fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }
}

/// Identifies the double-click timer started by one click
pub type ClickToken = u32;

/// Outcome of a click on the bird
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDecision {
    /// Click ended a drag; ignore it
    Suppressed,
    /// First click; start the double-click timer and hand it the token
    StartTimer(ClickToken),
    /// Second click inside the window
    DoubleClick,
}

/// Single vs double click disambiguation
///
/// Every first click opens a window tagged with a fresh token. A timer only
/// resolves the window it was started for, so a late timer from an earlier
/// click never consumes a newer one.
#[derive(Debug, Clone, Default)]
pub struct ClickResolver {
    next_token: ClickToken,
    pending: Option<ClickToken>,
}

impl ClickResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, after_drag: bool) -> ClickDecision {
        if after_drag {
            return ClickDecision::Suppressed;
        }
        if self.pending.take().is_some() {
            return ClickDecision::DoubleClick;
        }
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        self.pending = Some(token);
        ClickDecision::StartTimer(token)
    }

    /// Timer for `token` fired; true if it resolves to a single click
    pub fn timer_elapsed(&mut self, token: ClickToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
