//! Scroll positions and the restoration policy

use std::cell::Cell;
use std::rc::Rc;

/// Viewport offset in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    /// Top-left corner
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What to do with the viewport after a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Restore the saved position for the entry, else scroll to the origin
    #[default]
    Restore,
    /// Leave the viewport alone
    Manual,
}

impl ScrollBehavior {
    /// Position to scroll to, `None` to leave the viewport as is
    pub fn target(self, saved: Option<ScrollPosition>) -> Option<ScrollPosition> {
        match self {
            Self::Restore => Some(saved.unwrap_or(ScrollPosition::ORIGIN)),
            Self::Manual => None,
        }
    }
}

/// The host's scrollable viewport
pub trait Viewport {
    /// Current offset
    fn offset(&self) -> ScrollPosition;

    /// Scroll to an absolute offset
    fn scroll_to(&self, position: ScrollPosition);
}

/// In-memory viewport; clones share the same offset
#[derive(Debug, Clone, Default)]
pub struct MemoryViewport(Rc<Cell<ScrollPosition>>);

impl MemoryViewport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewport for MemoryViewport {
    fn offset(&self) -> ScrollPosition {
        self.0.get()
    }

    fn scroll_to(&self, position: ScrollPosition) {
        self.0.set(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_prefers_saved_position() {
        let saved = ScrollPosition::new(0.0, 480.0);
        assert_eq!(ScrollBehavior::Restore.target(Some(saved)), Some(saved));
        assert_eq!(ScrollBehavior::Restore.target(None), Some(ScrollPosition::ORIGIN));
    }

    #[test]
    fn test_manual_leaves_viewport() {
        assert_eq!(ScrollBehavior::Manual.target(Some(ScrollPosition::new(1.0, 2.0))), None);
        assert_eq!(ScrollBehavior::Manual.target(None), None);
    }

    #[test]
    fn test_memory_viewport_shared() {
        let viewport = MemoryViewport::new();
        let handle = viewport.clone();
        viewport.scroll_to(ScrollPosition::new(10.0, 20.0));
        assert_eq!(handle.offset(), ScrollPosition::new(10.0, 20.0));
    }
}
