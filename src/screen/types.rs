//! Shared screen geometry types.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner, the offset added to capture-local coordinates.
    pub fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Whether the region fits entirely inside a screen of the given size.
    pub fn fits_within(&self, screen_width: u32, screen_height: u32) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= screen_width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= screen_height)
    }
}
