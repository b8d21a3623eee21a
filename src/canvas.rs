//! Canvas state: the walker and the bitmap it paints.
//!
//! DESIGN
//! ======
//! One `CanvasState` exists per process. It is wrapped in a
//! `tokio::sync::RwLock` and shared by handle (`SharedCanvas`): the
//! scheduler takes the write lock for each transition, readers (save path,
//! HTTP) take the read lock. Nothing else holds a copy it later writes back.
//!
//! INVARIANTS
//! ==========
//! - `position` is always inside the bitmap.
//! - `color` is never pure white; white is replaced by black.
//! - Painted pixels are opaque; unpainted pixels are fully transparent.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub const CANVAS_WIDTH: u32 = 500;
pub const CANVAS_HEIGHT: u32 = 500;

/// Canvas handle shared between the scheduler and the HTTP layer.
pub type SharedCanvas = Arc<RwLock<CanvasState>>;

#[must_use]
pub fn shared(canvas: CanvasState) -> SharedCanvas {
    Arc::new(RwLock::new(canvas))
}

// =============================================================================
// DIRECTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// In metadata code order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The opposite direction, used on a bounce.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[must_use]
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// One of the two directions on the other axis. `first` picks
    /// `Left` (from a vertical heading) or `Up` (from a horizontal one).
    #[must_use]
    pub fn perpendicular(self, first: bool) -> Self {
        match (self, first) {
            (Self::Up | Self::Down, true) => Self::Left,
            (Self::Up | Self::Down, false) => Self::Right,
            (Self::Left | Self::Right, true) => Self::Up,
            (Self::Left | Self::Right, false) => Self::Down,
        }
    }
}

/// Numeric code used by the metadata record: 0 up, 1 down, 2 left, 3 right.
impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(usize::from(code)).copied().ok_or(code)
    }
}

// =============================================================================
// COLOR / POSITION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const RED: Self = Self([255, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);

    /// Substitute black for white so the walker never paints an invisible pixel.
    #[must_use]
    pub fn visible(self) -> Self {
        if self == Self::WHITE { Self::BLACK } else { self }
    }

    #[must_use]
    pub fn opaque(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn center() -> Self {
        Self::new(CANVAS_WIDTH / 2, CANVAS_HEIGHT / 2)
    }
}

/// Walker fields without the bitmap: what the metadata record stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walker {
    pub position: Position,
    pub direction: Direction,
    pub color: Rgb,
}

impl Default for Walker {
    fn default() -> Self {
        Self { position: Position::center(), direction: Direction::Right, color: Rgb::RED }
    }
}

// =============================================================================
// CANVAS STATE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasState {
    pub position: Position,
    pub direction: Direction,
    pub color: Rgb,
    pub bitmap: RgbaImage,
}

impl CanvasState {
    /// First-run state: centered, heading right, red, nothing painted.
    #[must_use]
    pub fn fresh() -> Self {
        Self::restore(Walker::default(), blank_bitmap())
    }

    /// Rebuild state from persisted parts. The caller has checked that the
    /// position lies inside `bitmap`.
    #[must_use]
    pub fn restore(walker: Walker, bitmap: RgbaImage) -> Self {
        Self {
            position: walker.position,
            direction: walker.direction,
            color: walker.color.visible(),
            bitmap,
        }
    }

    #[must_use]
    pub fn walker(&self) -> Walker {
        Walker { position: self.position, direction: self.direction, color: self.color }
    }

    /// Number of pixels that have been painted at least once.
    #[must_use]
    pub fn painted_pixels(&self) -> usize {
        self.bitmap.pixels().filter(|p| p.0[3] != 0).count()
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Fully transparent bitmap at the fixed canvas size.
#[must_use]
pub fn blank_bitmap() -> RgbaImage {
    RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT)
}

#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;
