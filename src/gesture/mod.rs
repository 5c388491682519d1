//! Drag-to-decision mapping for the swipe card.
//!
//! Distances are in abstract gesture units and velocities in units per
//! second. The TUI converts terminal cells to units with the cell factors in
//! [`GestureConfig`].

pub mod tracker;

use serde::{Deserialize, Serialize};

pub use tracker::{DragTracker, Resolution};

pub const SWIPE_THRESHOLD: f64 = 100.0;
pub const VELOCITY_THRESHOLD: f64 = 500.0;
pub const TAP_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeOutcome {
    Like,
    Skip,
    DeepDive,
    None,
}

/// A finished drag: displacement from the press point and horizontal
/// release velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragGesture {
    pub offset_x: f64,
    pub offset_y: f64,
    pub velocity_x: f64,
}

impl DragGesture {
    pub fn new(offset_x: f64, offset_y: f64, velocity_x: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            velocity_x,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Distance past which a drag commits (default: 100)
    pub swipe_threshold: f64,

    /// Horizontal flick speed that commits regardless of distance (default: 500)
    pub velocity_threshold: f64,

    /// Largest movement on either axis still treated as a tap (default: 10)
    pub tap_threshold: f64,

    /// Gesture units per terminal column (default: 10)
    pub cell_width: f64,

    /// Gesture units per terminal row (default: 25)
    pub cell_height: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: SWIPE_THRESHOLD,
            velocity_threshold: VELOCITY_THRESHOLD,
            tap_threshold: TAP_THRESHOLD,
            cell_width: 10.0,
            cell_height: 25.0,
        }
    }
}

impl GestureConfig {
    /// First match wins: a mostly vertical upward drag dives in, then a long
    /// or fast horizontal drag likes or skips by direction.
    pub fn interpret(&self, gesture: &DragGesture) -> SwipeOutcome {
        let DragGesture {
            offset_x,
            offset_y,
            velocity_x,
        } = *gesture;

        if offset_y < -self.swipe_threshold && offset_x.abs() < self.swipe_threshold {
            return SwipeOutcome::DeepDive;
        }

        if offset_x.abs() > self.swipe_threshold || velocity_x.abs() > self.velocity_threshold {
            return if offset_x > 0.0 {
                SwipeOutcome::Like
            } else {
                SwipeOutcome::Skip
            };
        }

        SwipeOutcome::None
    }

    /// Whether a displacement is still within tap range.
    pub fn is_tap(&self, offset_x: f64, offset_y: f64) -> bool {
        offset_x.abs() <= self.tap_threshold && offset_y.abs() <= self.tap_threshold
    }
}

/// [`GestureConfig::interpret`] with the default thresholds.
pub fn interpret(gesture: &DragGesture) -> SwipeOutcome {
    GestureConfig::default().interpret(gesture)
}
