use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::{DragGesture, GestureConfig, SwipeOutcome};

/// Release velocity is measured over this trailing window.
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub gesture: DragGesture,
    pub outcome: SwipeOutcome,
    /// The pointer never left tap range.
    pub tap: bool,
}

impl Resolution {
    /// What to commit: the drag outcome, or a deep dive for a plain tap.
    pub fn action(&self) -> SwipeOutcome {
        match self.outcome {
            SwipeOutcome::None if self.tap => SwipeOutcome::DeepDive,
            outcome => outcome,
        }
    }
}

#[derive(Debug)]
struct Press {
    origin: (f64, f64),
    current: (f64, f64),
    samples: VecDeque<(f64, Instant)>,
    left_tap_range: bool,
}

/// Accumulates one pointer drag at a time.
#[derive(Debug)]
pub struct DragTracker {
    config: GestureConfig,
    press: Option<Press>,
}

impl DragTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some()
    }

    /// Displacement of the active drag, if any.
    pub fn offset(&self) -> Option<(f64, f64)> {
        self.press
            .as_ref()
            .map(|p| (p.current.0 - p.origin.0, p.current.1 - p.origin.1))
    }

    pub fn press(&mut self, x: f64, y: f64, at: Instant) {
        let mut samples = VecDeque::new();
        samples.push_back((x, at));
        self.press = Some(Press {
            origin: (x, y),
            current: (x, y),
            samples,
            left_tap_range: false,
        });
    }

    pub fn move_to(&mut self, x: f64, y: f64, at: Instant) {
        let config = &self.config;
        if let Some(press) = self.press.as_mut() {
            press.current = (x, y);
            press.samples.push_back((x, at));
            while press.samples.len() > 2
                && at.saturating_duration_since(press.samples[1].1) > VELOCITY_WINDOW
            {
                press.samples.pop_front();
            }
            if !config.is_tap(x - press.origin.0, y - press.origin.1) {
                press.left_tap_range = true;
            }
        }
    }

    /// Finish the drag. Returns `None` when no press was recorded.
    pub fn release(&mut self, x: f64, y: f64, at: Instant) -> Option<Resolution> {
        self.move_to(x, y, at);
        let press = self.press.take()?;

        let gesture = DragGesture {
            offset_x: x - press.origin.0,
            offset_y: y - press.origin.1,
            velocity_x: release_velocity(&press.samples, x, at),
        };

        Some(Resolution {
            gesture,
            outcome: self.config.interpret(&gesture),
            tap: !press.left_tap_range,
        })
    }

    pub fn cancel(&mut self) {
        self.press = None;
    }

    pub fn press_cell(&mut self, column: u16, row: u16, at: Instant) {
        let (x, y) = self.to_units(column, row);
        self.press(x, y, at);
    }

    pub fn move_cell(&mut self, column: u16, row: u16, at: Instant) {
        let (x, y) = self.to_units(column, row);
        self.move_to(x, y, at);
    }

    pub fn release_cell(&mut self, column: u16, row: u16, at: Instant) -> Option<Resolution> {
        let (x, y) = self.to_units(column, row);
        self.release(x, y, at)
    }

    fn to_units(&self, column: u16, row: u16) -> (f64, f64) {
        (
            f64::from(column) * self.config.cell_width,
            f64::from(row) * self.config.cell_height,
        )
    }
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

fn release_velocity(samples: &VecDeque<(f64, Instant)>, x: f64, at: Instant) -> f64 {
    let base = samples
        .iter()
        .find(|(_, t)| at.saturating_duration_since(*t) <= VELOCITY_WINDOW);

    match base {
        Some(&(base_x, t)) => {
            let dt = at.saturating_duration_since(t).as_secs_f64();
            if dt > 0.0 {
                (x - base_x) / dt
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}
