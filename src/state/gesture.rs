//! Gesture events as delivered by the recognizer.

use std::time::Duration;

use crate::model::Point;

/// Kind of recognized gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Pan recognized.
    PanStart,
    /// Pan moved.
    PanMove,
    /// Pan released.
    PanEnd,
    /// Pinch recognized.
    PinchStart,
    /// Pinch scale changed.
    PinchMove,
    /// Pinch released.
    PinchEnd,
}

/// One event of the gesture stream, tagged with the page it targets.
///
/// Deltas and `delta_time` are cumulative since the recognizer started the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    /// Event kind.
    pub kind: GestureKind,
    /// Page the gesture targets.
    pub page_index: usize,
    /// Horizontal movement since the gesture started.
    pub delta_x: f64,
    /// Vertical movement since the gesture started.
    pub delta_y: f64,
    /// Gesture center in screen coordinates.
    pub center: Point,
    /// Pinch scale relative to the start of the gesture.
    pub scale: f64,
    /// Horizontal velocity in px/ms.
    pub velocity_x: f64,
    /// Time since the gesture started.
    pub delta_time: Duration,
}

impl GestureEvent {
    /// Event of `kind` on `page_index` with neutral values.
    pub fn new(kind: GestureKind, page_index: usize) -> Self {
        Self {
            kind,
            page_index,
            delta_x: 0.0,
            delta_y: 0.0,
            center: Point::default(),
            scale: 1.0,
            velocity_x: 0.0,
            delta_time: Duration::ZERO,
        }
    }

    /// Set the cumulative deltas.
    pub fn with_delta(mut self, delta_x: f64, delta_y: f64) -> Self {
        self.delta_x = delta_x;
        self.delta_y = delta_y;
        self
    }

    /// Set the pinch center and scale.
    pub fn with_pinch(mut self, center: Point, scale: f64) -> Self {
        self.center = center;
        self.scale = scale;
        self
    }

    /// Set the elapsed time.
    pub fn with_time(mut self, delta_time: Duration) -> Self {
        self.delta_time = delta_time;
        self
    }
}

/// Lifecycle of the active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// No gesture.
    #[default]
    Idle,
    /// Gesture started, baseline recorded.
    Active,
    /// At least one move processed.
    Tracking,
    /// Released; an animated transition is running.
    Settling,
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Event did not apply in the current phase.
    Ignored,
    /// Baseline recorded or transient state updated.
    Tracking,
    /// Geometry committed and `PAGE_CHANGED` emitted.
    Committed,
    /// Animated transition to the given page started.
    Animating {
        /// Page the container centers on.
        target: usize,
    },
    /// Gesture refused by the target page.
    Rejected,
}
