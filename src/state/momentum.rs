//! Inertial momentum projection.
//!
//! Given a drag distance and duration, project how much further a fling would travel under
//! constant deceleration and how long it would take. When the projection falls outside the
//! configured bounds, the release speed is reduced (or raised) so that distance and time stay
//! physically consistent, instead of clamping the distance alone.

use std::time::Duration;

/// Deceleration and travel bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumConfig {
    /// Deceleration in px/ms².
    pub deceleration: f64,
    /// Smallest projected travel in px.
    pub min_distance: f64,
    /// Largest projected travel in px.
    pub max_distance: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            deceleration: 0.0006,
            min_distance: 0.0,
            max_distance: 2000.0,
        }
    }
}

/// Projected fling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    /// Additional travel, signed like the drag.
    pub distance: f64,
    /// Time to come to rest.
    pub duration: Duration,
    /// Release speed in px/ms after bounding.
    pub speed: f64,
}

impl Momentum {
    /// No further travel.
    pub const NONE: Self = Self {
        distance: 0.0,
        duration: Duration::ZERO,
        speed: 0.0,
    };
}

/// Project the fling of a drag of `distance` px lasting `time`.
///
/// `speed = |distance| / t`, `travel = speed² / 2a`, `duration = speed / a`. A travel outside
/// `[min_distance, max_distance]` is pinned to the bound and the speed recomputed as
/// `sqrt(2a · bound)`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use smartflow::state::momentum::{momentum, MomentumConfig};
///
/// let config = MomentumConfig { deceleration: 0.001, min_distance: 0.0, max_distance: 10_000.0 };
/// let fling = momentum(-100.0, Duration::from_millis(100), &config);
/// // speed 1 px/ms: travel 1 / 0.002 = 500 px over 1000 ms
/// assert!((fling.distance + 500.0).abs() < 1e-9);
/// assert!((fling.duration.as_secs_f64() - 1.0).abs() < 1e-9);
/// ```
pub fn momentum(distance: f64, time: Duration, config: &MomentumConfig) -> Momentum {
    let millis = time.as_secs_f64() * 1000.0;
    if millis <= 0.0 || distance == 0.0 || config.deceleration <= 0.0 {
        return Momentum::NONE;
    }

    let a = config.deceleration;
    let mut speed = distance.abs() / millis;
    let mut travel = speed * speed / (2.0 * a);

    let bound = if travel > config.max_distance {
        Some(config.max_distance)
    } else if travel < config.min_distance {
        Some(config.min_distance)
    } else {
        None
    };
    if let Some(bound) = bound {
        travel = bound.max(0.0);
        speed = (2.0 * a * travel).sqrt();
    }

    Momentum {
        distance: travel.copysign(distance),
        duration: Duration::from_secs_f64(speed / a / 1000.0),
        speed,
    }
}
