//! Scroller position and scroll direction.

use crate::model::Translate;

/// Direction of the last vertical move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    /// Content moved down (top increased).
    Up,
    /// Content moved up (top decreased).
    Down,
    /// No vertical movement.
    #[default]
    Halt,
}

/// Translate plus scale of a scrolled container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollerPosition {
    /// Translation in pixels.
    pub translate: Translate,
    /// Scale factor (1.0 = unscaled).
    pub scale: f64,
}

impl Default for ScrollerPosition {
    fn default() -> Self {
        Self {
            translate: Translate::default(),
            scale: 1.0,
        }
    }
}

impl ScrollerPosition {
    /// Position at `translate`, unscaled.
    pub fn at(translate: Translate) -> Self {
        Self {
            translate,
            ..Self::default()
        }
    }
}

/// Previous and current scroller positions.
///
/// Direction is derived by comparing successive `translate.top` values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    previous: Option<ScrollerPosition>,
    current: ScrollerPosition,
}

impl ScrollState {
    /// State starting at `position`, with no previous position.
    pub fn new(position: ScrollerPosition) -> Self {
        Self {
            previous: None,
            current: position,
        }
    }

    /// Current position.
    pub fn current(&self) -> ScrollerPosition {
        self.current
    }

    /// Position before the last update.
    pub fn previous(&self) -> Option<ScrollerPosition> {
        self.previous
    }

    /// Move to `position` and return the resulting direction.
    pub fn update(&mut self, position: ScrollerPosition) -> ScrollDirection {
        self.previous = Some(self.current);
        self.current = position;
        self.direction()
    }

    /// Direction of the last update; [`ScrollDirection::Halt`] before the first one.
    pub fn direction(&self) -> ScrollDirection {
        let Some(previous) = self.previous else {
            return ScrollDirection::Halt;
        };
        let (before, now) = (previous.translate.top, self.current.translate.top);
        if now < before {
            ScrollDirection::Down
        } else if now > before {
            ScrollDirection::Up
        } else {
            ScrollDirection::Halt
        }
    }
}
