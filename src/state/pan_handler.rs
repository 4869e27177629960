//! Pan gesture handling.
//!
//! A pan moves the page strip horizontally and, for pages taller than the viewport, the
//! target page vertically. Moves only translate the strip; the pool window is recomputed
//! when the pan ends. A short pan towards an existing neighbour starts an animated
//! transition that centers the neighbour instead of committing the release position.

use std::time::Duration;

use crate::model::LookupError;
use crate::view_state::{PagesPool, PoolWindow, ScrollDirection, ScrollState};

use super::events::{EventBus, ReaderEvent};
use super::gesture::{GestureEvent, GestureOutcome, GesturePhase};

/// Swipe detection and animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanSettings {
    /// Pans shorter than this animate to the adjacent page.
    pub swipe_threshold: Duration,
    /// Duration announced with `BEGIN_ANIMATION`.
    pub animation: Duration,
}

impl Default for PanSettings {
    fn default() -> Self {
        Self {
            swipe_threshold: Duration::from_millis(300),
            animation: Duration::from_millis(300),
        }
    }
}

/// Values recorded at pan start.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline {
    page_index: usize,
    container_left: f64,
    page_top: f64,
    start_dx: f64,
    start_dy: f64,
}

/// Animated transition waiting for [`PanHandler::complete_animation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    /// Page being centered.
    pub target: usize,
    /// Offset committed when the animation ends.
    pub offset: f64,
}

/// Pan state machine.
#[derive(Debug, Clone, Default)]
pub struct PanHandler {
    settings: PanSettings,
    phase: GesturePhase,
    baseline: Option<Baseline>,
    pending: Option<PendingTransition>,
    scroll: ScrollState,
}

impl PanHandler {
    /// Idle handler.
    pub fn new(settings: PanSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Current phase.
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Transition started by the last pan end, if any.
    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// Vertical direction of the last move of the panned page.
    pub fn direction(&self) -> ScrollDirection {
        self.scroll.direction()
    }

    /// True while an animated transition runs.
    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the baseline for subsequent moves.
    pub fn start(&mut self, event: &GestureEvent, pool: &PagesPool) -> GestureOutcome {
        let transform = pool
            .page(event.page_index)
            .map(|vm| vm.container.transform)
            .unwrap_or_default();
        self.scroll = ScrollState::new(transform);
        let page_top = transform.translate.top;
        self.baseline = Some(Baseline {
            page_index: event.page_index,
            container_left: pool.offset(),
            page_top,
            start_dx: event.delta_x,
            start_dy: event.delta_y,
        });
        self.phase = GesturePhase::Active;
        GestureOutcome::Tracking
    }

    /// Follow the finger: move the strip and the target page, then notify position
    /// observers.
    pub fn update(
        &mut self,
        event: &GestureEvent,
        pool: &mut PagesPool,
        bus: &mut EventBus,
    ) -> GestureOutcome {
        let Some(base) = self.baseline else {
            return GestureOutcome::Ignored;
        };

        let left = base.container_left + (event.delta_x - base.start_dx);
        pool.move_to(left);

        let viewport_height = pool.viewport().height;
        if let Some(vm) = pool.page_mut(base.page_index) {
            let height = vm.container.size.height;
            vm.container.transform.translate.top = if height <= viewport_height {
                0.0
            } else {
                (base.page_top + (event.delta_y - base.start_dy))
                    .clamp(viewport_height - height, 0.0)
            };
            self.scroll.update(vm.container.transform);
        }

        self.phase = GesturePhase::Tracking;
        bus.publish(ReaderEvent::ContainerPositionChanged { left });
        GestureOutcome::Tracking
    }

    /// Release: animate to the neighbour on a quick swipe, otherwise commit the release
    /// position.
    ///
    /// # Errors
    ///
    /// Propagates [`LookupError`] from the pool; offsets are clamped first so this only
    /// happens for an inconsistent pool.
    pub fn end(
        &mut self,
        event: &GestureEvent,
        pool: &mut PagesPool,
        bus: &mut EventBus,
    ) -> Result<GestureOutcome, LookupError> {
        let Some(base) = self.baseline.take() else {
            return Ok(GestureOutcome::Ignored);
        };
        let distance = event.delta_x - base.start_dx;

        let neighbour = if distance < 0.0 {
            Some(base.page_index + 1)
        } else if distance > 0.0 {
            base.page_index.checked_sub(1)
        } else {
            None
        };
        let swipe = event.delta_time < self.settings.swipe_threshold;

        if let Some(target) = neighbour.filter(|&target| swipe && target < pool.len()) {
            let offset = pool.clamp_offset(pool.centering_offset(target)?);
            tracing::debug!(from = base.page_index, target, offset, "Swipe to adjacent page");
            self.pending = Some(PendingTransition { target, offset });
            self.phase = GesturePhase::Settling;
            bus.publish(ReaderEvent::BeginAnimation(self.settings.animation));
            return Ok(GestureOutcome::Animating { target });
        }

        let offset = pool.clamp_offset(base.container_left + distance);
        let window = pool.set_offset(offset)?;
        self.phase = GesturePhase::Idle;
        bus.publish(ReaderEvent::PageChanged(window.range().collect()));
        Ok(GestureOutcome::Committed)
    }

    /// Commit the pending transition.
    ///
    /// Returns `None` when no animation was running.
    pub fn complete_animation(
        &mut self,
        pool: &mut PagesPool,
        bus: &mut EventBus,
    ) -> Result<Option<PoolWindow>, LookupError> {
        let Some(pending) = self.pending else {
            return Ok(None);
        };
        let window = pool.set_offset(pending.offset)?;
        self.pending = None;
        self.phase = GesturePhase::Idle;
        bus.publish(ReaderEvent::EndAnimation);
        bus.publish(ReaderEvent::PageChanged(window.range().collect()));
        Ok(Some(window))
    }
}
