//! Pinch gesture handling.
//!
//! Pinch moves only drive the live transform scale for visual feedback. On release the
//! live scale is resolved to a discrete zoom from the full zoom list, relative to the zoom
//! the page had when the pinch started, and only that page is resized.

use crate::model::{LookupError, Point, SearchMode, Zoom, ZoomInfo};
use crate::view_state::PagesPool;

use super::events::{EventBus, ReaderEvent};
use super::gesture::{GestureEvent, GestureOutcome, GesturePhase};

#[derive(Debug, Clone, PartialEq)]
struct PinchStart {
    page_index: usize,
    origin: Point,
    base_zoom: Zoom,
}

/// Pinch state machine.
#[derive(Debug, Clone, Default)]
pub struct PinchHandler {
    phase: GesturePhase,
    start: Option<PinchStart>,
    live_scale: f64,
}

impl PinchHandler {
    /// Idle handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Gesture center relative to the page's top-left corner at pinch start.
    pub fn origin(&self) -> Option<Point> {
        self.start.as_ref().map(|start| start.origin)
    }

    /// Scale of the last pinch move.
    pub fn live_scale(&self) -> f64 {
        self.live_scale
    }

    /// Record the pinch origin, or refuse the pinch on a restricted page.
    ///
    /// # Errors
    ///
    /// [`LookupError::PageOutOfRange`] for an index outside the issue.
    pub fn start(
        &mut self,
        event: &GestureEvent,
        pool: &PagesPool,
    ) -> Result<GestureOutcome, LookupError> {
        let left = pool.page_left(event.page_index)?;
        let Some(vm) = pool.page(event.page_index) else {
            return Ok(GestureOutcome::Ignored);
        };
        if vm.is_restricted() {
            tracing::debug!(page = event.page_index, "Pinch rejected on restricted page");
            self.phase = GesturePhase::Idle;
            return Ok(GestureOutcome::Rejected);
        }

        let rect = vm.screen_rect(left);
        self.start = Some(PinchStart {
            page_index: event.page_index,
            origin: Point::new(
                event.center.x - rect.horizontal.left(),
                event.center.y - rect.vertical.top(),
            ),
            base_zoom: vm.zoom.clone(),
        });
        self.live_scale = 1.0;
        self.phase = GesturePhase::Active;
        Ok(GestureOutcome::Tracking)
    }

    /// Track the live scale on the page transform. Committed geometry is untouched.
    pub fn update(&mut self, event: &GestureEvent, pool: &mut PagesPool) -> GestureOutcome {
        let Some(start) = &self.start else {
            return GestureOutcome::Ignored;
        };
        self.live_scale = event.scale;
        if let Some(vm) = pool.page_mut(start.page_index) {
            vm.container.transform.scale = event.scale;
        }
        self.phase = GesturePhase::Tracking;
        GestureOutcome::Tracking
    }

    /// Resolve the release scale to a zoom, resize the page and announce it.
    ///
    /// # Errors
    ///
    /// [`LookupError::ZoomNotFound`] when the page's zoom is not in the zoom list.
    pub fn end(
        &mut self,
        event: &GestureEvent,
        pool: &mut PagesPool,
        zoom_info: &mut ZoomInfo,
        bus: &mut EventBus,
    ) -> Result<GestureOutcome, LookupError> {
        let Some(start) = self.start.take() else {
            return Ok(GestureOutcome::Ignored);
        };
        self.phase = GesturePhase::Idle;
        self.live_scale = 1.0;

        let zoom = zoom_info.find_zoom(event.scale, SearchMode::All, &start.base_zoom)?;
        let scale = pool.apply_zoom(start.page_index, zoom.clone())?;
        tracing::debug!(page = start.page_index, %zoom, %scale, "Pinch committed");
        zoom_info.set_current(zoom);
        bus.publish(ReaderEvent::PageChanged(vec![start.page_index]));
        Ok(GestureOutcome::Committed)
    }
}
