//! Issue reader: the aggregate the presentation layer drives.
//!
//! Owns the issue, the pages pool, the event bus and the gesture handlers. Gestures are fed
//! in through [`IssueReader::handle_gesture`]; the rendering layer listens on
//! [`IssueReader::events_mut`] and reports finished animations back through
//! [`IssueReader::complete_animation`].

use std::time::Duration;

use crate::config::ResolvedConfig;
use crate::images::{self, ImageLoader, LoadSummary, WindowLoadError};
use crate::model::{IssueInfo, ReaderError, Size, ZoomInfo};
use crate::view_state::{PagesPool, PoolWindow};

use super::events::{EventBus, ReaderEvent};
use super::gesture::{GestureEvent, GestureKind, GestureOutcome};
use super::momentum::{momentum, Momentum, MomentumConfig};
use super::pan_handler::{PanHandler, PanSettings};
use super::pinch_handler::PinchHandler;

/// Reader tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderSettings {
    /// Pool window capacity.
    pub capacity: usize,
    /// Swipe detection and animation timing.
    pub pan: PanSettings,
    /// Fling projection.
    pub momentum: MomentumConfig,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            capacity: 5,
            pan: PanSettings::default(),
            momentum: MomentumConfig::default(),
        }
    }
}

impl From<&ResolvedConfig> for ReaderSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            capacity: config.pool_capacity,
            pan: PanSettings {
                swipe_threshold: Duration::from_millis(config.swipe_threshold_ms),
                animation: Duration::from_millis(config.animation_ms),
            },
            momentum: MomentumConfig {
                deceleration: config.deceleration,
                min_distance: config.momentum_min_distance,
                max_distance: config.momentum_max_distance,
            },
        }
    }
}

impl From<WindowLoadError> for ReaderError {
    fn from(err: WindowLoadError) -> Self {
        match err {
            WindowLoadError::Lookup(err) => err.into(),
            WindowLoadError::Load(err) => err.into(),
        }
    }
}

/// Paginated issue viewer state.
#[derive(Debug)]
pub struct IssueReader {
    issue: IssueInfo,
    viewport: Size,
    settings: ReaderSettings,
    pool: PagesPool,
    bus: EventBus,
    pan: PanHandler,
    pinch: PinchHandler,
}

impl IssueReader {
    /// Open `issue` in `viewport` at the default zoom, showing the first page.
    ///
    /// # Errors
    ///
    /// [`ReaderError::Lookup`] if no page can be shown, which only happens for pages of
    /// zero width.
    pub fn new(
        mut issue: IssueInfo,
        viewport: Size,
        settings: ReaderSettings,
    ) -> Result<Self, ReaderError> {
        let zoom = issue.zoom_info(viewport).default_zoom().clone();
        let mut pool = PagesPool::new(&issue, &zoom, viewport, settings.capacity);
        let window = pool.set_offset(pool.clamp_offset(0.0))?;
        tracing::debug!(
            issue = issue.issue_id(),
            pages = issue.page_count(),
            %zoom,
            start = window.start,
            end = window.end,
            "Issue opened"
        );

        Ok(Self {
            issue,
            viewport,
            settings,
            pool,
            bus: EventBus::new(),
            pan: PanHandler::new(settings.pan),
            pinch: PinchHandler::new(),
        })
    }

    /// Issue metadata.
    pub fn issue(&self) -> &IssueInfo {
        &self.issue
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Reader tuning.
    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Pages pool.
    pub fn pool(&self) -> &PagesPool {
        &self.pool
    }

    /// Zoom catalog for the current viewport.
    pub fn zoom_info(&mut self) -> &ZoomInfo {
        self.issue.zoom_info(self.viewport)
    }

    /// Event bus for observer registration.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// True while a page transition animation runs.
    pub fn is_animating(&self) -> bool {
        self.pan.is_animating()
    }

    /// Route one gesture event to its handler.
    ///
    /// Every gesture is ignored while an animation runs.
    ///
    /// # Errors
    ///
    /// [`ReaderError::Lookup`] for contract violations: an unknown page index, or a page
    /// whose zoom is missing from the zoom list.
    pub fn handle_gesture(&mut self, event: &GestureEvent) -> Result<GestureOutcome, ReaderError> {
        if self.pan.is_animating() {
            return Ok(GestureOutcome::Ignored);
        }

        let outcome = match event.kind {
            GestureKind::PanStart => self.pan.start(event, &self.pool),
            GestureKind::PanMove => self.pan.update(event, &mut self.pool, &mut self.bus),
            GestureKind::PanEnd => self.pan.end(event, &mut self.pool, &mut self.bus)?,
            GestureKind::PinchStart => self.pinch.start(event, &self.pool)?,
            GestureKind::PinchMove => self.pinch.update(event, &mut self.pool),
            GestureKind::PinchEnd => {
                let zoom_info = self.issue.zoom_info(self.viewport);
                self.pinch
                    .end(event, &mut self.pool, zoom_info, &mut self.bus)?
            }
        };
        Ok(outcome)
    }

    /// Commit the running page transition. `None` when nothing was animating.
    pub fn complete_animation(&mut self) -> Result<Option<PoolWindow>, ReaderError> {
        Ok(self.pan.complete_animation(&mut self.pool, &mut self.bus)?)
    }

    /// Center page `index` without animation.
    ///
    /// # Errors
    ///
    /// [`ReaderError::Lookup`] for an index outside the issue.
    pub fn go_to_page(&mut self, index: usize) -> Result<PoolWindow, ReaderError> {
        let offset = self.pool.clamp_offset(self.pool.centering_offset(index)?);
        let window = self.pool.set_offset(offset)?;
        self.bus
            .publish(ReaderEvent::PageChanged(window.range().collect()));
        Ok(window)
    }

    /// Reset every materialized page to its default zoom.
    ///
    /// Pages that left the window keep their view model, so they are reset too.
    pub fn reset_zoom(&mut self) -> Result<(), ReaderError> {
        if self.pool.window().is_none() {
            return Ok(());
        }
        let zoom_info = self.issue.zoom_info(self.viewport);
        let zoom = zoom_info.default_zoom().clone();
        zoom_info.set_current(zoom.clone());

        for index in self.pool.materialized_indices() {
            self.pool.apply_zoom(index, zoom.clone())?;
        }
        let window = self.pool.set_offset(self.pool.clamp_offset(self.pool.offset()))?;
        self.bus
            .publish(ReaderEvent::PageChanged(window.range().collect()));
        Ok(())
    }

    /// Fling projection for a drag of `distance` px over `time`.
    pub fn fling(&self, distance: f64, time: Duration) -> Momentum {
        momentum(distance, time, &self.settings.momentum)
    }

    /// Load images for every page of the current window.
    ///
    /// # Errors
    ///
    /// [`ReaderError::ImageLoad`] with the first loader rejection.
    pub async fn load_window_images<L>(&mut self, loader: &L) -> Result<LoadSummary, ReaderError>
    where
        L: ImageLoader + ?Sized,
    {
        let issue_id = self.issue.issue_id().to_string();
        Ok(images::load_window_images(&mut self.pool, &issue_id, loader, &mut self.bus).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Breakpoints, IssuePage, Point};
    use std::cell::RefCell;
    use std::rc::Rc;

    const VIEWPORT: Size = Size::new(600.0, 800.0);

    fn issue(pages: usize) -> IssueInfo {
        let pages = (0..pages)
            .map(|i| IssuePage::new(i as u32 + 1, Size::new(1000.0, 2000.0), 0))
            .collect();
        IssueInfo::new(
            "issue",
            Breakpoints::new(vec![400, 600, 800], vec![600, 800, 1000, 1600]),
            vec![],
            pages,
        )
        .unwrap()
    }

    fn reader(pages: usize) -> IssueReader {
        IssueReader::new(issue(pages), VIEWPORT, ReaderSettings::default()).unwrap()
    }

    fn page_changes(reader: &mut IssueReader) -> Rc<RefCell<Vec<Vec<usize>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        reader
            .events_mut()
            .on_page_changed(move |pages| sink.borrow_mut().push(pages.to_vec()));
        seen
    }

    #[test]
    fn opens_on_first_page() {
        let reader = reader(10);
        let window = reader.pool().window().unwrap();
        assert_eq!(window.first_visible, 0);
        assert_eq!(window.range(), 0..=4);
        assert_eq!(reader.pool().offset(), 0.0);
    }

    #[test]
    fn settings_follow_config() {
        let config = ResolvedConfig {
            pool_capacity: 7,
            swipe_threshold_ms: 150,
            ..ResolvedConfig::default()
        };
        let settings = ReaderSettings::from(&config);
        assert_eq!(settings.capacity, 7);
        assert_eq!(settings.pan.swipe_threshold, Duration::from_millis(150));
        assert_eq!(settings.momentum.max_distance, 2000.0);
    }

    #[test]
    fn go_to_page_centers_and_notifies() {
        let mut reader = reader(10);
        let seen = page_changes(&mut reader);

        let window = reader.go_to_page(5).unwrap();

        // Page 5 spans [2000, 2400): (600 - 400) / 2 - 2000
        assert_eq!(reader.pool().offset(), -1900.0);
        assert_eq!(window.visible(), 4..=6);
        assert_eq!(seen.borrow().as_slice(), &[(3..=7).collect::<Vec<_>>()]);
    }

    #[test]
    fn gestures_are_ignored_while_animating() {
        let mut reader = reader(10);
        let start = GestureEvent::new(GestureKind::PanStart, 0);
        let end = GestureEvent::new(GestureKind::PanEnd, 0)
            .with_delta(-60.0, 0.0)
            .with_time(Duration::from_millis(80));

        reader.handle_gesture(&start).unwrap();
        assert_eq!(
            reader.handle_gesture(&end).unwrap(),
            GestureOutcome::Animating { target: 1 }
        );
        assert!(reader.is_animating());
        assert_eq!(
            reader.handle_gesture(&start).unwrap(),
            GestureOutcome::Ignored
        );

        reader.complete_animation().unwrap();
        assert!(!reader.is_animating());
        assert_eq!(reader.pool().offset(), -300.0);
    }

    #[test]
    fn pinch_zooms_single_page_then_reset() {
        let mut reader = reader(10);
        let seen = page_changes(&mut reader);
        let center = Point::new(200.0, 400.0);

        reader
            .handle_gesture(&GestureEvent::new(GestureKind::PinchStart, 0).with_pinch(center, 1.0))
            .unwrap();
        reader
            .handle_gesture(&GestureEvent::new(GestureKind::PinchMove, 0).with_pinch(center, 1.6))
            .unwrap();
        let outcome = reader
            .handle_gesture(&GestureEvent::new(GestureKind::PinchEnd, 0).with_pinch(center, 2.0))
            .unwrap();

        assert_eq!(outcome, GestureOutcome::Committed);
        assert_eq!(reader.pool().page(0).unwrap().zoom.max_height, 1600);
        assert_eq!(reader.pool().page_width(0).unwrap(), 800.0);
        assert_eq!(reader.pool().page_width(1).unwrap(), 400.0);
        assert_eq!(seen.borrow().as_slice(), &[vec![0]]);

        reader.reset_zoom().unwrap();
        assert_eq!(reader.pool().page_width(0).unwrap(), 400.0);
        assert_eq!(reader.zoom_info().current().max_height, 800);
    }

    #[test]
    fn reset_reaches_pages_outside_the_window() {
        let mut reader = reader(10);
        let center = Point::new(200.0, 400.0);
        reader
            .handle_gesture(&GestureEvent::new(GestureKind::PinchStart, 0).with_pinch(center, 1.0))
            .unwrap();
        reader
            .handle_gesture(&GestureEvent::new(GestureKind::PinchEnd, 0).with_pinch(center, 2.0))
            .unwrap();
        assert_eq!(reader.pool().page_width(0).unwrap(), 800.0);

        let window = reader.go_to_page(9).unwrap();
        assert!(!window.range().contains(&0));
        assert!(reader.pool().page(0).is_some());

        reader.reset_zoom().unwrap();

        let page = reader.pool().page(0).unwrap();
        assert_eq!(page.zoom.max_height, 800);
        assert_eq!(reader.pool().page_width(0).unwrap(), 400.0);
        assert_eq!(reader.zoom_info().current().max_height, 800);
    }

    #[test]
    fn unknown_page_is_lookup_error() {
        let mut reader = reader(3);
        let err = reader.go_to_page(9).unwrap_err();
        assert!(matches!(err, ReaderError::Lookup(_)));
    }

    #[test]
    fn fling_uses_configured_bounds() {
        let reader = reader(3);
        let fling = reader.fling(-5000.0, Duration::from_millis(100));
        assert!((fling.distance + 2000.0).abs() < 1e-6);
    }
}
