//! Pages pool: a bounded window of page view models around the current offset.
//!
//! Pages sit side by side on a horizontal strip; the container translate moves the strip
//! under the viewport. [`PagesPool::set_offset`] finds the pages overlapping the viewport,
//! centers a window of `capacity` pages on them and materializes the view models inside it.
//! View models are created lazily the first time their page enters the window and are kept
//! afterwards; a page leaving the window is marked invisible and releases its image.

use std::ops::RangeInclusive;

use crate::model::{Breakpoints, IssueInfo, IssuePage, LookupError, Point, Rect, Scale, Size, Zoom};

use super::page::IssuePageViewModel;
use super::strip_index::StripIndex;

/// Result of a window recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolWindow {
    /// First page overlapping the viewport.
    pub first_visible: usize,
    /// Last page overlapping the viewport.
    pub last_visible: usize,
    /// `(first_visible + last_visible) / 2`.
    pub center: usize,
    /// First materialized page.
    pub start: usize,
    /// Last materialized page.
    pub end: usize,
}

impl PoolWindow {
    /// Materialized indices.
    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Indices overlapping the viewport.
    pub fn visible(&self) -> RangeInclusive<usize> {
        self.first_visible..=self.last_visible
    }

    /// Number of materialized pages.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false: a window holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Window bounds of exactly `capacity` pages (or every page) centered on `center`.
fn window_bounds(center: usize, capacity: usize, len: usize) -> (usize, usize) {
    let capacity = capacity.clamp(1, len);
    let mut start = center.saturating_sub(capacity / 2);
    if start + capacity > len {
        start = len - capacity;
    }
    (start, start + capacity - 1)
}

/// Page view models of one issue plus the materialized window.
#[derive(Debug, Clone)]
pub struct PagesPool {
    pages: Vec<IssuePage>,
    breakpoints: Breakpoints,
    default_zoom: Zoom,
    view_models: Vec<Option<IssuePageViewModel>>,
    strip: StripIndex,
    capacity: usize,
    viewport: Size,
    offset: f64,
    window: Option<PoolWindow>,
}

impl PagesPool {
    /// Pool over every page of `issue` at `zoom` for `viewport`.
    ///
    /// Nothing is materialized until the first [`PagesPool::set_offset`].
    pub fn new(issue: &IssueInfo, zoom: &Zoom, viewport: Size, capacity: usize) -> Self {
        let breakpoints = issue.breakpoints().clone();
        let strip = StripIndex::from_widths(issue.pages().iter().map(|page| {
            let scale = page.zoom_scale(&breakpoints, zoom);
            scale.apply(page.size).width.max(0.0) as usize
        }));

        Self {
            pages: issue.pages().to_vec(),
            breakpoints,
            default_zoom: zoom.clone(),
            view_models: vec![None; issue.page_count()],
            strip,
            capacity: capacity.max(1),
            viewport,
            offset: 0.0,
            window: None,
        }
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True for an issue without pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Maximum number of materialized pages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Current container offset (translate-left of the strip).
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Window of the last [`PagesPool::set_offset`].
    pub fn window(&self) -> Option<PoolWindow> {
        self.window
    }

    /// Width breakpoints and height breakpoints of the issue.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Materialized view model of page `index`.
    pub fn page(&self, index: usize) -> Option<&IssuePageViewModel> {
        self.view_models.get(index).and_then(Option::as_ref)
    }

    /// Mutable materialized view model of page `index`.
    pub fn page_mut(&mut self, index: usize) -> Option<&mut IssuePageViewModel> {
        self.view_models.get_mut(index).and_then(Option::as_mut)
    }

    /// Indices of pages currently marked visible.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.view_models
            .iter()
            .enumerate()
            .filter(|(_, vm)| vm.as_ref().is_some_and(IssuePageViewModel::is_visible))
            .map(|(index, _)| index)
            .collect()
    }

    /// Indices of every materialized page, inside the window or not.
    pub fn materialized_indices(&self) -> Vec<usize> {
        self.view_models
            .iter()
            .enumerate()
            .filter_map(|(index, vm)| vm.as_ref().map(|_| index))
            .collect()
    }

    /// Container width of page `index`.
    ///
    /// # Errors
    ///
    /// [`LookupError::PageOutOfRange`] for an index outside the issue.
    pub fn page_width(&self, index: usize) -> Result<f64, LookupError> {
        self.check(index)?;
        Ok(self.strip.width(index) as f64)
    }

    /// Screen-space left edge of page `index` at the current offset.
    pub fn page_left(&self, index: usize) -> Result<f64, LookupError> {
        self.check(index)?;
        Ok(self.strip.left_of(index) as f64 + self.offset)
    }

    /// Offset that centers page `index` in the viewport.
    pub fn centering_offset(&self, index: usize) -> Result<f64, LookupError> {
        self.check(index)?;
        let left = self.strip.left_of(index) as f64;
        let width = self.strip.width(index) as f64;
        Ok((self.viewport.width - width) / 2.0 - left)
    }

    /// Page under horizontal screen coordinate `x` at the current offset.
    pub fn page_at(&self, x: f64) -> Option<usize> {
        let strip_x = x - self.offset;
        if strip_x < 0.0 {
            return None;
        }
        self.strip.lower_bound(strip_x as usize)
    }

    /// Clamp `offset` so the strip covers the viewport; a strip narrower than the viewport
    /// is centered.
    pub fn clamp_offset(&self, offset: f64) -> f64 {
        let total = self.strip.total() as f64;
        if total <= self.viewport.width {
            return (self.viewport.width - total) / 2.0;
        }
        offset.clamp(self.viewport.width - total, 0.0)
    }

    fn check(&self, index: usize) -> Result<(), LookupError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(LookupError::PageOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    fn page_rect(&self, index: usize, left: f64, width: f64) -> Rect {
        match &self.view_models[index] {
            Some(vm) => vm.screen_rect(left),
            None => {
                let page = self.pages[index].size;
                let height = if page.width > 0.0 {
                    width * page.height / page.width
                } else {
                    page.height
                };
                Rect::new(Point::new(left, 0.0), Size::new(width, height))
            }
        }
    }

    /// Move the strip to `offset` without recomputing the window.
    ///
    /// Used while a pan is in progress; the window follows on the next
    /// [`PagesPool::set_offset`].
    pub fn move_to(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Move the strip to `offset` and recompute the window.
    ///
    /// Runs one linear pass over the pages. Idempotent for an unchanged offset.
    ///
    /// # Errors
    ///
    /// [`LookupError::NoVisiblePage`] when no page overlaps the viewport. Callers are expected
    /// to clamp the offset first (see [`PagesPool::clamp_offset`]); the pool state is left
    /// untouched on error.
    pub fn set_offset(&mut self, offset: f64) -> Result<PoolWindow, LookupError> {
        let viewport = Rect::new(Point::default(), self.viewport);

        let mut first_visible = None;
        let mut last_visible = None;
        let mut left = offset;
        for index in 0..self.len() {
            let width = self.strip.width(index) as f64;
            if self.page_rect(index, left, width).overlap(&viewport) {
                first_visible.get_or_insert(index);
                last_visible = Some(index);
            } else if last_visible.is_some() {
                break;
            }
            left += width;
        }

        let (Some(first_visible), Some(last_visible)) = (first_visible, last_visible) else {
            return Err(LookupError::NoVisiblePage { offset });
        };

        let center = (first_visible + last_visible) / 2;
        let (start, end) = window_bounds(center, self.capacity, self.len());
        let window = PoolWindow {
            first_visible,
            last_visible,
            center,
            start,
            end,
        };

        self.offset = offset;
        for index in 0..self.len() {
            let inside = window.range().contains(&index);
            if inside && self.view_models[index].is_none() {
                self.view_models[index] = Some(IssuePageViewModel::new(
                    index,
                    self.pages[index].clone(),
                    &self.breakpoints,
                    &self.default_zoom,
                    self.viewport,
                ));
            }
            if let Some(vm) = self.view_models[index].as_mut() {
                if !inside && vm.is_visible() {
                    vm.image.release();
                }
                vm.set_visible(inside);
            }
        }

        if self.window != Some(window) {
            tracing::debug!(
                offset,
                first_visible,
                last_visible,
                start,
                end,
                "Pool window recomputed"
            );
        }
        self.window = Some(window);
        Ok(window)
    }

    /// Switch page `index` to `zoom`, resizing its container and strip slot.
    ///
    /// # Errors
    ///
    /// [`LookupError::PageOutOfRange`] when the page is not materialized.
    pub fn apply_zoom(&mut self, index: usize, zoom: Zoom) -> Result<Scale, LookupError> {
        let len = self.len();
        let breakpoints = &self.breakpoints;
        let viewport = self.viewport;
        let vm = self
            .view_models
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(LookupError::PageOutOfRange { index, len })?;
        let scale = vm.apply_zoom(zoom, breakpoints, viewport);
        let width = vm.width_px();
        self.strip.set(index, width);
        Ok(scale)
    }
}
