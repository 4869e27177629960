//! Per-page view model.
//!
//! An [`IssuePageViewModel`] keeps two copies of its geometry: `defaults`, computed once from
//! the page's natural scale, and the live `zoom`/`image`/`container` that gesture handlers
//! mutate. [`IssuePageViewModel::set_defaults`] resets the live copy.

use crate::images::LoadedImage;
use crate::model::{Breakpoints, IssuePage, Point, Rect, Scale, Size, Zoom};

use super::scroll::ScrollerPosition;

/// Page container geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Container {
    /// Container size at the page's current scale.
    pub size: Size,
    /// Container transform (page pan offset and live pinch scale).
    pub transform: ScrollerPosition,
    /// Offset of the page inside the viewport (vertical centering of short pages).
    pub offset: Point,
}

/// Last accepted page image.
///
/// Empty until the first load completes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageImage {
    /// Image URL.
    pub url: Option<String>,
    /// Scale the image was requested at.
    pub scale: Option<Scale>,
    /// Request timestamp of the accepted image.
    pub timestamp: Option<u64>,
}

impl PageImage {
    /// True once an image has been accepted.
    pub fn is_loaded(&self) -> bool {
        self.url.is_some()
    }

    /// Take `loaded` unless it is older than the image already held.
    ///
    /// Returns `false` for a stale response, which is dropped.
    pub fn accept(&mut self, loaded: &LoadedImage, scale: Scale) -> bool {
        if self.timestamp.is_some_and(|last| loaded.timestamp < last) {
            tracing::warn!(
                url = %loaded.url,
                timestamp = loaded.timestamp,
                "Discarding stale page image"
            );
            return false;
        }
        self.url = Some(loaded.url.clone());
        self.scale = Some(scale);
        self.timestamp = Some(loaded.timestamp);
        true
    }

    /// Forget the image. The timestamp is kept so older in-flight responses stay stale.
    pub fn release(&mut self) {
        self.url = None;
        self.scale = None;
    }
}

/// Values a page view model resets to.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDefaults {
    /// Zoom the page was created with.
    pub zoom: Zoom,
    /// Empty image.
    pub image: PageImage,
    /// Container at the natural scale.
    pub container: Container,
}

/// Live view state of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuePageViewModel {
    index: usize,
    page: IssuePage,
    natural_scale: Scale,
    scale: Scale,
    defaults: PageDefaults,
    /// Live zoom.
    pub zoom: Zoom,
    /// Live image.
    pub image: PageImage,
    /// Live container.
    pub container: Container,
    visible: bool,
}

fn container_for(page: &IssuePage, scale: Scale, viewport: Size) -> Container {
    let size = scale.apply(page.size);
    Container {
        size,
        transform: ScrollerPosition::default(),
        offset: Point::new(0.0, ((viewport.height - size.height) / 2.0).max(0.0).floor()),
    }
}

impl IssuePageViewModel {
    /// View model for page `index` at `zoom`.
    pub fn new(
        index: usize,
        page: IssuePage,
        breakpoints: &Breakpoints,
        zoom: &Zoom,
        viewport: Size,
    ) -> Self {
        let scale = page.zoom_scale(breakpoints, zoom);
        let container = container_for(&page, scale, viewport);
        let defaults = PageDefaults {
            zoom: zoom.clone(),
            image: PageImage::default(),
            container,
        };
        Self {
            index,
            page,
            natural_scale: scale,
            scale,
            zoom: defaults.zoom.clone(),
            image: defaults.image.clone(),
            container: defaults.container,
            defaults,
            visible: false,
        }
    }

    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Static page metadata.
    pub fn page(&self) -> &IssuePage {
        &self.page
    }

    /// Reset values.
    pub fn defaults(&self) -> &PageDefaults {
        &self.defaults
    }

    /// Scale at the default zoom.
    pub fn natural_scale(&self) -> Scale {
        self.natural_scale
    }

    /// Scale at the live zoom.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Whether the page is inside the pool window.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Reset live zoom, image and container from the defaults.
    pub fn set_defaults(&mut self) {
        self.zoom = self.defaults.zoom.clone();
        self.image = self.defaults.image.clone();
        self.container = self.defaults.container;
        self.scale = self.natural_scale;
    }

    /// True when sub-scale zoom is not permitted.
    ///
    /// That is the case when the page has an unrestricted-scale cap, its zoom does not lift
    /// it, and the natural scale already reaches the cap.
    pub fn is_restricted(&self) -> bool {
        let cap = self.page.max_unrestricted_scale;
        cap != 0 && !self.zoom.disable_restricted_scales && self.natural_scale.percent() >= cap
    }

    /// Switch to `zoom` and resize the container for its scale.
    ///
    /// The page pan offset is reset; the image is kept until a reload replaces it.
    pub fn apply_zoom(&mut self, zoom: Zoom, breakpoints: &Breakpoints, viewport: Size) -> Scale {
        self.scale = self.page.zoom_scale(breakpoints, &zoom);
        self.container = container_for(&self.page, self.scale, viewport);
        self.zoom = zoom;
        self.scale
    }

    /// Page rectangle in screen coordinates when its container starts at `left`.
    pub fn screen_rect(&self, left: f64) -> Rect {
        let top = self.container.offset.y + self.container.transform.translate.top;
        Rect::new(Point::new(left, top), self.container.size)
    }

    /// Container width in whole pixels.
    pub fn width_px(&self) -> usize {
        self.container.size.width.max(0.0) as usize
    }
}
