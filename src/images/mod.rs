//! Page image loading.
//!
//! The host supplies an [`ImageLoader`]; the reader asks it for every page in the pool
//! window at the page's current scale. Responses carry the timestamp of their request, and
//! a response older than the image a page already holds is dropped (see
//! [`PageImage::accept`](crate::view_state::PageImage::accept)). Load failures are handed
//! back to the caller unchanged; nothing is retried here.

use futures::future::LocalBoxFuture;

use crate::model::{HorizontalPosition, ImageLoadError, LookupError, Point, Rect, Scale, Size, VerticalPosition};
use crate::state::events::{EventBus, ReaderEvent};
use crate::view_state::PagesPool;

/// What to load for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Issue the page belongs to.
    pub issue_id: String,
    /// 0-based page index.
    pub page_index: usize,
    /// Scale to render at.
    pub scale: Scale,
    /// Visible part of the page in page coordinates; set for magnifier zooms only.
    pub rect: Option<Rect>,
    /// Magnifier layer (the zoom height); set for magnifier zooms only.
    pub layer: Option<u32>,
}

/// Completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Image URL.
    pub url: String,
    /// Start time of the request that produced this image.
    pub timestamp: u64,
}

/// Future returned by [`ImageLoader::load`].
pub type ImageFuture<'a> = LocalBoxFuture<'a, Result<LoadedImage, ImageLoadError>>;

/// Host-provided image source.
pub trait ImageLoader {
    /// Start loading `request`.
    fn load(&self, request: ImageRequest) -> ImageFuture<'_>;
}

/// Counts from one [`load_window_images`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Requests issued.
    pub requested: usize,
    /// Responses stored on their page.
    pub accepted: usize,
    /// Responses dropped as stale.
    pub stale: usize,
}

/// Error from [`load_window_images`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WindowLoadError {
    /// A page left the pool between request and response.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// The loader rejected a request.
    #[error(transparent)]
    Load(#[from] ImageLoadError),
}

/// Build the request for page `index` of the current window.
///
/// # Errors
///
/// [`LookupError::PageOutOfRange`] when the page is not materialized.
pub fn request_for(
    pool: &PagesPool,
    issue_id: &str,
    index: usize,
) -> Result<ImageRequest, LookupError> {
    let len = pool.len();
    let vm = pool
        .page(index)
        .ok_or(LookupError::PageOutOfRange { index, len })?;

    let (rect, layer) = if vm.zoom.is_magnifier() {
        let left = pool.page_left(index)?;
        (visible_part(vm.screen_rect(left), pool.viewport()), Some(vm.zoom.max_height))
    } else {
        (None, None)
    };

    Ok(ImageRequest {
        issue_id: issue_id.to_string(),
        page_index: index,
        scale: vm.scale(),
        rect,
        layer,
    })
}

/// Part of `page` (screen coordinates) inside the viewport, relative to the page origin.
fn visible_part(page: Rect, viewport: Size) -> Option<Rect> {
    let screen = Rect::new(Point::default(), viewport);
    let horizontal = page.horizontal.intersection(&screen.horizontal)?;
    let vertical = page.vertical.intersection(&screen.vertical)?;
    let (left, top) = (page.horizontal.left(), page.vertical.top());
    Some(Rect {
        horizontal: HorizontalPosition::new(horizontal.left() - left, horizontal.right() - left),
        vertical: VerticalPosition::new(vertical.top() - top, vertical.bottom() - top),
    })
}

/// Load an image for every page of the pool window, one request at a time.
///
/// Publishes `ALL_IMAGES_LOADED` once every page of the window holds an image.
///
/// # Errors
///
/// The first loader rejection, as [`WindowLoadError::Load`]. Pages loaded before it keep
/// their images.
pub async fn load_window_images<L>(
    pool: &mut PagesPool,
    issue_id: &str,
    loader: &L,
    bus: &mut EventBus,
) -> Result<LoadSummary, WindowLoadError>
where
    L: ImageLoader + ?Sized,
{
    let mut summary = LoadSummary::default();
    let Some(window) = pool.window() else {
        return Ok(summary);
    };

    for index in window.range() {
        let request = request_for(pool, issue_id, index)?;
        let scale = request.scale;
        summary.requested += 1;

        let loaded = loader.load(request).await?;

        let len = pool.len();
        let vm = pool
            .page_mut(index)
            .ok_or(LookupError::PageOutOfRange { index, len })?;
        if vm.image.accept(&loaded, scale) {
            summary.accepted += 1;
        } else {
            summary.stale += 1;
        }
    }

    let complete = window
        .range()
        .all(|index| pool.page(index).is_some_and(|vm| vm.image.is_loaded()));
    if complete {
        bus.publish(ReaderEvent::AllImagesLoaded);
    }

    tracing::debug!(
        requested = summary.requested,
        accepted = summary.accepted,
        stale = summary.stale,
        "Window images loaded"
    );
    Ok(summary)
}
