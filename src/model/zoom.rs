//! Discrete zoom levels and zoom resolution.
//!
//! A [`ZoomInfo`] is built once per (issue, viewport) pair. It holds a default
//! fit-to-height zoom, a filtered ladder of normal zooms followed by the magnifier zooms,
//! and the list of every zoom without the minimum-step filter.
//!
//! [`ZoomInfo::find_zoom`] resolves a requested relative scale (from a pinch) to a ladder
//! entry by walking from the base zoom in the direction of the requested change and
//! stopping at the first local minimum of the height distance.

use std::fmt;

use super::error::{LookupError, ValidationError};
use super::geometry::Size;

/// Minimum relative height step between ladder zooms without enough magnifier sizes to
/// derive one.
pub const DEFAULT_MIN_SCALE_DELTA: f64 = 0.25;

/// Zoom type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomKind {
    /// Whole-page image scaled to the zoom box.
    Normal,
    /// Tiled detail images.
    Magnifier,
}

/// Immutable zoom descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Zoom {
    /// Width of the zoom box.
    pub max_width: u32,
    /// Height of the zoom box.
    pub max_height: u32,
    /// Zoom type.
    pub kind: ZoomKind,
    /// Fit the page to the box height.
    pub fit_to_height: bool,
    /// Allow scales above the page's unrestricted cap.
    pub disable_restricted_scales: bool,
}

impl Zoom {
    /// New zoom with both flags cleared.
    pub fn new(max_width: u32, max_height: u32, kind: ZoomKind) -> Self {
        Self {
            max_width,
            max_height,
            kind,
            fit_to_height: false,
            disable_restricted_scales: false,
        }
    }

    /// Normal fit-to-height zoom for a viewport box.
    pub fn fit_to_height(max_width: u32, max_height: u32) -> Self {
        Self {
            fit_to_height: true,
            ..Self::new(max_width, max_height, ZoomKind::Normal)
        }
    }

    /// Validated construction from optional parts.
    ///
    /// Fails naming the first absent field: `maxWidth`, `maxHeight`, then `zoomType`.
    pub fn from_parts(
        max_width: Option<u32>,
        max_height: Option<u32>,
        kind: Option<ZoomKind>,
    ) -> Result<Self, ValidationError> {
        let max_width = max_width.ok_or(ValidationError::MissingField { field: "maxWidth" })?;
        let max_height = max_height.ok_or(ValidationError::MissingField { field: "maxHeight" })?;
        let kind = kind.ok_or(ValidationError::MissingField { field: "zoomType" })?;
        Ok(Self::new(max_width, max_height, kind))
    }

    /// Copy with `disable_restricted_scales` set.
    pub fn with_restricted_scales_disabled(mut self) -> Self {
        self.disable_restricted_scales = true;
        self
    }

    /// True for magnifier zooms.
    pub fn is_magnifier(&self) -> bool {
        self.kind == ZoomKind::Magnifier
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ZoomKind::Normal => "normal",
            ZoomKind::Magnifier => "magnifier",
        };
        write!(f, "{kind} {}x{}", self.max_width, self.max_height)?;
        if self.fit_to_height {
            write!(f, " (fit)")?;
        }
        Ok(())
    }
}

/// Which zoom list [`ZoomInfo::find_zoom`] walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// The unfiltered list of every zoom.
    All,
    /// The filtered ladder.
    Ladder,
}

/// Zoom catalog for one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomInfo {
    default_zoom: Zoom,
    zooms: Vec<Zoom>,
    all_zooms: Vec<Zoom>,
    current: Zoom,
    min_scale_delta: f64,
}

impl ZoomInfo {
    /// Build the catalog for a `viewport_width` x `viewport_height` box.
    pub fn build(
        breakpoints: &super::issue::Breakpoints,
        magnifier_sizes: &[Size],
        viewport_width: u32,
        viewport_height: u32,
    ) -> Self {
        let viewport_height = viewport_height.max(1);
        let default_zoom = Zoom::fit_to_height(viewport_width, viewport_height);
        let normal_for = |height: u32| {
            let width = (f64::from(height) * f64::from(viewport_width) / f64::from(viewport_height))
                .ceil() as u32;
            Zoom::new(width, height, ZoomKind::Normal)
        };

        let mut magnifiers: Vec<Zoom> = magnifier_sizes
            .iter()
            .map(|size| {
                Zoom::new(
                    size.width.round() as u32,
                    size.height.round() as u32,
                    ZoomKind::Magnifier,
                )
            })
            .collect();
        magnifiers.sort_by_key(|zoom| zoom.max_height);
        magnifiers.dedup_by_key(|zoom| zoom.max_height);

        let magnifier_heights: Vec<u32> = magnifiers.iter().map(|zoom| zoom.max_height).collect();
        let min_scale_delta = min_scale_delta(&magnifier_heights);
        let magnifier_floor = magnifier_heights.first().copied().unwrap_or(u32::MAX);

        let mut zooms = vec![default_zoom.clone()];
        let mut last_height = viewport_height;
        for &height in breakpoints.heights() {
            if height <= viewport_height || height >= magnifier_floor {
                continue;
            }
            if f64::from(height) >= f64::from(last_height) * (1.0 + min_scale_delta) {
                zooms.push(normal_for(height));
                last_height = height;
            }
        }
        for magnifier in &magnifiers {
            if magnifier.max_height > last_height {
                zooms.push(magnifier.clone());
                last_height = magnifier.max_height;
            }
        }

        // Normal heights stop below the first magnifier, as on the ladder, so every ladder
        // zoom appears here unchanged and heights stay unique.
        let mut all_zooms = vec![default_zoom.clone()];
        all_zooms.extend(
            breakpoints
                .heights()
                .iter()
                .filter(|&&height| height != viewport_height && height < magnifier_floor)
                .map(|&height| normal_for(height)),
        );
        all_zooms.extend(
            magnifiers
                .iter()
                .filter(|zoom| zoom.max_height != viewport_height)
                .cloned(),
        );
        all_zooms.sort_by_key(|zoom| zoom.max_height);
        all_zooms.dedup_by_key(|zoom| zoom.max_height);

        tracing::debug!(
            ladder = zooms.len(),
            all = all_zooms.len(),
            min_scale_delta,
            "Zoom info built"
        );

        Self {
            current: default_zoom.clone(),
            default_zoom,
            zooms,
            all_zooms,
            min_scale_delta,
        }
    }

    /// Fit-to-height zoom for the viewport.
    pub fn default_zoom(&self) -> &Zoom {
        &self.default_zoom
    }

    /// Filtered ladder, strictly increasing by height.
    pub fn zooms(&self) -> &[Zoom] {
        &self.zooms
    }

    /// Every zoom without the minimum-step filter, strictly increasing by height.
    ///
    /// Normal heights at or above the first magnifier are left out, so each ladder zoom is
    /// also an entry of this list.
    pub fn all_zooms(&self) -> &[Zoom] {
        &self.all_zooms
    }

    /// Minimum relative height step used to filter the ladder.
    pub fn min_scale_delta(&self) -> f64 {
        self.min_scale_delta
    }

    /// Currently selected zoom.
    pub fn current(&self) -> &Zoom {
        &self.current
    }

    /// Select a zoom.
    pub fn set_current(&mut self, zoom: Zoom) {
        self.current = zoom;
    }

    fn list(&self, mode: SearchMode) -> &[Zoom] {
        match mode {
            SearchMode::All => &self.all_zooms,
            SearchMode::Ladder => &self.zooms,
        }
    }

    /// Resolve `target_scale` relative to `base` to a zoom of the chosen list.
    ///
    /// Walks upward when `target_scale > 1`, downward otherwise, and stops as soon as the
    /// next step would not bring the height closer to `target_scale * base.max_height`.
    /// Ties stop the walk.
    ///
    /// # Errors
    ///
    /// [`LookupError::ZoomNotFound`] if no zoom in the list has `base.max_height`.
    pub fn find_zoom(
        &self,
        target_scale: f64,
        mode: SearchMode,
        base: &Zoom,
    ) -> Result<Zoom, LookupError> {
        let list = self.list(mode);
        let start = list
            .iter()
            .position(|zoom| zoom.max_height == base.max_height)
            .ok_or(LookupError::ZoomNotFound {
                max_height: base.max_height,
            })?;

        let goal = target_scale * f64::from(base.max_height);
        let distance = |index: usize| (goal - f64::from(list[index].max_height)).abs();
        let upward = target_scale > 1.0;

        let mut index = start;
        loop {
            let next = if upward {
                index + 1
            } else {
                match index.checked_sub(1) {
                    Some(next) => next,
                    None => break,
                }
            };
            if next >= list.len() || distance(next) >= distance(index) {
                break;
            }
            index = next;
        }

        tracing::debug!(
            target_scale,
            from = base.max_height,
            to = list[index].max_height,
            "Zoom resolved"
        );
        Ok(list[index].clone())
    }
}

/// Half the smallest relative step between adjacent magnifier heights.
fn min_scale_delta(magnifier_heights: &[u32]) -> f64 {
    magnifier_heights
        .windows(2)
        .map(|pair| (f64::from(pair[1]) / f64::from(pair[0]) - 1.0) / 2.0)
        .reduce(f64::min)
        .unwrap_or(DEFAULT_MIN_SCALE_DELTA)
}
