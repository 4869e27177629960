//! Paginated issue model: page metadata, breakpoints and page-to-screen scale.

use std::fmt;

use super::error::{LookupError, ValidationError};
use super::geometry::Size;
use super::zoom::{Zoom, ZoomInfo, ZoomKind};

/// Page scale in whole percent (100 = natural size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Scale(u32);

impl Scale {
    /// Natural size.
    pub const NATURAL: Self = Self(100);

    /// Create a scale from a whole percentage.
    pub const fn new(percent: u32) -> Self {
        Self(percent)
    }

    /// Scale from a fractional factor, floored to a whole percent.
    pub fn from_factor_floor(factor: f64) -> Self {
        Self::from_factor_floor_exact(factor * 100.0)
    }

    /// `floor(100 * numerator / denominator)`.
    pub fn from_ratio_floor(numerator: f64, denominator: f64) -> Self {
        if denominator <= 0.0 {
            return Self(0);
        }
        Self::from_factor_floor_exact(100.0 * numerator / denominator)
    }

    fn from_factor_floor_exact(percent: f64) -> Self {
        Self((percent + 1e-9).floor().max(0.0) as u32)
    }

    /// `length` at this scale, without rounding.
    pub fn scale_length(&self, length: f64) -> f64 {
        length * f64::from(self.0) / 100.0
    }

    /// Whole percentage.
    pub fn percent(&self) -> u32 {
        self.0
    }

    /// Multiplicative factor (`percent / 100`).
    pub fn factor(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// `size` at this scale, floored to whole pixels.
    pub fn apply(&self, size: Size) -> Size {
        Size::new(
            self.scale_length(size.width).floor(),
            self.scale_length(size.height).floor(),
        )
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Pixel sizes at which page images exist on the server.
///
/// Both lists are sorted ascending and hold distinct values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakpoints {
    widths: Vec<u32>,
    heights: Vec<u32>,
}

impl Breakpoints {
    /// Build breakpoints, sorting and de-duplicating both lists.
    pub fn new(mut widths: Vec<u32>, mut heights: Vec<u32>) -> Self {
        widths.sort_unstable();
        widths.dedup();
        heights.sort_unstable();
        heights.dedup();
        Self { widths, heights }
    }

    /// Width breakpoints, ascending.
    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    /// Height breakpoints, ascending.
    pub fn heights(&self) -> &[u32] {
        &self.heights
    }
}

/// Static metadata of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuePage {
    /// 1-based page number.
    pub page_number: u32,
    /// Physical page size.
    pub size: Size,
    /// Largest scale (percent) allowed without restricted scales; 0 means no cap.
    pub max_unrestricted_scale: u32,
}

impl IssuePage {
    /// Create page metadata.
    pub fn new(page_number: u32, size: Size, max_unrestricted_scale: u32) -> Self {
        Self {
            page_number,
            size,
            max_unrestricted_scale,
        }
    }

    /// True when `scale` is allowed. The cap is ignored when restricted scales are enabled.
    fn within_cap(&self, scale: Scale, enable_restricted_scale: bool) -> bool {
        enable_restricted_scale
            || self.max_unrestricted_scale == 0
            || scale.percent() <= self.max_unrestricted_scale
    }

    /// Scale at which the page fits into `max_width` x `max_height`.
    ///
    /// Two independent searches run over the descending breakpoint lists: one by height
    /// (largest height breakpoint that fits, whose width also fits) and one by width. The
    /// larger of the two results wins. Without any result, the scale of the smallest height
    /// breakpoint is used.
    pub fn get_scale(
        &self,
        breakpoints: &Breakpoints,
        max_width: f64,
        max_height: f64,
        enable_restricted_scale: bool,
    ) -> Scale {
        let by_height = breakpoints
            .heights()
            .iter()
            .rev()
            .filter(|&&height| f64::from(height) <= max_height)
            .map(|&height| Scale::from_ratio_floor(f64::from(height), self.size.height))
            .find(|&scale| {
                scale.scale_length(self.size.width) <= max_width
                    && self.within_cap(scale, enable_restricted_scale)
            });

        let by_width = breakpoints
            .widths()
            .iter()
            .rev()
            .filter(|&&width| f64::from(width) <= max_width)
            .map(|&width| Scale::from_ratio_floor(f64::from(width), self.size.width))
            .find(|&scale| {
                scale.scale_length(self.size.height) <= max_height
                    && self.within_cap(scale, enable_restricted_scale)
            });

        match (by_height, by_width) {
            (Some(h), Some(w)) => h.max(w),
            (Some(scale), None) | (None, Some(scale)) => scale,
            (None, None) => {
                let smallest = breakpoints.heights().first().copied().unwrap_or(0);
                Scale::from_ratio_floor(f64::from(smallest), self.size.height)
            }
        }
    }

    /// Scale at which a magnifier zoom renders the page.
    pub fn magnifier_scale(&self, max_width: f64, max_height: f64) -> Scale {
        let factor = (max_width / self.size.width).min(max_height / self.size.height);
        Scale::from_factor_floor(factor)
    }

    /// Scale for `zoom`, dispatching on its kind.
    pub fn zoom_scale(&self, breakpoints: &Breakpoints, zoom: &Zoom) -> Scale {
        match zoom.kind {
            ZoomKind::Magnifier => {
                self.magnifier_scale(f64::from(zoom.max_width), f64::from(zoom.max_height))
            }
            ZoomKind::Normal => self.get_scale(
                breakpoints,
                f64::from(zoom.max_width),
                f64::from(zoom.max_height),
                zoom.disable_restricted_scales,
            ),
        }
    }
}

/// Paginated issue.
///
/// Caches one [`ZoomInfo`], keyed by the last requested viewport size.
#[derive(Debug, Clone)]
pub struct IssueInfo {
    issue_id: String,
    breakpoints: Breakpoints,
    magnifier_sizes: Vec<Size>,
    pages: Vec<IssuePage>,
    zoom_cache: Option<((u32, u32), ZoomInfo)>,
}

impl IssueInfo {
    /// Create an issue. At least one page and one height breakpoint are required.
    pub fn new(
        issue_id: impl Into<String>,
        breakpoints: Breakpoints,
        magnifier_sizes: Vec<Size>,
        pages: Vec<IssuePage>,
    ) -> Result<Self, ValidationError> {
        if pages.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "pages",
                reason: "issue has no pages".to_string(),
            });
        }
        if breakpoints.heights().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "heights",
                reason: "no height breakpoints".to_string(),
            });
        }

        Ok(Self {
            issue_id: issue_id.into(),
            breakpoints,
            magnifier_sizes,
            pages,
            zoom_cache: None,
        })
    }

    /// Issue identifier.
    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    /// Width/height breakpoints.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Magnifier page sizes as supplied.
    pub fn magnifier_sizes(&self) -> &[Size] {
        &self.magnifier_sizes
    }

    /// All pages in order.
    pub fn pages(&self) -> &[IssuePage] {
        &self.pages
    }

    /// Page at a 0-based index.
    pub fn page(&self, index: usize) -> Result<&IssuePage, LookupError> {
        self.pages.get(index).ok_or(LookupError::PageOutOfRange {
            index,
            len: self.pages.len(),
        })
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Scale of the page at `index` for `zoom`.
    pub fn zoom_scale(&self, index: usize, zoom: &Zoom) -> Result<Scale, LookupError> {
        Ok(self.page(index)?.zoom_scale(&self.breakpoints, zoom))
    }

    /// Zoom catalog for a viewport, rebuilt whenever a different size is requested.
    pub fn zoom_info(&mut self, viewport: Size) -> &mut ZoomInfo {
        let key = (viewport.width as u32, viewport.height as u32);
        if matches!(&self.zoom_cache, Some((cached, _)) if *cached != key) {
            self.zoom_cache = None;
        }

        let breakpoints = &self.breakpoints;
        let magnifier_sizes = &self.magnifier_sizes;
        let (_, info) = self.zoom_cache.get_or_insert_with(|| {
            tracing::debug!(width = key.0, height = key.1, "Rebuilding zoom info");
            (key, ZoomInfo::build(breakpoints, magnifier_sizes, key.0, key.1))
        });
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakpoints() -> Breakpoints {
        Breakpoints::new(vec![400, 600], vec![600, 800, 1000])
    }

    fn page() -> IssuePage {
        IssuePage::new(1, Size::new(1000.0, 2000.0), 0)
    }

    mod get_scale {
        use super::*;

        #[test]
        fn height_and_width_searches_agree() {
            let scale = page().get_scale(&breakpoints(), 600.0, 800.0, true);
            assert_eq!(scale, Scale::new(40));
        }

        #[test]
        fn larger_of_both_searches_wins() {
            // Height search: 1000 -> 50%, width 500 <= 700. Width search: 600 -> 60%, height
            // 1200 <= 1200. Max is 60.
            let scale = page().get_scale(&breakpoints(), 700.0, 1200.0, true);
            assert_eq!(scale, Scale::new(60));
        }

        #[test]
        fn falls_back_to_smallest_height() {
            let scale = page().get_scale(&breakpoints(), 100.0, 100.0, true);
            assert_eq!(scale, Scale::new(30));
        }

        #[test]
        fn unrestricted_cap_limits_scale() {
            let capped = IssuePage::new(1, Size::new(1000.0, 2000.0), 45);
            // Height 1000 -> 50% exceeds the cap, 800 -> 40% passes.
            let scale = capped.get_scale(&breakpoints(), 1000.0, 1000.0, false);
            assert_eq!(scale, Scale::new(40));
        }

        #[test]
        fn enabling_restricted_scales_ignores_cap() {
            let capped = IssuePage::new(1, Size::new(1000.0, 2000.0), 45);
            let scale = capped.get_scale(&breakpoints(), 1000.0, 1000.0, true);
            assert_eq!(scale, Scale::new(50));
        }
    }

    #[test]
    fn magnifier_scale_uses_tighter_axis() {
        assert_eq!(page().magnifier_scale(1500.0, 2400.0), Scale::new(120));
    }

    #[test]
    fn zoom_scale_dispatches_on_kind() {
        let magnifier = Zoom::new(1500, 2400, ZoomKind::Magnifier);
        let normal = Zoom::new(600, 800, ZoomKind::Normal);
        assert_eq!(page().zoom_scale(&breakpoints(), &magnifier), Scale::new(120));
        assert_eq!(page().zoom_scale(&breakpoints(), &normal), Scale::new(40));
    }

    #[test]
    fn new_rejects_empty_pages() {
        let err = IssueInfo::new("issue", breakpoints(), vec![], vec![]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "pages", .. }));
    }

    #[test]
    fn zoom_info_is_cached_per_viewport() {
        let mut issue = IssueInfo::new("issue", breakpoints(), vec![], vec![page()]).unwrap();
        let first = issue.zoom_info(Size::new(600.0, 800.0)).default_zoom().clone();
        issue.zoom_info(Size::new(600.0, 800.0)).set_current(first.clone());
        assert_eq!(issue.zoom_info(Size::new(600.0, 800.0)).current(), &first);

        let other = issue.zoom_info(Size::new(300.0, 400.0)).default_zoom().clone();
        assert_eq!(other.max_height, 400);
    }
}
