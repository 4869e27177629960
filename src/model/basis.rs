//! Reference measurements used to fit article content into a column grid.

use super::geometry::Size;

/// Reference measurement set.
///
/// Supplied pre-aligned by the measurement provider: `block_max.height` is an exact multiple
/// of `line.height`. The layout engine relies on this and does not re-validate it.
///
/// A basis is an immutable value passed explicitly to every layout function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    /// Size of one text line (width = text measure, height = line height).
    pub line: Size,
    /// Size of a column slot, including gutters.
    pub column: Size,
    /// Largest block area a column can hold.
    pub block_max: Size,
}

impl Basis {
    /// Create a basis from its three measurements.
    pub const fn new(line: Size, column: Size, block_max: Size) -> Self {
        Self {
            line,
            column,
            block_max,
        }
    }

    /// Line height.
    pub fn line_height(&self) -> f64 {
        self.line.height
    }

    /// Line width.
    pub fn line_width(&self) -> f64 {
        self.line.width
    }

    /// Height a column may be filled to.
    pub fn max_column_height(&self) -> f64 {
        self.block_max.height
    }

    /// Round `height` down to a whole number of lines.
    pub fn floor_to_lines(&self, height: f64) -> f64 {
        let line = self.line_height();
        if line <= 0.0 {
            return height;
        }
        (height / line).floor() * line
    }

    /// Padding needed to bring `height` up to the next whole number of lines.
    ///
    /// Always in `[0, line_height)`.
    pub fn filler_for(&self, height: f64) -> f64 {
        let line = self.line_height();
        if line <= 0.0 {
            return 0.0;
        }
        let remainder = height % line;
        if remainder == 0.0 {
            0.0
        } else {
            line - remainder
        }
    }
}
