//! Block measurement.
//!
//! Text and title sizes come from a [`Measure`] provider (the renderer in production). Image
//! sizes never do: they follow from [`ImageBlock::adjust`](crate::model::ImageBlock::adjust).

use crate::model::{Basis, Block, BlockKind, LayoutError, Size};

/// Measurement provider for title and text blocks.
pub trait Measure {
    /// Measured size of `block` rendered with `basis`.
    ///
    /// Never called for image blocks.
    fn measure(&self, block: &Block, basis: &Basis) -> Result<Size, LayoutError>;
}

/// Built-in estimator: every character takes `avg_char_width * line_height` pixels and every
/// paragraph or title line occupies whole lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Average character width as a fraction of the line height.
    pub avg_char_width: f64,
}

impl LineMetrics {
    /// New estimator.
    pub fn new(avg_char_width: f64) -> Self {
        Self { avg_char_width }
    }

    fn lines_for(&self, text: &str, basis: &Basis) -> f64 {
        let char_width = self.avg_char_width * basis.line_height();
        let per_line = if char_width > 0.0 {
            (basis.line_width() / char_width).floor().max(1.0)
        } else {
            f64::INFINITY
        };
        let chars = text.chars().count() as f64;
        (chars / per_line).ceil().max(1.0)
    }
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Measure for LineMetrics {
    fn measure(&self, block: &Block, basis: &Basis) -> Result<Size, LayoutError> {
        let lines = match &block.kind {
            BlockKind::Title(title) => title
                .lines()
                .iter()
                .map(|line| self.lines_for(line, basis))
                .sum(),
            BlockKind::Text(text) => self.lines_for(&text.text, basis),
            BlockKind::Image(_) => {
                return Err(LayoutError::Measure(
                    "image blocks are sized by adjust".to_string(),
                ))
            }
        };
        Ok(Size::new(basis.line_width(), lines * basis.line_height()))
    }
}

/// Assign a fresh size to `block`.
pub(crate) fn measure_block<M: Measure + ?Sized>(
    block: &mut Block,
    basis: &Basis,
    measure: &M,
) -> Result<(), LayoutError> {
    let size = match &mut block.kind {
        BlockKind::Image(image) => image.adjust(basis),
        _ => measure.measure(block, basis)?,
    };
    block.size = Some(size);
    block.filler = 0.0;
    Ok(())
}
