//! Column layout strategies.
//!
//! - [`build_bulk`]: every block in one column, no measurement or fitting.
//! - [`build_expanded`]: measured blocks fitted into columns of at most
//!   `basis.block_max.height`, images padded to whole lines, overflowing text split.

use std::collections::VecDeque;

use crate::model::{ArticleModel, Basis, Block, BlockType, LayoutError, Size};

use super::measure::{measure_block, Measure};

/// Vertical slot holding an ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    /// Size once filled, `None` for unmeasured columns.
    pub size: Option<Size>,
    /// Blocks in display order.
    pub blocks: Vec<Block>,
}

impl Column {
    /// Empty column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of block heights plus fillers.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Unmeasured`] if any block has no size.
    pub fn filled_height(&self) -> Result<f64, LayoutError> {
        self.blocks.iter().map(Block::filled_height).sum()
    }

    /// True when the column holds no block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// One-line description: each block as `kind height[+filler]`, unmeasured blocks as
    /// `kind ?`.
    pub fn summary(&self) -> String {
        self.blocks
            .iter()
            .map(|block| {
                let kind = block.block_type().name();
                match block.size {
                    Some(size) if block.filler > 0.0 => {
                        format!("{kind} {}+{}", size.height, block.filler)
                    }
                    Some(size) => format!("{kind} {}", size.height),
                    None => format!("{kind} ?"),
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Single column holding every block in block-map order.
pub fn build_bulk(model: &ArticleModel) -> Vec<Column> {
    let blocks = model.block_map().values().flatten().cloned().collect();
    vec![Column { size: None, blocks }]
}

fn measured<M: Measure + ?Sized>(
    model: &ArticleModel,
    block_type: BlockType,
    measure: &M,
) -> Result<Vec<Block>, LayoutError> {
    model
        .blocks(block_type)
        .iter()
        .cloned()
        .map(|mut block| {
            measure_block(&mut block, model.basis(), measure)?;
            Ok(block)
        })
        .collect()
}

/// Index of the image whose height is closest to `target` without exceeding it.
fn closest_by_height(images: &[Block], target: f64) -> Result<Option<usize>, LayoutError> {
    let mut best: Option<(usize, f64)> = None;
    for (index, image) in images.iter().enumerate() {
        let delta = target - image.height()?;
        if delta >= 0.0 && best.is_none_or(|(_, min)| delta < min) {
            best = Some((index, delta));
        }
    }
    Ok(best.map(|(index, _)| index))
}

/// Index of the first image no taller than `target`.
fn first_fitting(images: &[Block], target: f64) -> Result<Option<usize>, LayoutError> {
    for (index, image) in images.iter().enumerate() {
        if image.height()? <= target {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn place_image(column: &mut Column, mut image: Block, basis: &Basis) -> Result<(), LayoutError> {
    let filled = column.filled_height()? + image.height()?;
    image.filler = basis.filler_for(filled);
    column.blocks.push(image);
    Ok(())
}

/// Append queued blocks until the column is full, splitting the first overflowing text block
/// at a whole number of lines.
fn fill_text(
    column: &mut Column,
    queue: &mut VecDeque<Block>,
    basis: &Basis,
) -> Result<(), LayoutError> {
    let max_height = basis.max_column_height();
    while let Some(mut block) = queue.pop_front() {
        let remaining = max_height - column.filled_height()?;
        if block.height()? <= remaining {
            column.blocks.push(block);
            continue;
        }

        let available = basis.floor_to_lines(remaining);
        if available > 0.0 {
            if let Some(rest) = block.split(available)? {
                column.blocks.push(block);
                queue.push_front(rest);
                break;
            }
        }
        queue.push_front(block);
        break;
    }
    Ok(())
}

/// Fit the article into full columns.
///
/// Column 0 holds the title, the image closest in height to the remaining space and as much
/// text as fits. Every further column first takes the first image that fits, then text, until
/// nothing is left.
///
/// # Errors
///
/// [`LayoutError::NoProgress`] when a fresh column cannot take any remaining block (a block
/// taller than the column that cannot be split), and any measurement failure.
pub fn build_expanded<M: Measure + ?Sized>(
    model: &ArticleModel,
    measure: &M,
) -> Result<Vec<Column>, LayoutError> {
    let basis = model.basis();
    let max_height = basis.max_column_height();

    let mut titles = measured(model, BlockType::Title, measure)?;
    let mut images = measured(model, BlockType::Image, measure)?;
    // Extra title blocks are laid out like unsplittable text.
    let extra_titles = if titles.len() > 1 {
        titles.split_off(1)
    } else {
        Vec::new()
    };
    let mut queue: VecDeque<Block> = extra_titles
        .into_iter()
        .chain(measured(model, BlockType::Text, measure)?)
        .collect();

    let mut columns = Vec::new();
    let mut column = Column::new();
    column.blocks.extend(titles.pop());

    let remaining = max_height - column.filled_height()?;
    if let Some(index) = closest_by_height(&images, remaining)? {
        let image = images.remove(index);
        place_image(&mut column, image, basis)?;
    }
    fill_text(&mut column, &mut queue, basis)?;

    while !queue.is_empty() || !images.is_empty() {
        columns.push(column);
        column = Column::new();

        if let Some(index) = first_fitting(&images, max_height)? {
            let image = images.remove(index);
            place_image(&mut column, image, basis)?;
        }
        fill_text(&mut column, &mut queue, basis)?;

        if column.is_empty() {
            return Err(LayoutError::NoProgress {
                column: columns.len(),
            });
        }
    }
    columns.push(column);

    for column in &mut columns {
        column.size = Some(Size::new(basis.column.width, column.filled_height()?));
    }

    tracing::debug!(columns = columns.len(), "Expanded layout built");
    Ok(columns)
}
