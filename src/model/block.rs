//! Article content blocks.
//!
//! A [`Block`] holds the fields shared by every block kind (size, filler, visibility) and a
//! kind-specific payload in [`BlockKind`]. Blocks are created by article parsing and mutated
//! only by the layout engine (measurement, filler, splitting).

use std::rc::Rc;

use super::basis::Basis;
use super::error::LayoutError;
use super::geometry::Size;

/// Upper bound for the image display scale.
pub const MAX_IMAGE_SCALE: f64 = 4.0;

/// Block type, used as the key of an article's block map.
///
/// The declaration order is the order blocks are laid out in by the bulk strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockType {
    /// Title family (title, subtitle, byline, issue line).
    Title,
    /// Article image.
    Image,
    /// Paragraph of body text.
    Text,
}

impl BlockType {
    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

/// Issue line shown under a title.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueLine {
    /// Publication title.
    pub title: String,
    /// Short publication date.
    pub short_date: String,
    /// Issue identifier.
    pub id: String,
}

/// Title family payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    /// Article headline.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// Optional byline.
    pub byline: Option<String>,
    /// Issue the article belongs to.
    pub issue: Option<IssueLine>,
}

impl TitleBlock {
    /// Every non-empty line of the title family, in display order.
    pub fn lines(&self) -> Vec<&str> {
        let mut lines = vec![self.title.as_str()];
        lines.extend(self.subtitle.as_deref());
        lines.extend(self.byline.as_deref());
        if let Some(issue) = &self.issue {
            lines.push(issue.title.as_str());
        }
        lines.retain(|line| !line.is_empty());
        lines
    }
}

/// Image payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    /// Image URL.
    pub url: String,
    /// Intrinsic size as reported by the content source.
    pub original: Size,
    /// Optional caption.
    pub caption: Option<String>,
    /// Display scale chosen by [`ImageBlock::adjust`].
    pub scale: f64,
}

impl ImageBlock {
    /// Compute the display scale and size for `basis`.
    ///
    /// The scale fills the line width, is capped at [`MAX_IMAGE_SCALE`] and at the height a
    /// column can hold, and is floored to a whole percentage so the caps survive rounding.
    pub fn adjust(&mut self, basis: &Basis) -> Size {
        if self.original.width <= 0.0 || self.original.height <= 0.0 {
            self.scale = 0.0;
            return Size::default();
        }

        let width_scale = basis.line_width() / self.original.width;
        let height_cap = basis.max_column_height() / self.original.height;
        let scale = width_scale.min(MAX_IMAGE_SCALE).min(height_cap);
        // Epsilon absorbs representation error (0.29 * 100.0 == 28.999...).
        self.scale = (scale * 100.0 + 1e-9).floor() / 100.0;

        self.original.scaled_floor(self.scale)
    }
}

/// Paragraph payload.
///
/// The paragraph text is shared between a block and its split continuations.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Paragraph text.
    pub text: Rc<str>,
    /// Index of the paragraph in the source article.
    pub original_index: usize,
    /// Vertical offset of the visible window into the paragraph.
    ///
    /// Zero for a whole paragraph; negative for a continuation so that it renders as the
    /// bottom portion of the original.
    pub top_offset: f64,
}

/// Kind-specific payload of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Title family.
    Title(TitleBlock),
    /// Image.
    Image(ImageBlock),
    /// Text paragraph.
    Text(TextBlock),
}

/// Measurable content fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Kind-specific payload.
    pub kind: BlockKind,
    /// Measured size, `None` until measured.
    pub size: Option<Size>,
    /// Padding added after the block so the column stays line-aligned.
    pub filler: f64,
    /// Whether the renderer should show the block.
    pub visible: bool,
}

impl Block {
    fn with_kind(kind: BlockKind) -> Self {
        Self {
            kind,
            size: None,
            filler: 0.0,
            visible: true,
        }
    }

    /// New unmeasured title block.
    pub fn title(title: TitleBlock) -> Self {
        Self::with_kind(BlockKind::Title(title))
    }

    /// New unmeasured image block.
    pub fn image(url: impl Into<String>, original: Size, caption: Option<String>) -> Self {
        Self::with_kind(BlockKind::Image(ImageBlock {
            url: url.into(),
            original,
            caption,
            scale: 1.0,
        }))
    }

    /// New unmeasured text block.
    pub fn text(text: impl Into<Rc<str>>, original_index: usize) -> Self {
        Self::with_kind(BlockKind::Text(TextBlock {
            text: text.into(),
            original_index,
            top_offset: 0.0,
        }))
    }

    /// Block type of the payload.
    pub fn block_type(&self) -> BlockType {
        match self.kind {
            BlockKind::Title(_) => BlockType::Title,
            BlockKind::Image(_) => BlockType::Image,
            BlockKind::Text(_) => BlockType::Text,
        }
    }

    /// Builder-style size assignment.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// True once a size has been assigned.
    pub fn is_measured(&self) -> bool {
        self.size.is_some()
    }

    /// Measured height.
    pub fn height(&self) -> Result<f64, LayoutError> {
        self.size
            .map(|size| size.height)
            .ok_or(LayoutError::Unmeasured {
                kind: self.block_type().name(),
            })
    }

    /// Measured height plus filler.
    pub fn filled_height(&self) -> Result<f64, LayoutError> {
        Ok(self.height()? + self.filler)
    }

    /// Truncate a text block to `available_height` and return the remainder.
    ///
    /// Returns `Ok(None)` and leaves the block untouched when it already fits, and for
    /// non-text blocks (which never split). The remainder carries
    /// `top_offset = -available_height` and its own size, never shared with `self`.
    pub fn split(&mut self, available_height: f64) -> Result<Option<Block>, LayoutError> {
        let height = self.height()?;
        if height <= available_height {
            return Ok(None);
        }

        let BlockKind::Text(text) = &self.kind else {
            return Ok(None);
        };

        let mut remainder_text = text.clone();
        remainder_text.top_offset = text.top_offset - available_height;
        let width = self.size.map(|size| size.width).unwrap_or_default();

        self.size = Some(Size::new(width, available_height));

        Ok(Some(Block {
            kind: BlockKind::Text(remainder_text),
            size: Some(Size::new(width, height - available_height)),
            filler: 0.0,
            visible: self.visible,
        }))
    }

    /// Text payload, if this is a text block.
    pub fn as_text(&self) -> Option<&TextBlock> {
        match &self.kind {
            BlockKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Image payload, if this is an image block.
    pub fn as_image(&self) -> Option<&ImageBlock> {
        match &self.kind {
            BlockKind::Image(image) => Some(image),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis() -> Basis {
        Basis::new(
            Size::new(300.0, 20.0),
            Size::new(320.0, 800.0),
            Size::new(300.0, 800.0),
        )
    }

    mod split {
        use super::*;

        #[test]
        fn split_truncates_and_returns_remainder() {
            let mut block = Block::text("body", 4).with_size(Size::new(300.0, 250.0));

            let remainder = block.split(200.0).unwrap().expect("should split");

            assert_eq!(block.height().unwrap(), 200.0);
            assert_eq!(remainder.height().unwrap(), 50.0);
            let text = remainder.as_text().unwrap();
            assert_eq!(text.top_offset, -200.0);
            assert_eq!(text.original_index, 4);
            assert_eq!(block.as_text().unwrap().top_offset, 0.0);
        }

        #[test]
        fn split_of_fitting_block_returns_none() {
            let mut block = Block::text("body", 0).with_size(Size::new(300.0, 100.0));
            assert_eq!(block.split(100.0).unwrap(), None);
            assert_eq!(block.height().unwrap(), 100.0);
        }

        #[test]
        fn split_continuation_accumulates_offset() {
            let mut block = Block::text("body", 0).with_size(Size::new(300.0, 500.0));
            let mut second = block.split(200.0).unwrap().unwrap();
            let third = second.split(100.0).unwrap().unwrap();
            assert_eq!(third.as_text().unwrap().top_offset, -300.0);
            assert_eq!(third.height().unwrap(), 200.0);
        }

        #[test]
        fn split_of_unmeasured_block_is_error() {
            let mut block = Block::text("body", 0);
            assert_eq!(
                block.split(10.0),
                Err(LayoutError::Unmeasured { kind: "text" })
            );
        }

        #[test]
        fn image_never_splits() {
            let mut block =
                Block::image("a.jpg", Size::new(10.0, 10.0), None).with_size(Size::new(300.0, 300.0));
            assert_eq!(block.split(100.0).unwrap(), None);
            assert_eq!(block.height().unwrap(), 300.0);
        }
    }

    mod adjust {
        use super::*;

        fn image(width: f64, height: f64) -> ImageBlock {
            ImageBlock {
                url: "img".to_string(),
                original: Size::new(width, height),
                caption: None,
                scale: 1.0,
            }
        }

        #[test]
        fn image_scales_to_line_width() {
            let mut img = image(600.0, 400.0);
            assert_eq!(img.adjust(&basis()), Size::new(300.0, 200.0));
            assert_eq!(img.scale, 0.5);
        }

        #[test]
        fn small_image_scale_is_capped() {
            let mut img = image(50.0, 20.0);
            let size = img.adjust(&basis());
            assert_eq!(img.scale, MAX_IMAGE_SCALE);
            assert_eq!(size, Size::new(200.0, 80.0));
        }

        #[test]
        fn tall_image_is_capped_to_column_height() {
            let mut img = image(300.0, 1600.0);
            let size = img.adjust(&basis());
            assert_eq!(img.scale, 0.5);
            assert!(size.height <= 800.0);
        }

        #[test]
        fn scale_is_floored_to_whole_percent() {
            let mut img = image(900.0, 90.0);
            img.adjust(&basis());
            assert_eq!(img.scale, 0.33);
        }
    }

    #[test]
    fn title_lines_skip_missing_parts() {
        let title = TitleBlock {
            title: "Headline".to_string(),
            subtitle: None,
            byline: Some("By Someone".to_string()),
            issue: None,
        };
        assert_eq!(title.lines(), vec!["Headline", "By Someone"]);
    }
}
