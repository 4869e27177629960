//! Parsed article: a basis plus an ordered map of blocks by type.

use std::collections::BTreeMap;

use super::basis::Basis;
use super::block::{Block, BlockType, IssueLine, TitleBlock};
use super::geometry::Size;

/// Issue reference carried by an article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleIssue {
    /// Publication title.
    pub title: String,
    /// Short date string.
    pub short_date: String,
    /// Issue identifier.
    pub id: String,
}

/// Image reference carried by an article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleImage {
    /// Image URL.
    pub url: String,
    /// Intrinsic width.
    pub width: f64,
    /// Intrinsic height.
    pub height: f64,
    /// Optional caption.
    pub text: Option<String>,
}

/// Validated article content as supplied by the content source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleContent {
    /// Headline.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// Optional byline.
    pub byline: Option<String>,
    /// Issue the article belongs to.
    pub issue: Option<ArticleIssue>,
    /// Article images, in source order.
    pub images: Vec<ArticleImage>,
    /// Body paragraphs, in source order.
    pub blocks: Vec<String>,
    /// Number of similar articles.
    pub similars_count: u32,
    /// Page name the article appears on.
    pub page_name: Option<String>,
}

/// Ordered map from block type to the blocks of that type.
///
/// Iteration follows [`BlockType`]'s declaration order: titles, images, text.
pub type BlockMap = BTreeMap<BlockType, Vec<Block>>;

/// Article ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleModel {
    basis: Basis,
    block_map: BlockMap,
}

impl ArticleModel {
    /// Empty model for `basis`.
    pub fn new(basis: Basis) -> Self {
        Self {
            basis,
            block_map: BlockMap::new(),
        }
    }

    /// Build the model directly from parsed content.
    pub fn from_content(basis: Basis, content: &ArticleContent) -> Self {
        let mut model = Self::new(basis);
        model.parse(content);
        model
    }

    /// Rebuild the block map from `content`, replacing any previous blocks.
    pub fn parse(&mut self, content: &ArticleContent) {
        let mut map = BlockMap::new();

        let title = TitleBlock {
            title: content.title.clone(),
            subtitle: content.subtitle.clone(),
            byline: content.byline.clone(),
            issue: content.issue.as_ref().map(|issue| IssueLine {
                title: issue.title.clone(),
                short_date: issue.short_date.clone(),
                id: issue.id.clone(),
            }),
        };
        map.insert(BlockType::Title, vec![Block::title(title)]);

        let images = content
            .images
            .iter()
            .map(|image| {
                Block::image(
                    image.url.clone(),
                    Size::new(image.width, image.height),
                    image.text.clone(),
                )
            })
            .collect();
        map.insert(BlockType::Image, images);

        let texts = content
            .blocks
            .iter()
            .enumerate()
            .map(|(index, text)| Block::text(text.as_str(), index))
            .collect();
        map.insert(BlockType::Text, texts);

        tracing::debug!(
            images = content.images.len(),
            paragraphs = content.blocks.len(),
            "Article parsed into block map"
        );

        self.block_map = map;
    }

    /// Reference measurements.
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Replace the basis. Blocks are kept; their sizes become stale and are re-measured by
    /// the next layout pass.
    pub fn set_basis(&mut self, basis: Basis) {
        self.basis = basis;
    }

    /// The whole block map.
    pub fn block_map(&self) -> &BlockMap {
        &self.block_map
    }

    /// Blocks of one type (empty when none).
    pub fn blocks(&self, block_type: BlockType) -> &[Block] {
        self.block_map
            .get(&block_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Insert blocks directly, bypassing parsing.
    ///
    /// Used by measurement providers that pre-size blocks and by tests.
    pub fn set_blocks(&mut self, block_type: BlockType, blocks: Vec<Block>) {
        self.block_map.insert(block_type, blocks);
    }

    /// Total number of blocks across all types.
    pub fn block_count(&self) -> usize {
        self.block_map.values().map(Vec::len).sum()
    }
}
