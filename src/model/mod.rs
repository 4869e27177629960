//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors. Nothing here performs I/O
//! or holds shared state; the reader and layout engine own the mutable pieces.

pub mod article;
pub mod basis;
pub mod block;
pub mod error;
pub mod geometry;
pub mod issue;
pub mod zoom;

// Re-export for convenience
pub use article::{ArticleContent, ArticleImage, ArticleIssue, ArticleModel, BlockMap};
pub use basis::Basis;
pub use block::{Block, BlockKind, BlockType, ImageBlock, TextBlock, TitleBlock};
pub use error::{
    FeedError, ImageLoadError, LayoutError, LoadFailure, LookupError, ReaderError,
    ValidationError,
};
pub use geometry::{HorizontalPosition, Point, Position, Rect, Size, Translate, VerticalPosition};
pub use issue::{Breakpoints, IssueInfo, IssuePage, Scale};
pub use zoom::{SearchMode, Zoom, ZoomInfo, ZoomKind};
