//! View-state layer - page geometry, virtualization and scrolling
//!
//! # Module Structure
//!
//! - `page`: IssuePageViewModel - per-page zoom, image and container state
//! - `strip_index`: StripIndex - O(log n) page edges via Fenwick tree
//! - `pool`: PagesPool - bounded window of page view models around the offset
//! - `scroll`: ScrollerPosition / ScrollState - transform values and scroll direction

pub mod page;
pub mod pool;
pub mod scroll;
pub mod strip_index;

pub use page::{Container, IssuePageViewModel, PageDefaults, PageImage};
pub use pool::{PagesPool, PoolWindow};
pub use scroll::{ScrollDirection, ScrollState, ScrollerPosition};
pub use strip_index::StripIndex;
