//! Error types for the smartflow engine.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via `?` and
//! `From` conversions into [`ReaderError`], the top-level error returned by the issue reader.
//!
//! # Error Hierarchy
//!
//! - [`ReaderError`] - Top-level error for issue reading and gesture reconciliation
//!   - [`ValidationError`] - Missing or invalid required field at construction time
//!   - [`LookupError`] - Contract violations (zoom not in ladder, no visible page)
//!   - [`LayoutError`] - Column layout failures (unmeasured blocks, no progress)
//!   - [`ImageLoadError`] - Asynchronous image load failures
//!   - [`FeedError`] - Feed metadata load failures
//!
//! # Recovery Strategy
//!
//! Validation, lookup and layout errors are fatal to the operation in progress and are never
//! retried. Only image and feed loads are recoverable: image failures surface to the caller
//! as a rejected future, feed loads are retried by [`crate::source::feed::FeedLoader`].
//!
//! A stale image response is *not* an error. It is discarded by timestamp comparison in
//! [`crate::view_state::page::PageImage::accept`].

use thiserror::Error;

/// Top-level error for issue reading operations.
///
/// All domain-specific error types convert into `ReaderError` via `From`, so handler code can
/// use `?` freely.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A required field was missing or invalid while constructing a model object.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A lookup that must succeed under correct usage did not.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// Article layout failed.
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// Page image could not be loaded.
    #[error("Image load failed: {0}")]
    ImageLoad(#[from] ImageLoadError),

    /// Feed metadata could not be loaded.
    #[error("Feed load failed: {0}")]
    Feed(#[from] FeedError),
}

/// Missing or invalid required data, raised synchronously at construction time.
///
/// Construction never silently defaults a required field: the error names the field so the
/// content source can be fixed.
///
/// # Examples
///
/// ```
/// use smartflow::model::error::ValidationError;
///
/// let err = ValidationError::MissingField { field: "heights" };
/// assert!(err.to_string().contains("'heights'"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The source document is not valid JSON for the expected shape.
    ///
    /// The message is extracted from `serde_json::Error` rather than wrapping it, so the
    /// error stays `Clone`.
    #[error("Invalid JSON: {message}")]
    InvalidJson {
        /// Parser error message.
        message: String,
    },

    /// A required field is absent.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// Name of the field as it appears in the source data.
        field: &'static str,
    },

    /// A field is present but its value is unusable.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },

    /// The declared page count disagrees with the per-page layout data.
    #[error("Issue declares {declared} pages but page layout describes {actual}")]
    PageCountMismatch {
        /// Value of the `pages` field.
        declared: usize,
        /// Number of per-page layout records.
        actual: usize,
    },
}

/// A lookup that cannot fail under correct usage failed.
///
/// These are programming-contract violations, not recoverable runtime conditions. Callers are
/// expected to guarantee the precondition (e.g. clamp offsets before calling
/// [`crate::view_state::pool::PagesPool::set_offset`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// The base zoom of a zoom search is not part of the searched ladder.
    #[error("Zoom with max height {max_height} not found in zoom ladder")]
    ZoomNotFound {
        /// Max height of the zoom that was searched for.
        max_height: u32,
    },

    /// No page overlaps the viewport at the requested offset.
    #[error("No visible page at offset {offset}")]
    NoVisiblePage {
        /// Horizontal container offset that was requested.
        offset: f64,
    },

    /// A page index is outside the issue.
    #[error("Page index {index} out of range (page count: {len})")]
    PageOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of pages.
        len: usize,
    },
}

/// Column layout failure.
///
/// `Clone` because a memoized in-flight build hands the same result to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A block reached a step that requires its measured size before it was measured.
    #[error("{kind} block has not been measured")]
    Unmeasured {
        /// Block kind name (`title`, `image`, `text`).
        kind: &'static str,
    },

    /// A fresh, empty column could not take any remaining block.
    #[error("Column {column} could not place any remaining block")]
    NoProgress {
        /// Index of the column that stayed empty.
        column: usize,
    },

    /// The measurement provider failed.
    #[error("Measurement failed: {0}")]
    Measure(String),

    /// The view was dropped before a queued expanded build ran.
    #[error("Expanded build was cancelled")]
    Cancelled,
}

/// Why an image load did not produce an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The loader reported an error.
    Error(String),
    /// The load was aborted before completion.
    Abort,
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(message) => write!(f, "error: {message}"),
            Self::Abort => write!(f, "aborted"),
        }
    }
}

/// Image load rejection.
///
/// The core performs no automatic retry for image loads; the rendering layer decides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Image for page {page_index} failed to load ({reason})")]
pub struct ImageLoadError {
    /// Page the image was requested for.
    pub page_index: usize,
    /// Failure reason.
    pub reason: LoadFailure,
}

/// Feed metadata load failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// A single fetch attempt failed.
    #[error("Fetch of {count} items at offset {offset} failed: {reason}")]
    Fetch {
        /// Offset of the requested batch.
        offset: usize,
        /// Requested batch size.
        count: usize,
        /// Source-provided reason.
        reason: String,
    },

    /// Every attempt failed or returned nothing.
    #[error("Feed load gave up after {attempts} attempts")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    mod display {
        use super::*;

        #[test]
        fn missing_field_names_field() {
            let err = ValidationError::MissingField { field: "magnifierPageSizes" };
            assert_eq!(err.to_string(), "Missing required field 'magnifierPageSizes'");
        }

        #[test]
        fn page_count_mismatch_includes_both_counts() {
            let err = ValidationError::PageCountMismatch {
                declared: 12,
                actual: 10,
            };
            let msg = err.to_string();
            assert!(msg.contains("12"));
            assert!(msg.contains("10"));
        }

        #[test]
        fn zoom_not_found_includes_height() {
            let err = LookupError::ZoomNotFound { max_height: 1337 };
            assert!(err.to_string().contains("1337"));
        }

        #[test]
        fn image_load_error_includes_reason() {
            let err = ImageLoadError {
                page_index: 3,
                reason: LoadFailure::Abort,
            };
            assert_eq!(err.to_string(), "Image for page 3 failed to load (aborted)");
        }
    }

    mod conversion {
        use super::*;

        fn lookup() -> Result<(), LookupError> {
            Err(LookupError::NoVisiblePage { offset: -10.0 })
        }

        fn reader_op() -> Result<(), ReaderError> {
            lookup()?;
            Ok(())
        }

        #[test]
        fn lookup_error_converts_into_reader_error() {
            let err = reader_op().unwrap_err();
            assert!(matches!(
                err,
                ReaderError::Lookup(LookupError::NoVisiblePage { .. })
            ));
        }

        #[test]
        fn layout_error_converts_into_reader_error() {
            let err: ReaderError = LayoutError::NoProgress { column: 2 }.into();
            assert!(err.to_string().contains("Column 2"));
        }
    }
}
