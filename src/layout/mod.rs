//! Article column layout.
//!
//! [`ArticleColumnLayout`] rebuilds the column array whenever the layout state or basis
//! changes, choosing the bulk strategy for unmeasured states and the expanded strategy for
//! [`LayoutState::Expanded`]. Expanded columns are kept when collapsing to
//! [`LayoutState::Shrinked`] and restored without measuring when expanding again with the
//! same basis.
//!
//! [`ArticleView`] wraps a layout with a [`BuildSlot`] so that expanded builds requested while
//! one is pending share its result instead of rebuilding.

pub mod build_slot;
pub mod measure;
pub mod strategy;

pub use build_slot::{BuildSlot, Request, SharedBuild};
pub use measure::{LineMetrics, Measure};
pub use strategy::{build_bulk, build_expanded, Column};

use futures::future::{FutureExt, LocalBoxFuture};

use crate::model::{ArticleContent, ArticleModel, Basis, LayoutError};

/// Requested layout state of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutState {
    /// Freshly parsed, nothing rendered yet.
    #[default]
    Init,
    /// Teaser rendering in a list.
    Preview,
    /// Collapsed article.
    Shrinked,
    /// Full multi-column article.
    Expanded,
}

impl LayoutState {
    /// True when this state uses the fitted multi-column strategy.
    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Expanded)
    }
}

impl std::str::FromStr for LayoutState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(Self::Init),
            "preview" => Ok(Self::Preview),
            "shrinked" => Ok(Self::Shrinked),
            "expanded" => Ok(Self::Expanded),
            other => Err(format!("unknown layout state '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
struct ExpandedCache {
    basis: Basis,
    columns: Vec<Column>,
}

/// Column array of one article plus the strategy switch.
#[derive(Debug)]
pub struct ArticleColumnLayout<M> {
    measure: M,
    state: LayoutState,
    columns: Vec<Column>,
    expanded_cache: Option<ExpandedCache>,
}

impl<M: Measure> ArticleColumnLayout<M> {
    /// Empty layout in [`LayoutState::Init`].
    pub fn new(measure: M) -> Self {
        Self {
            measure,
            state: LayoutState::Init,
            columns: Vec::new(),
            expanded_cache: None,
        }
    }

    /// State of the last completed layout.
    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Columns of the last completed layout.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// True when expanded columns are cached for the current basis of `model`.
    pub fn has_cached_expansion(&self, model: &ArticleModel) -> bool {
        self.expanded_cache
            .as_ref()
            .is_some_and(|cache| cache.basis == *model.basis())
    }

    /// Rebuild the columns of `model` for `state`.
    ///
    /// The column array is fully replaced; the previous array is never patched.
    pub fn layout(
        &mut self,
        model: &ArticleModel,
        state: LayoutState,
    ) -> Result<&[Column], LayoutError> {
        if self
            .expanded_cache
            .as_ref()
            .is_some_and(|cache| cache.basis != *model.basis())
        {
            tracing::debug!("Basis changed, dropping cached expanded columns");
            self.expanded_cache = None;
        }

        let columns = if state.is_expanded() {
            match self.expanded_cache.take() {
                Some(cache) => {
                    tracing::debug!(columns = cache.columns.len(), "Restored expanded columns");
                    cache.columns
                }
                None => build_expanded(model, &self.measure)?,
            }
        } else {
            if self.state.is_expanded() && state == LayoutState::Shrinked {
                self.expanded_cache = Some(ExpandedCache {
                    basis: *model.basis(),
                    columns: std::mem::take(&mut self.columns),
                });
            }
            build_bulk(model)
        };

        self.columns = columns;
        self.state = state;
        Ok(&self.columns)
    }
}

/// Expanded-layout result shared between waiters.
pub type ExpandedBuild = Result<Vec<Column>, LayoutError>;

/// An article with its layout and an at-most-one-concurrent expanded build.
///
/// [`ArticleView::request_expanded`] only queues work; the event loop drives it with
/// [`ArticleView::run_pending`]. A build always uses the basis current when it runs, so a
/// basis change while a build is queued is picked up and the last completed build wins.
#[derive(Debug)]
pub struct ArticleView<M> {
    model: ArticleModel,
    layout: ArticleColumnLayout<M>,
    slot: BuildSlot<ExpandedBuild>,
}

impl<M: Measure> ArticleView<M> {
    /// Parse `content` with `basis` into a new view.
    pub fn new(basis: Basis, content: &ArticleContent, measure: M) -> Self {
        Self {
            model: ArticleModel::from_content(basis, content),
            layout: ArticleColumnLayout::new(measure),
            slot: BuildSlot::new(),
        }
    }

    /// Article model.
    pub fn model(&self) -> &ArticleModel {
        &self.model
    }

    /// Current layout.
    pub fn layout(&self) -> &ArticleColumnLayout<M> {
        &self.layout
    }

    /// Replace the basis. Cached expanded columns are dropped by the next layout pass.
    pub fn set_basis(&mut self, basis: Basis) {
        self.model.set_basis(basis);
    }

    /// True while an expanded build is queued.
    pub fn is_transaction_pending(&self) -> bool {
        self.slot.is_pending()
    }

    /// Lay the article out in `state` right away.
    ///
    /// An expanded layout also resolves the queued expanded build, if any, so its waiters get
    /// this result instead of a second build.
    pub fn show(&mut self, state: LayoutState) -> Result<&[Column], LayoutError> {
        if state.is_expanded() && self.slot.is_pending() {
            let result = self.expand_now();
            self.slot.complete(result.clone());
            result?;
            return Ok(self.layout.columns());
        }
        self.layout.layout(&self.model, state)
    }

    /// Request an expanded layout, joining the pending build if there is one.
    ///
    /// Resolves to [`LayoutError::Cancelled`] if the view is dropped before the build runs.
    pub fn request_expanded(&mut self) -> LocalBoxFuture<'static, ExpandedBuild> {
        let (build, request) = self.slot.request();
        match request {
            Request::Started => tracing::debug!("Expanded build queued"),
            Request::Joined => tracing::debug!("Joined pending expanded build"),
        }
        build
            .map(|result| result.unwrap_or_else(|_| Err(LayoutError::Cancelled)))
            .boxed_local()
    }

    /// Run the queued expanded build, if any, and resolve every waiter.
    ///
    /// Returns `false` when nothing was queued.
    pub fn run_pending(&mut self) -> bool {
        if !self.slot.is_pending() {
            return false;
        }
        let result = self.expand_now();
        self.slot.complete(result)
    }

    fn expand_now(&mut self) -> ExpandedBuild {
        let result = self
            .layout
            .layout(&self.model, LayoutState::Expanded)
            .map(<[Column]>::to_vec);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Expanded build failed");
        }
        result
    }
}
