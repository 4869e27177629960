//! Batched feed metadata loading with retry.
//!
//! A failed or empty fetch is retried up to `max_attempts` times, doubling the requested
//! batch size on every retry so sparse feeds still make progress.

use futures::future::LocalBoxFuture;

use crate::model::FeedError;

/// Future returned by [`FeedSource::fetch`].
pub type FeedFuture<'a, T> = LocalBoxFuture<'a, Result<Vec<T>, FeedError>>;

/// Host-provided feed backend.
pub trait FeedSource {
    /// Feed entry type.
    type Item;

    /// Fetch up to `count` entries starting at `offset`.
    fn fetch(&self, offset: usize, count: usize) -> FeedFuture<'_, Self::Item>;
}

/// Retry policy for feed loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLoader {
    batch_size: usize,
    max_attempts: u32,
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_attempts: 3,
        }
    }
}

impl FeedLoader {
    /// Loader starting at `batch_size` entries, trying at most `max_attempts` times.
    pub fn new(batch_size: usize, max_attempts: u32) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Initial batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Attempt cap.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Load the batch at `offset`.
    ///
    /// # Errors
    ///
    /// [`FeedError::Exhausted`] when every attempt failed or came back empty.
    pub async fn load<S>(&self, source: &S, offset: usize) -> Result<Vec<S::Item>, FeedError>
    where
        S: FeedSource + ?Sized,
    {
        let mut count = self.batch_size;
        for attempt in 1..=self.max_attempts {
            match source.fetch(offset, count).await {
                Ok(items) if !items.is_empty() => {
                    tracing::debug!(offset, count, received = items.len(), attempt, "Feed batch loaded");
                    return Ok(items);
                }
                Ok(_) => tracing::warn!(offset, count, attempt, "Feed fetch returned no items"),
                Err(err) => tracing::warn!(offset, count, attempt, error = %err, "Feed fetch failed"),
            }
            count = count.saturating_mul(2);
        }

        Err(FeedError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::cell::RefCell;

    /// Source replaying canned results and recording requested batch sizes.
    struct Scripted {
        results: RefCell<Vec<Result<Vec<u32>, FeedError>>>,
        counts: RefCell<Vec<usize>>,
    }

    impl Scripted {
        fn new(results: Vec<Result<Vec<u32>, FeedError>>) -> Self {
            Self {
                results: RefCell::new(results),
                counts: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeedSource for Scripted {
        type Item = u32;

        fn fetch(&self, offset: usize, count: usize) -> FeedFuture<'_, u32> {
            self.counts.borrow_mut().push(count);
            let result = if self.results.borrow().is_empty() {
                Err(FeedError::Fetch {
                    offset,
                    count,
                    reason: "script exhausted".to_string(),
                })
            } else {
                self.results.borrow_mut().remove(0)
            };
            async move { result }.boxed_local()
        }
    }

    fn failure() -> Result<Vec<u32>, FeedError> {
        Err(FeedError::Fetch {
            offset: 0,
            count: 0,
            reason: "timeout".to_string(),
        })
    }

    #[test]
    fn first_success_returns_immediately() {
        let source = Scripted::new(vec![Ok(vec![1, 2, 3])]);
        let items = pollster::block_on(FeedLoader::new(5, 3).load(&source, 0)).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(source.counts.borrow().as_slice(), &[5]);
    }

    #[test]
    fn retries_double_the_batch() {
        let source = Scripted::new(vec![failure(), Ok(vec![]), Ok(vec![7])]);
        let items = pollster::block_on(FeedLoader::new(5, 3).load(&source, 40)).unwrap();
        assert_eq!(items, vec![7]);
        assert_eq!(source.counts.borrow().as_slice(), &[5, 10, 20]);
    }

    #[test]
    fn gives_up_after_attempt_cap() {
        let source = Scripted::new(vec![failure(), failure(), failure(), Ok(vec![1])]);
        let result = pollster::block_on(FeedLoader::new(2, 3).load(&source, 0));
        assert_eq!(result, Err(FeedError::Exhausted { attempts: 3 }));
        assert_eq!(source.counts.borrow().len(), 3);
    }

    #[test]
    fn zero_settings_are_raised_to_one() {
        let loader = FeedLoader::new(0, 0);
        assert_eq!(loader.batch_size(), 1);
        assert_eq!(loader.max_attempts(), 1);
    }
}
