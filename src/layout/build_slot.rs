//! Single-slot memoization of an in-flight build.
//!
//! At most one build is outstanding per slot. Requesting a build while one is pending returns
//! a handle to the same pending result; completing the build resolves every handle and clears
//! the slot so the next request starts fresh.
//!
//! Builds run on the event loop, never in parallel. Handles are [`Shared`] oneshot receivers.

use std::fmt;

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

/// Handle resolving to the result of a shared build.
///
/// Every handle obtained for the same pending build resolves to a clone of the same value, or
/// to [`oneshot::Canceled`] if the slot is dropped before the build completes.
pub type SharedBuild<T> = Shared<oneshot::Receiver<T>>;

/// Whether [`BuildSlot::request`] started a new build or joined the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// No build was pending; the caller's request started one.
    Started,
    /// A build was already pending; the handle shares its result.
    Joined,
}

struct Pending<T> {
    sender: oneshot::Sender<T>,
    build: SharedBuild<T>,
}

/// Slot holding at most one pending build.
pub struct BuildSlot<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for BuildSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> fmt::Debug for BuildSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSlot")
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl<T> BuildSlot<T> {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a build is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T: Clone> BuildSlot<T> {
    /// Handle to the pending build, starting one if none is outstanding.
    pub fn request(&mut self) -> (SharedBuild<T>, Request) {
        if let Some(pending) = &self.pending {
            return (pending.build.clone(), Request::Joined);
        }

        let (sender, receiver) = oneshot::channel();
        let build = receiver.shared();
        self.pending = Some(Pending {
            sender,
            build: build.clone(),
        });
        (build, Request::Started)
    }

    /// Resolve the pending build with `value` and clear the slot.
    ///
    /// Returns `false` (dropping `value`) when nothing was pending.
    pub fn complete(&mut self, value: T) -> bool {
        let Some(Pending { sender, build }) = self.pending.take() else {
            return false;
        };
        // `build` still holds the receiver, so the send cannot be refused.
        let _ = sender.send(value);
        drop(build);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll, Wake, Waker};

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn second_request_joins_pending_build() {
        let mut slot = BuildSlot::<u32>::new();
        let (_, first) = slot.request();
        let (_, second) = slot.request();
        assert_eq!(first, Request::Started);
        assert_eq!(second, Request::Joined);
        assert!(slot.is_pending());
    }

    #[test]
    fn all_waiters_receive_same_result() {
        let mut slot = BuildSlot::new();
        let (a, _) = slot.request();
        let (b, _) = slot.request();

        assert!(slot.complete(7));

        assert_eq!(pollster::block_on(a), Ok(7));
        assert_eq!(pollster::block_on(b), Ok(7));
        assert!(!slot.is_pending());
    }

    #[test]
    fn completion_wakes_registered_waiters() {
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(Arc::clone(&counter));
        let mut cx = Context::from_waker(&waker);

        let mut slot = BuildSlot::new();
        let (mut build, _) = slot.request();
        assert_eq!(Pin::new(&mut build).poll(&mut cx), Poll::Pending);
        // Re-polling with the same waker does not register twice.
        assert_eq!(Pin::new(&mut build).poll(&mut cx), Poll::Pending);

        slot.complete("done");

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(Pin::new(&mut build).poll(&mut cx), Poll::Ready(Ok("done")));
    }

    #[test]
    fn request_after_completion_starts_fresh_build() {
        let mut slot = BuildSlot::new();
        let (old, _) = slot.request();
        slot.complete(1);
        let (new, request) = slot.request();

        assert_eq!(request, Request::Started);
        assert_eq!(old.now_or_never(), Some(Ok(1)));
        assert_eq!(new.now_or_never(), None);
    }

    #[test]
    fn dropped_slot_cancels_waiters() {
        let mut slot = BuildSlot::<u32>::new();
        let (build, _) = slot.request();
        drop(slot);
        assert_eq!(pollster::block_on(build), Err(oneshot::Canceled));
    }

    #[test]
    fn complete_without_pending_build_is_noop() {
        let mut slot = BuildSlot::new();
        assert!(!slot.complete(3));
    }
}
