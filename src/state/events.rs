//! Reader notifications and observer registration.
//!
//! The reader publishes fire-and-forget [`ReaderEvent`]s; the rendering layer registers
//! callbacks. Delivery is synchronous and in registration order.

use std::fmt;
use std::time::Duration;

/// Notification published by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    /// These pages changed geometry or visibility and must be re-rendered.
    PageChanged(Vec<usize>),
    /// The container moved; consumers recompute visibility.
    ContainerPositionChanged {
        /// New container translate-left.
        left: f64,
    },
    /// Every page in the window holds an image.
    AllImagesLoaded,
    /// An animated transition of the given duration started.
    BeginAnimation(Duration),
    /// The running animation finished.
    EndAnimation,
}

impl ReaderEvent {
    /// Event name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PageChanged(_) => "PAGE_CHANGED",
            Self::ContainerPositionChanged { .. } => "CONTAINER_POSITION_CHANGED",
            Self::AllImagesLoaded => "ALL_IMAGES_LOADED",
            Self::BeginAnimation(_) => "BEGIN_ANIMATION",
            Self::EndAnimation => "END_ANIMATION",
        }
    }
}

/// Handle returned by registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ReaderEvent)>;

/// Observer registry.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every event.
    pub fn subscribe(&mut self, callback: impl FnMut(&ReaderEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Register a callback for `PAGE_CHANGED`, receiving the changed indices.
    pub fn on_page_changed(&mut self, mut callback: impl FnMut(&[usize]) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let ReaderEvent::PageChanged(indices) = event {
                callback(indices);
            }
        })
    }

    /// Register a callback for `CONTAINER_POSITION_CHANGED`, receiving the new left edge.
    pub fn on_position_changed(&mut self, mut callback: impl FnMut(f64) + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let ReaderEvent::ContainerPositionChanged { left } = event {
                callback(*left);
            }
        })
    }

    /// Remove a callback. Returns `false` for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every callback.
    pub fn publish(&mut self, event: ReaderEvent) {
        tracing::debug!(
            event = event.name(),
            subscribers = self.subscribers.len(),
            "Publishing reader event"
        );
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &mut EventBus) -> Rc<RefCell<Vec<ReaderEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    #[test]
    fn publish_reaches_every_subscriber() {
        let mut bus = EventBus::new();
        let a = recorder(&mut bus);
        let b = recorder(&mut bus);

        bus.publish(ReaderEvent::AllImagesLoaded);

        assert_eq!(a.borrow().as_slice(), &[ReaderEvent::AllImagesLoaded]);
        assert_eq!(b.borrow().len(), 1);
    }

    #[test]
    fn typed_callbacks_filter_events() {
        let mut bus = EventBus::new();
        let pages = Rc::new(RefCell::new(Vec::new()));
        let lefts = Rc::new(RefCell::new(Vec::new()));
        let (p, l) = (Rc::clone(&pages), Rc::clone(&lefts));
        bus.on_page_changed(move |indices| p.borrow_mut().extend_from_slice(indices));
        bus.on_position_changed(move |left| l.borrow_mut().push(left));

        bus.publish(ReaderEvent::PageChanged(vec![3, 4]));
        bus.publish(ReaderEvent::ContainerPositionChanged { left: -120.0 });
        bus.publish(ReaderEvent::EndAnimation);

        assert_eq!(pages.borrow().as_slice(), &[3, 4]);
        assert_eq!(lefts.borrow().as_slice(), &[-120.0]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);

        bus.publish(ReaderEvent::EndAnimation);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(ReaderEvent::EndAnimation);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn event_names_match_wire_names() {
        assert_eq!(
            ReaderEvent::BeginAnimation(Duration::from_millis(300)).name(),
            "BEGIN_ANIMATION"
        );
        assert_eq!(ReaderEvent::PageChanged(vec![]).name(), "PAGE_CHANGED");
    }
}
