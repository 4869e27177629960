//! Reader state: gesture reconciliation and notifications.
//!
//! # Module Structure
//!
//! - `events`: EventBus / ReaderEvent - observer registration and publishing
//! - `gesture`: GestureEvent and handler outcomes
//! - `pan_handler`: pan state machine (strip translation, swipe animation)
//! - `pinch_handler`: pinch state machine (zoom resolution on release)
//! - `momentum`: fling projection primitive
//! - `reader`: IssueReader - the aggregate the presentation layer drives

pub mod events;
pub mod gesture;
pub mod momentum;
pub mod pan_handler;
pub mod pinch_handler;
pub mod reader;

pub use events::{EventBus, ReaderEvent, SubscriptionId};
pub use gesture::{GestureEvent, GestureKind, GestureOutcome, GesturePhase};
pub use momentum::{momentum, Momentum, MomentumConfig};
pub use pan_handler::{PanHandler, PanSettings, PendingTransition};
pub use pinch_handler::PinchHandler;
pub use reader::{IssueReader, ReaderSettings};
