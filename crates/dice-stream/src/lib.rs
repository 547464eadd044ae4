mod error;
mod event;
mod hub;

pub use error::StreamError;
pub use event::{EventKind, StreamEvent};
pub use hub::{StreamHub, SubscriptionHandle, DEFAULT_SUBSCRIBER_BUFFER};
