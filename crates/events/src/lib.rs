//! In-process event bus for slide lifecycle changes.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`SlideEvent`]: a record snapshot tagged with what happened to it.
//!
//! Publishers are the background jobs and request handlers; the API's live
//! update router is the main subscriber.

pub mod bus;

pub use bus::{EventBus, SlideEvent, SlideEventKind};
