//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>`. Delivery is at-most-once:
//! events published with no subscribers are dropped, and a subscriber that
//! falls more than the channel capacity behind observes
//! `RecvError::Lagged` and loses the overwritten events.

use chrono::{DateTime, Utc};
use deckhand_core::types::DbId;
use deckhand_db::models::slide::Slide;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// SlideEvent
// ---------------------------------------------------------------------------

/// What happened to a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideEventKind {
    #[serde(rename = "slide.created")]
    Created,
    #[serde(rename = "slide.status_changed")]
    StatusChanged,
    #[serde(rename = "slide.deleted")]
    Deleted,
}

impl SlideEventKind {
    /// Dot-separated event name, e.g. `"slide.status_changed"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "slide.created",
            Self::StatusChanged => "slide.status_changed",
            Self::Deleted => "slide.deleted",
        }
    }
}

/// A slide lifecycle event carrying the record as it was when published.
///
/// For [`SlideEventKind::Deleted`] the snapshot is the last persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideEvent {
    #[serde(rename = "type")]
    pub kind: SlideEventKind,
    pub slide: Slide,
    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl SlideEvent {
    pub fn new(kind: SlideEventKind, slide: Slide) -> Self {
        Self {
            kind,
            slide,
            timestamp: Utc::now(),
        }
    }

    pub fn created(slide: &Slide) -> Self {
        Self::new(SlideEventKind::Created, slide.clone())
    }

    pub fn status_changed(slide: &Slide) -> Self {
        Self::new(SlideEventKind::StatusChanged, slide.clone())
    }

    pub fn deleted(slide: &Slide) -> Self {
        Self::new(SlideEventKind::Deleted, slide.clone())
    }

    pub fn slide_id(&self) -> DbId {
        self.slide.id
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use deckhand_events::EventBus;
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
/// assert_eq!(bus.subscriber_count(), 1);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<SlideEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: SlideEvent) {
        tracing::debug!(
            event_type = event.kind.as_str(),
            slide_id = event.slide_id(),
            status = %event.slide.status,
            "Publishing slide event"
        );
        // A send error only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SlideEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
