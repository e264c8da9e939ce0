//! Pushes slide changes to connected browsers.
//!
//! [`LiveUpdates`] subscribes to the event bus and, for every slide event,
//! broadcasts one JSON message over the WebSocket manager:
//!
//! ```text
//! {"type":"slide.updated","id":7,"html":"<tr id=\"slide_7\" ...>"}
//! {"type":"slide.removed","id":7}
//! ```
//!
//! Delivery is fire-and-forget. A client that reconnects sees current
//! state by reloading the listing.

use std::sync::Arc;

use deckhand_core::project::ProjectService;
use deckhand_core::types::DbId;
use deckhand_events::{SlideEvent, SlideEventKind};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::views::render_row;
use crate::ws::WsManager;

/// Wire format of a live update.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum LiveMessage {
    #[serde(rename = "slide.updated")]
    Updated { id: DbId, html: String },
    #[serde(rename = "slide.removed")]
    Removed { id: DbId },
}

impl LiveMessage {
    /// Build the message for an event, rendering the row when needed.
    pub fn from_event(event: &SlideEvent, service: &ProjectService) -> Result<Self, askama::Error> {
        let id = event.slide_id();
        Ok(match event.kind {
            SlideEventKind::Created | SlideEventKind::StatusChanged => Self::Updated {
                id,
                html: render_row(&event.slide, service)?,
            },
            SlideEventKind::Deleted => Self::Removed { id },
        })
    }
}

/// Routes slide events to WebSocket clients.
pub struct LiveUpdates {
    ws_manager: Arc<WsManager>,
    service: Arc<ProjectService>,
}

impl LiveUpdates {
    pub fn new(ws_manager: Arc<WsManager>, service: Arc<ProjectService>) -> Self {
        Self {
            ws_manager,
            service,
        }
    }

    /// Run until `cancel` fires or the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<SlideEvent>, cancel: CancellationToken) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Live update router shutting down");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) => self.push(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Live update router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, live update router shutting down");
                    break;
                }
            }
        }
    }

    async fn push(&self, event: &SlideEvent) {
        let message = match LiveMessage::from_event(event, &self.service) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(slide_id = event.slide_id(), error = %e, "Failed to render live update");
                return;
            }
        };
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(slide_id = event.slide_id(), error = %e, "Failed to encode live update");
                return;
            }
        };

        let delivered = self.ws_manager.broadcast_text(text).await;
        tracing::debug!(
            event_type = event.kind.as_str(),
            slide_id = event.slide_id(),
            delivered,
            "Live update pushed"
        );
    }
}
