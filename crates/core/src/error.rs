use crate::status::SlideStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The record is in a status that does not permit the requested action.
    #[error("Slide {id} is {status}; cannot {action}")]
    InvalidState {
        id: DbId,
        status: SlideStatus,
        action: &'static str,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
