//! One-shot notice/alert messages carried across a redirect in the query
//! string (`/slides?notice=...`).

use axum::response::Redirect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            alert: None,
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            notice: None,
            alert: Some(message.into()),
        }
    }

    /// `path` with this flash appended as a query string.
    pub fn url(&self, path: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{path}?{query}"),
            Ok(_) => path.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not encode flash message");
                path.to_string()
            }
        }
    }
}

/// `303 See Other` to `path` carrying `flash`.
pub fn redirect_with(path: &str, flash: Flash) -> Redirect {
    Redirect::to(&flash.url(path))
}
