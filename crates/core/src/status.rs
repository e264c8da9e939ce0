//! Slide build status and its transition rules.
//!
//! ```text
//! pending ──► building ──► completed
//!                │  ▲          │
//!                ▼  └──────────┤
//!             failed ──────────┘ (rebuild)
//! ```
//!
//! The status is stored as lower-case text in the `slides.status` column;
//! the SQL `CHECK` constraint must list exactly the values of [`SlideStatus::ALL`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a slide project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideStatus {
    /// Record exists; no job has started working on it yet.
    #[default]
    Pending,
    /// A create or build job owns the record.
    Building,
    /// The last build succeeded and its output is published.
    Completed,
    /// The last create or build step failed; see `error_message`.
    Failed,
}

impl SlideStatus {
    pub const ALL: [SlideStatus; 4] = [
        SlideStatus::Pending,
        SlideStatus::Building,
        SlideStatus::Completed,
        SlideStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Staying in the same status is not a transition and returns `false`.
    pub fn can_transition_to(self, next: SlideStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Building)
                | (Self::Completed, Self::Building)
                | (Self::Failed, Self::Building)
                | (Self::Building, Self::Completed)
                | (Self::Building, Self::Failed)
        )
    }

    /// Every status from which `self` can be entered.
    ///
    /// Used as the `WHERE status = ANY(...)` guard of compare-and-swap updates.
    pub fn sources(self) -> Vec<SlideStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(self))
            .collect()
    }

    /// `true` while a job owns the record; edits and rebuilds are refused.
    pub fn is_busy(self) -> bool {
        self == Self::Building
    }
}

impl fmt::Display for SlideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown slide status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for SlideStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for SlideStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
