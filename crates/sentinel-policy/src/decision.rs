// decision.rs — The allow/deny result every check returns.

use serde::{Deserialize, Serialize};

/// The outcome of a single check: allowed or denied, always with a reason.
///
/// This is the `(allowed, reason)` pair shared by the authority, blacklist
/// and query layers and by plan review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The action may proceed.
    Allow { reason: String },
    /// The action must not be executed.
    Deny { reason: String },
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Decision::Allow {
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            Decision::Allow { reason } | Decision::Deny { reason } => reason,
        }
    }

    /// Split into the `(allowed, reason)` tuple.
    pub fn into_parts(self) -> (bool, String) {
        match self {
            Decision::Allow { reason } => (true, reason),
            Decision::Deny { reason } => (false, reason),
        }
    }
}
