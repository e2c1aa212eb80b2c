// event.rs — Audit event data model.
//
// Every review emits one INTERCEPT event followed by exactly one BLOCK or
// APPROVE event. Events written to a JSONL log carry `previous_hash`,
// linking each line to the one before it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A plan or query arrived for review.
    Intercept,
    /// A layer denied it.
    Block,
    /// Every check passed.
    Approve,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Intercept => write!(f, "INTERCEPT"),
            EventKind::Block => write!(f, "BLOCK"),
            EventKind::Approve => write!(f, "APPROVE"),
        }
    }
}

/// What was reviewed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Plan,
    Query,
}

/// A single audit event: one line in the JSONL audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,

    /// When this event occurred (UTC).
    pub timestamp: DateTime<Utc>,

    pub kind: EventKind,

    pub subject: Subject,

    /// Plan identifier (plans only).
    pub plan_id: Option<String>,

    /// Name of the submitting agent.
    pub agent: String,

    /// Role the plan was evaluated under (plans only).
    pub role: Option<String>,

    /// Which layer blocked (BLOCK only): "structure", "authority", "blacklist", "query".
    pub layer: Option<String>,

    /// 1-based index of the blocked step (plan BLOCK only).
    pub step: Option<usize>,

    /// Human-readable reason (BLOCK and APPROVE).
    pub reason: Option<String>,

    /// The raw query text (queries only).
    pub query: Option<String>,

    /// Hash of the previous line in the log; None for the first event.
    pub previous_hash: Option<String>,

    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    /// Create a new event with the current timestamp and a random UUID.
    pub fn new(kind: EventKind, subject: Subject, agent: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            subject,
            plan_id: None,
            agent: agent.into(),
            role: None,
            layer: None,
            step: None,
            reason: None,
            query: None,
            previous_hash: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_plan_id(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Record the blocking layer and reason.
    pub fn with_block(mut self, layer: impl Into<String>, reason: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self.reason = Some(reason.into());
        self
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
