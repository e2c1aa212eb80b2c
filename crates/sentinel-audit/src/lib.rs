//! # sentinel-audit
//!
//! Decision audit trail for the Sentinel agent firewall.
//!
//! Every review of a plan or query produces an INTERCEPT [`AuditEvent`] and
//! then exactly one BLOCK or APPROVE event. Events are handed to an
//! [`AuditSink`]; [`JsonlSink`] appends them to a hash-chained JSONL
//! [`AuditLog`] that can later be checked with [`AuditLog::verify_chain`].
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use sentinel_audit::{AuditEvent, AuditSink, EventKind, JsonlSink, Subject};
//!
//! let sink = JsonlSink::open("/tmp/audit.jsonl").unwrap();
//! sink.record(AuditEvent::new(EventKind::Intercept, Subject::Plan, "agent-1").with_plan_id("p-1"));
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;
pub mod sink;

pub use error::AuditError;
pub use event::{AuditEvent, EventKind, Subject};
pub use log::{AuditLog, ChainSummary};
pub use sink::{AuditSink, FanoutSink, JsonlSink, MemorySink, TracingSink};
