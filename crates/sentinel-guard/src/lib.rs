//! # sentinel-guard
//!
//! Pre-execution review of agent plans and queries.
//!
//! A [`Plan`] is an ordered list of tool invocations. The [`PlanReviewer`]
//! runs every step through the authority layer and then the blacklist layer,
//! stops at the first failing step, and records INTERCEPT followed by BLOCK
//! or APPROVE on an audit sink. The [`Sentinel`] facade bundles the reviewer
//! with the query guard and exposes the "run this only if allowed" entry
//! points used by agent integrations.
//!
//! ```rust,no_run
//! use sentinel_guard::{AgentAction, Sentinel, SentinelConfig};
//!
//! let sentinel = Sentinel::new(&SentinelConfig::for_project(".")).unwrap();
//! let action = AgentAction::new("read_file", serde_json::json!({"path": "/public/a.txt"}));
//! let contents = sentinel.guard_action(&action, || std::fs::read_to_string("/public/a.txt"));
//! ```

pub mod adapter;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod plan;
pub mod reviewer;
pub mod sentinel;

pub use adapter::{normalize_action, AgentAction, ToolAction, ToolInput};
pub use bootstrap::{ensure_default_policies, BootstrapReport};
pub use config::SentinelConfig;
pub use error::{BootstrapError, ConfigError, GuardError};
pub use plan::{Plan, Step};
pub use reviewer::{Layer, PlanReviewer, Verdict, Violation, PLAN_APPROVED};
pub use sentinel::Sentinel;
