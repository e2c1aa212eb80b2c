// sentinel.rs — The integration facade.
//
// Sentinel owns one immutable policy snapshot, the engines built from it and
// an audit sink. Callers either ask for a verdict (`review_plan`,
// `review_query`) or hand over the work itself (`guard`, `check_query`) and
// get a `GuardError` instead of execution when the answer is no.

use std::sync::Arc;

use sentinel_audit::{AuditEvent, AuditSink, EventKind, FanoutSink, JsonlSink, Subject, TracingSink};
use sentinel_policy::{Decision, PolicyStore, QueryGuard};

use crate::adapter::{normalize_action, ToolAction};
use crate::config::SentinelConfig;
use crate::error::GuardError;
use crate::plan::Plan;
use crate::reviewer::{PlanReviewer, Verdict};

/// Layer name recorded for query decisions.
const QUERY_LAYER: &str = "query";

/// The assembled firewall: plan reviewer, query guard and audit sink.
pub struct Sentinel {
    store: PolicyStore,
    reviewer: PlanReviewer,
    query_guard: QueryGuard,
    sink: Arc<dyn AuditSink>,
}

impl Sentinel {
    /// Load policies from the configured paths and open the audit log.
    ///
    /// Never writes policy files; see [`crate::bootstrap`] for that.
    pub fn new(config: &SentinelConfig) -> Result<Self, GuardError> {
        let store = PolicyStore::load(&config.policy_paths());
        if store.has_lockdown() {
            tracing::error!(
                "one or more policy documents are locked down; affected checks deny all"
            );
        }

        let mut sink = FanoutSink::new().with(Arc::new(TracingSink));
        if let Some(path) = &config.audit_log {
            sink = sink.with(Arc::new(JsonlSink::open(path)?));
        }

        Ok(Self::from_parts(store, Arc::new(sink), config.default_role.clone()))
    }

    /// Load `<root>/sentinel.toml` (or the default layout) and build from it.
    pub fn for_project(project_root: impl AsRef<std::path::Path>) -> Result<Self, GuardError> {
        let config = SentinelConfig::load(project_root)?;
        Self::new(&config)
    }

    /// Assemble from an explicit store and sink.
    pub fn from_parts(
        store: PolicyStore,
        sink: Arc<dyn AuditSink>,
        default_role: impl Into<String>,
    ) -> Self {
        let reviewer =
            PlanReviewer::from_store(&store, Arc::clone(&sink)).with_default_role(default_role);
        let query_guard = QueryGuard::new(store.query().clone());
        Self {
            store,
            reviewer,
            query_guard,
            sink,
        }
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    pub fn default_role(&self) -> &str {
        self.reviewer.default_role()
    }

    pub fn review_plan(&self, plan: &Plan) -> Verdict {
        self.reviewer.review(plan)
    }

    /// Normalize a single framework action and review it.
    pub fn review_action<A: ToolAction + ?Sized>(&self, action: &A) -> Verdict {
        self.review_plan(&normalize_action(action, self.default_role()))
    }

    /// Run `f` only if `plan` is approved.
    pub fn guard<F, R>(&self, plan: &Plan, f: F) -> Result<R, GuardError>
    where
        F: FnOnce() -> R,
    {
        let verdict = self.review_plan(plan);
        if !verdict.is_allowed() {
            return Err(GuardError::AccessDenied {
                reason: verdict.reason().to_string(),
            });
        }
        Ok(f())
    }

    /// Run `f` only if the normalized `action` is approved.
    pub fn guard_action<A, F, R>(&self, action: &A, f: F) -> Result<R, GuardError>
    where
        A: ToolAction + ?Sized,
        F: FnOnce() -> R,
    {
        self.guard(&normalize_action(action, self.default_role()), f)
    }

    /// Check a data-access query and record the outcome.
    pub fn review_query(&self, query: &str, agent: &str) -> Decision {
        self.sink
            .record(AuditEvent::new(EventKind::Intercept, Subject::Query, agent).with_query(query));

        let decision = self.query_guard.check_query(query);

        let outcome = if decision.is_allowed() {
            AuditEvent::new(EventKind::Approve, Subject::Query, agent).with_reason(decision.reason())
        } else {
            AuditEvent::new(EventKind::Block, Subject::Query, agent)
                .with_block(QUERY_LAYER, decision.reason())
        };
        self.sink.record(outcome.with_query(query));

        decision
    }

    /// `Ok(())` if the query may run, else [`GuardError::QueryDenied`].
    pub fn check_query(&self, query: &str, agent: &str) -> Result<(), GuardError> {
        let decision = self.review_query(query, agent);
        if decision.is_allowed() {
            Ok(())
        } else {
            Err(GuardError::QueryDenied {
                reason: decision.reason().to_string(),
            })
        }
    }
}
