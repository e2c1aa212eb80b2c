// reviewer.rs — Whole-plan review: every step must clear authority, then blacklist.
//
// A plan is approved only if all steps pass. Evaluation stops at the first
// failing step; later steps are never examined. An empty plan is approved.
// Each review emits INTERCEPT, then exactly one of BLOCK or APPROVE.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use sentinel_audit::{AuditEvent, AuditSink, EventKind, Subject};
use sentinel_policy::{AuthorityEngine, BlacklistEngine, Decision, PolicyStore, DEFAULT_ROLE};

use crate::plan::{Plan, Step};

/// Reason given when every step passes.
pub const PLAN_APPROVED: &str = "Plan Approved.";

const UNKNOWN_AGENT: &str = "unknown";

/// Which check rejected a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// The step itself was malformed.
    Structure,
    Authority,
    Blacklist,
}

impl Layer {
    /// Lower-case name recorded in audit events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Structure => "structure",
            Layer::Authority => "authority",
            Layer::Blacklist => "blacklist",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// The first failing step of a denied plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// 1-based step number.
    pub step: usize,
    pub layer: Layer,
    /// The layer's own reason, without the step prefix.
    pub reason: String,
}

/// Outcome of a plan review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
}

impl Verdict {
    pub fn approved() -> Self {
        Self {
            decision: Decision::allow(PLAN_APPROVED),
            violation: None,
        }
    }

    pub fn blocked(step: usize, layer: Layer, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = match layer {
            Layer::Structure => format!("Step {} BLOCKED: {}", step, reason),
            Layer::Authority | Layer::Blacklist => {
                format!("Step {} BLOCKED by {}: {}", step, layer, reason)
            }
        };
        Self {
            decision: Decision::deny(message),
            violation: Some(Violation {
                step,
                layer,
                reason,
            }),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }

    pub fn reason(&self) -> &str {
        self.decision.reason()
    }
}

/// Reviews plans against the authority and blacklist layers.
///
/// Holds only immutable engines and a shared sink, so one reviewer can serve
/// concurrent callers.
pub struct PlanReviewer {
    authority: AuthorityEngine,
    blacklist: BlacklistEngine,
    sink: Arc<dyn AuditSink>,
    default_role: String,
}

impl PlanReviewer {
    pub fn new(
        authority: AuthorityEngine,
        blacklist: BlacklistEngine,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            authority,
            blacklist,
            sink,
            default_role: DEFAULT_ROLE.to_string(),
        }
    }

    /// Build both engines from a loaded store.
    pub fn from_store(store: &PolicyStore, sink: Arc<dyn AuditSink>) -> Self {
        Self::new(
            AuthorityEngine::new(store.authority().clone()),
            BlacklistEngine::new(store.blacklist().clone()),
            sink,
        )
    }

    /// Role used for plans that do not declare one.
    pub fn with_default_role(mut self, role: impl Into<String>) -> Self {
        self.default_role = role.into();
        self
    }

    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    /// Review a plan and record the outcome.
    pub fn review(&self, plan: &Plan) -> Verdict {
        let role = plan.role.as_deref().unwrap_or(&self.default_role);

        self.sink.record(
            plan_event(EventKind::Intercept, plan, role)
                .with_metadata(serde_json::json!({ "steps": plan.steps.len() })),
        );

        let verdict = self.evaluate(role, &plan.steps);

        let outcome = match &verdict.violation {
            Some(violation) => plan_event(EventKind::Block, plan, role)
                .with_step(violation.step)
                .with_block(violation.layer.as_str(), verdict.reason()),
            None => plan_event(EventKind::Approve, plan, role).with_reason(verdict.reason()),
        };
        self.sink.record(outcome);

        verdict
    }

    /// Evaluate steps in order for `role` without recording anything.
    pub fn evaluate(&self, role: &str, steps: &[Step]) -> Verdict {
        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;

            if let Some(defect) = step.defect() {
                tracing::debug!(step = number, defect, "step could not be read");
                return Verdict::blocked(
                    number,
                    Layer::Structure,
                    format!("malformed step ({}).", defect),
                );
            }

            let tool = match step.tool_name() {
                Some(tool) => tool,
                None => {
                    tracing::debug!(step = number, "step has no tool");
                    return Verdict::blocked(
                        number,
                        Layer::Structure,
                        "malformed step (missing tool).",
                    );
                }
            };

            let decision = self.authority.check_permission(role, tool, &step.args);
            if !decision.is_allowed() {
                return Verdict::blocked(number, Layer::Authority, decision.reason());
            }

            let decision = self.blacklist.check_blacklist(tool, &step.args);
            if !decision.is_allowed() {
                return Verdict::blocked(number, Layer::Blacklist, decision.reason());
            }

            tracing::debug!(step = number, tool, "step passed");
        }

        Verdict::approved()
    }
}

fn plan_event(kind: EventKind, plan: &Plan, role: &str) -> AuditEvent {
    let agent = plan.agent.as_deref().unwrap_or(UNKNOWN_AGENT);
    let event = AuditEvent::new(kind, Subject::Plan, agent).with_role(role);
    match plan.id.as_deref() {
        Some(id) => event.with_plan_id(id),
        None => event,
    }
}
