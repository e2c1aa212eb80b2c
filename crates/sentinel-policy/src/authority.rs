// authority.rs — Role-based authority checks.
//
// Every plan step passes through `check_permission()` which checks:
//
// 1. Is the policy locked down (malformed source)? → Yes → Deny
// 2. Is the role defined? → No → Deny
// 3. Does the role grant the tool (or "*")? → No → Deny
// 4. Does the call name a resource? → No → Allow on the tool grant alone
// 5. Are there scopes for the tool (or "*")? → No → Allow only for admins
// 6. Does any scope glob match the resource? → Yes → Allow, else Deny
//
// Unknown roles are always denied, and wildcard grants only ever widen.

use glob::Pattern;

use crate::decision::Decision;
use crate::extraction::{extract_resource, ToolArgs};
use crate::rules::AuthorityPolicy;
use crate::store::PolicySlot;

/// Evaluates single tool invocations against the authority policy.
#[derive(Debug, Clone)]
pub struct AuthorityEngine {
    policy: PolicySlot<AuthorityPolicy>,
}

impl AuthorityEngine {
    pub fn new(policy: PolicySlot<AuthorityPolicy>) -> Self {
        Self { policy }
    }

    /// Build an engine directly from a policy document.
    pub fn from_policy(policy: AuthorityPolicy) -> Self {
        Self::new(PolicySlot::from_document(policy))
    }

    /// Decide whether `role` may invoke `tool` with `args`.
    pub fn check_permission(&self, role: &str, tool: &str, args: &ToolArgs) -> Decision {
        let policy = match self.policy.document() {
            Some(p) => p,
            None => {
                return Decision::deny(
                    self.policy
                        .lockdown_reason()
                        .unwrap_or_else(|| "Authority policy unavailable.".to_string()),
                )
            }
        };

        let role_def = match policy.role(role) {
            Some(r) => r,
            None => {
                return Decision::deny(format!("Role '{}' is not defined in auth policy.", role))
            }
        };

        if !role_def.allows_tool(tool) {
            return Decision::deny(format!(
                "Rule Violation: Role '{}' is not allowed to use tool '{}'.",
                role, tool
            ));
        }

        // Tools without an extractable resource are authorized by the grant alone.
        let resource = match extract_resource(tool, args) {
            Some(r) => r,
            None => return Decision::allow("Authorized."),
        };

        let scopes = role_def.effective_scopes(tool);
        if scopes.is_empty() {
            if role_def.allows_all_tools() {
                return Decision::allow("Authorized (Admin).");
            }
            return Decision::deny(format!(
                "Scope Violation: No resource scope defined for tool '{}'.",
                tool
            ));
        }

        match scopes
            .iter()
            .find(|pattern| matches_resource_pattern(pattern, &resource))
        {
            Some(pattern) => {
                tracing::debug!(role, tool, %resource, pattern, "resource scope matched");
                Decision::allow("Authorized.")
            }
            None => Decision::deny(format!(
                "Scope Violation: Access to '{}' not permitted by role '{}'.",
                resource, role
            )),
        }
    }
}

/// Check if a shell-style glob pattern matches a resource.
///
/// `*` matches any run of characters (including `/`), `?` exactly one.
/// `**` is just two stars, not a recursive-directory token.
/// Invalid patterns never match.
fn matches_resource_pattern(pattern: &str, target: &str) -> bool {
    match Pattern::new(&collapse_stars(pattern)) {
        Ok(p) => p.matches(target),
        Err(_) => false,
    }
}

/// Squash every run of `*` into one.
fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}
