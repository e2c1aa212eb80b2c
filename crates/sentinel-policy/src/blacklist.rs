// blacklist.rs — Role-independent defense-in-depth layer.
//
// Runs after the authority check and can veto an action the role allows.
// Matching is a plain, case-sensitive substring test: no path
// canonicalization and no command tokenizing. `../../.env` is caught
// because it contains `.env`, and `curlew` would be caught by `curl`.

use crate::decision::Decision;
use crate::extraction::{extract_command, extract_resource, is_command_tool, is_path_tool, ToolArgs};
use crate::rules::{BlacklistPolicy, BlacklistRules};
use crate::store::PolicySlot;

/// Evaluates tool invocations against the sensitive-file and
/// prohibited-command substring lists.
#[derive(Debug, Clone)]
pub struct BlacklistEngine {
    policy: PolicySlot<BlacklistPolicy>,
}

impl BlacklistEngine {
    pub fn new(policy: PolicySlot<BlacklistPolicy>) -> Self {
        Self { policy }
    }

    pub fn from_policy(policy: BlacklistPolicy) -> Self {
        Self::new(PolicySlot::from_document(policy))
    }

    /// Check one tool call. A locked-down policy denies every call.
    pub fn check_blacklist(&self, tool: &str, args: &ToolArgs) -> Decision {
        match self.policy.document() {
            Some(policy) => check_blacklist(tool, args, &policy.rules),
            None => Decision::deny(
                self.policy
                    .lockdown_reason()
                    .unwrap_or_else(|| "Blacklist policy unavailable.".to_string()),
            ),
        }
    }
}

/// Check one tool call against `rules`.
///
/// Rules are tested in stored order and the first match is reported; the
/// allow/deny outcome does not depend on that order.
pub fn check_blacklist(tool: &str, args: &ToolArgs, rules: &BlacklistRules) -> Decision {
    if is_path_tool(tool) {
        if let Some(path) = extract_resource(tool, args) {
            if let Some(sensitive) = first_contained(&path, &rules.sensitive_files) {
                tracing::debug!(tool, %path, sensitive, "sensitive file matched");
                return Decision::deny(format!("Access to sensitive file '{}'.", sensitive));
            }
        }
    }

    if is_command_tool(tool) {
        if let Some(command) = extract_command(args) {
            if let Some(prohibited) = first_contained(&command, &rules.prohibited_commands) {
                tracing::debug!(tool, %command, prohibited, "prohibited command matched");
                return Decision::deny(format!("Prohibited command pattern '{}'.", prohibited));
            }
        }
    }

    Decision::allow("No blacklist rule matched.")
}

/// The first needle that occurs verbatim in `haystack`.
///
/// Empty needles are ignored; they would otherwise match everything.
fn first_contained<'a>(haystack: &str, needles: &'a [String]) -> Option<&'a str> {
    needles
        .iter()
        .map(String::as_str)
        .find(|needle| !needle.is_empty() && haystack.contains(*needle))
}
