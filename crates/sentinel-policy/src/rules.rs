// rules.rs — Rule-set documents for the three decision layers.
//
// Each layer is configured by its own document:
// - AuthorityPolicy: named roles with tool grants and resource scopes
// - BlacklistPolicy: sensitive path and prohibited command substrings
// - QueryPolicy: forbidden keywords and the row-limit requirement
//
// Missing keys deserialize to empty values, so a document without `roles`
// grants nothing. Unknown keys (e.g. `description`) are tolerated.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The wildcard entry for `allowed_tools` and `resource_scopes` keys.
pub const WILDCARD: &str = "*";

/// Role assigned when a plan or normalized action carries no role.
pub const DEFAULT_ROLE: &str = "restricted";

/// A policy document that has a built-in safe default.
///
/// The default is what the store uses when the document's file is absent,
/// and what the bootstrap utility writes to disk.
pub trait PolicyDocument: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Short name used in log lines and lockdown reasons.
    const KIND: &'static str;

    /// The documented safe default for this document.
    fn safe_default() -> Self;
}

// ── Authority ──

/// Tool grants and resource scopes for one role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Tools this role may invoke. `"*"` grants every tool.
    #[serde(default)]
    pub allowed_tools: Vec<String>,

    /// Tool (or `"*"`) → glob patterns of resources the tool may touch.
    #[serde(default)]
    pub resource_scopes: BTreeMap<String, Vec<String>>,
}

impl RoleDefinition {
    /// Whether the role holds the wildcard tool grant (full admin).
    pub fn allows_all_tools(&self) -> bool {
        self.allowed_tools.iter().any(|t| t == WILDCARD)
    }

    /// Whether the role may invoke `tool` at all.
    pub fn allows_tool(&self, tool: &str) -> bool {
        self.allows_all_tools() || self.allowed_tools.iter().any(|t| t == tool)
    }

    /// Patterns registered for `tool` followed by those under the wildcard key.
    ///
    /// Wildcard scopes only ever add to the tool's own scopes.
    pub fn effective_scopes(&self, tool: &str) -> Vec<&str> {
        let mut scopes: Vec<&str> = self
            .resource_scopes
            .get(tool)
            .map(|p| p.iter().map(String::as_str).collect())
            .unwrap_or_default();
        if tool != WILDCARD {
            if let Some(global) = self.resource_scopes.get(WILDCARD) {
                scopes.extend(global.iter().map(String::as_str));
            }
        }
        scopes
    }
}

/// The authority policy document (`auth_policy.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorityPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Role name → definition. Roles not listed here are always denied.
    #[serde(default)]
    pub roles: BTreeMap<String, RoleDefinition>,
}

impl AuthorityPolicy {
    /// Look up a role by name.
    pub fn role(&self, name: &str) -> Option<&RoleDefinition> {
        self.roles.get(name)
    }
}

impl PolicyDocument for AuthorityPolicy {
    const KIND: &'static str = "authority";

    fn safe_default() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(
            DEFAULT_ROLE.to_string(),
            RoleDefinition {
                allowed_tools: strings(&["read_file"]),
                resource_scopes: BTreeMap::from([(
                    "read_file".to_string(),
                    strings(&["/public/*", "*.log"]),
                )]),
            },
        );
        roles.insert(
            "admin".to_string(),
            RoleDefinition {
                allowed_tools: strings(&[WILDCARD]),
                resource_scopes: BTreeMap::from([(WILDCARD.to_string(), strings(&[WILDCARD]))]),
            },
        );
        Self {
            description: Some(
                "Safe Default authority policy: 'restricted' may read public files and logs, \
                 'admin' holds every tool and scope."
                    .to_string(),
            ),
            roles,
        }
    }
}

// ── Blacklist ──

/// Substrings that veto an action regardless of role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlacklistRules {
    /// Any occurrence in a resolved path denies the access.
    #[serde(default)]
    pub sensitive_files: Vec<String>,

    /// Any occurrence in a resolved command line denies the command.
    #[serde(default)]
    pub prohibited_commands: Vec<String>,
}

/// The blacklist policy document (`policy.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlacklistPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub rules: BlacklistRules,
}

impl PolicyDocument for BlacklistPolicy {
    const KIND: &'static str = "blacklist";

    fn safe_default() -> Self {
        Self {
            description: Some(
                "Safe Default blacklist: credentials and system files, destructive and \
                 network-fetching commands."
                    .to_string(),
            ),
            rules: BlacklistRules {
                sensitive_files: strings(&["/etc/passwd", ".env", "id_rsa", "config.yaml"]),
                prohibited_commands: strings(&[
                    "rm -rf",
                    "shutdown",
                    ":(){ :|:& };:",
                    "wget",
                    "curl",
                ]),
            },
        }
    }
}

// ── Query ──

/// Rules applied to raw data-access queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRules {
    /// Whole-word, case-insensitive tokens that may never appear.
    #[serde(default)]
    pub forbidden_keywords: Vec<String>,

    /// Read-all queries must carry a LIMIT clause or an id equality.
    #[serde(default)]
    pub require_limit: bool,
}

/// The query policy document (`sql_policy.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub rules: QueryRules,
}

impl PolicyDocument for QueryPolicy {
    const KIND: &'static str = "query";

    fn safe_default() -> Self {
        Self {
            description: Some(
                "Safe Default query policy: no destructive statements, bounded reads only."
                    .to_string(),
            ),
            rules: QueryRules {
                forbidden_keywords: strings(&["DROP", "TRUNCATE", "DELETE", "ALTER"]),
                require_limit: true,
            },
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
