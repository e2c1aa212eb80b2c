//! # sentinel-policy
//!
//! Decision engines for the Sentinel agent firewall.
//!
//! Three independent layers decide, before execution, whether an agent's
//! action may run:
//!
//! - [`AuthorityEngine`]: role allowlists plus per-tool resource-scope globs.
//! - [`BlacklistEngine`]: role-independent sensitive-path and
//!   prohibited-command substrings.
//! - [`QueryGuard`]: forbidden keywords and bounded-read enforcement for raw
//!   data-access queries.
//!
//! Rule sets are loaded once into a [`PolicyStore`] and never mutated.
//!
//! ## Key invariants
//!
//! - **Unknown roles are denied**, whatever the tool.
//! - **Wildcards only widen**: `"*"` in `allowed_tools` or `resource_scopes`
//!   adds to a role's grants, never narrows them.
//! - **Authority is necessary, not sufficient**: the blacklist can veto an
//!   action the role allows.
//! - **Malformed policy fails closed**: a policy file that exists but cannot
//!   be parsed denies everything; only an absent file falls back to the
//!   built-in defaults.

pub mod authority;
pub mod blacklist;
pub mod decision;
pub mod error;
pub mod extraction;
pub mod query;
pub mod rules;
pub mod store;

pub use authority::AuthorityEngine;
pub use blacklist::{check_blacklist, BlacklistEngine};
pub use decision::Decision;
pub use error::PolicyLoadError;
pub use extraction::{extract_command, extract_resource, ToolArgs};
pub use query::{check_query, QueryGuard};
pub use rules::{
    AuthorityPolicy, BlacklistPolicy, BlacklistRules, PolicyDocument, QueryPolicy, QueryRules,
    RoleDefinition, DEFAULT_ROLE, WILDCARD,
};
pub use store::{load_document, PolicyOrigin, PolicyPaths, PolicySlot, PolicyStore};
