// config.rs — Sentinel configuration.
//
// SentinelConfig says where the three policy documents and the audit log
// live and which role unlabeled plans run under. `for_project()` gives the
// conventional layout; a `sentinel.toml` in the project root can override
// any field, with relative paths resolved against that root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sentinel_policy::{PolicyPaths, DEFAULT_ROLE};

use crate::error::ConfigError;

/// File name of the optional project config.
pub const CONFIG_FILE: &str = "sentinel.toml";

/// Configuration for a Sentinel instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentinelConfig {
    /// Blacklist document (`policy.json`).
    pub blacklist_policy: PathBuf,

    /// Authority document (`auth_policy.json`).
    pub authority_policy: PathBuf,

    /// Query document (`sql_policy.json`).
    pub query_policy: PathBuf,

    /// Hash-chained JSONL audit log. `None` keeps audit in the tracing stream only.
    pub audit_log: Option<PathBuf>,

    /// Role for plans and actions that do not declare one.
    pub default_role: String,
}

/// On-disk shape of `sentinel.toml`; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    blacklist_policy: Option<PathBuf>,
    authority_policy: Option<PathBuf>,
    query_policy: Option<PathBuf>,
    audit_log: Option<PathBuf>,
    /// Set to false to disable the JSONL audit log.
    audit_log_enabled: Option<bool>,
    default_role: Option<String>,
}

impl SentinelConfig {
    /// Standard layout for a project root.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref();
        let policies = PolicyPaths::in_dir(root);
        Self {
            blacklist_policy: policies.blacklist,
            authority_policy: policies.authority,
            query_policy: policies.query,
            audit_log: Some(root.join(".sentinel").join("audit.jsonl")),
            default_role: DEFAULT_ROLE.to_string(),
        }
    }

    /// `for_project()` overlaid with `<root>/sentinel.toml` when it exists.
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = project_root.as_ref();
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::for_project(root));
        }
        Self::from_toml_file(&path, root)
    }

    /// Parse `path` and overlay it on `for_project(root)`.
    pub fn from_toml_file(path: &Path, root: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded sentinel config");
        Ok(Self::for_project(root).overlay(file, root))
    }

    fn overlay(mut self, file: ConfigFile, root: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };

        if let Some(p) = file.blacklist_policy {
            self.blacklist_policy = resolve(p);
        }
        if let Some(p) = file.authority_policy {
            self.authority_policy = resolve(p);
        }
        if let Some(p) = file.query_policy {
            self.query_policy = resolve(p);
        }
        if let Some(p) = file.audit_log {
            self.audit_log = Some(resolve(p));
        }
        if file.audit_log_enabled == Some(false) {
            self.audit_log = None;
        }
        if let Some(role) = file.default_role {
            self.default_role = role;
        }
        self
    }

    /// Locations handed to [`sentinel_policy::PolicyStore::load`].
    pub fn policy_paths(&self) -> PolicyPaths {
        PolicyPaths {
            authority: self.authority_policy.clone(),
            blacklist: self.blacklist_policy.clone(),
            query: self.query_policy.clone(),
        }
    }
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self::for_project(".")
    }
}
