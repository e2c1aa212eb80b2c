// store.rs — Loading and holding immutable policy snapshots.
//
// Each document is loaded once into a PolicySlot:
// - file present and valid  → Active (from file)
// - file absent             → Active (built-in safe default), with a notice
// - file unreadable/invalid → Lockdown: engines built from it deny everything
//
// Documents are shared behind `Arc` and never mutated. Picking up edits
// means loading a new PolicyStore.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PolicyLoadError;
use crate::rules::{AuthorityPolicy, BlacklistPolicy, PolicyDocument, QueryPolicy};

/// Where an active document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOrigin {
    /// Parsed from this file.
    File(PathBuf),
    /// The file was absent; the built-in default is in use.
    BuiltInDefault,
    /// Supplied directly by the caller.
    Provided,
}

impl fmt::Display for PolicyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyOrigin::File(path) => write!(f, "file {}", path.display()),
            PolicyOrigin::BuiltInDefault => write!(f, "built-in default"),
            PolicyOrigin::Provided => write!(f, "provided"),
        }
    }
}

/// One loaded policy document, or the reason it could not be loaded.
#[derive(Debug, Clone)]
pub enum PolicySlot<T> {
    Active {
        document: Arc<T>,
        origin: PolicyOrigin,
    },
    /// The source was present but unusable. Deny all until corrected.
    Lockdown { path: PathBuf, reason: String },
}

impl<T: PolicyDocument> PolicySlot<T> {
    /// Load a document from `path`, substituting the safe default only when
    /// the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match load_document::<T>(path) {
            Ok(document) => {
                tracing::debug!(kind = T::KIND, path = %path.display(), "policy loaded");
                PolicySlot::Active {
                    document: Arc::new(document),
                    origin: PolicyOrigin::File(path.to_path_buf()),
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    kind = T::KIND,
                    path = %path.display(),
                    "policy file not found; using built-in safe default"
                );
                Self::built_in_default()
            }
            Err(e) => {
                tracing::error!(
                    kind = T::KIND,
                    path = %path.display(),
                    error = %e,
                    "policy file unusable; denying all requests until corrected"
                );
                PolicySlot::Lockdown {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Wrap an already-loaded document.
    pub fn from_document(document: T) -> Self {
        PolicySlot::Active {
            document: Arc::new(document),
            origin: PolicyOrigin::Provided,
        }
    }

    /// The documented safe default for this document type.
    pub fn built_in_default() -> Self {
        PolicySlot::Active {
            document: Arc::new(T::safe_default()),
            origin: PolicyOrigin::BuiltInDefault,
        }
    }
}

impl<T> PolicySlot<T> {
    /// The active document, if any.
    pub fn document(&self) -> Option<&Arc<T>> {
        match self {
            PolicySlot::Active { document, .. } => Some(document),
            PolicySlot::Lockdown { .. } => None,
        }
    }

    pub fn origin(&self) -> Option<&PolicyOrigin> {
        match self {
            PolicySlot::Active { origin, .. } => Some(origin),
            PolicySlot::Lockdown { .. } => None,
        }
    }

    pub fn is_lockdown(&self) -> bool {
        matches!(self, PolicySlot::Lockdown { .. })
    }

    /// Human-readable denial reason for a locked slot.
    pub fn lockdown_reason(&self) -> Option<String> {
        match self {
            PolicySlot::Active { .. } => None,
            PolicySlot::Lockdown { path, reason } => Some(format!(
                "Policy unavailable: '{}' could not be loaded ({}); denying all until corrected.",
                path.display(),
                reason
            )),
        }
    }
}

/// Read and parse a policy document.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
pub fn load_document<T: PolicyDocument>(path: &Path) -> Result<T, PolicyLoadError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PolicyLoadError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(PolicyLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if is_yaml(path) {
        serde_yaml::from_str(&data).map_err(|source| PolicyLoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&data).map_err(|source| PolicyLoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// File locations of the three policy documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyPaths {
    pub authority: PathBuf,
    pub blacklist: PathBuf,
    pub query: PathBuf,
}

impl PolicyPaths {
    /// Conventional file names under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            authority: dir.join("auth_policy.json"),
            blacklist: dir.join("policy.json"),
            query: dir.join("sql_policy.json"),
        }
    }
}

/// Read-only snapshots of all three rule sets.
///
/// Cloning is cheap: documents are shared.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    authority: PolicySlot<AuthorityPolicy>,
    blacklist: PolicySlot<BlacklistPolicy>,
    query: PolicySlot<QueryPolicy>,
}

impl PolicyStore {
    /// Load every document. Never fails; see [`PolicySlot::load`].
    pub fn load(paths: &PolicyPaths) -> Self {
        Self {
            authority: PolicySlot::load(&paths.authority),
            blacklist: PolicySlot::load(&paths.blacklist),
            query: PolicySlot::load(&paths.query),
        }
    }

    /// Build a store from documents the caller already holds.
    pub fn from_documents(
        authority: AuthorityPolicy,
        blacklist: BlacklistPolicy,
        query: QueryPolicy,
    ) -> Self {
        Self {
            authority: PolicySlot::from_document(authority),
            blacklist: PolicySlot::from_document(blacklist),
            query: PolicySlot::from_document(query),
        }
    }

    /// All three built-in safe defaults.
    pub fn defaults() -> Self {
        Self {
            authority: PolicySlot::built_in_default(),
            blacklist: PolicySlot::built_in_default(),
            query: PolicySlot::built_in_default(),
        }
    }

    /// Build a store from slots in any state, e.g. one document locked down
    /// beside two that loaded.
    pub fn from_slots(
        authority: PolicySlot<AuthorityPolicy>,
        blacklist: PolicySlot<BlacklistPolicy>,
        query: PolicySlot<QueryPolicy>,
    ) -> Self {
        Self {
            authority,
            blacklist,
            query,
        }
    }

    pub fn authority(&self) -> &PolicySlot<AuthorityPolicy> {
        &self.authority
    }

    pub fn blacklist(&self) -> &PolicySlot<BlacklistPolicy> {
        &self.blacklist
    }

    pub fn query(&self) -> &PolicySlot<QueryPolicy> {
        &self.query
    }

    /// Whether any document is locked down.
    pub fn has_lockdown(&self) -> bool {
        self.authority.is_lockdown() || self.blacklist.is_lockdown() || self.query.is_lockdown()
    }
}
