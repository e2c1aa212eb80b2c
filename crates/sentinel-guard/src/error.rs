// error.rs — Error types for the guard layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced at the integration boundary.
///
/// Inside the engines a denial is a value; here it becomes the signal that
/// tells the caller not to execute.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A plan (or normalized action) was denied.
    #[error("Sentinel Blocked Execution: {reason}")]
    AccessDenied { reason: String },

    /// A data-access query was denied.
    #[error("Sentinel Blocked SQL: {reason}")]
    QueryDenied { reason: String },

    /// The configured audit log could not be opened.
    #[error("audit log unavailable: {0}")]
    Audit(#[from] sentinel_audit::AuditError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GuardError {
    /// True for the two denial variants.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            GuardError::AccessDenied { .. } | GuardError::QueryDenied { .. }
        )
    }
}

/// Errors from reading `sentinel.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Errors from writing default policy documents.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to serialize default {kind} policy: {message}")]
    Serialize { kind: &'static str, message: String },
}
