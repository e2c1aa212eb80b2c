// error.rs — Error types for policy loading.
//
// Evaluation itself never fails: every check returns a Decision. These
// errors only describe why a policy document could not be loaded, and the
// store turns them into either a built-in default (file absent) or a
// lockdown (anything else).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a policy document.
#[derive(Debug, Error)]
pub enum PolicyLoadError {
    /// The policy file does not exist.
    #[error("policy file not found at {path}")]
    NotFound { path: PathBuf },

    /// The policy file exists but could not be read.
    #[error("failed to read policy file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy file is not valid JSON for its document type.
    #[error("malformed JSON policy at {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The policy file is not valid YAML for its document type.
    #[error("malformed YAML policy at {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl PolicyLoadError {
    /// True only for the "file absent" case, which is recoverable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PolicyLoadError::NotFound { .. })
    }
}
