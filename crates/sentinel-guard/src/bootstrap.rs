// bootstrap.rs — Write the built-in default policy documents to disk.
//
// Separate from loading: the engines never write files. Existing files are
// never touched, and a failed write is reported rather than raised because
// the same defaults apply in memory whenever a file is absent.

use std::path::{Path, PathBuf};

use sentinel_policy::{AuthorityPolicy, BlacklistPolicy, PolicyDocument, QueryPolicy};

use crate::config::SentinelConfig;
use crate::error::BootstrapError;

/// What `ensure_default_policies` did with each document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
    /// Paths that could not be written, with the I/O error text.
    pub failed: Vec<(PathBuf, String)>,
}

impl BootstrapReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Write each missing policy document with its safe default.
///
/// Documents are serialized as pretty JSON, or YAML when the path ends in
/// `.yaml` / `.yml`.
pub fn ensure_default_policies(config: &SentinelConfig) -> Result<BootstrapReport, BootstrapError> {
    let mut report = BootstrapReport::default();
    ensure::<BlacklistPolicy>(&config.blacklist_policy, &mut report)?;
    ensure::<AuthorityPolicy>(&config.authority_policy, &mut report)?;
    ensure::<QueryPolicy>(&config.query_policy, &mut report)?;
    Ok(report)
}

fn ensure<T: PolicyDocument>(path: &Path, report: &mut BootstrapReport) -> Result<(), BootstrapError> {
    if path.exists() {
        tracing::debug!(kind = T::KIND, path = %path.display(), "policy exists; leaving untouched");
        report.existing.push(path.to_path_buf());
        return Ok(());
    }

    let content = render(&T::safe_default(), path)?;

    let written = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
    .and_then(|_| std::fs::write(path, content));

    match written {
        Ok(()) => {
            tracing::info!(kind = T::KIND, path = %path.display(), "wrote default policy");
            report.created.push(path.to_path_buf());
        }
        Err(e) => {
            tracing::warn!(
                kind = T::KIND,
                path = %path.display(),
                error = %e,
                "could not write default policy; built-in default stays in effect"
            );
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
    Ok(())
}

fn render<T: PolicyDocument>(document: &T, path: &Path) -> Result<String, BootstrapError> {
    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");

    let rendered = if is_yaml {
        serde_yaml::to_string(document).map_err(|e| e.to_string())
    } else {
        serde_json::to_string_pretty(document)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| e.to_string())
    };

    rendered.map_err(|message| BootstrapError::Serialize {
        kind: T::KIND,
        message,
    })
}
