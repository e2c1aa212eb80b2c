// init.rs — Write default policy documents for a project.

use sentinel_guard::{ensure_default_policies, SentinelConfig};

pub fn execute(config: &SentinelConfig) -> anyhow::Result<()> {
    let report = ensure_default_policies(config)?;

    for path in &report.created {
        println!("created  {}", path.display());
    }
    for path in &report.existing {
        println!("exists   {}", path.display());
    }
    for (path, error) in &report.failed {
        println!("FAILED   {} ({})", path.display(), error);
    }

    if !report.is_clean() {
        anyhow::bail!(
            "{} policy document(s) could not be written; built-in defaults remain in effect",
            report.failed.len()
        );
    }
    Ok(())
}
