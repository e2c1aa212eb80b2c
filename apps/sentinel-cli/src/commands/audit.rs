// audit.rs — Audit subcommands: verify, tail.

use std::path::PathBuf;

use clap::Subcommand;
use sentinel_audit::{AuditError, AuditEvent, AuditLog, ChainSummary};
use sentinel_guard::SentinelConfig;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit log hash chain integrity.
    Verify {
        /// Path to audit log (defaults to .sentinel/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent audit events.
    Tail {
        /// Path to audit log (defaults to .sentinel/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &SentinelConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let Some(path) = resolve(log, config) else {
                return Ok(());
            };

            match AuditLog::verify_chain(&path) {
                Ok(summary) => print_summary(&summary),
                Err(AuditError::IntegrityViolation {
                    line,
                    expected,
                    actual,
                }) => {
                    println!("Chain broken at line {}.", line);
                    match AuditLog::event_at(&path, line)? {
                        Some(event) => println!("  {}", describe(&event)),
                        None => println!("  (line {} is not a readable event)", line),
                    }
                    println!("  previous_hash on that line: {}", actual);
                    println!("  hash of the line before it: {}", expected);
                    anyhow::bail!("{} failed verification", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        AuditCommands::Tail { log, n } => {
            let Some(path) = resolve(log, config) else {
                return Ok(());
            };

            let recent = AuditLog::tail(&path, *n)?;
            if recent.is_empty() {
                println!("No audit events.");
                return Ok(());
            }

            println!(
                "{:<20} {:<10} {:<6} {:<16} {:<10} REASON",
                "TIMESTAMP", "KIND", "STEP", "AGENT", "LAYER"
            );
            println!("{}", "-".repeat(90));

            for event in &recent {
                println!(
                    "{:<20} {:<10} {:<6} {:<16} {:<10} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.kind.to_string(),
                    event.step.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                    event.agent,
                    event.layer.as_deref().unwrap_or("-"),
                    event.reason.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &ChainSummary) {
    println!(
        "{} event(s), hash chain intact: {} intercepted, {} blocked, {} approved.",
        summary.events, summary.intercepted, summary.blocked, summary.approved
    );
    if let Some(at) = summary.last_timestamp {
        println!("Last event at {}.", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// One-line description of the decision an event records.
fn describe(event: &AuditEvent) -> String {
    let mut text = format!("{} {:?} by {}", event.kind, event.subject, event.agent);
    if let Some(plan_id) = &event.plan_id {
        text.push_str(&format!(", plan {}", plan_id));
    }
    if let Some(step) = event.step {
        text.push_str(&format!(", step {}", step));
    }
    if let Some(layer) = &event.layer {
        text.push_str(&format!(", layer {}", layer));
    }
    text
}

/// The log to read, or `None` (after saying so) when none exists.
fn resolve(log: &Option<PathBuf>, config: &SentinelConfig) -> Option<PathBuf> {
    let path = match log.clone().or_else(|| config.audit_log.clone()) {
        Some(p) => p,
        None => {
            println!("Audit log is disabled in sentinel.toml; pass --log to read one.");
            return None;
        }
    };

    if !path.exists() {
        println!("No audit log found at {}", path.display());
        return None;
    }
    Some(path)
}
