//! # sentinel-cli
//!
//! Command-line interface for the Sentinel agent firewall.
//!
//! - `sentinel init` — write missing policy documents with safe defaults
//! - `sentinel status` — show where each policy document was loaded from
//! - `sentinel review <plan.json>` — review a multi-step plan
//! - `sentinel action <action.json>` — review a single framework action
//! - `sentinel query <sql>` — check a data-access query
//! - `sentinel audit verify/tail` — inspect the hash-chained audit log

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sentinel_guard::SentinelConfig;

/// Sentinel: pre-execution firewall for agent plans and queries.
#[derive(Parser)]
#[command(name = "sentinel", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default policy documents that do not exist yet.
    Init,
    /// Show the origin of each loaded policy document.
    Status,
    /// Review a plan file (JSON). Use "-" to read stdin.
    Review {
        plan: PathBuf,
        /// Role to use when the plan does not declare one.
        #[arg(long)]
        role: Option<String>,
        /// Print the verdict as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Review a single agent action (`{"tool": ..., "tool_input": ...}`).
    Action {
        action: PathBuf,
        /// Role to use for the action.
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Check a SQL query against the query policy.
    Query {
        sql: String,
        /// Agent name recorded in the audit log.
        #[arg(long, default_value = "cli")]
        agent: String,
    },
    /// Inspect the audit trail.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sentinel_guard=info".parse()?)
                .add_directive("sentinel_policy=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = SentinelConfig::load(&project_root)?;

    match &cli.command {
        Commands::Init => commands::init::execute(&config),
        Commands::Status => commands::status::execute(&config),
        Commands::Review { plan, role, json } => {
            commands::review::execute_plan(&config, plan, role.as_deref(), *json)
        }
        Commands::Action { action, role, json } => {
            commands::review::execute_action(&config, action, role.as_deref(), *json)
        }
        Commands::Query { sql, agent } => commands::query::execute(&config, sql, agent),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}
