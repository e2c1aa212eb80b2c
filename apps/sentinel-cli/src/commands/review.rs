// review.rs — Review a plan or a single agent action read from a file.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use sentinel_guard::{AgentAction, Plan, Sentinel, SentinelConfig, Verdict};

pub fn execute_plan(
    config: &SentinelConfig,
    path: &Path,
    role: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let plan: Plan = serde_json::from_str(&read_input(path)?)
        .with_context(|| format!("invalid plan in {}", path.display()))?;

    let sentinel = sentinel(config, role)?;
    report(&sentinel.review_plan(&plan), json)
}

pub fn execute_action(
    config: &SentinelConfig,
    path: &Path,
    role: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let action: AgentAction = serde_json::from_str(&read_input(path)?)
        .with_context(|| format!("invalid action in {}", path.display()))?;

    let sentinel = sentinel(config, role)?;
    report(&sentinel.review_action(&action), json)
}

/// A Sentinel whose default role is overridden by `--role` when given.
fn sentinel(config: &SentinelConfig, role: Option<&str>) -> anyhow::Result<Sentinel> {
    match role {
        Some(role) => {
            let mut config = config.clone();
            config.default_role = role.to_string();
            Ok(Sentinel::new(&config)?)
        }
        None => Ok(Sentinel::new(config)?),
    }
}

fn report(verdict: &Verdict, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(verdict)?);
    } else if verdict.is_allowed() {
        println!("APPROVED  {}", verdict.reason());
    } else {
        println!("BLOCKED   {}", verdict.reason());
        if let Some(violation) = &verdict.violation {
            println!("  step:   {}", violation.step);
            println!("  layer:  {}", violation.layer);
            println!("  reason: {}", violation.reason);
        }
    }

    if !verdict.is_allowed() {
        anyhow::bail!("plan denied");
    }
    Ok(())
}

/// File contents, or stdin when `path` is "-".
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
