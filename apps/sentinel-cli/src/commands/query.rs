// query.rs — Check one SQL query.

use sentinel_guard::{Sentinel, SentinelConfig};

pub fn execute(config: &SentinelConfig, sql: &str, agent: &str) -> anyhow::Result<()> {
    let sentinel = Sentinel::new(config)?;
    let decision = sentinel.review_query(sql, agent);

    if decision.is_allowed() {
        println!("ALLOW  {}", decision.reason());
        Ok(())
    } else {
        println!("DENY   {}", decision.reason());
        anyhow::bail!("query denied")
    }
}
