// status.rs — Show how each policy document was resolved.

use sentinel_guard::SentinelConfig;
use sentinel_policy::{PolicySlot, PolicyStore};

pub fn execute(config: &SentinelConfig) -> anyhow::Result<()> {
    let store = PolicyStore::load(&config.policy_paths());

    println!("{:<10} STATUS", "POLICY");
    println!("{}", "-".repeat(60));
    print_slot("authority", store.authority());
    print_slot("blacklist", store.blacklist());
    print_slot("query", store.query());
    println!();
    println!("default role: {}", config.default_role);
    match &config.audit_log {
        Some(path) => println!("audit log:    {}", path.display()),
        None => println!("audit log:    disabled"),
    }

    if store.has_lockdown() {
        anyhow::bail!("one or more policy documents are locked down");
    }
    Ok(())
}

fn print_slot<T>(name: &str, slot: &PolicySlot<T>) {
    match slot {
        PolicySlot::Active { origin, .. } => println!("{:<10} active ({})", name, origin),
        PolicySlot::Lockdown { .. } => println!(
            "{:<10} LOCKDOWN: {}",
            name,
            slot.lockdown_reason().unwrap_or_default()
        ),
    }
}
