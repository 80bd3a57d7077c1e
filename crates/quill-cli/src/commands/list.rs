//! List command implementation

use anyhow::{Context, Result};
use quill::prelude::*;

pub fn execute(
    recorder: &AuditRecorder,
    tenant: TenantId,
    start: EpochSecs,
    end: EpochSecs,
    json: bool,
) -> Result<()> {
    let events = recorder
        .list(tenant, start, end)
        .context("Failed to list audit events")?;

    if json {
        for event in &events {
            let line = serde_json::to_string(event).context("Failed to serialize event")?;
            println!("{}", line);
        }
        return Ok(());
    }

    if events.is_empty() {
        println!("No audit events for tenant {}", tenant);
        return Ok(());
    }

    println!("\nAudit Events (tenant {}):", tenant);
    println!("{:<12} {:<16} {:<32} Detail", "Time", "Actor", "Action");
    println!("{}", "=".repeat(80));
    for event in &events {
        println!(
            "{:<12} {:<16} {:<32} {}",
            event.occurred_at,
            event.actor,
            event.action,
            event.detail.as_deref().unwrap_or("-")
        );
    }
    println!("\nTotal: {} event(s)", events.len());
    Ok(())
}
