//! Record command implementation

use anyhow::{Context, Result};
use quill::prelude::*;

pub struct RecordArgs {
    pub actor: String,
    pub action: String,
    pub detail: Option<String>,
    pub tenant: TenantId,
    pub at: EpochSecs,
    pub metadata: Option<String>,
}

pub fn execute(recorder: &AuditRecorder, args: RecordArgs) -> Result<()> {
    let metadata = args
        .metadata
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("Metadata is not valid JSON")?;

    if !actions::is_known(&args.action) {
        tracing::warn!(action = %args.action, "Action is not in the known catalog");
    }

    recorder
        .record(
            &args.actor,
            &args.action,
            args.detail.as_deref(),
            args.at,
            args.tenant,
            metadata,
        )
        .context("Failed to record audit event")?;

    println!("Recorded '{}' by {} for tenant {}", args.action, args.actor, args.tenant);
    Ok(())
}
