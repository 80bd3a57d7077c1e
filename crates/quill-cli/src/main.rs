//! Quill CLI - record and inspect audit events from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Storage backend: file or relational
    #[arg(short, long, env = "QUILL_BACKEND", default_value = "file")]
    backend: String,

    /// Path to the audit log file or database
    #[arg(short, long, env = "QUILL_PATH")]
    path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a single audit event
    Record {
        /// Who performed the action
        #[arg(long)]
        actor: String,

        /// Action label, e.g. "User logged in"
        #[arg(long)]
        action: String,

        /// Free-form detail text
        #[arg(long)]
        detail: Option<String>,

        /// Tenant the event belongs to
        #[arg(long, default_value_t = 0)]
        tenant: TenantId,

        /// Unix seconds; 0 stamps the current time
        #[arg(long, default_value_t = 0)]
        at: EpochSecs,

        /// Metadata as a JSON value
        #[arg(long)]
        metadata: Option<String>,
    },

    /// List a tenant's events in a time window
    List {
        /// Tenant to list
        #[arg(long)]
        tenant: TenantId,

        /// Inclusive lower bound in unix seconds
        #[arg(long, default_value_t = 0)]
        start: EpochSecs,

        /// Inclusive upper bound in unix seconds; 0 means no bound
        #[arg(long, default_value_t = 0)]
        end: EpochSecs,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Print the catalog of known action labels
    Actions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Actions => commands::actions::execute(),
        Commands::Record {
            actor,
            action,
            detail,
            tenant,
            at,
            metadata,
        } => {
            let recorder = open_recorder(&cli.backend, cli.path)?;
            commands::record::execute(
                &recorder,
                commands::record::RecordArgs {
                    actor,
                    action,
                    detail,
                    tenant,
                    at,
                    metadata,
                },
            )?;
            recorder.registry().shutdown()?;
            Ok(())
        }
        Commands::List {
            tenant,
            start,
            end,
            json,
        } => {
            let recorder = open_recorder(&cli.backend, cli.path)?;
            commands::list::execute(&recorder, tenant, start, end, json)?;
            recorder.registry().shutdown()?;
            Ok(())
        }
    }
}

/// Initializes a registry for `backend` and wraps it in a recorder
fn open_recorder(backend: &str, path: Option<PathBuf>) -> Result<AuditRecorder> {
    let kind: BackendKind = backend.parse().context("Invalid backend")?;
    let (path, settings) = store_settings(kind, path);

    let registry = Arc::new(AuditRegistry::new());
    registry
        .initialize(kind.as_str(), &settings)
        .with_context(|| format!("Failed to open {} store at {}", kind, path.display()))?;
    tracing::debug!(backend = %kind, path = %path.display(), "Audit store ready");

    Ok(AuditRecorder::new(registry))
}

/// Settings map for `kind`, falling back to a file in the working directory
fn store_settings(kind: BackendKind, path: Option<PathBuf>) -> (PathBuf, HashMap<String, String>) {
    let (key, default_path) = match kind {
        BackendKind::File => ("filePath", "./audit.log"),
        BackendKind::Relational => ("dbPath", "./audit.db"),
    };
    let path = path.unwrap_or_else(|| PathBuf::from(default_path));

    let mut settings = HashMap::new();
    settings.insert(key.to_string(), path.display().to_string());
    (path, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_settings_defaults() {
        let (path, settings) = store_settings(BackendKind::File, None);
        assert_eq!(path, PathBuf::from("./audit.log"));
        assert_eq!(settings.get("filePath").map(String::as_str), Some("./audit.log"));

        let (path, settings) = store_settings(BackendKind::Relational, None);
        assert_eq!(path, PathBuf::from("./audit.db"));
        assert_eq!(settings.get("dbPath").map(String::as_str), Some("./audit.db"));
        assert!(!settings.contains_key("filePath"));
    }

    #[test]
    fn test_open_recorder_both_backends() {
        let temp_dir = tempfile::tempdir().unwrap();

        let recorder = open_recorder("file", Some(temp_dir.path().join("audit.log"))).unwrap();
        assert_eq!(recorder.registry().backend(), Some(BackendKind::File));
        assert!(temp_dir.path().join("audit.log").exists());

        let recorder = open_recorder("db", Some(temp_dir.path().join("audit.db"))).unwrap();
        assert_eq!(recorder.registry().backend(), Some(BackendKind::Relational));
        assert!(temp_dir.path().join("audit.db").exists());
    }

    #[test]
    fn test_open_recorder_rejects_unknown_backend() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(open_recorder("postgres", Some(temp_dir.path().join("x"))).is_err());
    }

    #[test]
    fn test_cli_parses_record() {
        let cli = Cli::try_parse_from([
            "quill", "--backend", "relational", "record", "--actor", "alice", "--action",
            "User logged in", "--tenant", "123",
        ])
        .unwrap();
        assert_eq!(cli.backend, "relational");
        assert!(matches!(
            cli.command,
            Commands::Record { tenant: 123, at: 0, .. }
        ));
    }
}
