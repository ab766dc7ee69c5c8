//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::output::CommandOutput;
use crate::cli::parse::{Cli, Commands};
use crate::cli::presentation::{format_fingerprint_text, format_verify_json, format_verify_text};
use crate::config::{format_validation_errors, ConfigLoader, ConfigOverrides, NotaryConfig};
use crate::error::NotaryError;
use crate::ledger::FactomClient;
use crate::scheduler::Scheduler;
use crate::snapshot::{snapshot_file_name, verify_snapshot, Fingerprinter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Runtime context for CLI execution: the effective configuration.
/// Built once from config sources and command-line overrides.
pub struct RunContext {
    config: NotaryConfig,
}

impl RunContext {
    /// Load configuration for this invocation.
    pub fn new(cli: &Cli) -> Result<Self, NotaryError> {
        let config = ConfigLoader::load(cli.config.as_deref(), &overrides_from(cli))?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: NotaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NotaryConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, NotaryError> {
        match command {
            Commands::Run { .. } => self.handle_run().await,
            Commands::Fingerprint { height, output } => {
                self.handle_fingerprint(*height, output.clone()).await
            }
            Commands::Verify {
                snapshot,
                rehash,
                format,
            } => self.handle_verify(snapshot.clone(), *rehash, format).await,
            Commands::Config => self.handle_config(),
        }
    }

    async fn handle_run(&self) -> Result<CommandOutput, NotaryError> {
        self.config
            .validate()
            .map_err(|errors| NotaryError::Config(format_validation_errors(&errors)))?;

        let client = Arc::new(FactomClient::new(&self.config.ledger)?);
        let mut scheduler = Scheduler::initialize(&self.config, client.clone(), client).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            info!("Shutdown requested; stopping after the current cycle");
            let _ = shutdown_tx.send(true);
        });

        scheduler.run(shutdown_rx).await;
        Ok(CommandOutput::success(format!(
            "Stopped at height {}",
            scheduler.poll_state().last_observed_height
        )))
    }

    async fn handle_fingerprint(
        &self,
        height: u64,
        output: Option<PathBuf>,
    ) -> Result<CommandOutput, NotaryError> {
        self.config
            .validate_local()
            .map_err(|errors| NotaryError::Config(format_validation_errors(&errors)))?;

        let target = output.unwrap_or_else(|| {
            self.config
                .snapshot
                .output_dir
                .join(snapshot_file_name(height))
        });
        let source = self.config.snapshot.source_dir.clone();
        let fingerprinter = Fingerprinter::new(self.config.snapshot.walker_config());

        let written = target.clone();
        let snapshot =
            tokio::task::spawn_blocking(move || fingerprinter.create(&source, &written, height))
                .await
                .map_err(|e| NotaryError::Task(format!("Fingerprint task failed: {}", e)))??;

        Ok(CommandOutput::success(format_fingerprint_text(
            &snapshot, &target,
        )))
    }

    async fn handle_verify(
        &self,
        snapshot: PathBuf,
        rehash: bool,
        format: &str,
    ) -> Result<CommandOutput, NotaryError> {
        if format != "text" && format != "json" {
            return Err(NotaryError::Config(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                format
            )));
        }

        let report = tokio::task::spawn_blocking(move || verify_snapshot(&snapshot, rehash))
            .await
            .map_err(|e| NotaryError::Task(format!("Verify task failed: {}", e)))??;

        let text = if format == "json" {
            format_verify_json(&report)?
        } else {
            format_verify_text(&report)
        };
        if report.is_clean() {
            Ok(CommandOutput::success(text))
        } else {
            warn!(
                mismatches = report.mismatches.len(),
                "Snapshot does not match the filesystem"
            );
            Ok(CommandOutput::failure(text))
        }
    }

    fn handle_config(&self) -> Result<CommandOutput, NotaryError> {
        let text = toml::to_string_pretty(&self.config)
            .map_err(|e| NotaryError::Config(format!("Failed to render configuration: {}", e)))?;
        Ok(CommandOutput::success(text))
    }
}

fn overrides_from(cli: &Cli) -> ConfigOverrides {
    let poll_interval_secs = match &cli.command {
        Commands::Run { poll_interval_secs } => *poll_interval_secs,
        _ => None,
    };
    ConfigOverrides {
        source_dir: cli.source_dir.clone(),
        output_dir: cli.output_dir.clone(),
        factomd_url: cli.factomd_url.clone(),
        walletd_url: cli.walletd_url.clone(),
        ec_address: cli.ec_address.clone(),
        chain_id: cli.chain_id.clone(),
        poll_interval_secs,
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "Unable to listen for SIGTERM"),
        }
    }
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context_for(source: &TempDir, output: &TempDir) -> RunContext {
        let mut config = NotaryConfig::default();
        config.snapshot.source_dir = source.path().to_path_buf();
        config.snapshot.output_dir = output.path().to_path_buf();
        RunContext::from_config(config)
    }

    #[tokio::test]
    async fn test_fingerprint_then_verify() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(source.path().join("a.txt"), b"hello").unwrap();
        let ctx = context_for(&source, &output);

        let result = ctx
            .execute(&Commands::Fingerprint {
                height: 41,
                output: None,
            })
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        let snapshot = output.path().join("snap-42.log");
        assert!(snapshot.is_file());
        // Single leaf: the root is the file digest
        assert!(result
            .text
            .contains("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"));

        let verified = ctx
            .execute(&Commands::Verify {
                snapshot,
                rehash: true,
                format: "text".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(verified.exit_code, 0);
        assert!(verified.text.contains("All listed files match"));
    }

    #[tokio::test]
    async fn test_verify_reports_changed_file() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let file = source.path().join("a.txt");
        std::fs::write(&file, b"hello").unwrap();
        let ctx = context_for(&source, &output);
        let snapshot = output.path().join("custom.log");

        ctx.execute(&Commands::Fingerprint {
            height: 0,
            output: Some(snapshot.clone()),
        })
        .await
        .unwrap();
        std::fs::write(&file, b"jello").unwrap();

        let verified = ctx
            .execute(&Commands::Verify {
                snapshot,
                rehash: true,
                format: "json".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(verified.exit_code, 1);
        let value: serde_json::Value = serde_json::from_str(&verified.text).unwrap();
        assert_eq!(value["mismatches"][0]["kind"], "changed");
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_format() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let ctx = context_for(&source, &output);
        let err = ctx
            .execute(&Commands::Verify {
                snapshot: output.path().join("snap-1.log"),
                rehash: false,
                format: "yaml".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotaryError::Config(_)));
    }

    #[tokio::test]
    async fn test_config_renders_toml() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let ctx = context_for(&source, &output);
        let rendered = ctx.execute(&Commands::Config).await.unwrap().text;

        let parsed: NotaryConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.snapshot.source_dir, source.path());
        assert_eq!(parsed.scheduler.poll_interval_secs, 60);
    }

    #[tokio::test]
    async fn test_run_requires_credential() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let ctx = context_for(&source, &output);
        let err = ctx
            .execute(&Commands::Run {
                poll_interval_secs: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotaryError::Config(_)));
    }
}
