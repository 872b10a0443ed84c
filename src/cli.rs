//! # Command Line Support
//!
//! Parti condivise dai due binari `optimize-assets` e `optimize-videos`.
//!
//! ## Responsabilità:
//! - Flag comuni (`--config`, `--source-dir`, `--target-dir`, `--json`, `--verbose`)
//! - Inizializzazione del logging con `tracing-subscriber` (INFO, DEBUG con `--verbose`)
//! - Costruzione della `Config` effettiva: file JSON, poi override da CLI, poi validazione
//!
//! I log vanno su stderr: in modalità `--json` stdout contiene solo eventi JSON.

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flags shared by both binaries
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// JSON configuration file (paths, qualities, bitrates, catalog)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root of the legacy content export
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Root of the generated site assets
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// Output pipeline events as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Build the effective configuration
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow::anyhow!(
                        "Config file does not exist: {}",
                        path.display()
                    ));
                }
                Config::from_file(path).await?
            }
            None => Config::default(),
        };

        if let Some(source_dir) = &self.source_dir {
            config.source_dir = source_dir.clone();
        }
        if let Some(target_dir) = &self.target_dir {
            config.target_dir = target_dir.clone();
        }
        if self.json {
            config.json_output = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Initialize logging on stderr; `RUST_LOG` wins unless `--verbose` is set
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cli_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("optimizer.json");
        tokio::fs::write(&path, r#"{"source_dir": "/export", "target_dir": "/site/assets"}"#)
            .await
            .unwrap();

        let args = CommonArgs {
            config: Some(path),
            target_dir: Some(PathBuf::from("/tmp/out")),
            json: true,
            ..Default::default()
        };
        let config = args.load_config().await.unwrap();

        assert_eq!(config.source_dir, PathBuf::from("/export"));
        assert_eq!(config.target_dir, PathBuf::from("/tmp/out"));
        assert!(config.json_output);
    }

    #[tokio::test]
    async fn test_missing_config_file_is_an_error() {
        let args = CommonArgs {
            config: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(args.load_config().await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let args = CommonArgs {
            source_dir: Some(PathBuf::from("same")),
            target_dir: Some(PathBuf::from("same")),
            ..Default::default()
        };
        assert!(args.load_config().await.is_err());
    }
}
