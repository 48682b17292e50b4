///
/// This module implements the CLI interface for reg-publish-local: command parsing,
/// routing and user-visible output. All publish/fetch logic lives in
/// `reg-publish-local-core`; this module only loads config and wires the publisher.
///
/// ## How To Use
/// - Command line: `reg-publish-local --help`.
/// - Programmatic/integration use: call [`run`] with a constructed [`Cli`].
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reg_publish_local_core::prepare::{prepare, PrepareOptions};
use reg_publish_local_core::publisher::Publisher;
use std::path::PathBuf;

/// CLI for reg-publish-local: publish report artifacts under a key and fetch them back.
#[derive(Parser)]
#[clap(
    name = "reg-publish-local",
    version,
    about = "Publish visual-regression report artifacts to a local key-prefixed store and fetch snapshots back"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create (or reuse) a store root and print its path
    Prepare {
        /// Directory under which a new uniquely-named root is created
        #[clap(long, required_unless_present = "existing")]
        base_dir: Option<PathBuf>,
        /// Reuse this root instead of creating a new one
        #[clap(long, conflicts_with = "base_dir")]
        existing: Option<PathBuf>,
        /// Print the root without creating it
        #[clap(long)]
        no_emit: bool,
    },
    /// Upload every matching file under the working base directory for a key
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Key (e.g. commit SHA) to publish under
        #[clap(long)]
        key: String,
    },
    /// Copy the snapshot stored under a key into the expected directory
    Fetch {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Key (e.g. commit SHA) to fetch
        #[clap(long)]
        key: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Prepare {
            base_dir,
            existing,
            no_emit,
        } => {
            let options = match (base_dir, existing) {
                (_, Some(existing)) => PrepareOptions::reuse(existing),
                (Some(base_dir), None) => PrepareOptions::create_under(base_dir),
                (None, None) => anyhow::bail!("either --base-dir or --existing is required"),
            }
            .no_emit(no_emit);
            let prepared = prepare(&options).await.context("prepare failed")?;
            tracing::info!(command = "prepare", root = %prepared.root_path.display(), "Store root prepared");
            println!("{}", prepared.root_path.display());
            Ok(())
        }
        Commands::Publish { config, key } => {
            let publisher = init_publisher(&config)?;
            tracing::info!(command = "publish", key = %key, "Starting publish");
            let result = publisher
                .publish(&key)
                .await
                .with_context(|| format!("publish failed for key {key}"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Fetch { config, key } => {
            let publisher = init_publisher(&config)?;
            tracing::info!(command = "fetch", key = %key, "Starting fetch");
            let result = publisher
                .fetch(&key)
                .await
                .with_context(|| format!("fetch failed for key {key}"))?;
            println!("Fetched {} files for key {key}", result.items.len());
            Ok(())
        }
    }
}

fn init_publisher(config_path: &std::path::Path) -> Result<Publisher> {
    let config = load_config(config_path)?;
    let mut publisher = Publisher::default();
    publisher
        .init(config.into())
        .context("failed to initialise publisher")?;
    Ok(publisher)
}
