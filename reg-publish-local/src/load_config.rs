/// `load_config` module: loads a static YAML config and applies environment overrides,
/// producing the [`PublisherOptions`] handed to the core publisher.
///
/// # Environment overrides
/// - `REG_PUBLISH_LOCAL_ROOT` replaces `publisher.root_path`.
/// - `REG_PUBLISH_LOCAL_NO_EMIT` (`1`/`true`/`yes`) forces a dry run.
///
/// # Errors
/// All errors use `anyhow::Error` and name the config file; they surface at the CLI boundary.
use anyhow::{Context, Result};
use reg_publish_local_core::contract::{PluginConfig, WorkingDirs};
use reg_publish_local_core::publisher::PublisherOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const ROOT_ENV: &str = "REG_PUBLISH_LOCAL_ROOT";
pub const NO_EMIT_ENV: &str = "REG_PUBLISH_LOCAL_NO_EMIT";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub publisher: PluginConfig,
    pub working_dirs: WorkingDirs,
    #[serde(default)]
    pub no_emit: bool,
}

impl From<CliConfig> for PublisherOptions {
    fn from(config: CliConfig) -> Self {
        PublisherOptions {
            working_dirs: config.working_dirs,
            config: config.publisher,
            no_emit: config.no_emit,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let mut config: CliConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path_ref)
    })?;

    if let Ok(root) = std::env::var(ROOT_ENV) {
        info!(root = %root, "Store root overridden from environment");
        config.publisher.root_path = root.into();
    }
    if let Ok(raw) = std::env::var(NO_EMIT_ENV) {
        config.no_emit = parse_flag(&raw)
            .with_context(|| format!("{NO_EMIT_ENV} must be a boolean flag"))?;
    }

    info!(
        root = %config.publisher.root_path.display(),
        base = %config.working_dirs.base.display(),
        no_emit = config.no_emit,
        "Config loaded and merged successfully"
    );
    Ok(config)
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value {other:?}"),
    }
}
