//! Configuration loading.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file, the
//! flat `S3_*` variables older deployments use, then `PRESENCE_` variables
//! split on `__` (e.g. `PRESENCE_ICONS__PUBLIC_DOMAIN`).

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use presence_core::config::AppConfig;
use std::path::Path;

/// Legacy variable names and the config keys they populate.
const LEGACY_S3_VARS: &[(&str, &str)] = &[
    ("S3_ACCOUNT_ID", "storage.account_id"),
    ("S3_ACCESS_KEY", "storage.access_key_id"),
    ("S3_SECRET_KEY", "storage.secret_access_key"),
    ("S3_BUCKET", "storage.bucket"),
    ("S3_REGION", "storage.region"),
    ("S3_CUSTOM_DOMAIN", "icons.public_domain"),
];

/// Build the layered figment for `config_path`. A missing file is skipped.
pub fn figment(config_path: &Path) -> Figment {
    let mut figment = Figment::new();

    if config_path.exists() {
        tracing::debug!(config_path = %config_path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(config_path));
    } else {
        tracing::debug!(config_path = %config_path.display(), "No config file found");
    }

    // A bucket in the legacy variables implies the S3 backend.
    if std::env::var_os("S3_BUCKET").is_some() {
        figment = figment.merge(Serialized::default("storage.type", "s3"));
    }

    figment
        .merge(legacy_s3_env())
        .merge(Env::prefixed("PRESENCE_").split("__").ignore(&["config"]))
}

fn legacy_s3_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_S3_VARS
            .iter()
            .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
            .map(|(_, path)| (*path).into())
    })
}

/// Load and validate configuration.
pub fn load(config_path: &Path) -> Result<AppConfig> {
    let config: AppConfig = figment(config_path)
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;
    Ok(config)
}
