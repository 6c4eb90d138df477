use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use tracing::*;

use loghive_common::{LoghiveConfig, LoghiveConfigStore};

pub fn load_config(path: &Path) -> Result<LoghiveConfig> {
    let store: LoghiveConfigStore = Config::builder()
        .add_source(File::from(path))
        .add_source(Environment::with_prefix("LOGHIVE"))
        .build()
        .context("Could not load config")?
        .try_deserialize()
        .context("Could not parse config")?;

    let config = LoghiveConfig {
        store,
        paths_relative_to: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };

    info!(
        "Using config: {path:?} (producers: {}, severities: {})",
        config.store.producers.len(),
        config.store.severities.len(),
    );
    Ok(config)
}
