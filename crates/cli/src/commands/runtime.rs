//! Process-wide wiring shared by `serve` and `chat`.
//!
//! Store, generator and controller are built once here and passed in
//! explicitly; nothing is global.

use ironlog_coach::{ChannelScope, Controller, Generator};
use ironlog_config::AppConfig;
use ironlog_core::clock::SystemClock;
use ironlog_store::SqliteStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    AppConfig::load_path(&config_file(path))
        .map_err(|e| format!("Failed to load config: {e}").into())
}

/// Open the SQLite store, creating its directory when needed.
pub async fn open_store(config: &AppConfig) -> CliResult<Arc<SqliteStore>> {
    let path = config.database_path();
    let file = path
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if !file.contains(":memory:") {
        if let Some(parent) = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(Arc::new(SqliteStore::new(&path).await?))
}

pub fn build_controller(
    config: &AppConfig,
    store: Arc<SqliteStore>,
    scope: ChannelScope,
) -> CliResult<Arc<Controller>> {
    let provider = ironlog_providers::build_from_config(config)?;
    let generator = Generator::from_config(provider, config);
    info!(
        provider = generator.provider_name(),
        model = generator.model(),
        "Generator ready"
    );

    Ok(Arc::new(Controller::new(
        store.clone(),
        store,
        generator,
        scope,
        Arc::new(SystemClock),
    )))
}

/// Resolves on Ctrl+C. Never resolves when the handler cannot be installed.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
