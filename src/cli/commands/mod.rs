//! CLI command implementations

pub mod backup;
pub mod config;
pub mod restore;

use std::path::Path;

use crate::cli::error::CliError;
use crate::database::DumpConfig;

/// Load the workspace configuration with environment overrides applied
pub fn load_config(workspace: &Path) -> Result<DumpConfig, CliError> {
    DumpConfig::load(workspace).map_err(|e| CliError::ConfigError(e.to_string()))
}

/// Multi-threaded runtime for async commands
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::IoError(format!("Failed to create runtime: {}", e)))
}

/// Open the configured MySQL connection
#[cfg(feature = "mysql-backend")]
pub async fn connect(
    config: &DumpConfig,
) -> Result<crate::database::MySqlBackend, CliError> {
    use crate::database::MySqlBackend;

    let url = config.database.url.as_deref().ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "Database URL not configured. Set [database].url in {} or {}",
            crate::database::config::CONFIG_FILENAME,
            crate::database::config::ENV_DATABASE_URL
        ))
    })?;

    let backend = MySqlBackend::connect(url)
        .await?
        .with_dialect(config.database.dialect.clone());
    Ok(backend)
}

#[cfg(not(feature = "mysql-backend"))]
/// Error for commands that need a live connection
pub fn backend_disabled() -> CliError {
    CliError::InvalidArgument(
        "MySQL support not enabled. Build with --features mysql-backend".to_string(),
    )
}

/// Split a backup path into the storage root and the file name
pub fn split_path(path: &Path) -> Result<(std::path::PathBuf, String), CliError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CliError::InvalidArgument(format!("Not a file path: {}", path.display()))
        })?;
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    Ok((root, file_name))
}
