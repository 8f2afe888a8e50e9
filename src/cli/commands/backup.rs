//! Backup CLI command
//!
//! Dumps the configured database to a file in the workspace backup directory.

use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::database::DumpConfig;
use crate::dump::{DumpMask, TableMasks, parse_mask};

use super::load_config;

/// Backup command arguments
#[derive(Debug, Clone)]
pub struct BackupArgs {
    /// Backup file (relative to the backup directory unless absolute)
    pub file: PathBuf,
    /// Gzip-compress the document
    pub compress: bool,
    /// Per-table overrides as `NAME=MASK`
    pub tables: Vec<String>,
    /// Workspace path
    pub workspace: PathBuf,
}

/// Parse a `NAME=MASK` table override
pub fn parse_table_spec(spec: &str) -> Result<(String, DumpMask), CliError> {
    let (name, mask) = spec.split_once('=').ok_or_else(|| {
        CliError::InvalidArgument(format!("Expected NAME=MASK, got '{}'", spec))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "Missing table name in '{}'",
            spec
        )));
    }
    let mask = parse_mask(mask)?;
    Ok((name.to_string(), mask))
}

/// Config masks with command-line overrides applied on top
pub fn table_masks(config: &DumpConfig, specs: &[String]) -> Result<TableMasks, CliError> {
    let mut masks = config.table_masks()?;
    for spec in specs {
        let (name, mask) = parse_table_spec(spec)?;
        masks.set(name, mask);
    }
    Ok(masks)
}

/// Back up the configured database
pub fn handle_backup(args: &BackupArgs) -> Result<(), CliError> {
    let config = load_config(&args.workspace)?;
    let masks = table_masks(&config, &args.tables)?;
    let compress = args.compress || config.backup.compress;
    let path = config.resolve_path(&args.workspace, &args.file);

    run_backup(&config, &path, compress, masks)
}

#[cfg(feature = "mysql-backend")]
fn run_backup(
    config: &DumpConfig,
    path: &Path,
    compress: bool,
    masks: TableMasks,
) -> Result<(), CliError> {
    use super::{connect, runtime, split_path};
    use crate::database::DatabaseBackend;
    use crate::helper::DatabaseHelper;
    use crate::storage::FileSystemStorageBackend;

    let (root, file_name) = split_path(path)?;
    let rt = runtime()?;

    rt.block_on(async {
        let backend = connect(config).await?;
        let mut helper = DatabaseHelper::new(backend, FileSystemStorageBackend::new(&root));

        let report = helper.backup(&file_name, compress, masks).await?;
        helper.dump().backend().close().await?;

        println!(
            "Backed up database '{}' to {}",
            report.database,
            path.display()
        );
        println!(
            "  {} tables, {} views, {} bytes{}",
            report.tables,
            report.views,
            report.bytes_written,
            if report.compressed { " (gzip)" } else { "" }
        );
        println!("  sha256 {}", report.checksum);
        eprintln!("\nExecution time: {}ms", report.duration_ms);

        Ok(())
    })
}

#[cfg(not(feature = "mysql-backend"))]
fn run_backup(
    _config: &DumpConfig,
    _path: &Path,
    _compress: bool,
    _masks: TableMasks,
) -> Result<(), CliError> {
    Err(super::backend_disabled())
}
