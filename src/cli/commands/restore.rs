//! Restore CLI command

use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::database::DumpConfig;

use super::load_config;

/// Restore command arguments
#[derive(Debug, Clone)]
pub struct RestoreArgs {
    /// Backup file (relative to the backup directory unless absolute)
    pub file: PathBuf,
    /// The document is gzip-compressed
    pub compress: bool,
    /// Workspace path
    pub workspace: PathBuf,
}

/// Replay a backup file against the configured database
pub fn handle_restore(args: &RestoreArgs) -> Result<(), CliError> {
    let config = load_config(&args.workspace)?;
    let path = config.resolve_path(&args.workspace, &args.file);
    if !path.exists() {
        return Err(CliError::FileNotFound(path));
    }
    let compress = args.compress || config.backup.compress;

    run_restore(&config, &path, compress)
}

#[cfg(feature = "mysql-backend")]
fn run_restore(config: &DumpConfig, path: &Path, compress: bool) -> Result<(), CliError> {
    use super::{connect, runtime, split_path};
    use crate::database::DatabaseBackend;
    use crate::helper::DatabaseHelper;
    use crate::storage::FileSystemStorageBackend;

    let (root, file_name) = split_path(path)?;
    let rt = runtime()?;

    rt.block_on(async {
        let backend = connect(config).await?;
        let mut helper = DatabaseHelper::new(backend, FileSystemStorageBackend::new(&root));

        let report = helper.restore(&file_name, compress).await?;
        helper.dump().backend().close().await?;

        println!(
            "Restored {} ({} statements executed)",
            path.display(),
            report.statements
        );
        eprintln!("\nExecution time: {}ms", report.duration_ms);

        Ok(())
    })
}

#[cfg(not(feature = "mysql-backend"))]
fn run_restore(_config: &DumpConfig, _path: &Path, _compress: bool) -> Result<(), CliError> {
    Err(super::backend_disabled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_backup_file() {
        let dir = tempdir().unwrap();
        let args = RestoreArgs {
            file: PathBuf::from("missing.sql"),
            compress: false,
            workspace: dir.path().to_path_buf(),
        };

        match handle_restore(&args) {
            Err(CliError::FileNotFound(path)) => {
                assert!(path.ends_with("backups/missing.sql"));
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }
}
