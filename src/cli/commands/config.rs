//! Configuration CLI commands

use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::database::config::{CONFIG_FILENAME, sample_config};

use super::load_config;

/// Config init arguments
#[derive(Debug, Clone)]
pub struct ConfigInitArgs {
    /// Workspace path
    pub workspace: PathBuf,
    /// Overwrite an existing configuration
    pub force: bool,
}

/// Config show arguments
#[derive(Debug, Clone)]
pub struct ConfigShowArgs {
    /// Workspace path
    pub workspace: PathBuf,
}

/// Write the sample configuration into the workspace
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), CliError> {
    let path = args.workspace.join(CONFIG_FILENAME);
    if path.exists() && !args.force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }

    std::fs::create_dir_all(&args.workspace)
        .map_err(|e| CliError::FileWriteError(args.workspace.clone(), e.to_string()))?;
    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

/// Effective configuration as TOML, with the password masked
pub fn render_config(args: &ConfigShowArgs) -> Result<String, CliError> {
    let mut config = load_config(&args.workspace)?;
    config.database.url = config.url_masked();
    Ok(config.to_toml()?)
}

/// Print the effective configuration
pub fn handle_config_show(args: &ConfigShowArgs) -> Result<(), CliError> {
    println!("{}", render_config(args)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let args = ConfigInitArgs {
            workspace: dir.path().to_path_buf(),
            force: false,
        };

        handle_config_init(&args).unwrap();
        assert!(dir.path().join(CONFIG_FILENAME).exists());
        assert!(handle_config_init(&args).is_err());

        let forced = ConfigInitArgs {
            force: true,
            ..args
        };
        handle_config_init(&forced).unwrap();
    }

    #[test]
    fn test_show_masks_password() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[database]\nurl = \"mysql://root:secret@db:3306/shop\"\n",
        )
        .unwrap();

        let rendered = render_config(&ConfigShowArgs {
            workspace: dir.path().to_path_buf(),
        })
        .unwrap();
        if std::env::var(crate::database::config::ENV_DATABASE_URL).is_err() {
            assert!(rendered.contains("mysql://root:****@db:3306/shop"));
            assert!(!rendered.contains("secret"));
        }
    }
}
