//! Init command: write a default `layerport.yaml`.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::{ExportConfig, CONFIG_FILENAME};
use crate::error::{ExportError, Result};
use crate::output::{display_path, Printer};
use crate::types::TargetFormat;

/// Write a default layerport.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Target directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format to configure
    #[arg(long, value_enum, default_value = "fairygui")]
    pub format: TargetFormat,

    /// Overwrite an existing layerport.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let path = args.path.join(CONFIG_FILENAME);
    if path.exists() && !args.force {
        return Err(ExportError::Build {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let config = ExportConfig {
        format: args.format,
        ..ExportConfig::default()
    };
    fs::write(&path, config.to_yaml()?).map_err(|e| ExportError::Io {
        path: path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;

    printer.status("Created", &display_path(&path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(path: PathBuf, force: bool) -> InitArgs {
        InitArgs {
            path,
            format: TargetFormat::Unity,
            force,
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();
        run(args(dir.path().to_path_buf(), false), &Printer::plain()).unwrap();

        let config = ExportConfig::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.format, TargetFormat::Unity);
        assert_eq!(config.naming, crate::types::NamingRules::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "format: unity\n").unwrap();
        assert!(run(args(dir.path().to_path_buf(), false), &Printer::plain()).is_err());
        assert!(run(args(dir.path().to_path_buf(), true), &Printer::plain()).is_ok());
    }
}
