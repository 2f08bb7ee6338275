pub mod completions;
pub mod export;
pub mod init;
pub mod inspect;
pub mod validate;

use std::path::Path;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::discovery::{find_config, ExportConfig};
use crate::error::Result;
use crate::types::TargetFormat;

/// layerport - export layered image documents as UI packages and prefabs
#[derive(Parser, Debug)]
#[command(name = "layerport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a decoded document into a target directory
    Export(export::ExportArgs),

    /// Check documents for layers the exporter would skip or mangle
    Validate(validate::ValidateArgs),

    /// Print how each layer name is classified
    Inspect(inspect::InspectArgs),

    /// Write a default layerport.yaml
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Configuration options shared by several commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (default: layerport.yaml in the target directory)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output format, overriding the configuration
    #[arg(long, value_enum)]
    pub format: Option<TargetFormat>,
}

impl ConfigArgs {
    /// Load the configuration and apply command-line overrides.
    pub fn resolve(&self, root: &Path) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => {
                let (config, found) = find_config(root)?;
                if !found {
                    tracing::debug!(root = %root.display(), "no configuration file, using defaults");
                }
                config
            }
        };
        if let Some(format) = self.format {
            config.format = format;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::try_parse_from(["layerport", "-vv", "export", "doc.json", "--out", "ui", "--format", "unity", "--force"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.config.format, Some(TargetFormat::Unity));
        assert!(args.force);
        assert!(!args.replace);
    }

    #[test]
    fn test_format_flag_overrides_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("layerport.yaml"), "format: unity\nbig_asset_threshold: 256\n").unwrap();

        let config = ConfigArgs::default().resolve(dir.path()).unwrap();
        assert_eq!(config.format, TargetFormat::Unity);
        assert_eq!(config.big_asset_threshold, 256);

        let args = ConfigArgs {
            config: None,
            format: Some(TargetFormat::Fairygui),
        };
        assert_eq!(args.resolve(dir.path()).unwrap().format, TargetFormat::Fairygui);
    }
}
