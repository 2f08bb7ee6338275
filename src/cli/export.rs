//! Export command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::load_document;
use crate::error::{ExportError, Result};
use crate::export::{export, ExportOptions};
use crate::output::{display_path, summarize, Printer};
use crate::package::{FsDirectory, RandomIds};
use crate::validation::{print_diagnostics, validate_document};

use super::ConfigArgs;

/// Export a decoded document into a target directory
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Decoded document (JSON with layer PNGs next to it)
    pub document: PathBuf,

    /// Target directory
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Rewrite images that already exist
    #[arg(long)]
    pub force: bool,

    /// Overwrite the view if it already exists
    #[arg(long)]
    pub replace: bool,

    /// Validate first and stop on errors
    #[arg(long)]
    pub validate: bool,

    /// Seed for generated ids, for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: ExportArgs, printer: &Printer) -> Result<()> {
    let config = args.config.resolve(&args.out)?;

    printer.status("Loading", &display_path(&args.document));
    let document = load_document(&args.document)?;

    if args.validate {
        let result = validate_document(&document, &config.naming, config.format.border_order());
        if !result.is_ok() {
            print_diagnostics(&result);
        }
        if result.has_errors() {
            return Err(ExportError::Build {
                message: format!("{} failed validation", display_path(&args.document)),
                help: Some("Fix the errors above or export without --validate".to_string()),
            });
        }
    }

    let mut dir = FsDirectory::new(&args.out);
    let mut ids = match args.seed {
        Some(seed) => RandomIds::seeded(seed),
        None => RandomIds::new(),
    };
    let options = ExportOptions {
        force: args.force,
        replace_view: args.replace,
    };

    printer.status(
        "Exporting",
        &format!("{} to {}", document.name, printer.cyan(&display_path(&args.out))),
    );
    let report = export(&document, &config, &mut dir, &mut ids, options)?;
    if report.skipped > 0 {
        printer.warning("Skipped", &format!("{} layer(s), run with -v for details", report.skipped));
    }
    printer.status("Finished", &summarize(&report));
    Ok(())
}
