use std::path::PathBuf;

use clap::Args;

use crate::discovery::load_document;
use crate::error::{ExportError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, validate_document};

use super::ConfigArgs;

/// Check documents for layers the exporter would skip or mangle
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Decoded documents to check
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let config = args.config.resolve(&PathBuf::from("."))?;
    let order = config.format.border_order();

    let mut failed = 0;
    for path in &args.documents {
        printer.status("Checking", &display_path(path));
        let document = load_document(path)?;
        let result = validate_document(&document, &config.naming, order);

        print_diagnostics(&result);
        if result.has_errors() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(ExportError::Build {
            message: format!("{} failed validation", plural(failed, "document", "documents")),
            help: None,
        });
    }
    printer.status("Finished", &format!("{} checked", plural(args.documents.len(), "document", "documents")));
    Ok(())
}
