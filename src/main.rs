use clap::Parser;
use miette::Result;
use layerport::cli::{Cli, Commands};
use layerport::logging::init_logging;
use layerport::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Export(args) => layerport::cli::export::run(args, &printer)?,
        Commands::Validate(args) => layerport::cli::validate::run(args, &printer)?,
        Commands::Inspect(args) => layerport::cli::inspect::run(args)?,
        Commands::Init(args) => layerport::cli::init::run(args, &printer)?,
        Commands::Completions(args) => layerport::cli::completions::run(args)?,
    }

    Ok(())
}
