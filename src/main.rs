//! CLI entry point for the frame mosaic builder

use clap::Parser;
use framemosaic::io::cli::Cli;

fn main() -> framemosaic::Result<()> {
    let cli = Cli::parse();
    let report = cli.run()?;
    tracing::info!(
        output = %report.output.display(),
        cells = report.grid_width * report.grid_height,
        "Done"
    );
    Ok(())
}
