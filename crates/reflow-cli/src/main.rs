//! reflow CLI: convert scholarly PDFs to semantic HTML, or rasterize
//! pages to PNG.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reflow", version, about = "Reconstruct scholarly PDFs as semantic HTML")]
struct Cli {
    /// Verbose pipeline logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a PDF to a semantic HTML document.
    Pdf2html {
        /// Input PDF path.
        pdf: PathBuf,
        /// Output HTML path.
        out: PathBuf,
    },
    /// Rasterize each page of a PDF to PNG at 300 DPI.
    Pdf2png {
        /// Input PDF path.
        pdf: PathBuf,
        /// Output directory for page-N.png files.
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "reflow=debug" } else { "reflow=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Pdf2html { pdf, out } => commands::convert::pdf2html(&pdf, &out).await,
        Command::Pdf2png { pdf, out_dir } => commands::rasterize::pdf2png(&pdf, &out_dir).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
