//! CNAB engine CLI
//!
//! Command-line interface for writing remessa files, reading retorno files and
//! composing boleto barcodes.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- remessa charges.csv --bank bradesco --agency 1172 --account 403005 \
//!     --wallet 09 --company-name "Padaria" --company-document 12345678000195 -o CB0104.REM
//! cargo run -- retorno CB0104.RET CB0204.RET > events.csv
//! cargo run -- retorno --strategy sync --max-concurrent 4 *.RET > events.csv
//! cargo run -- boleto charges.csv --bank itau --agency 0057 --account 12345 --wallet 109 > boletos.csv
//! ```
//!
//! Diagnostics (skipped rows, rejected instructions, validation warnings) are
//! logged to stderr; set `RUST_LOG=info` for per-file summaries.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, unsupported layout, etc.)

use rust_cnab_engine::cli;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
