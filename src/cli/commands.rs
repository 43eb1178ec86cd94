//! Subcommand handlers
//!
//! Each handler turns parsed arguments into calls on the core and writes the
//! result to the given output. Fatal problems come back as `Err(String)` for
//! `main` to report; per-row and per-instruction problems are logged and
//! skipped.

use crate::cli::args::{BoletoArgs, CliArgs, Command, RemessaArgs, RetornoArgs, StrategyType};
use crate::core::{write_remessa, BarcodeComposer};
use crate::io::{write_boletos_csv, write_warnings_csv, InstructionReader};
use crate::strategy::create_strategy;
use crate::types::RemessaHeader;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{info, warn};

/// Run the selected subcommand
///
/// Remessa files go to `--output` when given; everything else goes to stdout.
pub fn run(args: CliArgs) -> Result<(), String> {
    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    match args.command {
        Command::Remessa(remessa) => match &remessa.output {
            Some(path) => {
                let file = File::create(path)
                    .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;
                let mut writer = BufWriter::new(file);
                run_remessa(&remessa, &mut writer)?;
                writer
                    .flush()
                    .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
            }
            None => run_remessa(&remessa, &mut output),
        },
        Command::Retorno(retorno) => run_retorno(&retorno, &mut output),
        Command::Boleto(boleto) => run_boleto(&boleto, &mut output),
    }
}

/// Read the instruction CSV and write one remessa file
pub fn run_remessa(args: &RemessaArgs, output: &mut dyn Write) -> Result<(), String> {
    let beneficiary = args.to_beneficiary();
    let lotes = InstructionReader::new(&args.input_file, beneficiary.account.clone())?.into_lotes();
    let header = RemessaHeader {
        beneficiary,
        file_sequence: args.file_sequence,
        generated_on: args
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };

    let file = write_remessa(args.account.bank, args.format, header, &lotes)
        .map_err(|e| format!("Failed to write remessa: {}", e))?;
    info!(
        bank = %args.account.bank,
        format = %args.format,
        lines = file.lines.len(),
        rejected = file.rejected.len(),
        "Remessa written"
    );

    output
        .write_all(&file.to_bytes())
        .map_err(|e| format!("Failed to write remessa: {}", e))
}

/// Parse retorno files with the selected strategy
///
/// The warning count always goes to the log; `--warnings` also writes each
/// warning to a CSV file, and `--strict` turns an unclean run into an error.
pub fn run_retorno(args: &RetornoArgs, output: &mut dyn Write) -> Result<(), String> {
    let config = if matches!(args.strategy, StrategyType::Async) {
        Some(args.to_batch_config())
    } else {
        None
    };
    let summary = create_strategy(args.strategy, config).process(&args.input_files, output)?;

    if let Some(path) = &args.warnings {
        let file = File::create(path)
            .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;
        let mut writer = BufWriter::new(file);
        let warnings = summary
            .warnings
            .iter()
            .map(|(file, warning)| (file.as_str(), warning));
        write_warnings_csv(warnings, &mut writer)
            .map_err(|e| format!("Failed to write warnings: {}", e))?;
        writer
            .flush()
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    }

    if summary.is_clean() {
        info!(files = summary.files, events = summary.events, "Retorno files read");
        return Ok(());
    }
    warn!(
        files = summary.files,
        events = summary.events,
        warnings = summary.warnings.len(),
        aborted = summary.aborted.len(),
        skipped = summary.skipped.len(),
        "Retorno files read with problems"
    );
    if args.strict {
        return Err(format!(
            "{} validation warnings, {} aborted and {} skipped files",
            summary.warnings.len(),
            summary.aborted.len(),
            summary.skipped.len()
        ));
    }
    Ok(())
}

/// Compose a boleto for every instruction in the CSV
pub fn run_boleto(args: &BoletoArgs, output: &mut dyn Write) -> Result<(), String> {
    let composer = BarcodeComposer::new(args.account.bank);
    let mut boletos = Vec::new();

    for result in InstructionReader::new(&args.input_file, args.account.to_account())? {
        let instruction = match result {
            Ok((_, instruction)) => instruction,
            Err(e) => {
                warn!("Skipping row: {}", e);
                continue;
            }
        };
        match composer.compose(&instruction) {
            Ok(barcode) => boletos.push((instruction, barcode)),
            Err(e) => warn!(
                document = %instruction.document_number,
                error = %e,
                "Skipping boleto"
            ),
        }
    }

    write_boletos_csv(boletos.iter().map(|(i, b)| (i, b)), output)
        .map_err(|e| format!("Failed to write boletos: {}", e))
}
