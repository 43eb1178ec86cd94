//! Processing strategy module for retorno files
//!
//! This module defines the Strategy pattern for processing a set of retorno
//! files end to end: reading, parsing and writing the events CSV. This allows
//! different implementations (sequential, parallel) to be selected at runtime.
//!
//! Each file is parsed on its own: the bank and format are detected from its
//! first line, and a parse that aborts still contributes the events read
//! before the error.

use crate::cli::StrategyType;
use crate::core::retorno::RetornoParser;
use crate::io::write_events_csv;
use crate::types::{CnabError, PaymentStatusEvent, ValidationWarning};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for retorno pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Parse every input file and write the events of all of them to output
    ///
    /// # Arguments
    ///
    /// * `input_paths` - Retorno files, in the order their events are written
    /// * `output` - Mutable reference to a writer for the events CSV
    ///
    /// # Returns
    ///
    /// * `Ok(RetornoSummary)` if all files were processed, with the
    ///   validation warnings, aborted parses and skipped files found
    /// * `Err(String)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or the output cannot be
    /// written. Files whose format cannot be detected are logged and skipped.
    fn process(
        &self,
        input_paths: &[PathBuf],
        output: &mut dyn Write,
    ) -> Result<RetornoSummary, String>;
}

/// Events read from one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileEvents {
    /// File name as given on the command line
    pub file: String,
    pub events: Vec<PaymentStatusEvent>,
    pub warnings: Vec<ValidationWarning>,
    /// Why the parse stopped before the file trailer, if it did
    pub aborted: Option<CnabError>,
    /// Format not detected; nothing was parsed
    pub skipped: bool,
}

/// Everything a run found besides the events themselves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetornoSummary {
    pub files: usize,
    pub events: usize,
    /// Validation warnings with the file they came from, in file order
    pub warnings: Vec<(String, ValidationWarning)>,
    pub aborted: Vec<(String, CnabError)>,
    pub skipped: Vec<String>,
}

impl RetornoSummary {
    fn collect(files: &[FileEvents]) -> Self {
        let mut summary = RetornoSummary {
            files: files.len(),
            ..RetornoSummary::default()
        };
        for file in files {
            summary.events += file.events.len();
            summary.warnings.extend(
                file.warnings
                    .iter()
                    .map(|warning| (file.file.clone(), warning.clone())),
            );
            if let Some(error) = &file.aborted {
                summary.aborted.push((file.file.clone(), error.clone()));
            }
            if file.skipped {
                summary.skipped.push(file.file.clone());
            }
        }
        summary
    }

    /// No warnings, no aborted parse and no skipped file
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.aborted.is_empty() && self.skipped.is_empty()
    }
}

/// Parse one file's contents, keeping whatever could be read
pub fn parse_retorno(file: String, bytes: &[u8]) -> FileEvents {
    let parser = match RetornoParser::detect(bytes) {
        Ok(parser) => parser,
        Err(e) => {
            warn!(file = %file, error = %e, "Skipping file");
            return FileEvents {
                file,
                events: Vec::new(),
                warnings: Vec::new(),
                aborted: None,
                skipped: true,
            };
        }
    };

    let (events, warnings, aborted) = match parser.parse(bytes) {
        Ok(parsed) => {
            info!(
                file = %file,
                bank = %parsed.bank,
                direction = %parsed.direction,
                events = parsed.events.len(),
                warnings = parsed.warnings.len(),
                "File parsed"
            );
            (parsed.events, parsed.warnings, None)
        }
        Err(partial) => {
            warn!(
                file = %file,
                error = %partial.source,
                events = partial.events.len(),
                "Parse aborted, keeping partial events"
            );
            (partial.events, partial.warnings, Some(partial.source))
        }
    };
    for warning in &warnings {
        warn!(file = %file, "{}", warning);
    }
    FileEvents {
        file,
        events,
        warnings,
        aborted,
        skipped: false,
    }
}

/// Write the events of every file, in file order, and summarise the run
pub fn write_file_events(
    files: &[FileEvents],
    output: &mut dyn Write,
) -> Result<RetornoSummary, String> {
    let events = files
        .iter()
        .flat_map(|f| f.events.iter().map(move |event| (f.file.as_str(), event)));
    write_events_csv(events, output).map_err(|e| format!("Failed to write events: {}", e))?;
    Ok(RetornoSummary::collect(files))
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for parallel processing (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
