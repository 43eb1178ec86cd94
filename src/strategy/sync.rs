//! Sequential processing strategy
//!
//! Reads and parses the retorno files one after the other on the calling
//! thread, then writes all events.

use crate::strategy::{parse_retorno, write_file_events, ProcessingStrategy, RetornoSummary};
use std::io::Write;
use std::path::PathBuf;

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_cnab_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::PathBuf;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = std::io::stdout();
///
/// strategy
///     .process(&[PathBuf::from("retorno.ret")], &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_paths: &[PathBuf],
        output: &mut dyn Write,
    ) -> Result<RetornoSummary, String> {
        let mut files = Vec::with_capacity(input_paths.len());
        for path in input_paths {
            let bytes = std::fs::read(path)
                .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;
            files.push(parse_retorno(path.display().to_string(), &bytes));
        }
        write_file_events(&files, output)
    }
}
