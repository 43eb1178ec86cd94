//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over payment instructions from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! ```no_run
//! use rust_cnab_engine::io::sync_reader::InstructionReader;
//! use rust_cnab_engine::types::BankAccount;
//! use std::path::Path;
//!
//! let reader = InstructionReader::new(Path::new("instructions.csv"), BankAccount::default()).unwrap();
//! for result in reader {
//!     match result {
//!         Ok((lote, instruction)) => println!("Lote {}: {}", lote, instruction.document_number),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator, with
//!   the line number in the message

use crate::io::csv_format::{convert_instruction_row, InstructionRow};
use crate::types::{BankAccount, Lote, PaymentInstruction};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Streaming reader of instruction rows
#[derive(Debug)]
pub struct InstructionReader<R: Read = File> {
    reader: csv::Reader<R>,
    account: BankAccount,
    line_num: usize,
}

impl InstructionReader<File> {
    /// Open an instruction CSV file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    /// * `account` - Beneficiary account attached to every instruction
    ///
    /// # Returns
    ///
    /// * `Ok(InstructionReader)` if the file opened successfully
    /// * `Err(String)` if the file could not be opened
    pub fn new(path: &Path, account: BankAccount) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;
        Ok(Self::from_reader(file, account))
    }
}

impl<R: Read> InstructionReader<R> {
    /// Read instructions from any byte source
    pub fn from_reader(source: R, account: BankAccount) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        Self {
            reader,
            account,
            line_num: 0,
        }
    }

    /// Read every row and group the instructions into lotes by lote number
    ///
    /// Rows that fail to parse are logged and skipped. Lotes come out in
    /// ascending lote-number order; instructions keep their file order.
    pub fn into_lotes(self) -> Vec<Lote> {
        let mut lotes: BTreeMap<u32, Vec<PaymentInstruction>> = BTreeMap::new();
        for result in self {
            match result {
                Ok((lote, instruction)) => lotes.entry(lote).or_default().push(instruction),
                Err(e) => warn!("Skipping row: {}", e),
            }
        }
        lotes.into_values().map(Lote::new).collect()
    }
}

impl<R: Read> Iterator for InstructionReader<R> {
    type Item = Result<(u32, PaymentInstruction), String>;

    /// Get the next instruction from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok((lote, instruction)))` - Successfully parsed row
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<InstructionRow>();

        let result = deserializer.next()?;
        self.line_num += 1;
        // Header is line 1
        let line = self.line_num + 1;
        Some(match result {
            Ok(row) => convert_instruction_row(row, &self.account)
                .map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}
