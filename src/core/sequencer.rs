//! Lote numbering, record sequencing and control totals
//!
//! The same [`SegmentSequencer`] drives the writer (which stamps the numbers
//! it hands out) and the parser (which compares what the file declares with
//! what it counted). Counting rules:
//!
//! - CNAB240 lote `record_count` includes the lote header and trailer.
//! - CNAB240 file `record_count` includes every line, file header and trailer too.
//! - `title_count` counts detail groups (one per charge), not segments.
//! - CNAB240 detail `sequence` restarts at 1 in every lote; CNAB400
//!   `sequence` is the line number in the file.

use crate::core::record::DecodedRecord;
use crate::types::{CnabFormat, ValidationWarning};

/// Counts and sums accumulated over a lote or a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTotals {
    pub record_count: u64,
    pub title_count: u64,
    pub value_sum: u64,
}

impl ControlTotals {
    // A saturated sum exceeds every trailer field, so it surfaces as a mismatch
    fn add_title(&mut self, value: u64) {
        self.title_count += 1;
        self.value_sum = self.value_sum.saturating_add(value);
    }
}

/// Totals declared in a file trailer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTotals {
    pub lote_count: u64,
    /// Every line including the trailer
    pub record_count: u64,
    pub title_count: u64,
    pub value_sum: u64,
}

#[derive(Debug, Clone)]
pub struct SegmentSequencer {
    format: CnabFormat,
    lote_number: u32,
    lote_count: u64,
    detail_ordinal: u64,
    lote: ControlTotals,
    file: ControlTotals,
}

impl SegmentSequencer {
    pub fn new(format: CnabFormat) -> Self {
        SegmentSequencer {
            format,
            lote_number: 0,
            lote_count: 0,
            detail_ordinal: 0,
            lote: ControlTotals::default(),
            file: ControlTotals::default(),
        }
    }

    /// Count the file header; returns its sequence number
    pub fn file_header(&mut self) -> u64 {
        self.file.record_count += 1;
        self.file.record_count
    }

    /// Start a lote and count its header; returns the new lote number
    pub fn open_lote(&mut self) -> u32 {
        self.lote_number += 1;
        self.detail_ordinal = 0;
        self.lote = ControlTotals {
            record_count: 1,
            ..ControlTotals::default()
        };
        self.file.record_count += 1;
        self.lote_number
    }

    /// Count one detail line and return the sequence number to stamp on it
    pub fn next_ordinal(&mut self) -> u64 {
        self.detail_ordinal += 1;
        self.lote.record_count += 1;
        self.file.record_count += 1;
        match self.format {
            CnabFormat::Cnab240 => self.detail_ordinal,
            CnabFormat::Cnab400 => self.file.record_count,
        }
    }

    /// Add one title (detail group) and its value to the running totals
    pub fn accumulate(&mut self, value: u64) {
        self.lote.add_title(value);
        self.file.add_title(value);
    }

    /// Count the lote trailer and return the lote's totals
    pub fn close_lote(&mut self) -> ControlTotals {
        self.lote.record_count += 1;
        self.file.record_count += 1;
        self.lote_count += 1;
        self.lote
    }

    /// Count the file trailer and return the file's totals
    pub fn close_file(&mut self) -> FileTotals {
        self.file.record_count += 1;
        FileTotals {
            lote_count: self.lote_count,
            record_count: self.file.record_count,
            title_count: self.file.title_count,
            value_sum: self.file.value_sum,
        }
    }

    /// Number of the current (or last) lote
    pub fn lote_number(&self) -> u32 {
        self.lote_number
    }

    pub fn lote_totals(&self) -> ControlTotals {
        self.lote
    }

    pub fn file_totals(&self) -> ControlTotals {
        self.file
    }

    /// Compare a lote number read from a record with the current lote
    pub fn check_lote_number(&self, line: usize, found: u64) -> Option<ValidationWarning> {
        expect(line, "lote", u64::from(self.lote_number), found)
    }

    /// Compare a sequence number read from a record with the one just counted
    pub fn check_sequence(&self, line: usize, expected: u64, found: u64) -> Option<ValidationWarning> {
        expect(line, "sequence", expected, found)
    }

    /// Compare a lote trailer with the lote's totals (after [`close_lote`](Self::close_lote))
    pub fn check_lote_trailer(&self, trailer: &DecodedRecord) -> Vec<ValidationWarning> {
        let totals = self.lote;
        [
            mismatch(trailer, "record_count", totals.record_count),
            mismatch(trailer, "title_count", totals.title_count),
            mismatch(trailer, "total_value", totals.value_sum),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Compare a file trailer with the file's totals (after [`close_file`](Self::close_file))
    pub fn check_file_trailer(&self, trailer: &DecodedRecord) -> Vec<ValidationWarning> {
        let checks = match self.format {
            CnabFormat::Cnab240 => vec![
                mismatch(trailer, "lote_count", self.lote_count),
                mismatch(trailer, "record_count", self.file.record_count),
            ],
            CnabFormat::Cnab400 => vec![
                mismatch(trailer, "title_count", self.file.title_count),
                mismatch(trailer, "total_value", self.file.value_sum),
            ],
        };
        checks.into_iter().flatten().collect()
    }
}

fn expect(line: usize, field: &str, expected: u64, found: u64) -> Option<ValidationWarning> {
    (expected != found).then(|| ValidationWarning::SequenceMismatch {
        line,
        field: field.to_string(),
        expected,
        found,
    })
}

fn mismatch(record: &DecodedRecord, field: &str, computed: u64) -> Option<ValidationWarning> {
    let declared = record.number(field);
    (declared != computed).then(|| ValidationWarning::ControlTotalMismatch {
        line: record.line,
        record: record.layout.name.to_string(),
        field: field.to_string(),
        declared,
        computed,
    })
}
