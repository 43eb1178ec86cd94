//! Retorno parser
//!
//! Reads a CNAB file line by line and drives the same state graph as the
//! writer:
//!
//! ```text
//! Start -> FileHeader -> LoteOpen -> (detail group)* -> LoteClosed -> [LoteOpen ...] -> Done
//! ```
//!
//! Structure (record kind, segment code) comes from the raw discriminator
//! characters, so a detail whose fields fail to decode is rejected with a
//! warning while the rest of the file is still read. Structural errors abort
//! the parse; whatever was read up to that point comes back in
//! [`PartialParse`].
//!
//! The direction is taken from the file header, so the parser reads both
//! remessa files (P/Q/R) and retorno files (T/U).

use crate::core::bank_rules::{self, BankRules};
use crate::core::layout::{self, describe, RecordKind, RecordLayout, SegmentOrder};
use crate::core::record::{self, DecodedRecord};
use crate::core::sequencer::SegmentSequencer;
use crate::types::{
    Bank, CnabError, CnabFormat, Direction, FieldValue, PaymentStatusEvent, ValidationWarning,
};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Nothing read yet
    Start,
    /// File header read, no lote open
    FileHeader,
    LoteOpen,
    LoteClosed,
    /// File trailer read
    Done,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Start => "start",
            ParserState::FileHeader => "file header",
            ParserState::LoteOpen => "lote open",
            ParserState::LoteClosed => "lote closed",
            ParserState::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// A completely read file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub bank: Bank,
    pub format: CnabFormat,
    /// Direction declared in the file header
    pub direction: Direction,
    pub header: DecodedRecord,
    /// One event per detail group, in file order
    pub events: Vec<PaymentStatusEvent>,
    pub warnings: Vec<ValidationWarning>,
}

/// A parse aborted by a structural error, with everything read before it
#[derive(Debug, Clone, Error)]
#[error("{source}")]
pub struct PartialParse {
    pub source: CnabError,
    /// File header, if it was read
    pub header: Option<DecodedRecord>,
    pub events: Vec<PaymentStatusEvent>,
    pub warnings: Vec<ValidationWarning>,
}

/// Parser for the files of one bank and format
#[derive(Debug, Clone, Copy)]
pub struct RetornoParser {
    bank: Bank,
    format: CnabFormat,
    rules: &'static BankRules,
}

impl RetornoParser {
    /// # Errors
    ///
    /// `UnsupportedLayout` if the bank has no layout for the format.
    pub fn new(bank: Bank, format: CnabFormat) -> Result<Self, CnabError> {
        layout::ensure_supported(bank, format)?;
        Ok(RetornoParser {
            bank,
            format,
            rules: bank_rules::rules(bank),
        })
    }

    /// Parser for the bank and format declared in the file's first line
    pub fn detect(bytes: &[u8]) -> Result<Self, CnabError> {
        let (bank, format) = detect(bytes)?;
        RetornoParser::new(bank, format)
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn format(&self) -> CnabFormat {
        self.format
    }

    /// Parse a whole file
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw file contents; lines end with `\n` or `\r\n`
    ///
    /// # Returns
    ///
    /// The events and warnings of the file, or the structural error that
    /// stopped the parse together with the partial result.
    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedFile, PartialParse> {
        let lines = record::split_lines(bytes);
        let mut run = ParseRun::new(self);

        for (index, chars) in lines.iter().enumerate() {
            if let Err(error) = run.line(index + 1, chars) {
                return Err(run.abort(error));
            }
        }
        if run.state != ParserState::Done {
            return Err(run.abort(CnabError::UnexpectedEndOfFile { line: lines.len() }));
        }
        run.finish(lines.len())
    }
}

/// Bank and format of a file, from the width and bank code of its first line
///
/// # Errors
///
/// - `UnexpectedEndOfFile` for empty input
/// - `RecordLengthMismatch` if the first line is neither 240 nor 400 characters
/// - `UnsupportedLayout` for an unknown bank code
pub fn detect(bytes: &[u8]) -> Result<(Bank, CnabFormat), CnabError> {
    let lines = record::split_lines(bytes);
    let first = lines
        .first()
        .ok_or(CnabError::UnexpectedEndOfFile { line: 0 })?;

    let (format, offset) = match first.len() {
        240 => (CnabFormat::Cnab240, 0),
        400 => (CnabFormat::Cnab400, 76),
        actual => {
            return Err(CnabError::RecordLengthMismatch {
                record: "file header".to_string(),
                expected: 240,
                actual,
            })
        }
    };
    let code: String = first[offset..offset + 3].iter().collect();
    let bank = Bank::from_code(&code).ok_or_else(|| CnabError::UnsupportedLayout {
        bank: code.clone(),
        format: format.to_string(),
    })?;
    Ok((bank, format))
}

/// Segments and records of the detail group being read
#[derive(Debug, Default)]
struct Group {
    line: usize,
    segments: Vec<char>,
    records: Vec<DecodedRecord>,
    rejected: bool,
}

struct ParseRun<'a> {
    parser: &'a RetornoParser,
    state: ParserState,
    direction: Direction,
    order: Option<SegmentOrder>,
    sequencer: SegmentSequencer,
    header: Option<DecodedRecord>,
    group: Group,
    events: Vec<PaymentStatusEvent>,
    warnings: Vec<ValidationWarning>,
}

impl<'a> ParseRun<'a> {
    fn new(parser: &'a RetornoParser) -> Self {
        ParseRun {
            parser,
            state: ParserState::Start,
            direction: Direction::Retorno,
            order: None,
            sequencer: SegmentSequencer::new(parser.format),
            header: None,
            group: Group::default(),
            events: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn line(&mut self, line: usize, chars: &[char]) -> Result<(), CnabError> {
        let (kind, segment) = record::classify(self.parser.format, line, chars)?;
        match kind {
            RecordKind::FileHeader => self.file_header(line, chars),
            RecordKind::LoteHeader => self.lote_header(line, chars),
            RecordKind::Detail => self.detail(line, chars, segment),
            RecordKind::LoteTrailer => self.lote_trailer(line, chars),
            RecordKind::FileTrailer => self.file_trailer(line, chars),
        }
    }

    fn file_header(&mut self, line: usize, chars: &[char]) -> Result<(), CnabError> {
        self.expect_state(line, RecordKind::FileHeader, &[ParserState::Start])?;
        let format = self.parser.format;

        let code = record::header_direction(format, chars).unwrap_or(' ');
        self.direction = Direction::from_code(code)
            .ok_or_else(|| CnabError::invalid_character("direction_code", &code.to_string()))?;
        self.order = layout::segment_order(format, self.direction);

        let header = record::decode(self.layout(line, RecordKind::FileHeader, None)?, line, chars)?;
        let sequence = self.sequencer.file_header();
        if format == CnabFormat::Cnab400 {
            let found = header.number("sequence");
            self.warn(self.sequencer.check_sequence(line, sequence, found));
        }
        self.header = Some(header);

        self.state = if format.has_lotes() {
            ParserState::FileHeader
        } else {
            ParserState::LoteOpen
        };
        debug!(
            bank = %self.parser.bank,
            format = %format,
            direction = %self.direction,
            "File header read"
        );
        Ok(())
    }

    fn lote_header(&mut self, line: usize, chars: &[char]) -> Result<(), CnabError> {
        self.expect_state(
            line,
            RecordKind::LoteHeader,
            &[ParserState::FileHeader, ParserState::LoteClosed],
        )?;
        let lote = self.sequencer.open_lote();
        self.state = ParserState::LoteOpen;
        debug!(lote, line, "Lote opened");

        let layout = self.layout(line, RecordKind::LoteHeader, None)?;
        if let Some(record) = self.decode_or_reject(layout, line, chars) {
            self.warn(self.sequencer.check_lote_number(line, record.number("lote")));
        }
        Ok(())
    }

    fn detail(&mut self, line: usize, chars: &[char], segment: Option<char>) -> Result<(), CnabError> {
        self.expect_state(line, RecordKind::Detail, &[ParserState::LoteOpen])?;
        let layout = self.layout(line, RecordKind::Detail, segment)?;
        let code = segment.unwrap_or(' ');

        match self.order {
            Some(order) => {
                let so_far = &self.group.segments;
                let continues = !so_far.is_empty() && order.allowed_next(so_far).contains(&code);
                if !continues {
                    let closed = so_far.is_empty() || order.is_complete(so_far);
                    if !(closed && order.starts_group(code)) {
                        let expected = describe(order.allowed_next(so_far));
                        return Err(CnabError::segment_order_violation(line, code, &expected));
                    }
                    self.flush_group();
                }
            }
            // One line per group
            None => self.flush_group(),
        }

        let sequence = self.sequencer.next_ordinal();
        if self.group.segments.is_empty() {
            self.group.line = line;
        }
        self.group.segments.push(code);

        match self.decode_or_reject(layout, line, chars) {
            Some(record) => {
                self.warn(self.sequencer.check_sequence(line, sequence, record.number("sequence")));
                if self.parser.format.has_lotes() {
                    self.warn(self.sequencer.check_lote_number(line, record.number("lote")));
                }
                self.group.records.push(record);
            }
            None => self.group.rejected = true,
        }
        Ok(())
    }

    fn lote_trailer(&mut self, line: usize, chars: &[char]) -> Result<(), CnabError> {
        self.expect_state(line, RecordKind::LoteTrailer, &[ParserState::LoteOpen])?;
        if let Some(order) = self.order {
            let so_far = &self.group.segments;
            if !so_far.is_empty() && !order.is_complete(so_far) {
                let found = chars.get(7).copied().unwrap_or(' ');
                let expected = describe(order.allowed_next(so_far));
                return Err(CnabError::segment_order_violation(line, found, &expected));
            }
        }
        self.flush_group();

        let totals = self.sequencer.close_lote();
        self.state = ParserState::LoteClosed;
        debug!(
            lote = self.sequencer.lote_number(),
            titles = totals.title_count,
            "Lote closed"
        );

        let layout = self.layout(line, RecordKind::LoteTrailer, None)?;
        if let Some(record) = self.decode_or_reject(layout, line, chars) {
            self.warn(self.sequencer.check_lote_number(line, record.number("lote")));
            for warning in self.sequencer.check_lote_trailer(&record) {
                self.warn(Some(warning));
            }
        }
        Ok(())
    }

    fn file_trailer(&mut self, line: usize, chars: &[char]) -> Result<(), CnabError> {
        let format = self.parser.format;
        let allowed: &[ParserState] = if format.has_lotes() {
            &[ParserState::FileHeader, ParserState::LoteClosed]
        } else {
            &[ParserState::LoteOpen]
        };
        self.expect_state(line, RecordKind::FileTrailer, allowed)?;
        self.flush_group();

        let totals = self.sequencer.close_file();
        self.state = ParserState::Done;

        let layout = self.layout(line, RecordKind::FileTrailer, None)?;
        if let Some(record) = self.decode_or_reject(layout, line, chars) {
            if format == CnabFormat::Cnab400 {
                let found = record.number("sequence");
                self.warn(self.sequencer.check_sequence(line, totals.record_count, found));
            }
            for warning in self.sequencer.check_file_trailer(&record) {
                self.warn(Some(warning));
            }
        }
        Ok(())
    }

    /// Turn the open group into an event and count it
    ///
    /// A group with a rejected record still counts as a title; its value is
    /// the one of the first decoded record that carries it, or zero.
    fn flush_group(&mut self) {
        let group = std::mem::take(&mut self.group);
        if group.segments.is_empty() {
            return;
        }
        let value = group
            .records
            .iter()
            .find_map(|r| r.layout.value_field.map(|field| r.number(field)))
            .unwrap_or(0);
        self.sequencer.accumulate(value);

        if group.rejected {
            debug!(line = group.line, "Detail group dropped");
            return;
        }
        if let Some(event) = self.event(group.line, group.records) {
            self.events.push(event);
        }
    }

    fn event(&self, line: usize, records: Vec<DecodedRecord>) -> Option<PaymentStatusEvent> {
        let first = records.first()?;
        let find = |name: &str| records.iter().find_map(|r| r.get(name));

        let our_number = first.text("our_number");
        let our_number = match self.parser.format {
            CnabFormat::Cnab240 => self.parser.rules.our_number_from_field(&our_number),
            CnabFormat::Cnab400 => bank_rules::strip_zeros(&our_number),
        };

        Some(PaymentStatusEvent {
            line,
            lote: self.sequencer.lote_number().max(1),
            occurrence_code: first.number("movement_code"),
            reason_codes: find("reason_codes")
                .map(|v| v.to_string().trim().to_string())
                .unwrap_or_default(),
            our_number,
            document_number: first.text("document_number"),
            value: first.number("value"),
            due_date: first.date("due_date"),
            paid_value: find("paid_value").and_then(FieldValue::as_number),
            occurrence_date: find("occurrence_date").and_then(FieldValue::as_date),
            records,
        })
    }

    /// Decode a record; a failure becomes a `RecordRejected` warning
    fn decode_or_reject(
        &mut self,
        layout: &'static RecordLayout,
        line: usize,
        chars: &[char],
    ) -> Option<DecodedRecord> {
        match record::decode(layout, line, chars) {
            Ok(record) => Some(record),
            Err(error) => {
                self.warn(Some(ValidationWarning::RecordRejected { line, error }));
                None
            }
        }
    }

    fn layout(
        &self,
        line: usize,
        kind: RecordKind,
        segment: Option<char>,
    ) -> Result<&'static RecordLayout, CnabError> {
        let parser = self.parser;
        layout::layout(parser.bank, parser.format, self.direction, kind, segment)?.ok_or_else(|| {
            let discriminator = segment
                .map(String::from)
                .unwrap_or_else(|| kind.to_string());
            CnabError::unknown_record_type(line, &discriminator)
        })
    }

    fn expect_state(
        &self,
        line: usize,
        kind: RecordKind,
        allowed: &[ParserState],
    ) -> Result<(), CnabError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(CnabError::unexpected_record_type(
                line,
                &kind.to_string(),
                &self.state.to_string(),
            ))
        }
    }

    fn warn(&mut self, warning: Option<ValidationWarning>) {
        if let Some(warning) = warning {
            warn!(bank = %self.parser.bank, "{}", warning);
            self.warnings.push(warning);
        }
    }

    /// Stop the parse, keeping every event read so far
    ///
    /// The open group becomes an event too when it holds every segment its
    /// kind needs (always, for single-line groups).
    fn abort(mut self, error: CnabError) -> PartialParse {
        let complete = match self.order {
            Some(order) => order.is_complete(&self.group.segments),
            None => true,
        };
        if complete {
            self.flush_group();
        }
        warn!(bank = %self.parser.bank, error = %error, "Parse aborted");
        PartialParse {
            source: error,
            header: self.header,
            events: self.events,
            warnings: self.warnings,
        }
    }

    fn finish(self, lines: usize) -> Result<ParsedFile, PartialParse> {
        let Some(header) = self.header else {
            return Err(PartialParse {
                source: CnabError::UnexpectedEndOfFile { line: lines },
                header: None,
                events: self.events,
                warnings: self.warnings,
            });
        };
        debug!(
            events = self.events.len(),
            warnings = self.warnings.len(),
            "File parsed"
        );
        Ok(ParsedFile {
            bank: self.parser.bank,
            format: self.parser.format,
            direction: self.direction,
            header,
            events: self.events,
            warnings: self.warnings,
        })
    }
}
