//! Remessa writer
//!
//! Turns payment instructions into an ordered sequence of fixed-width lines.
//! The writer is an explicit state machine:
//!
//! ```text
//! FileHeader -> LoteOpen -> (detail group)* -> LoteClosed -> [LoteOpen ...] -> Done
//! ```
//!
//! A lote opens only after the previous one was closed, and the file
//! trailer only follows a closed lote (or a header, for an empty file).
//! CNAB400 files have a single implicit lote that is open from the start.
//!
//! Every detail group is built completely before anything is appended, so a
//! failing instruction leaves the file untouched and the caller may skip it.

use crate::core::bank_rules::{self, BankRules};
use crate::core::field_codec::CharsetPolicy;
use crate::core::layout::{self, RecordKind, RecordLayout};
use crate::core::record::RecordBuilder;
use crate::core::sequencer::SegmentSequencer;
use crate::types::{
    Bank, Cents, CnabError, CnabFormat, Direction, FieldValue, Lote, PaymentInstruction,
    RemessaHeader, ServiceType,
};
use std::fmt;
use tracing::{debug, warn};

/// Values of one record, by field name
pub type FieldValues = Vec<(&'static str, FieldValue)>;

/// Writer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// File header written, no lote open
    FileHeader,
    LoteOpen,
    LoteClosed,
    /// File trailer written
    Done,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterState::FileHeader => "file header",
            WriterState::LoteOpen => "lote open",
            WriterState::LoteClosed => "lote closed",
            WriterState::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// An instruction left out of a batch, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedInstruction {
    /// Position of the instruction in its lote
    pub index: usize,
    pub document_number: String,
    pub error: CnabError,
}

/// A finished remessa
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemessaFile {
    pub lines: Vec<String>,
    /// Instructions skipped by [`write_remessa`]
    pub rejected: Vec<RejectedInstruction>,
}

impl RemessaFile {
    /// File contents, every line terminated by CRLF
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.lines.iter().map(|l| l.len() + 2).sum());
        for line in &self.lines {
            bytes.extend_from_slice(line.as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }
        bytes
    }
}

/// Stateful writer for one remessa file
#[derive(Debug, Clone)]
pub struct RemessaWriter {
    bank: Bank,
    format: CnabFormat,
    rules: &'static BankRules,
    header: RemessaHeader,
    policy: CharsetPolicy,
    sequencer: SegmentSequencer,
    state: WriterState,
    lines: Vec<String>,
}

impl RemessaWriter {
    /// Start a file and write its header
    ///
    /// # Errors
    ///
    /// - `UnsupportedLayout` if the bank has no layout for the format
    /// - Field errors if the header data does not fit
    pub fn new(bank: Bank, format: CnabFormat, header: RemessaHeader) -> Result<Self, CnabError> {
        Self::with_charset(bank, format, header, CharsetPolicy::default())
    }

    /// Like [`RemessaWriter::new`], with an explicit charset policy for text fields
    pub fn with_charset(
        bank: Bank,
        format: CnabFormat,
        header: RemessaHeader,
        policy: CharsetPolicy,
    ) -> Result<Self, CnabError> {
        layout::ensure_supported(bank, format)?;
        let mut writer = RemessaWriter {
            bank,
            format,
            rules: bank_rules::rules(bank),
            header,
            policy,
            sequencer: SegmentSequencer::new(format),
            state: WriterState::FileHeader,
            lines: Vec::new(),
        };

        let sequence = writer.sequencer.file_header();
        let line = writer.file_header(sequence)?;
        writer.lines.push(line);
        if format == CnabFormat::Cnab400 {
            writer.state = WriterState::LoteOpen;
        }
        Ok(writer)
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Lines written so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Open a new lote and write its header; returns the lote number
    pub fn open_lote(&mut self, service: ServiceType) -> Result<u32, CnabError> {
        if !matches!(self.state, WriterState::FileHeader | WriterState::LoteClosed) {
            return Err(self.unexpected(RecordKind::LoteHeader));
        }
        let mut sequencer = self.sequencer.clone();
        let lote = sequencer.open_lote();
        let line = self.lote_header(lote, service)?;

        self.sequencer = sequencer;
        self.lines.push(line);
        self.state = WriterState::LoteOpen;
        Ok(lote)
    }

    /// Write the detail group of one instruction
    ///
    /// CNAB240 emits segments P and Q, plus R when the instruction carries a
    /// fine; CNAB400 emits one detail line.
    pub fn add_instruction(&mut self, instruction: &PaymentInstruction) -> Result<(), CnabError> {
        if self.state != WriterState::LoteOpen {
            return Err(self.unexpected(RecordKind::Detail));
        }
        match self.format {
            CnabFormat::Cnab240 => {
                let mut segments = vec![
                    ('P', self.segment_p(instruction)?),
                    ('Q', self.segment_q(instruction)?),
                ];
                if instruction.fine.is_some() {
                    segments.push(('R', self.segment_r(instruction)?));
                }
                self.add_segments(segments)
            }
            CnabFormat::Cnab400 => {
                let values = self.cnab400_detail(instruction)?;
                self.push_group(vec![(None, values)])
            }
        }
    }

    /// Write a CNAB240 detail group from raw segment values
    ///
    /// Bank code, lote and sequence are filled in by the writer.
    ///
    /// # Errors
    ///
    /// `SegmentOrderViolation` if the segment codes do not follow the lote's
    /// declared order; nothing is written in that case.
    pub fn add_segments(&mut self, segments: Vec<(char, FieldValues)>) -> Result<(), CnabError> {
        if self.format != CnabFormat::Cnab240 {
            return Err(CnabError::unexpected_record_type(
                self.lines.len() + 1,
                "segment",
                "CNAB400 file",
            ));
        }
        self.push_group(
            segments
                .into_iter()
                .map(|(code, values)| (Some(code), values))
                .collect(),
        )
    }

    /// Close the open lote and write its trailer
    pub fn close_lote(&mut self) -> Result<(), CnabError> {
        if self.state != WriterState::LoteOpen {
            return Err(self.unexpected(RecordKind::LoteTrailer));
        }
        if self.format == CnabFormat::Cnab400 {
            self.state = WriterState::LoteClosed;
            return Ok(());
        }

        let mut sequencer = self.sequencer.clone();
        let totals = sequencer.close_lote();
        let line = RecordBuilder::new(self.layout(RecordKind::LoteTrailer, None)?)
            .set("bank_code", self.bank.code())?
            .set("lote", sequencer.lote_number())?
            .set("record_count", totals.record_count)?
            .set("title_count", totals.title_count)?
            .set("total_value", totals.value_sum)?
            .build()?;

        self.sequencer = sequencer;
        self.lines.push(line);
        self.state = WriterState::LoteClosed;
        Ok(())
    }

    /// Write the file trailer and hand out the finished file
    pub fn finish(&mut self) -> Result<RemessaFile, CnabError> {
        let allowed = match self.format {
            CnabFormat::Cnab240 => {
                matches!(self.state, WriterState::FileHeader | WriterState::LoteClosed)
            }
            CnabFormat::Cnab400 => {
                matches!(self.state, WriterState::LoteOpen | WriterState::LoteClosed)
            }
        };
        if !allowed {
            return Err(self.unexpected(RecordKind::FileTrailer));
        }

        let mut sequencer = self.sequencer.clone();
        let totals = sequencer.close_file();
        let builder = RecordBuilder::new(self.layout(RecordKind::FileTrailer, None)?);
        let line = match self.format {
            CnabFormat::Cnab240 => builder
                .set("bank_code", self.bank.code())?
                .set("lote_count", totals.lote_count)?
                .set("record_count", totals.record_count)?,
            CnabFormat::Cnab400 => builder
                .set("title_count", totals.title_count)?
                .set("total_value", totals.value_sum)?
                .set("sequence", totals.record_count)?,
        }
        .build()?;

        self.sequencer = sequencer;
        self.lines.push(line);
        self.state = WriterState::Done;
        debug!(
            bank = %self.bank,
            format = %self.format,
            records = totals.record_count,
            titles = totals.title_count,
            "Remessa finished"
        );
        Ok(RemessaFile {
            lines: std::mem::take(&mut self.lines),
            rejected: Vec::new(),
        })
    }

    fn push_group(&mut self, segments: Vec<(Option<char>, FieldValues)>) -> Result<(), CnabError> {
        if self.state != WriterState::LoteOpen {
            return Err(self.unexpected(RecordKind::Detail));
        }
        let first_line = self.lines.len() + 1;

        if let Some(order) = layout::segment_order(self.format, Direction::Remessa) {
            let codes: Vec<char> = segments.iter().filter_map(|(code, _)| *code).collect();
            if let Err((index, found, expected)) = order.validate(&codes) {
                return Err(CnabError::segment_order_violation(
                    first_line + index,
                    found,
                    &expected,
                ));
            }
        }

        let mut sequencer = self.sequencer.clone();
        let mut built = Vec::with_capacity(segments.len());
        let mut group_value = None;

        for (code, values) in segments {
            let record_layout = self.layout(RecordKind::Detail, code)?;
            let mut builder = RecordBuilder::new(record_layout)
                .with_charset(self.policy)
                .set_all(values)?;
            let sequence = sequencer.next_ordinal();
            builder = builder.set("sequence", sequence)?;
            if self.format == CnabFormat::Cnab240 {
                builder = builder
                    .set("bank_code", self.bank.code())?
                    .set("lote", sequencer.lote_number())?;
            }
            if let Some(field) = record_layout.value_field {
                if group_value.is_none() {
                    group_value = builder.get(field).and_then(FieldValue::as_number);
                }
            }
            built.push(builder.build()?);
        }

        sequencer.accumulate(group_value.unwrap_or(0));
        self.sequencer = sequencer;
        self.lines.extend(built);
        Ok(())
    }

    fn layout(
        &self,
        kind: RecordKind,
        segment: Option<char>,
    ) -> Result<&'static RecordLayout, CnabError> {
        layout::layout(self.bank, self.format, Direction::Remessa, kind, segment)?.ok_or_else(
            || {
                let discriminator = segment
                    .map(String::from)
                    .unwrap_or_else(|| kind.to_string());
                CnabError::unknown_record_type(self.lines.len() + 1, &discriminator)
            },
        )
    }

    fn unexpected(&self, kind: RecordKind) -> CnabError {
        CnabError::unexpected_record_type(
            self.lines.len() + 1,
            &kind.to_string(),
            &self.state.to_string(),
        )
    }

    fn file_header(&self, sequence: u64) -> Result<String, CnabError> {
        let beneficiary = &self.header.beneficiary;
        let account = &beneficiary.account;
        let builder = RecordBuilder::new(self.layout(RecordKind::FileHeader, None)?)
            .with_charset(self.policy)
            .set("bank_code", self.bank.code())?
            .set("company_name", &beneficiary.name)?
            .set("bank_name", self.bank.name())?
            .set("generation_date", self.header.generated_on)?
            .set("file_sequence", self.header.file_sequence)?;

        let builder = match self.format {
            CnabFormat::Cnab240 => builder
                .set("direction_code", Direction::Remessa.code())?
                .set("company_document_kind", beneficiary.document_kind.code())?
                .set("company_document", digits(&beneficiary.document))?
                .set("agreement", &account.agreement)?
                .set("agency", &account.agency)?
                .set("agency_dv", self.rules.agency_dv(account)?)?
                .set("account", &account.account)?
                .set("account_dv", self.rules.account_dv(account)?)?
                .set("layout_version", self.rules.file_layout_version)?,
            CnabFormat::Cnab400 => builder
                .set("company_code", &account.agreement)?
                .set("sequence", sequence)?,
        };
        builder.build()
    }

    fn lote_header(&self, lote: u32, service: ServiceType) -> Result<String, CnabError> {
        let beneficiary = &self.header.beneficiary;
        let account = &beneficiary.account;
        RecordBuilder::new(self.layout(RecordKind::LoteHeader, None)?)
            .with_charset(self.policy)
            .set("bank_code", self.bank.code())?
            .set("lote", lote)?
            .set("operation", 'R')?
            .set("service_code", service.code())?
            .set("layout_version", self.rules.lote_layout_version)?
            .set("company_document_kind", beneficiary.document_kind.code())?
            .set("company_document", digits(&beneficiary.document))?
            .set("agreement", &account.agreement)?
            .set("agency", &account.agency)?
            .set("agency_dv", self.rules.agency_dv(account)?)?
            .set("account", &account.account)?
            .set("account_dv", self.rules.account_dv(account)?)?
            .set("company_name", &beneficiary.name)?
            .set("file_sequence", self.header.file_sequence)?
            .set("recording_date", self.header.generated_on)?
            .build()
    }

    fn segment_p(&self, instruction: &PaymentInstruction) -> Result<FieldValues, CnabError> {
        let account = &instruction.account;
        Ok(vec![
            ("movement_code", instruction.movement_code.into()),
            ("agency", account.agency.as_str().into()),
            ("agency_dv", self.rules.agency_dv(account)?.into()),
            ("account", account.account.as_str().into()),
            ("account_dv", self.rules.account_dv(account)?.into()),
            (
                "our_number",
                self.rules
                    .our_number_field(
                        account,
                        &instruction.our_number,
                        instruction.our_number_dv.as_deref(),
                    )?
                    .into(),
            ),
            ("document_number", instruction.document_number.as_str().into()),
            ("due_date", instruction.due_date.into()),
            (
                "value",
                cents("cnab240.segment_p", "value", 15, instruction.value)?.into(),
            ),
            ("issue_date", instruction.issue_date.into()),
        ])
    }

    fn segment_q(&self, instruction: &PaymentInstruction) -> Result<FieldValues, CnabError> {
        let payer = &instruction.payer;
        let (zip_code, zip_suffix) = split_zip("cnab240.segment_q", &payer.zip_code)?;
        Ok(vec![
            ("movement_code", instruction.movement_code.into()),
            ("payer_document_kind", payer.document_kind.code().into()),
            ("payer_document", digits(&payer.document).into()),
            ("payer_name", payer.name.as_str().into()),
            ("payer_address", payer.address.as_str().into()),
            ("payer_neighborhood", payer.neighborhood.as_str().into()),
            ("zip_code", zip_code.into()),
            ("zip_suffix", zip_suffix.into()),
            ("payer_city", payer.city.as_str().into()),
            ("payer_state", payer.state.as_str().into()),
        ])
    }

    fn segment_r(&self, instruction: &PaymentInstruction) -> Result<FieldValues, CnabError> {
        let mut values: FieldValues = vec![("movement_code", instruction.movement_code.into())];
        if let Some(fine) = &instruction.fine {
            values.push(("fine_code", FINE_PERCENT.into()));
            values.push(("fine_date", fine.date.into()));
            values.push(("fine_value", fine.percent.into()));
        }
        Ok(values)
    }

    fn cnab400_detail(&self, instruction: &PaymentInstruction) -> Result<FieldValues, CnabError> {
        let account = &instruction.account;
        let payer = &instruction.payer;
        let our_number_dv = self
            .rules
            .our_number_dv(
                account,
                &instruction.our_number,
                instruction.our_number_dv.as_deref(),
            )?
            .map(String::from)
            .unwrap_or_default();
        let (zip_code, zip_suffix) = split_zip("cnab400.remessa_detail", &payer.zip_code)?;

        let mut values: FieldValues = vec![
            ("wallet", account.wallet.as_str().into()),
            ("agency", account.agency.as_str().into()),
            ("account", account.account.as_str().into()),
            ("account_dv", self.rules.account_dv(account)?.into()),
            (
                "our_number",
                self.rules
                    .padded_our_number(account, &instruction.our_number)?
                    .into(),
            ),
            ("our_number_dv", our_number_dv.into()),
            ("movement_code", instruction.movement_code.into()),
            ("document_number", instruction.document_number.as_str().into()),
            ("due_date", instruction.due_date.into()),
            (
                "value",
                cents("cnab400.remessa_detail", "value", 13, instruction.value)?.into(),
            ),
            ("issue_date", instruction.issue_date.into()),
            ("payer_document_kind", payer.document_kind.code().into()),
            ("payer_document", digits(&payer.document).into()),
            ("payer_name", payer.name.as_str().into()),
            ("payer_address", payer.address.as_str().into()),
            ("zip_code", format!("{}{}", zip_code, zip_suffix).into()),
        ];
        if let Some(fine) = &instruction.fine {
            values.push(("fine_flag", FINE_PERCENT.into()));
            values.push(("fine_percent", fine.percent.into()));
        }
        Ok(values)
    }
}

/// Fine code for a percentage rate, in both formats
const FINE_PERCENT: u64 = 2;

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn cents(record: &str, field: &str, width: usize, value: Cents) -> Result<u64, CnabError> {
    u64::try_from(value).map_err(|_| CnabError::field_overflow(record, field, width, &value.to_string()))
}

/// CEP split into its 5-digit prefix and 3-digit suffix
fn split_zip(record: &str, zip: &str) -> Result<(String, String), CnabError> {
    let zip = digits(zip);
    if zip.len() > 8 {
        return Err(CnabError::field_overflow(record, "zip_code", 8, &zip));
    }
    let zip = format!("{:0>8}", zip);
    Ok((zip[..5].to_string(), zip[5..].to_string()))
}

/// Write a whole batch, skipping instructions whose data does not fit
///
/// Record-scoped failures (overflow, bad characters, missing values) drop
/// only the offending instruction; it is logged and listed in
/// [`RemessaFile::rejected`]. Anything else aborts the batch.
///
/// CNAB400 has no lotes: the instructions of every lote are written in order
/// into the single implicit one. An empty batch yields header and trailer only.
pub fn write_remessa(
    bank: Bank,
    format: CnabFormat,
    header: RemessaHeader,
    lotes: &[Lote],
) -> Result<RemessaFile, CnabError> {
    let mut writer = RemessaWriter::new(bank, format, header)?;
    let mut rejected = Vec::new();

    for lote in lotes {
        if format.has_lotes() {
            writer.open_lote(lote.service)?;
        }
        for (index, instruction) in lote.instructions.iter().enumerate() {
            match writer.add_instruction(instruction) {
                Ok(()) => {}
                Err(error) if error.is_record_scoped() => {
                    warn!(
                        index,
                        document = %instruction.document_number,
                        error = %error,
                        "Skipping instruction"
                    );
                    rejected.push(RejectedInstruction {
                        index,
                        document_number: instruction.document_number.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }
        if format.has_lotes() {
            writer.close_lote()?;
        }
    }

    let mut file = writer.finish()?;
    file.rejected = rejected;
    Ok(file)
}
