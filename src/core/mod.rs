//! Core CNAB logic
//!
//! This module contains the file-format components:
//! - `field_codec` - Formatting and parsing of single fixed-width fields
//! - `check_digit` - Weighted-modulus check-digit rules
//! - `bank_rules` - Per-bank identifier widths and check digits
//! - `layout` - Static record layouts for CNAB240 and CNAB400
//! - `record` - Building lines from named values and decoding them back
//! - `sequencer` - Lote numbering, record sequencing and control totals
//! - `remessa` - Remessa writer state machine
//! - `retorno` - Retorno parser state machine
//! - `barcode` - Boleto barcode and digitable line

pub mod bank_rules;
pub mod barcode;
pub mod check_digit;
pub mod field_codec;
pub mod layout;
pub mod record;
pub mod remessa;
pub mod retorno;
pub mod sequencer;

pub use barcode::{Barcode, BarcodeComposer};
pub use check_digit::CheckDigitRule;
pub use field_codec::{CharsetPolicy, FieldSpec};
pub use layout::{RecordKind, RecordLayout};
pub use record::{DecodedRecord, RecordBuilder};
pub use remessa::{write_remessa, RejectedInstruction, RemessaFile, RemessaWriter};
pub use retorno::{ParsedFile, PartialParse, RetornoParser};
pub use sequencer::{ControlTotals, SegmentSequencer};
