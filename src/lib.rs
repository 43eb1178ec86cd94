//! Rust CNAB Engine Library
//! # Overview
//!
//! This library reads and writes the fixed-width CNAB files Brazilian banks
//! exchange with their customers for boleto collection, and composes the
//! boleto barcode and digitable line.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (banks, instructions, events, errors)
//! - [`cli`] - CLI arguments parsing and subcommand handlers
//! - [`core`] - Business logic components:
//!   - [`core::field_codec`] - Fixed-width field formatting and parsing
//!   - [`core::layout`] - Record layouts per bank, format and direction
//!   - [`core::check_digit`] - Modulo 10 / modulo 11 check digits
//!   - [`core::bank_rules`] - Per-bank identifier and check-digit rules
//!   - [`core::remessa`] - Remessa writer with segment and lote bookkeeping
//!   - [`core::retorno`] - Retorno parser with control-total validation
//!   - [`core::barcode`] - Barcode and digitable line composition
//! - [`io`] - Instruction CSV input, event and boleto CSV output
//! - [`strategy`] - Sequential and parallel retorno processing
//!
//! # Formats
//!
//! - **CNAB240**: 240-character lines; details are grouped into lotes and
//!   each charge spans several segments (P, Q, R on remessa; T, U on retorno)
//! - **CNAB400**: 400-character lines; one detail per charge, no lotes
//!
//! # Supported Banks
//!
//! Banco do Brasil (001), Santander (033), Bradesco (237) and Itaú (341)
//! exchange CNAB240 files; CNAB400 is implemented for Bradesco.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    write_remessa, Barcode, BarcodeComposer, ParsedFile, PartialParse, RemessaFile,
    RemessaWriter, RetornoParser,
};
pub use io::{write_boletos_csv, write_events_csv};
pub use types::{
    Bank, CnabError, CnabFormat, Direction, Lote, PaymentInstruction, PaymentStatusEvent,
    RemessaHeader,
};
