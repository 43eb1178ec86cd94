//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `bank`: Bank, format and direction identifiers
//! - `instruction`: Payment instructions and the remessa header data
//! - `field`: Typed value of a fixed-width field
//! - `event`: Retorno events and validation warnings
//! - `error`: Error types for the engine

pub mod bank;
pub mod error;
pub mod event;
pub mod field;
pub mod instruction;

pub use bank::{Bank, CnabFormat, Direction};
pub use error::CnabError;
pub use event::{PaymentStatusEvent, ValidationWarning};
pub use field::FieldValue;
pub use instruction::{
    movement, BankAccount, Beneficiary, Cents, DocumentKind, Fine, Lote, Payer,
    PaymentInstruction, RemessaHeader, ServiceType,
};
