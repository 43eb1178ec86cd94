//! Payment-instruction types consumed by the remessa writer and the barcode composer
//!
//! All identifiers are kept exactly as the caller supplied them. Padding,
//! upper-casing and check-digit computation happen later, in the field codec
//! and the bank rules, never on construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Monetary value in integer cents
///
/// Signed so that a negative input can be detected and rejected instead of
/// wrapping around.
pub type Cents = i64;

/// Identity of an account at the bank
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankAccount {
    /// Branch number, digits only
    pub agency: String,

    /// Branch check digit; computed from the bank's rule when absent
    pub agency_dv: Option<String>,

    /// Account number, digits only
    pub account: String,

    /// Account check digit; computed from the bank's rule when absent
    pub account_dv: Option<String>,

    /// Wallet / portfolio code ("carteira")
    pub wallet: String,

    /// Agreement code ("convênio") assigned by the bank
    pub agreement: String,
}

/// Kind of taxpayer document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Individual (CPF, 11 digits)
    Cpf,
    /// Company (CNPJ, 14 digits)
    Cnpj,
}

impl DocumentKind {
    /// Numeric code used in every CNAB layout
    pub fn code(&self) -> u64 {
        match self {
            DocumentKind::Cpf => 1,
            DocumentKind::Cnpj => 2,
        }
    }

    /// Inverse of [`DocumentKind::code`]
    pub fn from_code(code: u64) -> Option<DocumentKind> {
        match code {
            1 => Some(DocumentKind::Cpf),
            2 => Some(DocumentKind::Cnpj),
            _ => None,
        }
    }

    /// Guess the kind from the number of digits in a document
    pub fn infer(document: &str) -> DocumentKind {
        let digits = document.chars().filter(|c| c.is_ascii_digit()).count();
        if digits > 11 {
            DocumentKind::Cnpj
        } else {
            DocumentKind::Cpf
        }
    }
}

/// The drawee of a charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub document_kind: DocumentKind,
    /// CPF or CNPJ, digits only
    pub document: String,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    /// Eight-digit CEP
    pub zip_code: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
}

/// Late-payment fine, emitted in segment R (CNAB240) or the fine fields (CNAB400)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    /// Date from which the fine applies (CNAB400 layouts do not carry it)
    pub date: NaiveDate,
    /// Fine rate in hundredths of a percent (`200` is 2.00%)
    pub percent: u32,
}

/// Movement codes a remessa detail can carry
pub mod movement {
    /// Register a new charge ("entrada de títulos")
    pub const REGISTER: u8 = 1;
    /// Request write-off ("pedido de baixa")
    pub const WRITE_OFF: u8 = 2;
    /// Change due date
    pub const CHANGE_DUE_DATE: u8 = 6;
}

/// A single charge to be registered with the bank
///
/// Created by the caller and consumed read-only by the remessa writer and the
/// barcode composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Account the charge is credited to
    pub account: BankAccount,

    /// Caller's document number ("número do documento / seu número")
    pub document_number: String,

    /// Our-number ("nosso número") without check digit
    pub our_number: String,

    /// Due date
    pub due_date: NaiveDate,

    /// Issue date
    pub issue_date: NaiveDate,

    /// Face value in cents
    pub value: Cents,

    /// Who pays
    pub payer: Payer,

    /// Movement / instruction code, see [`movement`]
    pub movement_code: u8,

    /// Optional fine
    pub fine: Option<Fine>,

    /// Our-number check digit assigned by the bank; computed when absent
    #[serde(default)]
    pub our_number_dv: Option<String>,

    /// Barcode issued elsewhere, used as is instead of being composed
    #[serde(default)]
    pub barcode: Option<String>,
}

/// The company issuing the remessa ("cedente / beneficiário")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub name: String,
    pub document_kind: DocumentKind,
    /// CPF or CNPJ, digits only
    pub document: String,
    pub account: BankAccount,
}

/// Data written in the file (and lote) headers of a remessa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemessaHeader {
    pub beneficiary: Beneficiary,
    /// Sequential number of this file, agreed with the bank
    pub file_sequence: u32,
    /// Generation date
    pub generated_on: NaiveDate,
}

/// Service carried by a lote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceType {
    /// Charging / boleto collection
    #[default]
    Charging,
}

impl ServiceType {
    /// Service code in the lote header
    pub fn code(&self) -> u64 {
        match self {
            ServiceType::Charging => 1,
        }
    }

    /// Inverse of [`ServiceType::code`]
    pub fn from_code(code: u64) -> Option<ServiceType> {
        match code {
            1 => Some(ServiceType::Charging),
            _ => None,
        }
    }
}

/// A group of instructions written between a lote header and trailer
///
/// The lote number is assigned by the writer (1-based, monotonic per file).
/// CNAB400 files are written as a single implicit lote.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lote {
    pub service: ServiceType,
    pub instructions: Vec<PaymentInstruction>,
}

impl Lote {
    /// Create a charging lote
    pub fn new(instructions: Vec<PaymentInstruction>) -> Self {
        Lote {
            service: ServiceType::Charging,
            instructions,
        }
    }
}
