//! CSV format handling for instruction input and event/boleto output
//!
//! This module centralizes all CSV format concerns, providing:
//! - InstructionRow structure for deserialization
//! - Conversion from CSV rows to payment instructions
//! - Event, warning and boleto output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::Barcode;
use crate::types::{
    movement, BankAccount, Cents, CnabError, DocumentKind, Fine, Payer, PaymentInstruction,
    PaymentStatusEvent, ValidationWarning,
};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// One charge as it appears in the instruction CSV
///
/// Amounts are decimal strings (`"150.00"`); dates are ISO-8601. The
/// beneficiary account is not part of the row, it comes from the command line.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InstructionRow {
    /// Lote the charge goes into (CNAB240); defaults to 1
    #[serde(default)]
    pub lote: Option<u32>,
    pub document_number: String,
    pub our_number: String,
    pub due_date: NaiveDate,
    pub issue_date: NaiveDate,
    pub amount: String,
    #[serde(default)]
    pub movement: Option<u8>,
    pub payer_document: String,
    pub payer_name: String,
    #[serde(default)]
    pub payer_address: String,
    #[serde(default)]
    pub payer_neighborhood: String,
    #[serde(default)]
    pub payer_zip: String,
    #[serde(default)]
    pub payer_city: String,
    #[serde(default)]
    pub payer_state: String,
    /// Fine rate in percent (`"2.00"`)
    #[serde(default)]
    pub fine_percent: Option<String>,
    /// Day the fine starts to apply; defaults to the day after the due date
    #[serde(default)]
    pub fine_date: Option<NaiveDate>,
    /// Our-number check digit assigned by the bank
    #[serde(default)]
    pub our_number_dv: Option<String>,
    /// Barcode issued elsewhere (44 digits)
    #[serde(default)]
    pub barcode: Option<String>,
}

/// Parse a decimal amount into integer cents
///
/// # Errors
///
/// Returns an error message for non-numeric input or more than two decimal places.
pub fn parse_cents(amount: &str) -> Result<Cents, String> {
    let decimal = Decimal::from_str(amount.trim())
        .map_err(|_| format!("Invalid amount '{}'", amount))?;
    hundredths(decimal).ok_or_else(|| format!("Amount '{}' has more than two decimal places", amount))
}

fn hundredths(decimal: Decimal) -> Option<i64> {
    let scaled = decimal.checked_mul(Decimal::ONE_HUNDRED)?;
    if !scaled.fract().is_zero() {
        return None;
    }
    scaled.to_i64()
}

/// Format cents as a decimal amount with two places
pub fn format_cents(cents: u64) -> String {
    i64::try_from(cents)
        .map(|c| Decimal::new(c, 2).to_string())
        .unwrap_or_else(|_| cents.to_string())
}

/// Convert an InstructionRow to a lote number and a PaymentInstruction
///
/// # Arguments
///
/// * `row` - The deserialized CSV row
/// * `account` - Beneficiary account every charge is credited to
///
/// # Returns
///
/// Result containing either:
/// - Ok((lote, PaymentInstruction)) - Successfully converted row
/// - Err(String) - Error message describing the conversion failure
pub fn convert_instruction_row(
    row: InstructionRow,
    account: &BankAccount,
) -> Result<(u32, PaymentInstruction), String> {
    let value = parse_cents(&row.amount)
        .map_err(|e| format!("{} for document {}", e, row.document_number))?;

    let fine = match row.fine_percent.as_deref().map(str::trim) {
        Some(percent) if !percent.is_empty() => {
            let rate = Decimal::from_str(percent)
                .ok()
                .and_then(hundredths)
                .and_then(|r| u32::try_from(r).ok())
                .ok_or_else(|| {
                    format!(
                        "Invalid fine percent '{}' for document {}",
                        percent, row.document_number
                    )
                })?;
            Some(Fine {
                date: row
                    .fine_date
                    .or_else(|| row.due_date.succ_opt())
                    .unwrap_or(row.due_date),
                percent: rate,
            })
        }
        _ => None,
    };

    let instruction = PaymentInstruction {
        account: account.clone(),
        document_number: row.document_number,
        our_number: row.our_number,
        due_date: row.due_date,
        issue_date: row.issue_date,
        value,
        payer: Payer {
            document_kind: DocumentKind::infer(&row.payer_document),
            document: row.payer_document,
            name: row.payer_name,
            address: row.payer_address,
            neighborhood: row.payer_neighborhood,
            zip_code: row.payer_zip,
            city: row.payer_city,
            state: row.payer_state,
        },
        movement_code: row.movement.unwrap_or(movement::REGISTER),
        fine,
        our_number_dv: non_blank(row.our_number_dv),
        barcode: non_blank(row.barcode),
    };
    Ok((row.lote.unwrap_or(1), instruction))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Write payment-status events in CSV format
///
/// Columns: file, line, lote, occurrence_code, reason_codes, our_number,
/// document_number, value, due_date, paid_value, occurrence_date. Events are
/// written in the order given.
///
/// # Arguments
///
/// * `events` - Pairs of source file name and event
/// * `output` - Mutable reference to a writer for outputting CSV
pub fn write_events_csv<'a, I>(events: I, output: &mut dyn Write) -> Result<(), CnabError>
where
    I: IntoIterator<Item = (&'a str, &'a PaymentStatusEvent)>,
{
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "file",
        "line",
        "lote",
        "occurrence_code",
        "reason_codes",
        "our_number",
        "document_number",
        "value",
        "due_date",
        "paid_value",
        "occurrence_date",
    ])?;

    for (file, event) in events {
        writer.write_record(&[
            file.to_string(),
            event.line.to_string(),
            event.lote.to_string(),
            format!("{:02}", event.occurrence_code),
            event.reason_codes.clone(),
            event.our_number.clone(),
            event.document_number.clone(),
            format_cents(event.value),
            format_date(event.due_date),
            event.paid_value.map(format_cents).unwrap_or_default(),
            format_date(event.occurrence_date),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write validation warnings in CSV format
///
/// Columns: file, line, kind, message
pub fn write_warnings_csv<'a, I>(warnings: I, output: &mut dyn Write) -> Result<(), CnabError>
where
    I: IntoIterator<Item = (&'a str, &'a ValidationWarning)>,
{
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["file", "line", "kind", "message"])?;
    for (file, warning) in warnings {
        writer.write_record(&[
            file.to_string(),
            warning.line().to_string(),
            warning.kind().to_string(),
            warning.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write boletos in CSV format
///
/// Columns: document_number, our_number, due_date, value, barcode, digitable_line
pub fn write_boletos_csv<'a, I>(boletos: I, output: &mut dyn Write) -> Result<(), CnabError>
where
    I: IntoIterator<Item = (&'a PaymentInstruction, &'a Barcode)>,
{
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "document_number",
        "our_number",
        "due_date",
        "value",
        "barcode",
        "digitable_line",
    ])?;

    for (instruction, barcode) in boletos {
        writer.write_record(&[
            instruction.document_number.clone(),
            instruction.our_number.clone(),
            format_date(Some(instruction.due_date)),
            format_cents(u64::try_from(instruction.value).unwrap_or(0)),
            barcode.to_string(),
            barcode.digitable_line(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
