//! Retorno output: payment-status events and validation warnings

use crate::core::record::DecodedRecord;
use crate::types::{CnabError, FieldValue};
use chrono::NaiveDate;
use std::fmt;

/// Status of one charge as reported by a parsed file
///
/// Built from a detail group (one CNAB400 detail line, or a CNAB240 run of
/// segments such as T+U or P+Q+R). Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStatusEvent {
    /// Line of the first record of the group
    pub line: usize,

    /// Lote the group belongs to (1 for CNAB400)
    pub lote: u32,

    /// Every decoded record of the group, in file order
    pub records: Vec<DecodedRecord>,

    /// Occurrence / movement code
    pub occurrence_code: u64,

    /// Reason codes attached to the occurrence, as printed by the bank
    pub reason_codes: String,

    /// Our-number without check digit and without leading zeros
    pub our_number: String,

    /// Caller's document number
    pub document_number: String,

    /// Face value in cents
    pub value: u64,

    /// Due date, if present
    pub due_date: Option<NaiveDate>,

    /// Amount actually paid in cents (retorno only)
    pub paid_value: Option<u64>,

    /// Date of the occurrence (retorno only)
    pub occurrence_date: Option<NaiveDate>,
}

impl PaymentStatusEvent {
    /// Look up a decoded field by name across the group's records
    ///
    /// Records are searched in file order; the first match wins.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.records.iter().find_map(|record| record.get(name))
    }

    /// Layout name of the record that opened the group
    pub fn record_type(&self) -> &'static str {
        self.records
            .first()
            .map(|record| record.layout.name)
            .unwrap_or_default()
    }
}

/// Non-fatal finding attached to a successful parse
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// A trailer's declared count or total disagrees with what was read
    ControlTotalMismatch {
        line: usize,
        record: String,
        field: String,
        declared: u64,
        computed: u64,
    },

    /// A lote number or sequence number is not the one expected
    SequenceMismatch {
        line: usize,
        field: String,
        expected: u64,
        found: u64,
    },

    /// A record failed to decode and was skipped
    RecordRejected { line: usize, error: CnabError },
}

impl ValidationWarning {
    /// Short machine-readable name of the warning
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationWarning::ControlTotalMismatch { .. } => "control_total_mismatch",
            ValidationWarning::SequenceMismatch { .. } => "sequence_mismatch",
            ValidationWarning::RecordRejected { .. } => "record_rejected",
        }
    }

    /// Line the warning refers to
    pub fn line(&self) -> usize {
        match self {
            ValidationWarning::ControlTotalMismatch { line, .. }
            | ValidationWarning::SequenceMismatch { line, .. }
            | ValidationWarning::RecordRejected { line, .. } => *line,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::ControlTotalMismatch {
                line,
                record,
                field,
                declared,
                computed,
            } => write!(
                f,
                "Control total mismatch at line {} ({}.{}): declared {}, computed {}",
                line, record, field, declared, computed
            ),
            ValidationWarning::SequenceMismatch {
                line,
                field,
                expected,
                found,
            } => write!(
                f,
                "Sequence mismatch at line {} ({}): expected {}, found {}",
                line, field, expected, found
            ),
            ValidationWarning::RecordRejected { line, error } => {
                write!(f, "Record rejected at line {}: {}", line, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::control_total(
        ValidationWarning::ControlTotalMismatch {
            line: 9,
            record: "cnab240.lote_trailer".to_string(),
            field: "total_value".to_string(),
            declared: 100,
            computed: 90,
        },
        "Control total mismatch at line 9 (cnab240.lote_trailer.total_value): declared 100, computed 90"
    )]
    #[case::sequence(
        ValidationWarning::SequenceMismatch {
            line: 3,
            field: "sequence".to_string(),
            expected: 2,
            found: 5,
        },
        "Sequence mismatch at line 3 (sequence): expected 2, found 5"
    )]
    fn test_warning_display(#[case] warning: ValidationWarning, #[case] expected: &str) {
        assert_eq!(warning.to_string(), expected);
    }

    #[test]
    fn test_warning_line() {
        let warning = ValidationWarning::RecordRejected {
            line: 4,
            error: CnabError::field_width_mismatch("line", 240, 239),
        };
        assert_eq!(warning.line(), 4);
        assert_eq!(warning.kind(), "record_rejected");
    }
}
