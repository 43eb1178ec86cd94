//! Error types for the CNAB engine
//!
//! This module defines all error types that can occur while formatting fields,
//! building or reading records, sequencing files and composing barcodes.
//!
//! # Error Categories
//!
//! - **Field Errors**: overflow, wrong width, invalid characters, missing values.
//!   Fatal to the single record they occur in.
//! - **Structural Errors**: unknown or unexpected record types, segment order
//!   violations, truncated files. Fatal to the file being processed.
//! - **Barcode Errors**: malformed barcode input. Fatal, no barcode is emitted.
//! - **I/O Errors**: file access and CSV handling in the outer layers.
//!
//! Control-total disagreements are not errors; they are reported as
//! [`ValidationWarning`](crate::types::ValidationWarning)s attached to a
//! successful parse.

use thiserror::Error;

/// Main error type for the CNAB engine
///
/// Each variant carries enough context (line number, record name, field name)
/// to locate the problem in the file or in the input data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CnabError {
    /// A value does not fit in its fixed-width slot
    #[error("Value '{value}' overflows field '{field}' of {record} (width {width})")]
    FieldOverflow {
        /// Layout name of the record being built
        record: String,
        /// Field name
        field: String,
        /// Declared field width
        width: usize,
        /// The offending value
        value: String,
    },

    /// A slice handed to the codec does not have the declared width
    #[error("Field '{field}' expects {expected} characters, got {actual}")]
    FieldWidthMismatch {
        /// Field name
        field: String,
        /// Declared field width
        expected: usize,
        /// Width actually received
        actual: usize,
    },

    /// A character is not allowed by the field's charset
    #[error("Invalid character in field '{field}': '{value}'")]
    InvalidCharacter {
        /// Field name
        field: String,
        /// The offending value
        value: String,
    },

    /// A required field has no value and no default
    #[error("Missing required field '{field}' in {record}")]
    MissingField {
        /// Layout name of the record being built
        record: String,
        /// Field name
        field: String,
    },

    /// A value was supplied for a field the layout does not declare
    #[error("Unknown field '{field}' for {record}")]
    UnknownField {
        /// Layout name of the record being built
        record: String,
        /// Field name
        field: String,
    },

    /// A line does not have the layout's declared width
    ///
    /// Raised when reading truncated or padded lines; on write it is an
    /// internal consistency check that well-formed layouts never trip.
    #[error("Record {record} has {actual} characters, expected {expected}")]
    RecordLengthMismatch {
        /// Layout name
        record: String,
        /// Declared record width
        expected: usize,
        /// Actual line width
        actual: usize,
    },

    /// No layout matches the record-type discriminator of a line
    #[error("Unknown record type '{discriminator}' at line {line}")]
    UnknownRecordType {
        /// 1-based line number
        line: usize,
        /// The discriminator found in the line
        discriminator: String,
    },

    /// A record kind is not allowed in the current file state
    #[error("Unexpected {found} at line {line} (state: {state})")]
    UnexpectedRecordType {
        /// 1-based line number
        line: usize,
        /// Record kind encountered
        found: String,
        /// State the writer or parser was in
        state: String,
    },

    /// Detail segments are not in the bank's declared order
    #[error("Segment order violation at line {line}: found segment {found}, expected {expected}")]
    SegmentOrderViolation {
        /// 1-based line number
        line: usize,
        /// Segment code encountered
        found: char,
        /// Description of the segments allowed at that point
        expected: String,
    },

    /// The input ended before the file trailer
    #[error("Unexpected end of file after line {line}")]
    UnexpectedEndOfFile {
        /// Last line read
        line: usize,
    },

    /// The bank has no layout for the requested format
    #[error("{bank} does not support {format}")]
    UnsupportedLayout {
        /// Bank name
        bank: String,
        /// Format name
        format: String,
    },

    /// A barcode input does not fit or is out of range
    #[error("Barcode field '{field}' is invalid: '{value}' (width {width})")]
    BarcodeFieldOverflow {
        /// Barcode part name
        field: String,
        /// Declared width of the part
        width: usize,
        /// The offending value
        value: String,
    },

    /// A pre-computed barcode or digitable line is malformed
    #[error("Invalid barcode '{code}': {reason}")]
    InvalidBarcode {
        /// The input as received
        code: String,
        /// What is wrong with it
        reason: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV input could not be parsed
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for CnabError {
    fn from(error: std::io::Error) -> Self {
        CnabError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CnabError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        CnabError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CnabError {
    /// Create a FieldOverflow error
    pub fn field_overflow(record: &str, field: &str, width: usize, value: &str) -> Self {
        CnabError::FieldOverflow {
            record: record.to_string(),
            field: field.to_string(),
            width,
            value: value.to_string(),
        }
    }

    /// Create a FieldWidthMismatch error
    pub fn field_width_mismatch(field: &str, expected: usize, actual: usize) -> Self {
        CnabError::FieldWidthMismatch {
            field: field.to_string(),
            expected,
            actual,
        }
    }

    /// Create an InvalidCharacter error
    pub fn invalid_character(field: &str, value: &str) -> Self {
        CnabError::InvalidCharacter {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(record: &str, field: &str) -> Self {
        CnabError::MissingField {
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an UnknownField error
    pub fn unknown_field(record: &str, field: &str) -> Self {
        CnabError::UnknownField {
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an UnknownRecordType error
    pub fn unknown_record_type(line: usize, discriminator: &str) -> Self {
        CnabError::UnknownRecordType {
            line,
            discriminator: discriminator.to_string(),
        }
    }

    /// Create an UnexpectedRecordType error
    pub fn unexpected_record_type(line: usize, found: &str, state: &str) -> Self {
        CnabError::UnexpectedRecordType {
            line,
            found: found.to_string(),
            state: state.to_string(),
        }
    }

    /// Create a SegmentOrderViolation error
    pub fn segment_order_violation(line: usize, found: char, expected: &str) -> Self {
        CnabError::SegmentOrderViolation {
            line,
            found,
            expected: expected.to_string(),
        }
    }

    /// Create a BarcodeFieldOverflow error
    pub fn barcode_field_overflow(field: &str, width: usize, value: &str) -> Self {
        CnabError::BarcodeFieldOverflow {
            field: field.to_string(),
            width,
            value: value.to_string(),
        }
    }

    /// Create an InvalidBarcode error
    pub fn invalid_barcode(code: &str, reason: &str) -> Self {
        CnabError::InvalidBarcode {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Attach the record name to a field error raised by the codec
    pub fn in_record(self, name: &str) -> Self {
        match self {
            CnabError::FieldOverflow {
                field,
                width,
                value,
                ..
            } => CnabError::FieldOverflow {
                record: name.to_string(),
                field,
                width,
                value,
            },
            other => other,
        }
    }

    /// Whether the error only invalidates the record it occurred in
    ///
    /// Record-scoped errors let a batch writer skip the instruction and a
    /// parser reject the line while the rest of the file is still processed.
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            CnabError::FieldOverflow { .. }
                | CnabError::FieldWidthMismatch { .. }
                | CnabError::InvalidCharacter { .. }
                | CnabError::MissingField { .. }
                | CnabError::RecordLengthMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::field_overflow(
        CnabError::field_overflow("cnab240.segment_p", "value", 15, "1234567890123456"),
        "Value '1234567890123456' overflows field 'value' of cnab240.segment_p (width 15)"
    )]
    #[case::field_width_mismatch(
        CnabError::field_width_mismatch("agency", 5, 4),
        "Field 'agency' expects 5 characters, got 4"
    )]
    #[case::missing_field(
        CnabError::missing_field("cnab400.detail", "our_number"),
        "Missing required field 'our_number' in cnab400.detail"
    )]
    #[case::unknown_record_type(
        CnabError::unknown_record_type(7, "4"),
        "Unknown record type '4' at line 7"
    )]
    #[case::unexpected_record_type(
        CnabError::unexpected_record_type(2, "detail", "file header"),
        "Unexpected detail at line 2 (state: file header)"
    )]
    #[case::segment_order_violation(
        CnabError::segment_order_violation(4, 'Q', "P"),
        "Segment order violation at line 4: found segment Q, expected P"
    )]
    #[case::unexpected_end_of_file(
        CnabError::UnexpectedEndOfFile { line: 12 },
        "Unexpected end of file after line 12"
    )]
    #[case::barcode_field_overflow(
        CnabError::barcode_field_overflow("our_number", 11, "123456789012"),
        "Barcode field 'our_number' is invalid: '123456789012' (width 11)"
    )]
    #[case::parse_error_with_line(
        CnabError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        CnabError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: CnabError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::overflow(CnabError::field_overflow("r", "f", 1, "12"), true)]
    #[case::width(CnabError::field_width_mismatch("f", 2, 1), true)]
    #[case::charset(CnabError::invalid_character("f", "#"), true)]
    #[case::missing(CnabError::missing_field("r", "f"), true)]
    #[case::length(CnabError::RecordLengthMismatch { record: "r".into(), expected: 240, actual: 239 }, true)]
    #[case::unexpected(CnabError::unexpected_record_type(1, "detail", "start"), false)]
    #[case::order(CnabError::segment_order_violation(1, 'R', "P"), false)]
    fn test_record_scoped(#[case] error: CnabError, #[case] expected: bool) {
        assert_eq!(error.is_record_scoped(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: CnabError = io_error.into();
        assert!(matches!(error, CnabError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
