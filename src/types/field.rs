//! Typed value of a single fixed-width field

use chrono::NaiveDate;
use std::fmt;

/// A field value before formatting or after parsing
///
/// Numeric fields decode to [`FieldValue::Number`], alphanumeric fields to
/// [`FieldValue::Text`] and date fields to [`FieldValue::Date`] (`None` for an
/// all-zero date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Number(u64),
    Text(String),
    Date(Option<NaiveDate>),
}

impl FieldValue {
    /// The value as an integer, if it is a number or an all-digit text
    ///
    /// Text too large for a `u64` is not a number.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                match s.trim_start_matches('0') {
                    "" => Some(0),
                    significant => significant.parse().ok(),
                }
            }
            _ => None,
        }
    }

    /// The value as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a date, if it is a non-empty date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => *d,
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Date(None) => Ok(()),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(u64::from(value))
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Number(u64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<char> for FieldValue {
    fn from(value: char) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        FieldValue::Date(value)
    }
}
