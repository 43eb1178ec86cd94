//! Fixed-width field codec
//!
//! Formats a typed [`FieldValue`] into its fixed-width slot and parses a slot
//! back. All padding, upper-casing and transliteration happen here, at format
//! time, and nowhere else.
//!
//! # Rules
//!
//! - Numeric: right-aligned, zero-padded on the left. Leading zeros are not
//!   significant, so `"00042"` and `42` format identically. Wider values fail
//!   with `FieldOverflow`.
//! - Alphanumeric: left-aligned, space-padded on the right, upper-cased,
//!   accents transliterated, truncated to width. Characters outside the CNAB
//!   charset become spaces, or fail with `InvalidCharacter` under
//!   [`CharsetPolicy::Strict`].
//! - Date: `ddmmyy` or `ddmmyyyy`; an absent date is written as zeros.
//!   Two-digit years read 00-69 as 20xx and 70-99 as 19xx, so `ddmmyy`
//!   fields only accept dates from 1970 to 2069.
//! - Filler: always blank.
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{CnabError, FieldValue};
use chrono::{Datelike, NaiveDate};

/// Date pattern of a date field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `ddmmyy`, used by CNAB400
    DdMmYy,
    /// `ddmmyyyy`, used by CNAB240
    DdMmYyyy,
}

impl DateFormat {
    /// Width of the formatted date
    pub const fn width(&self) -> usize {
        match self {
            DateFormat::DdMmYy => 6,
            DateFormat::DdMmYyyy => 8,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            DateFormat::DdMmYy => "%d%m%y",
            DateFormat::DdMmYyyy => "%d%m%Y",
        }
    }

    /// Whether the date reads back unchanged
    pub fn fits(&self, date: NaiveDate) -> bool {
        match self {
            DateFormat::DdMmYy => TWO_DIGIT_YEARS.contains(&date.year()),
            DateFormat::DdMmYyyy => (0..=9999).contains(&date.year()),
        }
    }
}

/// Years a two-digit year field reads back as
pub const TWO_DIGIT_YEARS: std::ops::RangeInclusive<i32> = 1970..=2069;

/// Kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Alphanumeric,
    Date(DateFormat),
    Filler,
}

/// How a value is placed in its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Right-aligned, zero-padded on the left
    ZeroPadLeft,
    /// Left-aligned, space-padded on the right
    SpacePadRight,
}

/// Treatment of characters outside the CNAB charset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharsetPolicy {
    /// Transliterate accents, replace anything else with a space
    #[default]
    Transliterate,
    /// Reject any character outside the charset
    Strict,
}

/// Shape of one field in a record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
    pub required: bool,
    /// Value used when the builder is given none
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn numeric(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Numeric,
            required: false,
            default: None,
        }
    }

    pub const fn alpha(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Alphanumeric,
            required: false,
            default: None,
        }
    }

    pub const fn date(name: &'static str, format: DateFormat) -> Self {
        FieldSpec {
            name,
            width: format.width(),
            kind: FieldKind::Date(format),
            required: false,
            default: None,
        }
    }

    pub const fn filler(width: usize) -> Self {
        FieldSpec {
            name: "filler",
            width,
            kind: FieldKind::Filler,
            required: false,
            default: None,
        }
    }

    /// Numeric field that is always zero
    pub const fn zeros(name: &'static str, width: usize) -> Self {
        FieldSpec::numeric(name, width).with_default("0")
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn alignment(&self) -> Alignment {
        match self.kind {
            FieldKind::Numeric | FieldKind::Date(_) => Alignment::ZeroPadLeft,
            FieldKind::Alphanumeric | FieldKind::Filler => Alignment::SpacePadRight,
        }
    }

    pub fn is_filler(&self) -> bool {
        self.kind == FieldKind::Filler
    }
}

const ALLOWED_PUNCTUATION: &str = " .,-/&()@:;+*%'";

/// Content of a field with no value: zeros for numbers and dates, spaces otherwise
pub fn blank(spec: &FieldSpec) -> String {
    match spec.alignment() {
        Alignment::ZeroPadLeft => "0".repeat(spec.width),
        Alignment::SpacePadRight => " ".repeat(spec.width),
    }
}

/// Format a value into its fixed-width slot
///
/// # Errors
///
/// - `FieldOverflow` if a numeric value has more significant digits than the width
/// - `InvalidCharacter` for non-digits in numeric/date fields, a value of the
///   wrong type, or (strict policy) characters outside the charset
///
/// The `record` of a returned `FieldOverflow` is left empty; the record
/// builder fills it in.
pub fn format(
    value: &FieldValue,
    spec: &FieldSpec,
    policy: CharsetPolicy,
) -> Result<String, CnabError> {
    match spec.kind {
        FieldKind::Filler => Ok(blank(spec)),
        FieldKind::Numeric => format_numeric(value, spec),
        FieldKind::Alphanumeric => format_alpha(value, spec, policy),
        FieldKind::Date(date_format) => format_date(value, spec, date_format),
    }
}

fn format_numeric(value: &FieldValue, spec: &FieldSpec) -> Result<String, CnabError> {
    let digits = match value {
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(text) => {
            let text = text.trim();
            if !text.chars().all(|c| c.is_ascii_digit()) {
                return Err(CnabError::invalid_character(spec.name, text));
            }
            let significant = text.trim_start_matches('0');
            if significant.is_empty() {
                "0".to_string()
            } else {
                significant.to_string()
            }
        }
        FieldValue::Date(_) => {
            return Err(CnabError::invalid_character(spec.name, &value.to_string()))
        }
    };

    if digits.len() > spec.width {
        return Err(CnabError::field_overflow("", spec.name, spec.width, &digits));
    }

    Ok(format!("{:0>width$}", digits, width = spec.width))
}

fn format_alpha(
    value: &FieldValue,
    spec: &FieldSpec,
    policy: CharsetPolicy,
) -> Result<String, CnabError> {
    let text = match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Number(n) => {
            let digits = n.to_string();
            if digits.len() > spec.width {
                return Err(CnabError::field_overflow("", spec.name, spec.width, &digits));
            }
            digits
        }
        FieldValue::Date(_) => {
            return Err(CnabError::invalid_character(spec.name, &value.to_string()))
        }
    };

    let mut out = String::with_capacity(spec.width);
    for c in text.chars().take(spec.width) {
        out.push(normalize_char(c, spec, policy, &text)?);
    }
    while out.len() < spec.width {
        out.push(' ');
    }
    Ok(out)
}

fn normalize_char(
    c: char,
    spec: &FieldSpec,
    policy: CharsetPolicy,
    text: &str,
) -> Result<char, CnabError> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() || upper.is_ascii_digit() || ALLOWED_PUNCTUATION.contains(upper)
    {
        return Ok(upper);
    }
    match policy {
        CharsetPolicy::Strict => Err(CnabError::invalid_character(spec.name, text)),
        CharsetPolicy::Transliterate => Ok(transliterate(c).unwrap_or(' ')),
    }
}

fn transliterate(c: char) -> Option<char> {
    let mapped = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'ª' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'º' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' | 'Ç' => 'C',
        'ñ' | 'Ñ' => 'N',
        'ý' | 'ÿ' | 'Ý' => 'Y',
        _ => return None,
    };
    Some(mapped)
}

fn format_date(
    value: &FieldValue,
    spec: &FieldSpec,
    date_format: DateFormat,
) -> Result<String, CnabError> {
    match value {
        FieldValue::Date(Some(date)) if date_format.fits(*date) => {
            Ok(date.format(date_format.pattern()).to_string())
        }
        FieldValue::Date(Some(date)) => Err(CnabError::field_overflow(
            "",
            spec.name,
            spec.width,
            &date.format("%Y-%m-%d").to_string(),
        )),
        FieldValue::Date(None) => Ok(blank(spec)),
        // Already formatted, or an explicit zero date
        FieldValue::Text(text)
            if text.len() == spec.width
                && (text.chars().all(|c| c == '0')
                    || NaiveDate::parse_from_str(text, date_format.pattern()).is_ok()) =>
        {
            Ok(text.clone())
        }
        FieldValue::Number(0) => Ok(blank(spec)),
        other => Err(CnabError::invalid_character(spec.name, &other.to_string())),
    }
}

/// Parse a fixed-width slice back into a value
///
/// # Errors
///
/// - `FieldWidthMismatch` if the slice is not exactly `spec.width` characters
/// - `InvalidCharacter` for non-digits in a numeric field or an invalid date
/// - `FieldOverflow` for a numeric value beyond `u64`
pub fn parse(text: &str, spec: &FieldSpec) -> Result<FieldValue, CnabError> {
    let actual = text.chars().count();
    if actual != spec.width {
        return Err(CnabError::field_width_mismatch(spec.name, spec.width, actual));
    }

    match spec.kind {
        FieldKind::Numeric => parse_numeric(text, spec),
        FieldKind::Alphanumeric | FieldKind::Filler => {
            Ok(FieldValue::Text(text.trim_end().to_string()))
        }
        FieldKind::Date(date_format) => parse_date(text, spec, date_format),
    }
}

fn parse_numeric(text: &str, spec: &FieldSpec) -> Result<FieldValue, CnabError> {
    // Some banks leave unused numeric fields blank
    if text.trim().is_empty() {
        return Ok(FieldValue::Number(0));
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(CnabError::invalid_character(spec.name, text));
    }
    let significant = text.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(FieldValue::Number(0));
    }
    significant
        .parse::<u64>()
        .map(FieldValue::Number)
        .map_err(|_| CnabError::field_overflow("", spec.name, spec.width, text))
}

fn parse_date(
    text: &str,
    spec: &FieldSpec,
    date_format: DateFormat,
) -> Result<FieldValue, CnabError> {
    if text.trim().is_empty() || text.chars().all(|c| c == '0') {
        return Ok(FieldValue::Date(None));
    }
    NaiveDate::parse_from_str(text, date_format.pattern())
        .map(|date| FieldValue::Date(Some(date)))
        .map_err(|_| CnabError::invalid_character(spec.name, text))
}
