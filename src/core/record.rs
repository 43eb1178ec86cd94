//! Building and reading fixed-width records
//!
//! [`RecordBuilder`] turns named values into one line of a [`RecordLayout`];
//! [`decode`] turns a line back into named, typed values. Neither knows
//! anything about file structure: that belongs to the writer, the parser and
//! the [`SegmentSequencer`](crate::core::sequencer::SegmentSequencer).

use crate::core::field_codec::{self, CharsetPolicy};
use crate::core::layout::{cnab240, cnab400, RecordKind, RecordLayout};
use crate::types::{CnabError, CnabFormat, FieldValue};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Builds one fixed-width line from named values
///
/// Fields left unset take the layout default, or blank (zeros / spaces).
/// Unset required fields without a default fail with `MissingField`.
///
/// # Example
///
/// ```
/// use rust_cnab_engine::core::layout::cnab240;
/// use rust_cnab_engine::core::record::RecordBuilder;
///
/// let line = RecordBuilder::new(&cnab240::FILE_TRAILER)
///     .set("bank_code", 237u64)?
///     .set("lote_count", 1u64)?
///     .set("record_count", 6u64)?
///     .build()?;
/// assert_eq!(line.len(), 240);
/// assert!(line.starts_with("23799999"));
/// # Ok::<(), rust_cnab_engine::types::CnabError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    layout: &'static RecordLayout,
    values: HashMap<&'static str, FieldValue>,
    policy: CharsetPolicy,
}

impl RecordBuilder {
    pub fn new(layout: &'static RecordLayout) -> Self {
        RecordBuilder {
            layout,
            values: HashMap::new(),
            policy: CharsetPolicy::default(),
        }
    }

    /// Use a different charset policy for alphanumeric fields
    pub fn with_charset(mut self, policy: CharsetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set a field value
    ///
    /// # Errors
    ///
    /// `UnknownField` if the layout has no field of that name.
    pub fn set(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self, CnabError> {
        let spec = self
            .layout
            .field(name)
            .ok_or_else(|| CnabError::unknown_field(self.layout.name, name))?;
        self.values.insert(spec.name, value.into());
        Ok(self)
    }

    /// Set several fields at once
    pub fn set_all<I, V>(mut self, values: I) -> Result<Self, CnabError>
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<FieldValue>,
    {
        for (name, value) in values {
            self = self.set(name, value)?;
        }
        Ok(self)
    }

    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    /// Value currently set for a field
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Produce the line
    ///
    /// # Errors
    ///
    /// - `MissingField` for an unset required field without default
    /// - Field codec errors (`FieldOverflow`, `InvalidCharacter`), tagged with the record name
    /// - `RecordLengthMismatch` if the line does not have the layout's width
    pub fn build(&self) -> Result<String, CnabError> {
        let layout = self.layout;
        let mut line = String::with_capacity(layout.width());

        for spec in layout.fields {
            if spec.is_filler() {
                line.push_str(&field_codec::blank(spec));
                continue;
            }
            let text = match (self.values.get(spec.name), spec.default) {
                (Some(value), _) => field_codec::format(value, spec, self.policy),
                (None, Some(default)) => {
                    field_codec::format(&FieldValue::from(default), spec, self.policy)
                }
                (None, None) if spec.required => {
                    return Err(CnabError::missing_field(layout.name, spec.name))
                }
                (None, None) => Ok(field_codec::blank(spec)),
            }
            .map_err(|e| e.in_record(layout.name))?;
            line.push_str(&text);
        }

        let actual = line.chars().count();
        if actual != layout.width() {
            return Err(CnabError::RecordLengthMismatch {
                record: layout.name.to_string(),
                expected: layout.width(),
                actual,
            });
        }
        Ok(line)
    }
}

/// A line decoded against its layout
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub layout: &'static RecordLayout,
    /// 1-based line number in the file
    pub line: usize,
    /// Non-filler fields in layout order
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl DecodedRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Numeric value of a field, 0 when absent
    pub fn number(&self, name: &str) -> u64 {
        self.get(name).and_then(FieldValue::as_number).unwrap_or(0)
    }

    /// Text of a field, trimmed, empty when absent
    pub fn text(&self, name: &str) -> String {
        self.get(name)
            .map(|value| value.to_string().trim().to_string())
            .unwrap_or_default()
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(FieldValue::as_date)
    }
}

/// Decode a line against a layout
///
/// `chars` must hold exactly `layout.width()` characters.
///
/// # Errors
///
/// - `RecordLengthMismatch` if the line has the wrong width
/// - Field codec errors (`InvalidCharacter`, `FieldOverflow`), tagged with the record name
pub fn decode(
    layout: &'static RecordLayout,
    line: usize,
    chars: &[char],
) -> Result<DecodedRecord, CnabError> {
    if chars.len() != layout.width() {
        return Err(CnabError::RecordLengthMismatch {
            record: layout.name.to_string(),
            expected: layout.width(),
            actual: chars.len(),
        });
    }

    let mut fields = Vec::with_capacity(layout.fields.len());
    let mut offset = 0;
    for spec in layout.fields {
        let end = offset + spec.width;
        if !spec.is_filler() {
            let slice: String = chars[offset..end].iter().collect();
            let value = field_codec::parse(&slice, spec).map_err(|e| e.in_record(layout.name))?;
            fields.push((spec.name, value));
        }
        offset = end;
    }

    Ok(DecodedRecord {
        layout,
        line,
        fields,
    })
}

/// Kind and segment code of a raw line, read from the discriminator positions
///
/// # Errors
///
/// `UnknownRecordType` if the discriminator matches no record kind of the
/// format, or a CNAB240 detail has no segment code.
pub fn classify(
    format: CnabFormat,
    line: usize,
    chars: &[char],
) -> Result<(RecordKind, Option<char>), CnabError> {
    let offset = match format {
        CnabFormat::Cnab240 => cnab240::RECORD_TYPE_OFFSET,
        CnabFormat::Cnab400 => 0,
    };
    let discriminator = chars.get(offset).copied().unwrap_or(' ');
    let kind = RecordKind::from_discriminator(format, discriminator)
        .ok_or_else(|| CnabError::unknown_record_type(line, &discriminator.to_string()))?;

    if format == CnabFormat::Cnab240 && kind == RecordKind::Detail {
        let segment = chars
            .get(cnab240::SEGMENT_OFFSET)
            .copied()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(|| CnabError::unknown_record_type(line, &discriminator.to_string()))?;
        return Ok((kind, Some(segment.to_ascii_uppercase())));
    }
    Ok((kind, None))
}

/// Direction code of a file header line, if it carries a valid one
pub fn header_direction(format: CnabFormat, chars: &[char]) -> Option<char> {
    let offset = match format {
        CnabFormat::Cnab240 => cnab240::FILE_HEADER.offset_of("direction_code")?,
        CnabFormat::Cnab400 => cnab400::DIRECTION_OFFSET,
    };
    chars.get(offset).copied()
}

/// Split raw file bytes into lines of characters
///
/// Bytes are read as Latin-1, so every byte is one character and accented
/// text from legacy systems survives. `\r\n` and `\n` both end a line; a
/// trailing empty line is dropped.
pub fn split_lines(bytes: &[u8]) -> Vec<Vec<char>> {
    let mut lines: Vec<Vec<char>> = bytes
        .split(|&b| b == b'\n')
        .map(|raw| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            raw.iter().map(|&b| char::from(b)).collect()
        })
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}
