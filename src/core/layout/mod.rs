//! Record layouts
//!
//! Static, ordered field tables for every record a supported bank/format
//! pair reads or writes. Tables are data: adding a bank whose layout follows
//! FEBRABAN 240 needs no new table, only a [`BankRules`](crate::core::bank_rules::BankRules)
//! entry.
//!
//! - `cnab240` - FEBRABAN 240 tables shared by every bank
//! - `cnab400` - Bradesco 400 tables

pub mod cnab240;
pub mod cnab400;

use crate::core::field_codec::FieldSpec;
use crate::types::{Bank, CnabError, CnabFormat, Direction};
use std::fmt;

/// Position of a record in the file hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    FileHeader,
    LoteHeader,
    Detail,
    LoteTrailer,
    FileTrailer,
}

impl RecordKind {
    /// Record-type discriminator of the kind in a given format
    ///
    /// CNAB400 has no lote records.
    pub fn discriminator(&self, format: CnabFormat) -> Option<char> {
        match (format, self) {
            (CnabFormat::Cnab240, RecordKind::FileHeader) => Some('0'),
            (CnabFormat::Cnab240, RecordKind::LoteHeader) => Some('1'),
            (CnabFormat::Cnab240, RecordKind::Detail) => Some('3'),
            (CnabFormat::Cnab240, RecordKind::LoteTrailer) => Some('5'),
            (CnabFormat::Cnab240, RecordKind::FileTrailer) => Some('9'),
            (CnabFormat::Cnab400, RecordKind::FileHeader) => Some('0'),
            (CnabFormat::Cnab400, RecordKind::Detail) => Some('1'),
            (CnabFormat::Cnab400, RecordKind::FileTrailer) => Some('9'),
            (CnabFormat::Cnab400, _) => None,
        }
    }

    /// Inverse of [`RecordKind::discriminator`]
    pub fn from_discriminator(format: CnabFormat, discriminator: char) -> Option<RecordKind> {
        [
            RecordKind::FileHeader,
            RecordKind::LoteHeader,
            RecordKind::Detail,
            RecordKind::LoteTrailer,
            RecordKind::FileTrailer,
        ]
        .into_iter()
        .find(|kind| kind.discriminator(format) == Some(discriminator))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::FileHeader => "file header",
            RecordKind::LoteHeader => "lote header",
            RecordKind::Detail => "detail",
            RecordKind::LoteTrailer => "lote trailer",
            RecordKind::FileTrailer => "file trailer",
        };
        write!(f, "{}", name)
    }
}

/// Ordered field table of one record type
#[derive(Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Unique name, e.g. `cnab240.segment_p`
    pub name: &'static str,
    pub format: CnabFormat,
    pub kind: RecordKind,
    /// Segment code of a CNAB240 detail
    pub segment: Option<char>,
    pub fields: &'static [FieldSpec],
    /// Field summed into the trailer's value total, if any
    pub value_field: Option<&'static str>,
}

impl RecordLayout {
    /// Sum of field widths
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Field by name (fillers are never found)
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields
            .iter()
            .find(|f| !f.is_filler() && f.name == name)
    }

    /// 0-based character offset of a field
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in self.fields {
            if !field.is_filler() && field.name == name {
                return Some(offset);
            }
            offset += field.width;
        }
        None
    }
}

/// Order of the segments that make up one CNAB240 detail group
///
/// Required segments come first, in order; optional ones may follow, in
/// order, each at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOrder {
    pub required: &'static [char],
    pub optional: &'static [char],
}

impl SegmentOrder {
    /// Segments allowed after `so_far` within the same group
    pub fn allowed_next(&self, so_far: &[char]) -> &'static [char] {
        let (required, optional) = (self.required, self.optional);
        if so_far.len() < required.len() {
            return &required[so_far.len()..=so_far.len()];
        }
        let start = match so_far[required.len()..].last() {
            Some(last) => optional
                .iter()
                .position(|c| c == last)
                .map(|p| p + 1)
                .unwrap_or(optional.len()),
            None => 0,
        };
        &optional[start..]
    }

    /// Whether `so_far` holds every required segment
    pub fn is_complete(&self, so_far: &[char]) -> bool {
        so_far.len() >= self.required.len()
    }

    /// Whether `segment` opens a new group
    pub fn starts_group(&self, segment: char) -> bool {
        self.required.first() == Some(&segment)
    }

    /// Check a complete group
    ///
    /// Returns the index of the first misplaced segment, what was found and a
    /// description of what was expected.
    pub fn validate(&self, segments: &[char]) -> Result<(), (usize, char, String)> {
        for (index, &segment) in segments.iter().enumerate() {
            let allowed = self.allowed_next(&segments[..index]);
            if !allowed.contains(&segment) {
                return Err((index, segment, describe(allowed)));
            }
        }
        if !self.is_complete(segments) {
            let missing = self.allowed_next(segments);
            return Err((segments.len(), ' ', describe(missing)));
        }
        Ok(())
    }
}

/// Human-readable list of allowed segments
pub fn describe(allowed: &[char]) -> String {
    if allowed.is_empty() {
        return "end of group".to_string();
    }
    allowed
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Look up the layout of a record
///
/// # Errors
///
/// `UnsupportedLayout` if the bank has no layout for the format.
///
/// # Returns
///
/// `Ok(None)` when the format has no record of that kind/segment.
pub fn layout(
    bank: Bank,
    format: CnabFormat,
    direction: Direction,
    kind: RecordKind,
    segment: Option<char>,
) -> Result<Option<&'static RecordLayout>, CnabError> {
    ensure_supported(bank, format)?;
    Ok(match format {
        CnabFormat::Cnab240 => cnab240::layout(kind, segment),
        CnabFormat::Cnab400 => cnab400::layout(direction, kind),
    })
}

/// Segment order of detail groups, `None` for single-record formats
pub fn segment_order(format: CnabFormat, direction: Direction) -> Option<SegmentOrder> {
    match format {
        CnabFormat::Cnab240 => Some(cnab240::segment_order(direction)),
        CnabFormat::Cnab400 => None,
    }
}

/// Fail with `UnsupportedLayout` unless the bank supports the format
pub fn ensure_supported(bank: Bank, format: CnabFormat) -> Result<(), CnabError> {
    if bank.supports(format) {
        Ok(())
    } else {
        Err(CnabError::UnsupportedLayout {
            bank: bank.name().to_string(),
            format: format.to_string(),
        })
    }
}

/// Every layout, for consistency checks
pub fn all_layouts() -> impl Iterator<Item = &'static RecordLayout> {
    cnab240::LAYOUTS
        .iter()
        .chain(cnab400::LAYOUTS.iter())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_every_layout_fills_the_record_width() {
        for layout in all_layouts() {
            assert_eq!(
                layout.width(),
                layout.format.record_width(),
                "{} has width {}",
                layout.name,
                layout.width()
            );
        }
    }

    #[test]
    fn test_field_names_are_unique() {
        for layout in all_layouts() {
            let mut seen = HashSet::new();
            for field in layout.fields.iter().filter(|f| !f.is_filler()) {
                assert!(seen.insert(field.name), "{} repeats {}", layout.name, field.name);
            }
        }
    }

    #[test]
    fn test_value_field_exists() {
        for layout in all_layouts() {
            if let Some(name) = layout.value_field {
                assert!(layout.field(name).is_some(), "{} lacks {}", layout.name, name);
            }
        }
    }

    #[test]
    fn test_discriminator_positions() {
        for layout in cnab240::LAYOUTS {
            assert_eq!(layout.offset_of("record_type"), Some(7), "{}", layout.name);
            if layout.segment.is_some() {
                assert_eq!(layout.offset_of("segment"), Some(13), "{}", layout.name);
            }
        }
        for layout in cnab400::LAYOUTS {
            assert_eq!(layout.offset_of("record_type"), Some(0), "{}", layout.name);
        }
        assert_eq!(cnab240::FILE_HEADER.offset_of("direction_code"), Some(142));
        assert_eq!(cnab400::REMESSA_HEADER.offset_of("direction_code"), Some(1));
        assert_eq!(cnab400::RETORNO_HEADER.offset_of("direction_code"), Some(1));
    }

    #[test]
    fn test_unsupported_layout() {
        let result = layout(
            Bank::Itau,
            CnabFormat::Cnab400,
            Direction::Remessa,
            RecordKind::Detail,
            None,
        );
        assert!(matches!(result, Err(CnabError::UnsupportedLayout { .. })));
    }

    #[rstest]
    #[case(&[], &['P'])]
    #[case(&['P'], &['Q'])]
    #[case(&['P', 'Q'], &['R'])]
    #[case(&['P', 'Q', 'R'], &[])]
    fn test_allowed_next(#[case] so_far: &[char], #[case] expected: &[char]) {
        let order = cnab240::segment_order(Direction::Remessa);
        assert_eq!(order.allowed_next(so_far), expected);
    }

    #[rstest]
    #[case(&['P', 'Q'], None)]
    #[case(&['P', 'Q', 'R'], None)]
    #[case(&['P', 'R'], Some((1, 'R')))]
    #[case(&['Q', 'P'], Some((0, 'Q')))]
    #[case(&['P', 'Q', 'R', 'R'], Some((3, 'R')))]
    fn test_validate(#[case] segments: &[char], #[case] expected: Option<(usize, char)>) {
        let order = cnab240::segment_order(Direction::Remessa);
        let result = order.validate(segments).err().map(|(i, c, _)| (i, c));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_validate_incomplete_group() {
        let order = cnab240::segment_order(Direction::Retorno);
        let (index, _, expected) = order.validate(&['T']).unwrap_err();
        assert_eq!(index, 1);
        assert_eq!(expected, "U");
    }

    #[test]
    fn test_kind_discriminators() {
        assert_eq!(
            RecordKind::from_discriminator(CnabFormat::Cnab240, '5'),
            Some(RecordKind::LoteTrailer)
        );
        assert_eq!(RecordKind::from_discriminator(CnabFormat::Cnab400, '5'), None);
        assert_eq!(RecordKind::from_discriminator(CnabFormat::Cnab240, '4'), None);
    }
}
