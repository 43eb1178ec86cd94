//! FEBRABAN CNAB240 layouts
//!
//! One table per record type, shared by every bank. Bank code, bank name and
//! layout versions are values the writer fills from the bank's rules.
//! Positions below are 1-based and inclusive, as printed in bank manuals.

use super::{RecordKind, RecordLayout, SegmentOrder};
use crate::core::field_codec::{DateFormat, FieldSpec as F};
use crate::types::{CnabFormat, Direction};

const DATE: DateFormat = DateFormat::DdMmYyyy;

pub static FILE_HEADER: RecordLayout = RecordLayout {
    name: "cnab240.file_header",
    format: CnabFormat::Cnab240,
    kind: RecordKind::FileHeader,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).with_default("0"),                // 004-007
        F::numeric("record_type", 1).with_default("0"),         // 008
        F::filler(9),                                           // 009-017
        F::numeric("company_document_kind", 1),                 // 018
        F::numeric("company_document", 14),                     // 019-032
        F::alpha("agreement", 20),                              // 033-052
        F::numeric("agency", 5),                                // 053-057
        F::alpha("agency_dv", 1),                               // 058
        F::numeric("account", 12),                              // 059-070
        F::alpha("account_dv", 1),                              // 071
        F::alpha("agency_account_dv", 1),                       // 072
        F::alpha("company_name", 30).required(),                // 073-102
        F::alpha("bank_name", 30),                              // 103-132
        F::filler(10),                                          // 133-142
        F::numeric("direction_code", 1).required(),             // 143
        F::date("generation_date", DATE).required(),            // 144-151
        F::zeros("generation_time", 6),                         // 152-157
        F::numeric("file_sequence", 6),                         // 158-163
        F::numeric("layout_version", 3),                        // 164-166
        F::zeros("density", 5),                                 // 167-171
        F::alpha("bank_reserved", 20),                          // 172-191
        F::alpha("company_reserved", 20),                       // 192-211
        F::filler(29),                                          // 212-240
    ],
};

pub static LOTE_HEADER: RecordLayout = RecordLayout {
    name: "cnab240.lote_header",
    format: CnabFormat::Cnab240,
    kind: RecordKind::LoteHeader,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("1"),         // 008
        F::alpha("operation", 1).required(),                    // 009
        F::numeric("service_code", 2).with_default("1"),        // 010-011
        F::filler(2),                                           // 012-013
        F::numeric("layout_version", 3),                        // 014-016
        F::filler(1),                                           // 017
        F::numeric("company_document_kind", 1),                 // 018
        F::numeric("company_document", 15),                     // 019-033
        F::alpha("agreement", 20),                              // 034-053
        F::numeric("agency", 5),                                // 054-058
        F::alpha("agency_dv", 1),                               // 059
        F::numeric("account", 12),                              // 060-071
        F::alpha("account_dv", 1),                              // 072
        F::alpha("agency_account_dv", 1),                       // 073
        F::alpha("company_name", 30),                           // 074-103
        F::alpha("message_1", 40),                              // 104-143
        F::alpha("message_2", 40),                              // 144-183
        F::numeric("file_sequence", 8),                         // 184-191
        F::date("recording_date", DATE),                        // 192-199
        F::date("credit_date", DATE),                           // 200-207
        F::filler(33),                                          // 208-240
    ],
};

pub static SEGMENT_P: RecordLayout = RecordLayout {
    name: "cnab240.segment_p",
    format: CnabFormat::Cnab240,
    kind: RecordKind::Detail,
    segment: Some('P'),
    value_field: Some("value"),
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("3"),         // 008
        F::numeric("sequence", 5).required(),                   // 009-013
        F::alpha("segment", 1).with_default("P"),               // 014
        F::filler(1),                                           // 015
        F::numeric("movement_code", 2).with_default("1"),       // 016-017
        F::numeric("agency", 5).required(),                     // 018-022
        F::alpha("agency_dv", 1),                               // 023
        F::numeric("account", 12).required(),                   // 024-035
        F::alpha("account_dv", 1),                              // 036
        F::alpha("agency_account_dv", 1),                       // 037
        F::alpha("our_number", 20).required(),                  // 038-057
        F::numeric("wallet_code", 1).with_default("1"),         // 058
        F::numeric("registration_kind", 1).with_default("1"),   // 059
        F::alpha("document_kind", 1).with_default("1"),         // 060
        F::numeric("issuer", 1).with_default("2"),              // 061
        F::alpha("distribution", 1).with_default("2"),          // 062
        F::alpha("document_number", 15).required(),             // 063-077
        F::date("due_date", DATE).required(),                   // 078-085
        F::numeric("value", 15).required(),                     // 086-100
        F::zeros("collecting_agency", 5),                       // 101-105
        F::alpha("collecting_agency_dv", 1),                    // 106
        F::numeric("species", 2).with_default("2"),             // 107-108
        F::alpha("acceptance", 1).with_default("N"),            // 109
        F::date("issue_date", DATE),                            // 110-117
        F::numeric("interest_code", 1).with_default("3"),       // 118
        F::date("interest_date", DATE),                         // 119-126
        F::zeros("interest_value", 15),                         // 127-141
        F::numeric("discount_code", 1).with_default("0"),       // 142
        F::date("discount_date", DATE),                         // 143-150
        F::zeros("discount_value", 15),                         // 151-165
        F::zeros("iof_value", 15),                              // 166-180
        F::zeros("rebate_value", 15),                           // 181-195
        F::alpha("company_reference", 25),                      // 196-220
        F::numeric("protest_code", 1).with_default("3"),        // 221
        F::zeros("protest_days", 2),                            // 222-223
        F::numeric("write_off_code", 1).with_default("0"),      // 224
        F::alpha("write_off_days", 3),                          // 225-227
        F::numeric("currency_code", 2).with_default("9"),       // 228-229
        F::zeros("contract_number", 10),                        // 230-239
        F::filler(1),                                           // 240
    ],
};

pub static SEGMENT_Q: RecordLayout = RecordLayout {
    name: "cnab240.segment_q",
    format: CnabFormat::Cnab240,
    kind: RecordKind::Detail,
    segment: Some('Q'),
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("3"),         // 008
        F::numeric("sequence", 5).required(),                   // 009-013
        F::alpha("segment", 1).with_default("Q"),               // 014
        F::filler(1),                                           // 015
        F::numeric("movement_code", 2).with_default("1"),       // 016-017
        F::numeric("payer_document_kind", 1).required(),        // 018
        F::numeric("payer_document", 15).required(),            // 019-033
        F::alpha("payer_name", 40).required(),                  // 034-073
        F::alpha("payer_address", 40),                          // 074-113
        F::alpha("payer_neighborhood", 15),                     // 114-128
        F::numeric("zip_code", 5),                              // 129-133
        F::numeric("zip_suffix", 3),                            // 134-136
        F::alpha("payer_city", 15),                             // 137-151
        F::alpha("payer_state", 2),                             // 152-153
        F::zeros("guarantor_document_kind", 1),                 // 154
        F::zeros("guarantor_document", 15),                     // 155-169
        F::alpha("guarantor_name", 40),                         // 170-209
        F::zeros("correspondent_bank", 3),                      // 210-212
        F::alpha("correspondent_our_number", 20),               // 213-232
        F::filler(8),                                           // 233-240
    ],
};

pub static SEGMENT_R: RecordLayout = RecordLayout {
    name: "cnab240.segment_r",
    format: CnabFormat::Cnab240,
    kind: RecordKind::Detail,
    segment: Some('R'),
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("3"),         // 008
        F::numeric("sequence", 5).required(),                   // 009-013
        F::alpha("segment", 1).with_default("R"),               // 014
        F::filler(1),                                           // 015
        F::numeric("movement_code", 2).with_default("1"),       // 016-017
        F::zeros("discount2_code", 1),                          // 018
        F::date("discount2_date", DATE),                        // 019-026
        F::zeros("discount2_value", 15),                        // 027-041
        F::zeros("discount3_code", 1),                          // 042
        F::date("discount3_date", DATE),                        // 043-050
        F::zeros("discount3_value", 15),                        // 051-065
        F::numeric("fine_code", 1).with_default("0"),           // 066
        F::date("fine_date", DATE),                             // 067-074
        F::numeric("fine_value", 15),                           // 075-089
        F::alpha("payer_info", 10),                             // 090-099
        F::alpha("message_3", 40),                              // 100-139
        F::alpha("message_4", 40),                              // 140-179
        F::filler(20),                                          // 180-199
        F::zeros("payer_occurrence_code", 8),                   // 200-207
        F::zeros("debit_bank", 3),                              // 208-210
        F::zeros("debit_agency", 5),                            // 211-215
        F::alpha("debit_agency_dv", 1),                         // 216
        F::zeros("debit_account", 12),                          // 217-228
        F::alpha("debit_account_dv", 1),                        // 229
        F::alpha("debit_agency_account_dv", 1),                 // 230
        F::zeros("debit_notice", 1),                            // 231
        F::filler(9),                                           // 232-240
    ],
};

pub static SEGMENT_T: RecordLayout = RecordLayout {
    name: "cnab240.segment_t",
    format: CnabFormat::Cnab240,
    kind: RecordKind::Detail,
    segment: Some('T'),
    value_field: Some("value"),
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("3"),         // 008
        F::numeric("sequence", 5).required(),                   // 009-013
        F::alpha("segment", 1).with_default("T"),               // 014
        F::filler(1),                                           // 015
        F::numeric("movement_code", 2).required(),              // 016-017
        F::numeric("agency", 5),                                // 018-022
        F::alpha("agency_dv", 1),                               // 023
        F::numeric("account", 12),                              // 024-035
        F::alpha("account_dv", 1),                              // 036
        F::alpha("agency_account_dv", 1),                       // 037
        F::alpha("our_number", 20).required(),                  // 038-057
        F::numeric("wallet_code", 1),                           // 058
        F::alpha("document_number", 15),                        // 059-073
        F::date("due_date", DATE),                              // 074-081
        F::numeric("value", 15),                                // 082-096
        F::numeric("collecting_bank", 3),                       // 097-099
        F::numeric("collecting_agency", 5),                     // 100-104
        F::alpha("collecting_agency_dv", 1),                    // 105
        F::alpha("company_reference", 25),                      // 106-130
        F::numeric("currency_code", 2),                         // 131-132
        F::numeric("payer_document_kind", 1),                   // 133
        F::numeric("payer_document", 15),                       // 134-148
        F::alpha("payer_name", 40),                             // 149-188
        F::numeric("contract_number", 10),                      // 189-198
        F::numeric("fee_value", 15),                            // 199-213
        F::alpha("reason_codes", 10),                           // 214-223
        F::filler(17),                                          // 224-240
    ],
};

pub static SEGMENT_U: RecordLayout = RecordLayout {
    name: "cnab240.segment_u",
    format: CnabFormat::Cnab240,
    kind: RecordKind::Detail,
    segment: Some('U'),
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("3"),         // 008
        F::numeric("sequence", 5).required(),                   // 009-013
        F::alpha("segment", 1).with_default("U"),               // 014
        F::filler(1),                                           // 015
        F::numeric("movement_code", 2).required(),              // 016-017
        F::numeric("interest_value", 15),                       // 018-032
        F::numeric("discount_value", 15),                       // 033-047
        F::numeric("rebate_value", 15),                         // 048-062
        F::numeric("iof_value", 15),                            // 063-077
        F::numeric("paid_value", 15),                           // 078-092
        F::numeric("net_value", 15),                            // 093-107
        F::numeric("other_expenses", 15),                       // 108-122
        F::numeric("other_credits", 15),                        // 123-137
        F::date("occurrence_date", DATE),                       // 138-145
        F::date("credit_date", DATE),                           // 146-153
        F::alpha("payer_occurrence_code", 4),                   // 154-157
        F::date("payer_occurrence_date", DATE),                 // 158-165
        F::numeric("payer_occurrence_value", 15),               // 166-180
        F::alpha("payer_occurrence_text", 30),                  // 181-210
        F::numeric("correspondent_bank", 3),                    // 211-213
        F::alpha("correspondent_our_number", 20),               // 214-233
        F::filler(7),                                           // 234-240
    ],
};

pub static LOTE_TRAILER: RecordLayout = RecordLayout {
    name: "cnab240.lote_trailer",
    format: CnabFormat::Cnab240,
    kind: RecordKind::LoteTrailer,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).required(),                       // 004-007
        F::numeric("record_type", 1).with_default("5"),         // 008
        F::filler(9),                                           // 009-017
        F::numeric("record_count", 6).required(),               // 018-023
        F::numeric("title_count", 6).required(),                // 024-029
        F::numeric("total_value", 17).required(),               // 030-046
        F::zeros("linked_count", 6),                            // 047-052
        F::zeros("linked_value", 17),                           // 053-069
        F::zeros("secured_count", 6),                           // 070-075
        F::zeros("secured_value", 17),                          // 076-092
        F::zeros("discounted_count", 6),                        // 093-098
        F::zeros("discounted_value", 17),                       // 099-115
        F::alpha("notice_number", 8),                           // 116-123
        F::filler(117),                                         // 124-240
    ],
};

pub static FILE_TRAILER: RecordLayout = RecordLayout {
    name: "cnab240.file_trailer",
    format: CnabFormat::Cnab240,
    kind: RecordKind::FileTrailer,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("bank_code", 3).required(),                  // 001-003
        F::numeric("lote", 4).with_default("9999"),             // 004-007
        F::numeric("record_type", 1).with_default("9"),         // 008
        F::filler(9),                                           // 009-017
        F::numeric("lote_count", 6).required(),                 // 018-023
        F::numeric("record_count", 6).required(),               // 024-029
        F::zeros("account_count", 6),                           // 030-035
        F::filler(205),                                         // 036-240
    ],
};

pub static LAYOUTS: &[&RecordLayout] = &[
    &FILE_HEADER,
    &LOTE_HEADER,
    &SEGMENT_P,
    &SEGMENT_Q,
    &SEGMENT_R,
    &SEGMENT_T,
    &SEGMENT_U,
    &LOTE_TRAILER,
    &FILE_TRAILER,
];

/// Layout of a record kind, with the segment code for details
pub fn layout(kind: RecordKind, segment: Option<char>) -> Option<&'static RecordLayout> {
    match (kind, segment) {
        (RecordKind::FileHeader, _) => Some(&FILE_HEADER),
        (RecordKind::LoteHeader, _) => Some(&LOTE_HEADER),
        (RecordKind::LoteTrailer, _) => Some(&LOTE_TRAILER),
        (RecordKind::FileTrailer, _) => Some(&FILE_TRAILER),
        (RecordKind::Detail, Some(code)) => LAYOUTS
            .iter()
            .find(|l| l.segment == Some(code))
            .copied(),
        (RecordKind::Detail, None) => None,
    }
}

/// Segments of one detail group
pub fn segment_order(direction: Direction) -> SegmentOrder {
    match direction {
        Direction::Remessa => SegmentOrder {
            required: &['P', 'Q'],
            optional: &['R'],
        },
        Direction::Retorno => SegmentOrder {
            required: &['T', 'U'],
            optional: &[],
        },
    }
}

/// 0-based offset of the record-type discriminator
pub const RECORD_TYPE_OFFSET: usize = 7;

/// 0-based offset of the segment code in a detail line
pub const SEGMENT_OFFSET: usize = 13;
