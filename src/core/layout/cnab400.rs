//! Bradesco CNAB400 layouts
//!
//! CNAB400 files have no lotes: a header, one detail line per charge and a
//! trailer, each ending with a 6-digit line sequence. Both trailers carry the
//! title count and total value so the file can be checked on read.

use super::{RecordKind, RecordLayout};
use crate::core::field_codec::{DateFormat, FieldSpec as F};
use crate::types::{CnabFormat, Direction};

const DATE: DateFormat = DateFormat::DdMmYy;

pub static REMESSA_HEADER: RecordLayout = RecordLayout {
    name: "cnab400.remessa_header",
    format: CnabFormat::Cnab400,
    kind: RecordKind::FileHeader,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("record_type", 1).with_default("0"),         // 001
        F::numeric("direction_code", 1).with_default("1"),      // 002
        F::alpha("direction_literal", 7).with_default("REMESSA"), // 003-009
        F::numeric("service_code", 2).with_default("1"),        // 010-011
        F::alpha("service_literal", 15).with_default("COBRANCA"), // 012-026
        F::numeric("company_code", 20).required(),              // 027-046
        F::alpha("company_name", 30).required(),                // 047-076
        F::numeric("bank_code", 3).required(),                  // 077-079
        F::alpha("bank_name", 15),                              // 080-094
        F::date("generation_date", DATE).required(),            // 095-100
        F::filler(8),                                           // 101-108
        F::alpha("system_id", 2).with_default("MX"),            // 109-110
        F::numeric("file_sequence", 7),                         // 111-117
        F::filler(277),                                         // 118-394
        F::numeric("sequence", 6).required(),                   // 395-400
    ],
};

pub static REMESSA_DETAIL: RecordLayout = RecordLayout {
    name: "cnab400.remessa_detail",
    format: CnabFormat::Cnab400,
    kind: RecordKind::Detail,
    segment: None,
    value_field: Some("value"),
    fields: &[
        F::numeric("record_type", 1).with_default("1"),         // 001
        F::zeros("debit_agency", 5),                            // 002-006
        F::alpha("debit_agency_dv", 1),                         // 007
        F::zeros("debit_agency_razao", 5),                      // 008-012
        F::zeros("debit_account", 7),                           // 013-019
        F::alpha("debit_account_dv", 1),                        // 020
        F::zeros("beneficiary_zero", 1),                        // 021
        F::numeric("wallet", 3).required(),                     // 022-024
        F::numeric("agency", 5).required(),                     // 025-029
        F::numeric("account", 7).required(),                    // 030-036
        F::alpha("account_dv", 1),                              // 037
        F::alpha("company_reference", 25),                      // 038-062
        F::zeros("debit_bank", 3),                              // 063-065
        F::numeric("fine_flag", 1).with_default("0"),           // 066
        F::numeric("fine_percent", 4),                          // 067-070
        F::numeric("our_number", 11).required(),                // 071-081
        F::alpha("our_number_dv", 1),                           // 082
        F::zeros("daily_bonus", 10),                            // 083-092
        F::numeric("issue_condition", 1).with_default("2"),     // 093
        F::alpha("debit_notice", 1).with_default("N"),          // 094
        F::filler(10),                                          // 095-104
        F::alpha("apportionment", 1),                           // 105
        F::numeric("notice_address", 1).with_default("2"),      // 106
        F::filler(2),                                           // 107-108
        F::numeric("movement_code", 2).required(),              // 109-110
        F::alpha("document_number", 10).required(),             // 111-120
        F::date("due_date", DATE).required(),                   // 121-126
        F::numeric("value", 13).required(),                     // 127-139
        F::zeros("collecting_bank", 3),                         // 140-142
        F::zeros("collecting_agency", 5),                       // 143-147
        F::numeric("species", 2).with_default("1"),             // 148-149
        F::alpha("acceptance", 1).with_default("N"),            // 150
        F::date("issue_date", DATE),                            // 151-156
        F::zeros("instruction_1", 2),                           // 157-158
        F::zeros("instruction_2", 2),                           // 159-160
        F::zeros("interest_per_day", 13),                       // 161-173
        F::date("discount_date", DATE),                         // 174-179
        F::zeros("discount_value", 13),                         // 180-192
        F::zeros("iof_value", 13),                              // 193-205
        F::zeros("rebate_value", 13),                           // 206-218
        F::numeric("payer_document_kind", 2).required(),        // 219-220
        F::numeric("payer_document", 14).required(),            // 221-234
        F::alpha("payer_name", 40).required(),                  // 235-274
        F::alpha("payer_address", 40),                          // 275-314
        F::alpha("message_1", 12),                              // 315-326
        F::numeric("zip_code", 8),                              // 327-334
        F::alpha("message_2", 60),                              // 335-394
        F::numeric("sequence", 6).required(),                   // 395-400
    ],
};

pub static REMESSA_TRAILER: RecordLayout = RecordLayout {
    name: "cnab400.remessa_trailer",
    format: CnabFormat::Cnab400,
    kind: RecordKind::FileTrailer,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("record_type", 1).with_default("9"),         // 001
        F::filler(16),                                          // 002-017
        F::numeric("title_count", 8).required(),                // 018-025
        F::numeric("total_value", 14).required(),               // 026-039
        F::filler(355),                                         // 040-394
        F::numeric("sequence", 6).required(),                   // 395-400
    ],
};

pub static RETORNO_HEADER: RecordLayout = RecordLayout {
    name: "cnab400.retorno_header",
    format: CnabFormat::Cnab400,
    kind: RecordKind::FileHeader,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("record_type", 1).with_default("0"),         // 001
        F::numeric("direction_code", 1).with_default("2"),      // 002
        F::alpha("direction_literal", 7).with_default("RETORNO"), // 003-009
        F::numeric("service_code", 2).with_default("1"),        // 010-011
        F::alpha("service_literal", 15).with_default("COBRANCA"), // 012-026
        F::numeric("company_code", 20),                         // 027-046
        F::alpha("company_name", 30),                           // 047-076
        F::numeric("bank_code", 3).required(),                  // 077-079
        F::alpha("bank_name", 15),                              // 080-094
        F::date("generation_date", DATE),                       // 095-100
        F::zeros("density", 8),                                 // 101-108
        F::zeros("notice_number", 5),                           // 109-113
        F::filler(266),                                         // 114-379
        F::date("credit_date", DATE),                           // 380-385
        F::filler(9),                                           // 386-394
        F::numeric("sequence", 6).required(),                   // 395-400
    ],
};

pub static RETORNO_DETAIL: RecordLayout = RecordLayout {
    name: "cnab400.retorno_detail",
    format: CnabFormat::Cnab400,
    kind: RecordKind::Detail,
    segment: None,
    value_field: Some("value"),
    fields: &[
        F::numeric("record_type", 1).with_default("1"),         // 001
        F::numeric("company_document_kind", 2),                 // 002-003
        F::numeric("company_document", 14),                     // 004-017
        F::filler(3),                                           // 018-020
        F::zeros("beneficiary_zero", 1),                        // 021
        F::numeric("wallet", 3),                                // 022-024
        F::numeric("agency", 5),                                // 025-029
        F::numeric("account", 7),                               // 030-036
        F::alpha("account_dv", 1),                              // 037
        F::alpha("company_reference", 25),                      // 038-062
        F::filler(8),                                           // 063-070
        F::numeric("our_number", 11).required(),                // 071-081
        F::alpha("our_number_dv", 1),                           // 082
        F::filler(22),                                          // 083-104
        F::alpha("apportionment", 1),                           // 105
        F::zeros("payment_kind", 2),                            // 106-107
        F::alpha("wallet_code", 1),                             // 108
        F::numeric("movement_code", 2).required(),              // 109-110
        F::date("occurrence_date", DATE),                       // 111-116
        F::alpha("document_number", 10),                        // 117-126
        F::alpha("bank_our_number", 20),                        // 127-146
        F::date("due_date", DATE),                              // 147-152
        F::numeric("value", 13),                                // 153-165
        F::numeric("collecting_bank", 3),                       // 166-168
        F::numeric("collecting_agency", 5),                     // 169-173
        F::alpha("species", 2),                                 // 174-175
        F::numeric("fee_value", 13),                            // 176-188
        F::numeric("other_expenses", 13),                       // 189-201
        F::numeric("late_interest", 13),                        // 202-214
        F::numeric("iof_value", 13),                            // 215-227
        F::numeric("rebate_value", 13),                         // 228-240
        F::numeric("discount_value", 13),                       // 241-253
        F::numeric("paid_value", 13),                           // 254-266
        F::numeric("interest_value", 13),                       // 267-279
        F::numeric("other_credits", 13),                        // 280-292
        F::filler(2),                                           // 293-294
        F::alpha("motive", 1),                                  // 295
        F::date("credit_date", DATE),                           // 296-301
        F::alpha("payment_origin", 3),                          // 302-304
        F::filler(10),                                          // 305-314
        F::alpha("cheque", 4),                                  // 315-318
        F::alpha("reason_codes", 10),                           // 319-328
        F::filler(40),                                          // 329-368
        F::zeros("registry_number", 2),                         // 369-370
        F::filler(24),                                          // 371-394
        F::numeric("sequence", 6).required(),                   // 395-400
    ],
};

pub static RETORNO_TRAILER: RecordLayout = RecordLayout {
    name: "cnab400.retorno_trailer",
    format: CnabFormat::Cnab400,
    kind: RecordKind::FileTrailer,
    segment: None,
    value_field: None,
    fields: &[
        F::numeric("record_type", 1).with_default("9"),         // 001
        F::numeric("direction_code", 1).with_default("2"),      // 002
        F::numeric("service_code", 2).with_default("1"),        // 003-004
        F::numeric("bank_code", 3).required(),                  // 005-007
        F::filler(10),                                          // 008-017
        F::numeric("title_count", 8).required(),                // 018-025
        F::numeric("total_value", 14).required(),               // 026-039
        F::zeros("notice_number", 8),                           // 040-047
        F::filler(347),                                         // 048-394
        F::numeric("sequence", 6).required(),                   // 395-400
    ],
};

pub static LAYOUTS: &[&RecordLayout] = &[
    &REMESSA_HEADER,
    &REMESSA_DETAIL,
    &REMESSA_TRAILER,
    &RETORNO_HEADER,
    &RETORNO_DETAIL,
    &RETORNO_TRAILER,
];

/// Layout of a record kind in the given direction
pub fn layout(direction: Direction, kind: RecordKind) -> Option<&'static RecordLayout> {
    match (direction, kind) {
        (Direction::Remessa, RecordKind::FileHeader) => Some(&REMESSA_HEADER),
        (Direction::Remessa, RecordKind::Detail) => Some(&REMESSA_DETAIL),
        (Direction::Remessa, RecordKind::FileTrailer) => Some(&REMESSA_TRAILER),
        (Direction::Retorno, RecordKind::FileHeader) => Some(&RETORNO_HEADER),
        (Direction::Retorno, RecordKind::Detail) => Some(&RETORNO_DETAIL),
        (Direction::Retorno, RecordKind::FileTrailer) => Some(&RETORNO_TRAILER),
        (_, RecordKind::LoteHeader | RecordKind::LoteTrailer) => None,
    }
}

/// 0-based offset of the direction code in a header line
pub const DIRECTION_OFFSET: usize = 1;
