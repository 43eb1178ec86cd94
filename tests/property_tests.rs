//! Property tests over the codec, check digits, the remessa writer and the barcode

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_cnab_engine::core::check_digit::{FEBRABAN_BARCODE, MODULO_10, MODULO_11};
use rust_cnab_engine::core::field_codec::{self, CharsetPolicy, FieldSpec};
use rust_cnab_engine::types::{
    movement, BankAccount, Beneficiary, DocumentKind, FieldValue, Payer,
};
use rust_cnab_engine::{
    write_remessa, Bank, Barcode, BarcodeComposer, CnabError, CnabFormat, Lote,
    PaymentInstruction, RemessaHeader, RetornoParser,
};

const AMOUNT: FieldSpec = FieldSpec::numeric("amount", 13);
const NAME: FieldSpec = FieldSpec::alpha("name", 30);

fn account() -> BankAccount {
    BankAccount {
        agency: "1172".to_string(),
        agency_dv: None,
        account: "403005".to_string(),
        account_dv: None,
        wallet: "09".to_string(),
        agreement: String::new(),
    }
}

fn charge(our_number: u64, document_number: &str, due_date: NaiveDate, value: i64) -> PaymentInstruction {
    PaymentInstruction {
        account: account(),
        document_number: document_number.to_string(),
        our_number: our_number.to_string(),
        due_date,
        issue_date: due_date,
        value,
        payer: Payer {
            document_kind: DocumentKind::Cpf,
            document: "12345678909".to_string(),
            name: "MARIA".to_string(),
            address: String::new(),
            neighborhood: String::new(),
            zip_code: "01310100".to_string(),
            city: String::new(),
            state: "SP".to_string(),
        },
        movement_code: movement::REGISTER,
        fine: None,
        our_number_dv: None,
        barcode: None,
    }
}

fn header() -> RemessaHeader {
    RemessaHeader {
        beneficiary: Beneficiary {
            name: "PADARIA".to_string(),
            document_kind: DocumentKind::Cnpj,
            document: "12345678000195".to_string(),
            account: account(),
        },
        file_sequence: 1,
        generated_on: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
    }
}

fn due_date() -> impl Strategy<Value = NaiveDate> {
    // Two-digit years in CNAB400 only cover 1970..=2069
    (0u64..24_000).prop_map(|days| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Days::new(days))
}

fn charges() -> impl Strategy<Value = Vec<(u64, String, NaiveDate, i64)>> {
    prop::collection::vec(
        (
            1u64..99_999_999_999,
            "[A-Z0-9]{1,10}",
            due_date(),
            1i64..10_000_000_000,
        ),
        0..8,
    )
}

proptest! {
    #[test]
    fn numeric_fields_round_trip(value in 0u64..10_000_000_000_000) {
        let text = field_codec::format(&FieldValue::Number(value), &AMOUNT, CharsetPolicy::Strict).unwrap();
        prop_assert_eq!(text.len(), 13);
        prop_assert_eq!(field_codec::parse(&text, &AMOUNT).unwrap(), FieldValue::Number(value));
    }

    #[test]
    fn numeric_fields_overflow_past_width(value in 10_000_000_000_000u64..u64::MAX) {
        let result = field_codec::format(&FieldValue::Number(value), &AMOUNT, CharsetPolicy::Strict);
        let is_overflow = matches!(result, Err(CnabError::FieldOverflow { .. }));
        prop_assert!(is_overflow);
    }

    #[test]
    fn formatting_is_idempotent(name in "[A-Z ]{0,30}") {
        let once = field_codec::format(&FieldValue::Text(name), &NAME, CharsetPolicy::Strict).unwrap();
        let parsed = field_codec::parse(&once, &NAME).unwrap();
        let twice = field_codec::format(&parsed, &NAME, CharsetPolicy::Strict).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn check_digits_verify(digits in "[0-9]{1,43}") {
        for rule in [MODULO_10, MODULO_11, FEBRABAN_BARCODE] {
            let dv = rule.compute(&digits).unwrap();
            prop_assert!(rule.verify(&digits, dv));
            prop_assert_eq!(rule.compute(&digits).unwrap(), dv);
        }
    }

    #[test]
    fn remessa_reads_back_field_for_field(
        rows in charges(),
        format in prop_oneof![Just(CnabFormat::Cnab240), Just(CnabFormat::Cnab400)],
    ) {
        let instructions: Vec<PaymentInstruction> = rows
            .iter()
            .map(|(our_number, document, due, value)| charge(*our_number, document, *due, *value))
            .collect();
        let file = write_remessa(Bank::Bradesco, format, header(), &[Lote::new(instructions.clone())]).unwrap();
        prop_assert!(file.rejected.is_empty());

        let parsed = RetornoParser::new(Bank::Bradesco, format)
            .unwrap()
            .parse(&file.to_bytes())
            .unwrap();
        prop_assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        prop_assert_eq!(parsed.events.len(), instructions.len());

        for (event, instruction) in parsed.events.iter().zip(&instructions) {
            prop_assert_eq!(&event.our_number, &instruction.our_number);
            prop_assert_eq!(&event.document_number, &instruction.document_number);
            prop_assert_eq!(event.due_date, Some(instruction.due_date));
            prop_assert_eq!(event.value as i64, instruction.value);
        }
    }

    #[test]
    fn barcodes_survive_the_digitable_line(
        our_number in 1u64..99_999_999_999,
        due in due_date(),
        value in 0i64..10_000_000_000,
    ) {
        let barcode = BarcodeComposer::new(Bank::Bradesco)
            .compose(&charge(our_number, "NF", due, value))
            .unwrap();
        prop_assert_eq!(barcode.as_str().len(), 44);
        prop_assert_eq!(Barcode::from_digitable_line(&barcode.digitable_line()).unwrap(), barcode);
    }
}
