//! Boleto barcode and digitable line
//!
//! # Barcode (44 digits)
//!
//! | Positions | Content                                      |
//! |-----------|----------------------------------------------|
//! | 1-3       | Bank code                                    |
//! | 4         | Currency code (`9`, real)                    |
//! | 5         | General check digit (FEBRABAN modulo 11)     |
//! | 6-9       | Due-date factor                              |
//! | 10-19     | Value in cents                               |
//! | 20-44     | Free field, laid out per bank                |
//!
//! # Digitable line (47 digits)
//!
//! Three blocks built from the barcode, each followed by its own modulo-10
//! digit, then the general check digit, then factor and value:
//!
//! ```text
//! AAAAA.AAAAA BBBBB.BBBBBB CCCCC.CCCCCC D EEEEEEEEEEEEEE
//! ```

use crate::core::bank_rules::{self, BankRules, DigitRule, Slot, Source};
use crate::core::check_digit::{FEBRABAN_BARCODE, MODULO_10};
use crate::types::{Bank, BankAccount, Cents, CnabError, PaymentInstruction};
use chrono::NaiveDate;
use std::fmt;

pub const BARCODE_WIDTH: usize = 44;
pub const DIGITABLE_LINE_WIDTH: usize = 47;
pub const FREE_FIELD_WIDTH: usize = 25;
pub const CURRENCY_CODE: char = '9';

const VALUE_WIDTH: usize = 10;
const MAX_VALUE: Cents = 9_999_999_999;

/// First day of the due-date factor count
pub fn factor_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1997, 10, 7).unwrap_or_default()
}

/// One piece of a bank's free field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeFieldPart {
    /// An identifier, zero-padded
    Slot(Slot),
    /// Fixed digits
    Literal(&'static str),
    /// The bank's our-number check digit
    OurNumberDv,
    /// A check digit over other slots
    CheckDigit(DigitRule),
}

impl FreeFieldPart {
    pub fn width(&self) -> usize {
        match self {
            FreeFieldPart::Slot(slot) => slot.width,
            FreeFieldPart::Literal(digits) => digits.len(),
            FreeFieldPart::OurNumberDv | FreeFieldPart::CheckDigit(_) => 1,
        }
    }
}

/// Free-field template of one bank
#[derive(Debug, PartialEq, Eq)]
pub struct BarcodeLayout {
    pub bank: Bank,
    pub parts: &'static [FreeFieldPart],
}

impl BarcodeLayout {
    pub fn width(&self) -> usize {
        self.parts.iter().map(FreeFieldPart::width).sum()
    }
}

use FreeFieldPart::{CheckDigit, Literal, OurNumberDv};

const fn part(source: Source, width: usize) -> FreeFieldPart {
    FreeFieldPart::Slot(Slot::new(source, width))
}

static BANCO_DO_BRASIL: BarcodeLayout = BarcodeLayout {
    bank: Bank::BancoDoBrasil,
    parts: &[
        Literal("000000"),
        part(Source::Agreement, 7),
        part(Source::OurNumber, 10),
        part(Source::Wallet, 2),
    ],
};

static SANTANDER: BarcodeLayout = BarcodeLayout {
    bank: Bank::Santander,
    parts: &[
        Literal("9"),
        part(Source::Agreement, 7),
        part(Source::OurNumber, 12),
        OurNumberDv,
        // IOF, only used by insurance companies
        Literal("0"),
        part(Source::Wallet, 3),
    ],
};

static BRADESCO: BarcodeLayout = BarcodeLayout {
    bank: Bank::Bradesco,
    parts: &[
        part(Source::Agency, 4),
        part(Source::Wallet, 2),
        part(Source::OurNumber, 11),
        part(Source::Account, 7),
        Literal("0"),
    ],
};

static ITAU: BarcodeLayout = BarcodeLayout {
    bank: Bank::Itau,
    parts: &[
        part(Source::Wallet, 3),
        part(Source::OurNumber, 8),
        OurNumberDv,
        part(Source::Agency, 4),
        part(Source::Account, 5),
        CheckDigit(DigitRule {
            rule: MODULO_10,
            inputs: &[Slot::new(Source::Agency, 4), Slot::new(Source::Account, 5)],
        }),
        Literal("000"),
    ],
};

/// Free-field template of a bank
pub fn barcode_layout(bank: Bank) -> &'static BarcodeLayout {
    match bank {
        Bank::BancoDoBrasil => &BANCO_DO_BRASIL,
        Bank::Santander => &SANTANDER,
        Bank::Bradesco => &BRADESCO,
        Bank::Itau => &ITAU,
    }
}

/// Due-date factor: days since 1997-10-07, modulo 10000
///
/// # Errors
///
/// `BarcodeFieldOverflow` for a date before the epoch.
pub fn due_date_factor(due_date: NaiveDate) -> Result<u32, CnabError> {
    let days = (due_date - factor_epoch()).num_days();
    if days < 0 {
        return Err(CnabError::barcode_field_overflow(
            "due_date",
            4,
            &due_date.to_string(),
        ));
    }
    Ok((days % 10_000) as u32)
}

/// A validated 44-digit barcode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Barcode {
    digits: String,
}

impl Barcode {
    /// Accept a pre-computed barcode
    ///
    /// Non-digits (spaces, dots) are ignored.
    ///
    /// # Errors
    ///
    /// - `BarcodeFieldOverflow` if the input does not hold exactly 44 digits
    /// - `InvalidBarcode` if the general check digit does not match
    pub fn from_barcode(code: &str) -> Result<Barcode, CnabError> {
        let digits: String = code.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != BARCODE_WIDTH {
            return Err(CnabError::barcode_field_overflow("barcode", BARCODE_WIDTH, code));
        }
        let expected = general_check_digit(&digits[..4], &digits[5..])?;
        if digits.as_bytes()[4] as char != expected {
            return Err(CnabError::invalid_barcode(
                code,
                &format!("check digit should be {}", expected),
            ));
        }
        Ok(Barcode { digits })
    }

    /// Rebuild the barcode from a digitable line, checking every block digit
    ///
    /// # Errors
    ///
    /// - `BarcodeFieldOverflow` if the input does not hold exactly 47 digits
    /// - `InvalidBarcode` if a block or general check digit does not match
    pub fn from_digitable_line(line: &str) -> Result<Barcode, CnabError> {
        let d: String = line.chars().filter(char::is_ascii_digit).collect();
        if d.len() != DIGITABLE_LINE_WIDTH {
            return Err(CnabError::barcode_field_overflow(
                "digitable_line",
                DIGITABLE_LINE_WIDTH,
                line,
            ));
        }
        for (block, (start, end)) in [(0, 9), (10, 20), (21, 31)].into_iter().enumerate() {
            let dv = d.as_bytes()[end] as char;
            if !MODULO_10.verify(&d[start..end], dv) {
                return Err(CnabError::invalid_barcode(
                    line,
                    &format!("block {} check digit does not match", block + 1),
                ));
            }
        }
        let barcode = format!(
            "{}{}{}{}{}{}",
            &d[0..4],
            &d[32..33],
            &d[33..47],
            &d[4..9],
            &d[10..20],
            &d[21..31]
        );
        Barcode::from_barcode(&barcode)
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn bank_code(&self) -> &str {
        &self.digits[0..3]
    }

    pub fn check_digit(&self) -> char {
        self.digits.as_bytes()[4] as char
    }

    pub fn due_date_factor(&self) -> &str {
        &self.digits[5..9]
    }

    pub fn value(&self) -> &str {
        &self.digits[9..19]
    }

    pub fn free_field(&self) -> &str {
        &self.digits[19..44]
    }

    /// The barcode regrouped for typing
    pub fn digitable_line(&self) -> String {
        let d = &self.digits;
        let free = self.free_field();
        let block1 = with_block_digit(&format!("{}{}", &d[0..4], &free[0..5]));
        let block2 = with_block_digit(&free[5..15]);
        let block3 = with_block_digit(&free[15..25]);
        format!(
            "{}.{} {}.{} {}.{} {} {}",
            &block1[..5],
            &block1[5..],
            &block2[..5],
            &block2[5..],
            &block3[..5],
            &block3[5..],
            self.check_digit(),
            &d[5..19]
        )
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digits)
    }
}

fn with_block_digit(digits: &str) -> String {
    // Blocks are always digits, so the codec cannot fail here
    let dv = MODULO_10.compute(digits).unwrap_or('0');
    format!("{}{}", digits, dv)
}

fn general_check_digit(head: &str, tail: &str) -> Result<char, CnabError> {
    FEBRABAN_BARCODE.compute(&format!("{}{}", head, tail))
}

/// Composes barcodes for one bank
///
/// Holds only references to static tables; cheap to create and `Copy`.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeComposer {
    layout: &'static BarcodeLayout,
    rules: &'static BankRules,
}

impl BarcodeComposer {
    pub fn new(bank: Bank) -> Self {
        BarcodeComposer {
            layout: barcode_layout(bank),
            rules: bank_rules::rules(bank),
        }
    }

    /// Compose the barcode of an instruction
    ///
    /// A barcode issued elsewhere is validated and used as is; otherwise the
    /// barcode is built from the instruction, with the bank-assigned
    /// our-number digit taking the place of the computed one.
    ///
    /// # Errors
    ///
    /// As [`Barcode::from_barcode`] for an issued barcode, plus
    /// `InvalidBarcode` when it belongs to another bank; as
    /// [`BarcodeComposer::compose_parts`] otherwise.
    pub fn compose(&self, instruction: &PaymentInstruction) -> Result<Barcode, CnabError> {
        if let Some(code) = &instruction.barcode {
            let barcode = Barcode::from_barcode(code)?;
            if barcode.bank_code() != self.layout.bank.code() {
                return Err(CnabError::invalid_barcode(code, "issued by another bank"));
            }
            return Ok(barcode);
        }
        self.build(
            &instruction.account,
            &instruction.our_number,
            instruction.our_number_dv.as_deref(),
            instruction.due_date,
            instruction.value,
        )
    }

    /// Compose a barcode from its parts
    ///
    /// # Errors
    ///
    /// `BarcodeFieldOverflow` for a negative or too large value, a due date
    /// before the epoch, or an identifier wider than its free-field slot.
    pub fn compose_parts(
        &self,
        account: &BankAccount,
        our_number: &str,
        due_date: NaiveDate,
        value: Cents,
    ) -> Result<Barcode, CnabError> {
        self.build(account, our_number, None, due_date, value)
    }

    fn build(
        &self,
        account: &BankAccount,
        our_number: &str,
        our_number_dv: Option<&str>,
        due_date: NaiveDate,
        value: Cents,
    ) -> Result<Barcode, CnabError> {
        if !(0..=MAX_VALUE).contains(&value) {
            return Err(CnabError::barcode_field_overflow(
                "value",
                VALUE_WIDTH,
                &value.to_string(),
            ));
        }
        let factor = due_date_factor(due_date)?;
        let free_field = self.free_field_with(account, our_number, our_number_dv)?;

        let head = format!("{}{}", self.layout.bank.code(), CURRENCY_CODE);
        let tail = format!("{:04}{:010}{}", factor, value, free_field);
        let dv = general_check_digit(&head, &tail)?;
        let digits = format!("{}{}{}", head, dv, tail);
        debug_assert_eq!(digits.len(), BARCODE_WIDTH);

        Ok(Barcode { digits })
    }

    /// The 25-digit bank-specific free field
    pub fn free_field(&self, account: &BankAccount, our_number: &str) -> Result<String, CnabError> {
        self.free_field_with(account, our_number, None)
    }

    fn free_field_with(
        &self,
        account: &BankAccount,
        our_number: &str,
        our_number_dv: Option<&str>,
    ) -> Result<String, CnabError> {
        let pad_slot = |slot: &Slot| pad(slot, account, our_number);
        let mut field = String::with_capacity(FREE_FIELD_WIDTH);

        for piece in self.layout.parts {
            match piece {
                FreeFieldPart::Slot(slot) => field.push_str(&pad_slot(slot)?),
                FreeFieldPart::Literal(digits) => field.push_str(digits),
                FreeFieldPart::OurNumberDv => {
                    match (&self.rules.our_number_dv, our_number_dv) {
                        (Some(_), Some(dv)) => field.push(barcode_digit(dv)?),
                        (Some(rule), None) => field.push(rule.compute_with(pad_slot)?),
                        (None, _) => {}
                    }
                }
                FreeFieldPart::CheckDigit(rule) => field.push(rule.compute_with(pad_slot)?),
            }
        }

        if field.len() != FREE_FIELD_WIDTH {
            return Err(CnabError::barcode_field_overflow(
                "free_field",
                FREE_FIELD_WIDTH,
                &field,
            ));
        }
        Ok(field)
    }
}

// Only digits fit a barcode, so a letter digit such as Bradesco's 'P' cannot
fn barcode_digit(dv: &str) -> Result<char, CnabError> {
    let mut chars = dv.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => Ok(c),
        _ => Err(CnabError::barcode_field_overflow("our_number_dv", 1, dv)),
    }
}

fn pad(slot: &Slot, account: &BankAccount, our_number: &str) -> Result<String, CnabError> {
    let raw = slot.source.value(account, our_number);
    let significant = raw.trim_start_matches('0');
    if !raw.chars().all(|c| c.is_ascii_digit()) || significant.len() > slot.width {
        return Err(CnabError::barcode_field_overflow(
            slot.source.name(),
            slot.width,
            raw,
        ));
    }
    Ok(format!("{:0>width$}", significant, width = slot.width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{movement, DocumentKind, Payer};
    use chrono::Days;
    use rstest::rstest;

    fn account(agency: &str, account: &str, wallet: &str, agreement: &str) -> BankAccount {
        BankAccount {
            agency: agency.to_string(),
            agency_dv: None,
            account: account.to_string(),
            account_dv: None,
            wallet: wallet.to_string(),
            agreement: agreement.to_string(),
        }
    }

    fn bradesco() -> BankAccount {
        account("1172", "0403005", "09", "")
    }

    #[test]
    fn test_every_layout_fills_the_free_field() {
        for bank in Bank::ALL {
            assert_eq!(barcode_layout(bank).width(), FREE_FIELD_WIDTH, "{}", bank);
        }
    }

    #[test]
    fn test_factor_thirty_days_after_epoch() {
        let due = factor_epoch() + Days::new(30);
        let barcode = BarcodeComposer::new(Bank::Bradesco)
            .compose_parts(&bradesco(), "75896452", due, 15000)
            .unwrap();

        let digits = barcode.as_str();
        assert_eq!(digits.len(), 44);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(barcode.bank_code(), "237");
        assert_eq!(&digits[3..4], "9");
        assert_eq!(barcode.due_date_factor(), "0030");
        assert_eq!(barcode.value(), "0000015000");
        assert_eq!(barcode.free_field(), "1172090007589645204030050");

        let without_dv = format!("{}{}", &digits[..4], &digits[5..]);
        assert!(FEBRABAN_BARCODE.verify(&without_dv, barcode.check_digit()));

        let line = barcode.digitable_line();
        let blocks: Vec<&str> = line.split(' ').collect();
        assert_eq!(blocks.len(), 5);
        for block in &blocks[..3] {
            let digits: String = block.chars().filter(|c| *c != '.').collect();
            let (body, dv) = digits.split_at(digits.len() - 1);
            assert!(MODULO_10.verify(body, dv.chars().next().unwrap()), "{}", block);
        }
        assert_eq!(blocks[3], barcode.check_digit().to_string());
        assert_eq!(blocks[4], "00300000015000");
    }

    #[test]
    fn test_digitable_line_shape() {
        let barcode = BarcodeComposer::new(Bank::Itau)
            .compose_parts(
                &account("0057", "12345", "109", ""),
                "12345678",
                NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
                123456,
            )
            .unwrap();
        let line = barcode.digitable_line();
        assert_eq!(line.len(), 54);
        let shape: String = line
            .chars()
            .map(|c| if c.is_ascii_digit() { '9' } else { c })
            .collect();
        assert_eq!(shape, "99999.99999 99999.999999 99999.999999 9 99999999999999");
    }

    #[rstest]
    #[case(Bank::BancoDoBrasil, account("4042", "61900", "18", "1234567"), "55")]
    #[case(Bank::Santander, account("4042", "13000123", "102", "1234567"), "566612457800")]
    #[case(Bank::Bradesco, bradesco(), "75896452")]
    #[case(Bank::Itau, account("0057", "12345", "109", ""), "12345678")]
    fn test_round_trip_through_digitable_line(
        #[case] bank: Bank,
        #[case] account: BankAccount,
        #[case] our_number: &str,
    ) {
        let due = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let barcode = BarcodeComposer::new(bank)
            .compose_parts(&account, our_number, due, 9999)
            .unwrap();
        assert_eq!(barcode.bank_code(), bank.code());
        assert_eq!(Barcode::from_barcode(barcode.as_str()).unwrap(), barcode);
        assert_eq!(
            Barcode::from_digitable_line(&barcode.digitable_line()).unwrap(),
            barcode
        );
    }

    #[test]
    fn test_santander_free_field() {
        let composer = BarcodeComposer::new(Bank::Santander);
        let field = composer
            .free_field(&account("4042", "1", "102", "1234567"), "566612457800")
            .unwrap();
        let dv = bank_rules::rules(Bank::Santander)
            .our_number_dv(&account("4042", "1", "102", "1234567"), "566612457800", None)
            .unwrap()
            .unwrap();
        assert_eq!(field, format!("91234567566612457800{}0102", dv));
    }

    fn santander_charge(our_number_dv: Option<&str>) -> PaymentInstruction {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        PaymentInstruction {
            account: account("4042", "13000123", "102", "1234567"),
            document_number: "NF1".to_string(),
            our_number: "566612457800".to_string(),
            due_date: date,
            issue_date: date,
            value: 9999,
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
            our_number_dv: our_number_dv.map(String::from),
            barcode: None,
        }
    }

    #[test]
    fn test_supplied_our_number_dv_enters_free_field() {
        let composer = BarcodeComposer::new(Bank::Santander);
        let computed = composer.compose(&santander_charge(None)).unwrap();
        let computed_dv = computed.free_field().as_bytes()[20] as char;
        let other = if computed_dv == '7' { "3" } else { "7" };

        let supplied = composer.compose(&santander_charge(Some(other))).unwrap();
        assert_eq!(&supplied.free_field()[20..21], other);
        assert_eq!(&supplied.free_field()[..20], &computed.free_field()[..20]);
        assert_eq!(Barcode::from_barcode(supplied.as_str()).unwrap(), supplied);
    }

    #[test]
    fn test_letter_our_number_dv_does_not_fit_barcode() {
        let result = BarcodeComposer::new(Bank::Santander).compose(&santander_charge(Some("P")));
        assert!(matches!(
            result,
            Err(CnabError::BarcodeFieldOverflow { field: ref f, .. }) if f == "our_number_dv"
        ));
    }

    #[test]
    fn test_issued_barcode_is_used_as_is() {
        let composer = BarcodeComposer::new(Bank::Santander);
        let issued = composer.compose(&santander_charge(None)).unwrap();

        let mut charge = santander_charge(None);
        charge.value = 1;
        charge.barcode = Some(issued.digitable_line().replace(['.', ' '], ""));
        // A digitable line is not a barcode
        assert!(composer.compose(&charge).is_err());

        charge.barcode = Some(issued.as_str().to_string());
        assert_eq!(composer.compose(&charge).unwrap(), issued);
    }

    #[test]
    fn test_issued_barcode_from_another_bank_is_rejected() {
        let due = factor_epoch() + Days::new(30);
        let bradesco_code = BarcodeComposer::new(Bank::Bradesco)
            .compose_parts(&bradesco(), "75896452", due, 15000)
            .unwrap();
        let mut charge = santander_charge(None);
        charge.barcode = Some(bradesco_code.as_str().to_string());
        assert!(matches!(
            BarcodeComposer::new(Bank::Santander).compose(&charge),
            Err(CnabError::InvalidBarcode { .. })
        ));

        charge.barcode = Some("0339".to_string());
        assert!(matches!(
            BarcodeComposer::new(Bank::Santander).compose(&charge),
            Err(CnabError::BarcodeFieldOverflow { .. })
        ));
    }

    #[test]
    fn test_itau_free_field_check_digits() {
        let acc = account("0057", "12345", "109", "");
        let field = BarcodeComposer::new(Bank::Itau)
            .free_field(&acc, "12345678")
            .unwrap();
        assert_eq!(&field[..11], "10912345678");
        assert!(MODULO_10.verify("00571234510912345678", field.as_bytes()[11] as char));
        assert_eq!(&field[12..21], "005712345");
        assert!(MODULO_10.verify("005712345", field.as_bytes()[21] as char));
        assert_eq!(&field[22..], "000");
    }

    #[rstest]
    #[case::negative_value(bradesco(), "1", 2024, -1, "value")]
    #[case::value_too_large(bradesco(), "1", 2024, 10_000_000_000, "value")]
    #[case::before_epoch(bradesco(), "1", 1997, 100, "due_date")]
    #[case::our_number_too_wide(bradesco(), "123456789012", 2024, 100, "our_number")]
    #[case::agency_too_wide(account("11720", "1", "09", ""), "1", 2024, 100, "agency")]
    #[case::non_digit(account("1172", "40300-5", "09", ""), "1", 2024, 100, "account")]
    fn test_malformed_input_fails(
        #[case] account: BankAccount,
        #[case] our_number: &str,
        #[case] year: i32,
        #[case] value: Cents,
        #[case] field: &str,
    ) {
        let due = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let result = BarcodeComposer::new(Bank::Bradesco).compose_parts(&account, our_number, due, value);
        assert!(
            matches!(result, Err(CnabError::BarcodeFieldOverflow { field: ref f, .. }) if f == field),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_value_at_width_limit() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let barcode = BarcodeComposer::new(Bank::Bradesco)
            .compose_parts(&bradesco(), "1", due, 9_999_999_999)
            .unwrap();
        assert_eq!(barcode.value(), "9999999999");
    }

    #[test]
    fn test_factor_wraps_at_ten_thousand() {
        let due = factor_epoch() + Days::new(10_001);
        assert_eq!(due_date_factor(due).unwrap(), 1);
    }

    #[rstest]
    #[case::too_short("2379")]
    #[case::letters("23791X00300000150001172090007589645204030050")]
    fn test_from_barcode_rejects_malformed(#[case] code: &str) {
        assert!(matches!(
            Barcode::from_barcode(code),
            Err(CnabError::BarcodeFieldOverflow { .. })
        ));
    }

    #[test]
    fn test_from_barcode_rejects_wrong_check_digit() {
        let due = factor_epoch() + Days::new(30);
        let barcode = BarcodeComposer::new(Bank::Bradesco)
            .compose_parts(&bradesco(), "75896452", due, 15000)
            .unwrap();
        let wrong = if barcode.check_digit() == '1' { '2' } else { '1' };
        let mut tampered = barcode.as_str().to_string();
        tampered.replace_range(4..5, &wrong.to_string());
        assert!(matches!(
            Barcode::from_barcode(&tampered),
            Err(CnabError::InvalidBarcode { .. })
        ));
    }

    #[test]
    fn test_from_digitable_line_rejects_bad_block() {
        let due = factor_epoch() + Days::new(30);
        let barcode = BarcodeComposer::new(Bank::Bradesco)
            .compose_parts(&bradesco(), "75896452", due, 15000)
            .unwrap();
        let line = barcode.digitable_line();
        // Flip the second block's check digit (last digit before the second space)
        let mut chars: Vec<char> = line.chars().collect();
        let pos = 23;
        chars[pos] = if chars[pos] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        assert!(matches!(
            Barcode::from_digitable_line(&tampered),
            Err(CnabError::InvalidBarcode { .. })
        ));
    }
}
