//! Per-bank identifier rules
//!
//! Widths and check-digit rules for agency, account and our-number, and the
//! CNAB240 layout versions each bank declares. One static [`BankRules`] per
//! bank; behaviour differences are data, not code.

use crate::core::check_digit::{
    CheckDigitRule, BANCO_DO_BRASIL_ACCOUNT, BRADESCO_ACCOUNT, BRADESCO_AGENCY,
    BRADESCO_OUR_NUMBER, MODULO_10, SANTANDER_OUR_NUMBER,
};
use crate::types::{Bank, BankAccount, CnabError};

/// Where a digit block comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Agency,
    Account,
    Wallet,
    Agreement,
    OurNumber,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::Agency => "agency",
            Source::Account => "account",
            Source::Wallet => "wallet",
            Source::Agreement => "agreement",
            Source::OurNumber => "our_number",
        }
    }

    /// Raw value of the source, surrounding whitespace removed
    pub fn value<'a>(&self, account: &'a BankAccount, our_number: &'a str) -> &'a str {
        match self {
            Source::Agency => account.agency.trim(),
            Source::Account => account.account.trim(),
            Source::Wallet => account.wallet.trim(),
            Source::Agreement => account.agreement.trim(),
            Source::OurNumber => our_number.trim(),
        }
    }
}

/// A source zero-padded to a fixed width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub source: Source,
    pub width: usize,
}

impl Slot {
    pub const fn new(source: Source, width: usize) -> Self {
        Slot { source, width }
    }
}

/// A check digit computed over a concatenation of slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitRule {
    pub rule: CheckDigitRule,
    pub inputs: &'static [Slot],
}

/// Identifier rules of one bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankRules {
    pub bank: Bank,
    /// Digits of the our-number without check digit
    pub our_number_width: usize,
    /// Agreement digits prefixed to the our-number in CNAB fields (Banco do Brasil)
    pub our_number_prefix: Option<Slot>,
    pub our_number_dv: Option<DigitRule>,
    pub agency_dv: Option<DigitRule>,
    pub account_dv: Option<DigitRule>,
    /// CNAB240 file header layout version
    pub file_layout_version: u64,
    /// CNAB240 lote header layout version
    pub lote_layout_version: u64,
}

static BANCO_DO_BRASIL: BankRules = BankRules {
    bank: Bank::BancoDoBrasil,
    our_number_width: 10,
    our_number_prefix: Some(Slot::new(Source::Agreement, 7)),
    our_number_dv: None,
    agency_dv: Some(DigitRule {
        rule: BANCO_DO_BRASIL_ACCOUNT,
        inputs: &[Slot::new(Source::Agency, 4)],
    }),
    account_dv: Some(DigitRule {
        rule: BANCO_DO_BRASIL_ACCOUNT,
        inputs: &[Slot::new(Source::Account, 8)],
    }),
    file_layout_version: 83,
    lote_layout_version: 42,
};

static SANTANDER: BankRules = BankRules {
    bank: Bank::Santander,
    our_number_width: 12,
    our_number_prefix: None,
    our_number_dv: Some(DigitRule {
        rule: SANTANDER_OUR_NUMBER,
        inputs: &[Slot::new(Source::OurNumber, 12)],
    }),
    agency_dv: None,
    account_dv: None,
    file_layout_version: 40,
    lote_layout_version: 30,
};

static BRADESCO: BankRules = BankRules {
    bank: Bank::Bradesco,
    our_number_width: 11,
    our_number_prefix: None,
    our_number_dv: Some(DigitRule {
        rule: BRADESCO_OUR_NUMBER,
        inputs: &[Slot::new(Source::Wallet, 2), Slot::new(Source::OurNumber, 11)],
    }),
    agency_dv: Some(DigitRule {
        rule: BRADESCO_AGENCY,
        inputs: &[Slot::new(Source::Agency, 4)],
    }),
    account_dv: Some(DigitRule {
        rule: BRADESCO_ACCOUNT,
        inputs: &[Slot::new(Source::Account, 7)],
    }),
    file_layout_version: 84,
    lote_layout_version: 42,
};

static ITAU: BankRules = BankRules {
    bank: Bank::Itau,
    our_number_width: 8,
    our_number_prefix: None,
    our_number_dv: Some(DigitRule {
        rule: MODULO_10,
        inputs: &[
            Slot::new(Source::Agency, 4),
            Slot::new(Source::Account, 5),
            Slot::new(Source::Wallet, 3),
            Slot::new(Source::OurNumber, 8),
        ],
    }),
    agency_dv: None,
    account_dv: Some(DigitRule {
        rule: MODULO_10,
        inputs: &[Slot::new(Source::Agency, 4), Slot::new(Source::Account, 5)],
    }),
    file_layout_version: 40,
    lote_layout_version: 30,
};

/// Rules of a bank
pub fn rules(bank: Bank) -> &'static BankRules {
    match bank {
        Bank::BancoDoBrasil => &BANCO_DO_BRASIL,
        Bank::Santander => &SANTANDER,
        Bank::Bradesco => &BRADESCO,
        Bank::Itau => &ITAU,
    }
}

/// Zero-pad a source value to its slot
///
/// # Errors
///
/// `InvalidCharacter` for non-digits, `FieldOverflow` when the value has more
/// significant digits than the slot.
pub fn pad_slot(slot: &Slot, account: &BankAccount, our_number: &str) -> Result<String, CnabError> {
    let raw = slot.source.value(account, our_number);
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(CnabError::invalid_character(slot.source.name(), raw));
    }
    let significant = raw.trim_start_matches('0');
    if significant.len() > slot.width {
        return Err(CnabError::field_overflow(
            "bank rules",
            slot.source.name(),
            slot.width,
            raw,
        ));
    }
    Ok(format!("{:0>width$}", significant, width = slot.width))
}

impl DigitRule {
    /// Compute the digit over the rule's slots
    pub fn compute(&self, account: &BankAccount, our_number: &str) -> Result<char, CnabError> {
        self.compute_with(|slot| pad_slot(slot, account, our_number))
    }

    /// Compute the digit with a caller-supplied slot formatter
    pub fn compute_with<F>(&self, mut pad: F) -> Result<char, CnabError>
    where
        F: FnMut(&Slot) -> Result<String, CnabError>,
    {
        let mut digits = String::new();
        for slot in self.inputs {
            digits.push_str(&pad(slot)?);
        }
        self.rule.compute(&digits)
    }
}

impl BankRules {
    /// Agency check digit: the caller's, else the bank's rule, else blank
    pub fn agency_dv(&self, account: &BankAccount) -> Result<String, CnabError> {
        supplied_or_computed(&account.agency_dv, self.agency_dv.as_ref(), account)
    }

    /// Account check digit: the caller's, else the bank's rule, else blank
    pub fn account_dv(&self, account: &BankAccount) -> Result<String, CnabError> {
        supplied_or_computed(&account.account_dv, self.account_dv.as_ref(), account)
    }

    /// Our-number check digit, if the bank uses one
    ///
    /// A digit assigned by the bank (`supplied`) wins over the computed one.
    /// Banks without an our-number digit ignore it.
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` when the supplied digit is not a single letter or
    /// digit.
    pub fn our_number_dv(
        &self,
        account: &BankAccount,
        our_number: &str,
        supplied: Option<&str>,
    ) -> Result<Option<char>, CnabError> {
        let Some(rule) = &self.our_number_dv else {
            return Ok(None);
        };
        match supplied {
            Some(dv) => supplied_digit(dv).map(Some),
            None => rule.compute(account, our_number).map(Some),
        }
    }

    /// Our-number padded to the bank's width, without check digit
    pub fn padded_our_number(
        &self,
        account: &BankAccount,
        our_number: &str,
    ) -> Result<String, CnabError> {
        pad_slot(
            &Slot::new(Source::OurNumber, self.our_number_width),
            account,
            our_number,
        )
    }

    /// Our-number as written in the CNAB240 "nosso número" field
    ///
    /// Agreement prefix (if any), padded number, check digit (if any).
    pub fn our_number_field(
        &self,
        account: &BankAccount,
        our_number: &str,
        supplied_dv: Option<&str>,
    ) -> Result<String, CnabError> {
        let mut field = String::new();
        if let Some(prefix) = &self.our_number_prefix {
            field.push_str(&pad_slot(prefix, account, our_number)?);
        }
        field.push_str(&self.padded_our_number(account, our_number)?);
        if let Some(dv) = self.our_number_dv(account, our_number, supplied_dv)? {
            field.push(dv);
        }
        Ok(field)
    }

    /// Inverse of [`BankRules::our_number_field`]: the bare our-number
    ///
    /// Prefix and check digit are dropped and leading zeros removed.
    pub fn our_number_from_field(&self, field: &str) -> String {
        let chars: Vec<char> = field.trim().chars().collect();
        let start = self
            .our_number_prefix
            .map(|prefix| prefix.width)
            .unwrap_or(0)
            .min(chars.len());
        let end = (start + self.our_number_width).min(chars.len());
        let number: String = chars[start..end].iter().collect();
        strip_zeros(&number)
    }
}

fn supplied_or_computed(
    supplied: &Option<String>,
    rule: Option<&DigitRule>,
    account: &BankAccount,
) -> Result<String, CnabError> {
    if let Some(dv) = supplied {
        return Ok(dv.trim().to_string());
    }
    match rule {
        Some(rule) => rule.compute(account, "").map(String::from),
        None => Ok(String::new()),
    }
}

fn supplied_digit(dv: &str) -> Result<char, CnabError> {
    let mut chars = dv.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Ok(c.to_ascii_uppercase()),
        _ => Err(CnabError::invalid_character("our_number_dv", dv)),
    }
}

/// Remove leading zeros, keeping a single `0` for an all-zero value
pub fn strip_zeros(value: &str) -> String {
    let stripped = value.trim().trim_start_matches('0');
    if stripped.is_empty() && !value.trim().is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_bradesco_our_number_field() {
        let acc = account("1172", "403005", "19", "");
        let rules = rules(Bank::Bradesco);
        assert_eq!(rules.our_number_field(&acc, "2", None).unwrap(), "000000000028");
        assert_eq!(rules.our_number_from_field("000000000028"), "2");
    }

    #[test]
    fn test_banco_do_brasil_prefixes_agreement() {
        let acc = account("4042", "61900", "18", "1234567");
        let rules = rules(Bank::BancoDoBrasil);
        let field = rules.our_number_field(&acc, "55", None).unwrap();
        assert_eq!(field, "12345670000000055");
        assert_eq!(rules.our_number_from_field(&field), "55");
    }

    #[rstest]
    #[case::bank_letter(Bank::Bradesco, Some("p"), Ok(Some('P')))]
    #[case::bank_digit(Bank::Bradesco, Some("3"), Ok(Some('3')))]
    #[case::computed(Bank::Bradesco, None, Ok(Some('8')))]
    #[case::no_rule(Bank::BancoDoBrasil, Some("3"), Ok(None))]
    fn test_supplied_our_number_dv(
        #[case] bank: Bank,
        #[case] supplied: Option<&str>,
        #[case] expected: Result<Option<char>, CnabError>,
    ) {
        let acc = account("1172", "403005", "19", "1234567");
        assert_eq!(rules(bank).our_number_dv(&acc, "2", supplied), expected);
    }

    #[rstest]
    #[case("")]
    #[case("12")]
    #[case("-")]
    fn test_malformed_our_number_dv(#[case] supplied: &str) {
        let acc = account("1172", "403005", "19", "");
        let result = rules(Bank::Bradesco).our_number_dv(&acc, "2", Some(supplied));
        assert!(matches!(result, Err(CnabError::InvalidCharacter { .. })));
    }

    #[test]
    fn test_supplied_our_number_dv_lands_in_field() {
        let acc = account("1172", "403005", "19", "");
        let field = rules(Bank::Bradesco)
            .our_number_field(&acc, "2", Some("P"))
            .unwrap();
        assert_eq!(field, "00000000002P");
        assert_eq!(rules(Bank::Bradesco).our_number_from_field(&field), "2");
    }

    #[test]
    fn test_supplied_dv_wins() {
        let mut acc = account("1172", "403005", "19", "");
        acc.account_dv = Some("7".to_string());
        assert_eq!(rules(Bank::Bradesco).account_dv(&acc).unwrap(), "7");
    }

    #[rstest]
    // 1*2 + 7*3 + 1*4 + 1*5 = 32; 32 % 11 = 10 -> result 1
    #[case(Bank::Bradesco, "1171", "1")]
    // 0*2 + 0*3 + 0*4 + 0*5 -> result 11 -> '0'
    #[case(Bank::Bradesco, "0000", "0")]
    #[case(Bank::Santander, "1234", "")]
    fn test_agency_dv(#[case] bank: Bank, #[case] agency: &str, #[case] expected: &str) {
        let acc = account(agency, "1", "1", "");
        assert_eq!(rules(bank).agency_dv(&acc).unwrap(), expected);
    }

    #[test]
    fn test_pad_slot_overflow() {
        let acc = account("12345", "1", "1", "");
        let result = pad_slot(&Slot::new(Source::Agency, 4), &acc, "");
        assert!(matches!(result, Err(CnabError::FieldOverflow { .. })));
    }

    #[rstest]
    #[case("000123", "123")]
    #[case("0000", "0")]
    #[case("", "")]
    #[case(" 42 ", "42")]
    fn test_strip_zeros(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_zeros(input), expected);
    }
}
