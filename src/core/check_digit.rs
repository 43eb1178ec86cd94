//! Check-digit engine
//!
//! Modulo-10 and modulo-11 digits as used by Brazilian banking identifiers.
//! A [`CheckDigitRule`] is pure data: the engine knows nothing about the
//! field it protects.
//!
//! # Modulo 11
//!
//! Digits are multiplied right-to-left by the rule's weight cycle (restarting
//! at the first weight after the last), the products summed, and
//! `result = 11 - sum % 11`. Results listed in the rule's overrides are
//! replaced by the mapped character; any other result of 10 or more becomes
//! `0`.
//!
//! # Modulo 10
//!
//! Weights alternate 2, 1 from the right; products above 9 contribute the sum
//! of their digits; `digit = (10 - sum % 10) % 10`.

use crate::types::CnabError;

/// Which algorithm a rule uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulus {
    Ten,
    Eleven,
}

/// Weights, modulus and result mapping of one check digit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDigitRule {
    pub modulus: Modulus,
    /// Weight cycle applied from the rightmost digit
    pub weights: &'static [u32],
    /// `(result, digit)` replacements, keyed by `11 - remainder`
    pub overrides: &'static [(u32, char)],
}

impl CheckDigitRule {
    pub const fn modulo11(weights: &'static [u32], overrides: &'static [(u32, char)]) -> Self {
        CheckDigitRule {
            modulus: Modulus::Eleven,
            weights,
            overrides,
        }
    }

    pub const fn modulo10() -> Self {
        CheckDigitRule {
            modulus: Modulus::Ten,
            weights: &[2, 1],
            overrides: &[],
        }
    }

    /// Compute the check digit of a digit sequence
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` if `digits` is empty or contains anything but ASCII digits.
    pub fn compute(&self, digits: &str) -> Result<char, CnabError> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CnabError::invalid_character("digits", digits));
        }

        let weighted = digits
            .bytes()
            .rev()
            .map(|b| u32::from(b - b'0'))
            .zip(self.weights.iter().cycle());

        match self.modulus {
            Modulus::Ten => {
                let sum: u32 = weighted
                    .map(|(digit, weight)| {
                        let product = digit * weight;
                        product / 10 + product % 10
                    })
                    .sum();
                Ok(digit_char((10 - sum % 10) % 10))
            }
            Modulus::Eleven => {
                let sum: u32 = weighted.map(|(digit, weight)| digit * weight).sum();
                let result = 11 - sum % 11;
                if let Some(&(_, mapped)) = self.overrides.iter().find(|(r, _)| *r == result) {
                    return Ok(mapped);
                }
                if result >= 10 {
                    Ok('0')
                } else {
                    Ok(digit_char(result))
                }
            }
        }
    }

    /// Whether `dv` is the check digit of `digits`
    pub fn verify(&self, digits: &str, dv: char) -> bool {
        self.compute(digits).map(|c| c == dv).unwrap_or(false)
    }
}

fn digit_char(d: u32) -> char {
    char::from_digit(d, 10).unwrap_or('0')
}

/// Modulo 10 with the 2/1 cycle
pub const MODULO_10: CheckDigitRule = CheckDigitRule::modulo10();

/// Barcode general check digit (FEBRABAN): results 0, 1, 10 and 11 become 1
pub const FEBRABAN_BARCODE: CheckDigitRule = CheckDigitRule::modulo11(
    &[2, 3, 4, 5, 6, 7, 8, 9],
    &[(0, '1'), (1, '1'), (10, '1'), (11, '1')],
);

/// Plain modulo 11 over 2..9 without overrides
pub const MODULO_11: CheckDigitRule = CheckDigitRule::modulo11(&[2, 3, 4, 5, 6, 7, 8, 9], &[]);

/// Banco do Brasil agency and account digits
pub const BANCO_DO_BRASIL_ACCOUNT: CheckDigitRule =
    CheckDigitRule::modulo11(&[2, 3, 4, 5, 6, 7, 8, 9], &[(10, 'X'), (11, '0')]);

/// Santander our-number digit
pub const SANTANDER_OUR_NUMBER: CheckDigitRule =
    CheckDigitRule::modulo11(&[2, 3, 4, 5, 6, 7, 8, 9], &[(10, '0'), (11, '0')]);

/// Bradesco our-number digit, computed over wallet + our-number
pub const BRADESCO_OUR_NUMBER: CheckDigitRule =
    CheckDigitRule::modulo11(&[2, 3, 4, 5, 6, 7], &[(10, 'P'), (11, '0')]);

/// Bradesco agency digit
pub const BRADESCO_AGENCY: CheckDigitRule =
    CheckDigitRule::modulo11(&[2, 3, 4, 5], &[(10, 'P'), (11, '0')]);

/// Bradesco account digit
pub const BRADESCO_ACCOUNT: CheckDigitRule =
    CheckDigitRule::modulo11(&[2, 3, 4, 5, 6, 7], &[(10, 'P'), (11, '0')]);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_modulo11_golden_value() {
        // 9*2 + 8*3 + 7*4 + 6*5 + 5*6 + 4*7 + 3*8 + 2*9 + 1*2 = 202; 202 % 11 = 4
        let rule = CheckDigitRule::modulo11(&[2, 3, 4, 5, 6, 7, 8, 9], &[]);
        assert_eq!(rule.compute("123456789").unwrap(), '7');
        assert_eq!(rule.compute("123456789").unwrap(), '7');
    }

    #[rstest]
    #[case::single_digit("0", '0')]
    #[case::doubled_over_nine("5", '9')]
    // 3*2 + 3 + (5*2 -> 1) + 1 + (6*2 -> 3) + 2 = 16
    #[case::known("261533", '4')]
    #[case::febraban_block("001900000", '9')]
    fn test_modulo10(#[case] digits: &str, #[case] expected: char) {
        assert_eq!(MODULO_10.compute(digits).unwrap(), expected);
    }

    #[rstest]
    // sum 0 -> remainder 0 -> result 11
    #[case::result_eleven(FEBRABAN_BARCODE, "0000", '1')]
    #[case::result_eleven_santander(SANTANDER_OUR_NUMBER, "0000", '0')]
    #[case::result_eleven_bradesco(BRADESCO_AGENCY, "0000", '0')]
    // 5*2 = 10 -> remainder 10 -> result 1
    #[case::result_one(MODULO_11, "5", '1')]
    // "6" * 2 = 12 -> remainder 1 -> result 10
    #[case::result_ten_unmapped(MODULO_11, "6", '0')]
    #[case::result_ten_bradesco(BRADESCO_ACCOUNT, "6", 'P')]
    #[case::result_ten_bb(BANCO_DO_BRASIL_ACCOUNT, "6", 'X')]
    #[case::result_ten_barcode(FEBRABAN_BARCODE, "6", '1')]
    fn test_modulo11_overrides(
        #[case] rule: CheckDigitRule,
        #[case] digits: &str,
        #[case] expected: char,
    ) {
        assert_eq!(rule.compute(digits).unwrap(), expected);
    }

    #[test]
    fn test_weight_cycle_restarts() {
        // Ten digits with weights [2, 3]: pairs from the right are 1*2 + 1*3
        let rule = CheckDigitRule::modulo11(&[2, 3], &[]);
        // sum = 5 * (2 + 3) = 25; 25 % 11 = 3; result 8
        assert_eq!(rule.compute("1111111111").unwrap(), '8');
    }

    #[test]
    fn test_bradesco_our_number() {
        // wallet 19 + our-number 00000000002: 2*2 + 9*7 + 1*2 = 69; 69 % 11 = 3 -> result 8
        assert_eq!(BRADESCO_OUR_NUMBER.compute("1900000000002").unwrap(), '8');
    }

    #[rstest]
    #[case("")]
    #[case("12a4")]
    #[case("12 4")]
    fn test_rejects_non_digits(#[case] digits: &str) {
        assert!(matches!(
            MODULO_11.compute(digits),
            Err(CnabError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_verify() {
        assert!(MODULO_11.verify("123456789", '7'));
        assert!(!MODULO_11.verify("123456789", '6'));
        assert!(!MODULO_11.verify("12x", '0'));
    }
}
