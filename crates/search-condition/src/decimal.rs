//! Arbitrary-precision decimal comparison on canonical text.
//!
//! Decimals are never converted to floating point or fixed-width integers.
//! Two values are aligned on a common integer width (leading zeros) and a
//! common scale (trailing zeros), after which digit strings compare
//! lexicographically.
//!
//! ```rust
//! use search_condition::{DecimalComparator, NumberLocale};
//!
//! assert!(DecimalComparator::is_equals("100.10", "100.1"));
//! assert!(DecimalComparator::is_higher("3000000000000000000000.00", "2000000000000000000000.00"));
//! assert_eq!(DecimalComparator::higher_value("99.99").unwrap(), "100.00");
//!
//! let nl = NumberLocale::from_tag("nl_NL");
//! assert_eq!(DecimalComparator::sanitize(&nl, "1.000,5").unwrap(), "1000.50");
//! ```

use std::cmp::Ordering;

use crate::comparator::ValueComparator;
use crate::error::{SearchError, SearchResult};
use crate::value::Value;

/// Minimum number of fraction digits in sanitized output.
const MIN_SCALE: usize = 2;

/// Zero code points of the digit scripts accepted by [`DecimalComparator::sanitize`].
const DIGIT_ZEROS: [u32; 7] = [
    0x0030, // ASCII
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0E50, // Thai
    0xFF10, // Fullwidth
];

/// Locale-specific number formatting symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberLocale {
    /// Character separating the integer and fraction parts.
    pub decimal_separator: char,
    /// Characters accepted as thousands grouping in the integer part.
    pub grouping_separators: Vec<char>,
}

impl NumberLocale {
    /// Creates a locale from explicit symbols.
    pub fn new(decimal_separator: char, grouping_separators: impl Into<Vec<char>>) -> Self {
        Self {
            decimal_separator,
            grouping_separators: grouping_separators.into(),
        }
    }

    /// The `C` locale: `.` decimal separator, no grouping.
    pub fn c() -> Self {
        Self::new('.', Vec::new())
    }

    /// Resolves a locale tag such as `nl_NL`, `en-US` or `uz_Arab`.
    ///
    /// Unknown tags fall back to `en_US` conventions.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().replace('-', "_").to_ascii_lowercase();
        let language = tag.split('_').next().unwrap_or_default();

        match tag.as_str() {
            "c" | "posix" => return Self::c(),
            "de_ch" | "it_ch" | "fr_ch" => return Self::new('.', vec!['\'', '\u{2019}']),
            "uz_arab" | "uz_arab_af" => return Self::new('\u{066B}', vec!['\u{066C}']),
            _ => {}
        }

        match language {
            "nl" | "de" | "es" | "it" | "pt" | "id" | "da" | "tr" | "el" | "ro" => {
                Self::new(',', vec!['.'])
            }
            "fr" | "ru" | "pl" | "cs" | "sk" | "sv" | "nb" | "fi" | "uk" | "hu" => {
                Self::new(',', vec![' ', '\u{00A0}', '\u{202F}'])
            }
            "ar" | "fa" | "ps" => Self::new('\u{066B}', vec!['\u{066C}']),
            _ => Self::new('.', vec![',']),
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::from_tag("en_US")
    }
}

/// A decimal split into its sign and ASCII digit parts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DecimalParts<'a> {
    negative: bool,
    int: &'a str,
    frac: &'a str,
}

impl<'a> DecimalParts<'a> {
    /// Splits a value matching `[+-]?\d+(\.\d+)?`.
    fn split(value: &'a str) -> Option<Self> {
        let (negative, unsigned) = match value.as_bytes().first()? {
            b'-' => (true, &value[1..]),
            b'+' => (false, &value[1..]),
            _ => (false, value),
        };

        let (int, frac) = match unsigned.split_once('.') {
            Some((int, frac)) => {
                if frac.is_empty() {
                    return None;
                }
                (int, frac)
            }
            None => (unsigned, ""),
        };

        if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self { negative, int, frac })
    }

    fn is_zero(&self) -> bool {
        self.int.bytes().all(|b| b == b'0') && self.frac.bytes().all(|b| b == b'0')
    }

    /// Sign that treats `-0` as non-negative.
    fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }
}

/// Pads both operands to a common integer width and scale.
fn align(a: &DecimalParts<'_>, b: &DecimalParts<'_>) -> (String, String) {
    let width = a.int.len().max(b.int.len());
    let scale = a.frac.len().max(b.frac.len());

    let pad = |p: &DecimalParts<'_>| {
        format!(
            "{:0>width$}{:0<scale$}",
            p.int,
            p.frac,
            width = width,
            scale = scale
        )
    };

    (pad(a), pad(b))
}

fn compare_magnitude(a: &DecimalParts<'_>, b: &DecimalParts<'_>) -> Ordering {
    let (a, b) = align(a, b);
    a.cmp(&b)
}

fn compare_parts(a: &DecimalParts<'_>, b: &DecimalParts<'_>) -> Ordering {
    match (a.is_negative(), b.is_negative()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_magnitude(a, b),
        (true, true) => compare_magnitude(b, a),
    }
}

/// Maps a decimal digit of any supported script to its value.
fn digit_value(c: char) -> Option<u8> {
    let code = c as u32;
    DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .map(|&zero| (code - zero) as u8)
}

/// Comparator for decimal numbers held as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalComparator;

impl DecimalComparator {
    /// Creates a new comparator.
    pub fn new() -> Self {
        Self
    }

    /// Parses locale-formatted input into a canonical decimal string.
    ///
    /// The result is `[-]int.frac` with at least two fraction digits and no
    /// leading zeros in the integer part (a lone `0` is kept).
    pub fn sanitize(locale: &NumberLocale, input: &str) -> SearchResult<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SearchError::format(input, "empty input"));
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let (negative, start) = match chars[0] {
            '-' | '\u{2212}' => (true, 1),
            '+' => (false, 1),
            _ => (false, 0),
        };

        let mut int = String::new();
        let mut frac = String::new();
        let mut in_fraction = false;

        for i in start..chars.len() {
            let c = chars[i];

            if let Some(d) = digit_value(c) {
                let target = if in_fraction { &mut frac } else { &mut int };
                target.push(char::from(b'0' + d));
                continue;
            }

            if c == locale.decimal_separator && !in_fraction {
                in_fraction = true;
                continue;
            }

            if !in_fraction && locale.grouping_separators.contains(&c) {
                let prev_is_digit = i > start && digit_value(chars[i - 1]).is_some();
                let next_is_digit = chars.get(i + 1).and_then(|&n| digit_value(n)).is_some();
                if prev_is_digit && next_is_digit {
                    continue;
                }
                return Err(SearchError::format(input, "misplaced grouping separator"));
            }

            return Err(SearchError::format(
                input,
                format!("unexpected character '{}'", c),
            ));
        }

        if int.is_empty() && frac.is_empty() {
            return Err(SearchError::format(input, "no digits"));
        }
        if in_fraction && frac.is_empty() {
            return Err(SearchError::format(input, "missing fraction digits"));
        }

        let int = int.trim_start_matches('0');
        let int = if int.is_empty() { "0" } else { int };
        while frac.len() < MIN_SCALE {
            frac.push('0');
        }

        let is_zero = int == "0" && frac.bytes().all(|b| b == b'0');
        let sign = if negative && !is_zero { "-" } else { "" };

        Ok(format!("{}{}.{}", sign, int, frac))
    }

    /// Returns true when `value` is a well-formed decimal (`[+-]?\d+(\.\d+)?`).
    pub fn validate(value: &str) -> bool {
        DecimalParts::split(value).is_some()
    }

    /// Scale-independent numeric equality; false when either side is malformed.
    pub fn is_equals(a: &str, b: &str) -> bool {
        Self::compare(a, b) == Some(Ordering::Equal)
    }

    /// True when `a < b`; false when either side is malformed.
    pub fn is_lower(a: &str, b: &str) -> bool {
        Self::compare(a, b) == Some(Ordering::Less)
    }

    /// True when `a > b`; false when either side is malformed.
    pub fn is_higher(a: &str, b: &str) -> bool {
        Self::compare(a, b) == Some(Ordering::Greater)
    }

    /// Total order on well-formed decimals.
    pub fn compare(a: &str, b: &str) -> Option<Ordering> {
        let a = DecimalParts::split(a)?;
        let b = DecimalParts::split(b)?;
        Some(compare_parts(&a, &b))
    }

    /// Returns the smallest value strictly higher than `value` at its own scale.
    ///
    /// `100.01` becomes `100.02`, `99.99` becomes `100.00` and `-0.01`
    /// becomes `0.00`.
    pub fn higher_value(value: &str) -> SearchResult<String> {
        let parts = DecimalParts::split(value)
            .ok_or_else(|| SearchError::format(value, "not a canonical decimal"))?;

        let int_len = parts.int.len();
        let mut digits: Vec<u8> = parts
            .int
            .bytes()
            .chain(parts.frac.bytes())
            .map(|b| b - b'0')
            .collect();

        let negative = parts.is_negative();
        let mut int_len = int_len;

        if negative {
            // Moving towards zero: subtract one unit of the last place.
            for d in digits.iter_mut().rev() {
                if *d == 0 {
                    *d = 9;
                } else {
                    *d -= 1;
                    break;
                }
            }
        } else {
            let mut carry = true;
            for d in digits.iter_mut().rev() {
                if *d == 9 {
                    *d = 0;
                } else {
                    *d += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                digits.insert(0, 1);
                int_len += 1;
            }
        }

        let render = |range: &[u8]| range.iter().map(|d| char::from(b'0' + d)).collect::<String>();
        let mut int = render(&digits[..int_len]);
        let frac = render(&digits[int_len..]);

        if negative && int.len() > 1 && int.starts_with('0') {
            int = int.trim_start_matches('0').to_string();
            if int.is_empty() {
                int.push('0');
            }
        }

        let is_zero = digits.iter().all(|&d| d == 0);
        let sign = if negative && !is_zero { "-" } else { "" };

        if frac.is_empty() {
            Ok(format!("{}{}", sign, int))
        } else {
            Ok(format!("{}{}.{}", sign, int, frac))
        }
    }
}

impl ValueComparator for DecimalComparator {
    fn ordering(&self, a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Decimal(_) | Value::Integer(_), Value::Decimal(_) | Value::Integer(_)) => {
                DecimalComparator::compare(&a.to_string(), &b.to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_latin() {
        let en = NumberLocale::from_tag("en_US");
        assert_eq!(DecimalComparator::sanitize(&en, "100.00").unwrap(), "100.00");
        assert_eq!(DecimalComparator::sanitize(&en, "1,234.5").unwrap(), "1234.50");
        assert_eq!(DecimalComparator::sanitize(&en, "0012").unwrap(), "12.00");
        assert_eq!(DecimalComparator::sanitize(&en, ".5").unwrap(), "0.50");
        assert_eq!(DecimalComparator::sanitize(&en, "-0.000").unwrap(), "0.000");
        assert_eq!(DecimalComparator::sanitize(&en, "1.12345").unwrap(), "1.12345");
    }

    #[test]
    fn test_sanitize_comma_locale() {
        let nl = NumberLocale::from_tag("nl_NL");
        assert_eq!(DecimalComparator::sanitize(&nl, "100,10").unwrap(), "100.10");
        assert_eq!(DecimalComparator::sanitize(&nl, "-1.000.000,1").unwrap(), "-1000000.10");
    }

    #[test]
    fn test_sanitize_arabic_script() {
        let uz = NumberLocale::from_tag("uz_Arab");
        assert_eq!(DecimalComparator::sanitize(&uz, "۵٫۵").unwrap(), "5.50");
        let ar = NumberLocale::from_tag("ar_EG");
        assert_eq!(DecimalComparator::sanitize(&ar, "١٬٢٣٤٫٥").unwrap(), "1234.50");
    }

    #[test]
    fn test_sanitize_rejects() {
        let en = NumberLocale::from_tag("en_US");
        for input in ["", "abc", "1.2.3", ",100", "100,", "1,,000", "5.", "1e5", "--1"] {
            assert!(
                matches!(DecimalComparator::sanitize(&en, input), Err(SearchError::Format { .. })),
                "expected format error for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_validate() {
        assert!(DecimalComparator::validate("100"));
        assert!(DecimalComparator::validate("-100.10"));
        assert!(DecimalComparator::validate("+0.5"));
        assert!(!DecimalComparator::validate("100,10"));
        assert!(!DecimalComparator::validate("100."));
        assert!(!DecimalComparator::validate(".5"));
        assert!(!DecimalComparator::validate(""));
        assert!(!DecimalComparator::validate("-"));
    }

    #[test]
    fn test_signed_ordering() {
        assert!(DecimalComparator::is_lower("-5.00", "1.00"));
        assert!(DecimalComparator::is_lower("-5.00", "-4.99"));
        assert!(DecimalComparator::is_higher("-0.01", "-0.10"));
        assert!(DecimalComparator::is_equals("-0.00", "0"));
    }

    #[test]
    fn test_malformed_never_compares() {
        assert!(!DecimalComparator::is_equals("abc", "abc"));
        assert!(!DecimalComparator::is_lower("1", "x"));
        assert!(!DecimalComparator::is_higher("x", "1"));
    }

    #[test]
    fn test_higher_value_without_fraction() {
        assert_eq!(DecimalComparator::higher_value("9").unwrap(), "10");
        assert_eq!(DecimalComparator::higher_value("41").unwrap(), "42");
    }

    #[test]
    fn test_higher_value_negative() {
        assert_eq!(DecimalComparator::higher_value("-1.00").unwrap(), "-0.99");
        assert_eq!(DecimalComparator::higher_value("-0.01").unwrap(), "0.00");
        assert_eq!(DecimalComparator::higher_value("-10").unwrap(), "-9");
    }

    #[test]
    fn test_higher_value_rejects_malformed() {
        assert!(DecimalComparator::higher_value("1,00").is_err());
    }

    #[test]
    fn test_value_comparator_mixes_integers() {
        let cmp = DecimalComparator::new();
        assert!(cmp.equals(&Value::Integer(100), &Value::Decimal("100.00".into())));
        assert!(cmp.lower_than(&Value::Integer(99), &Value::Decimal("99.01".into())));
        assert!(!cmp.equals(&Value::Integer(1), &Value::Text("1".into())));
    }
}
