//! Field validators: pure predicates and normalizers over a single value.
//!
//! Nothing here touches storage or the entity model, so every function can be
//! table-tested on its own.

use regex::Regex;
use std::sync::OnceLock;

const NATIONAL_ID_LEN: usize = 11;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
    })
}

/// Keep only ASCII digits, e.g. "529.982.247-25" -> "52998224725".
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// True when the value is empty or whitespace only.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Inclusive range check.
pub fn within<T: PartialOrd>(value: T, min: T, max: T) -> bool {
    value >= min && value <= max
}

/// CPF check: 11 digits after stripping punctuation, not all the same digit,
/// and both check digits matching.
pub fn validate_national_id(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != NATIONAL_ID_LEN {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted mod-11 digit over `prefix`; weights run from `prefix.len() + 1` down to 2.
fn check_digit(prefix: &[u32]) -> u32 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 {
        0
    } else {
        digit
    }
}

pub fn validate_email(raw: &str) -> bool {
    email_pattern().is_match(raw)
}

/// 10 (landline) or 11 (mobile) digits once punctuation is removed.
pub fn validate_phone(raw: &str) -> bool {
    matches!(digits_only(raw).len(), 10 | 11)
}

/// `XXX.XXX.XXX-XX`, or `None` when the id does not validate.
pub fn format_national_id(raw: &str) -> Option<String> {
    if !validate_national_id(raw) {
        return None;
    }
    let d = digits_only(raw);
    Some(format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]))
}

/// `(XX) XXXXX-XXXX` for mobiles, `(XX) XXXX-XXXX` for landlines, `None` otherwise.
pub fn format_phone(raw: &str) -> Option<String> {
    if !validate_phone(raw) {
        return None;
    }
    let d = digits_only(raw);
    let split = d.len() - 4;
    Some(format!("({}) {}-{}", &d[0..2], &d[2..split], &d[split..]))
}
