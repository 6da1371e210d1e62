//! Keystroke-level normalization of raw input.
//!
//! Transforms only constrain what gets stored; they never report
//! validation errors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const CARD_DIGITS: usize = 16;
pub const EXPIRY_SEPARATOR: &str = " / ";

/// Input mask applied on every change event before the value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputMask {
    /// Digits grouped by four, at most sixteen digits.
    CardNumber,
    /// `MM / YY`.
    Expiry,
    /// Stored as a JSON number when the text parses, raw text otherwise.
    Numeric,
    /// International format with the selected country's calling code.
    Phone,
}

/// Normalization applied when a field loses focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlurAction {
    /// Round numbers down to a whole value.
    Floor,
}

/// Applies `mask` to the raw text of a change event. `previous` is the
/// stored value before the keystroke, `calling_code` the default prefix for
/// phone numbers (digits only, no `+`).
pub fn apply_mask(
    mask: InputMask,
    previous: Option<&Value>,
    raw: &str,
    calling_code: Option<&str>,
) -> Value {
    match mask {
        InputMask::CardNumber => {
            let previous = previous.and_then(Value::as_str).unwrap_or_default();
            Value::String(group_card_number(previous, raw))
        }
        InputMask::Expiry => Value::String(format_expiry(raw)),
        InputMask::Numeric => coerce_numeric(raw),
        InputMask::Phone => Value::String(normalize_phone(raw, calling_code)),
    }
}

/// Strips whitespace and regroups the digits in blocks of four. Input that
/// is not all digits or longer than sixteen digits is rejected by returning
/// `previous` unchanged.
pub fn group_card_number(previous: &str, raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if digits.is_empty() {
        return String::new();
    }
    if digits.len() > CARD_DIGITS || !digits.iter().all(char::is_ascii_digit) {
        return previous.to_string();
    }
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps digits only and inserts the separator once a third digit arrives.
pub fn format_expiry(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() > 2 {
        format!("{}{}{}", &digits[..2], EXPIRY_SEPARATOR, &digits[2..])
    } else {
        digits
    }
}

pub fn coerce_numeric(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::Number(integer.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Rewrites a phone number into `+<calling code><subscriber>`.
///
/// Numbers typed with a leading `+` keep their own code. Local numbers lose
/// their trunk zeros and get `calling_code` prepended. Text containing
/// characters a phone number cannot hold is kept as typed so validation can
/// reject it.
pub fn normalize_phone(raw: &str, calling_code: Option<&str>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let allowed = |ch: char| ch.is_ascii_digit() || matches!(ch, ' ' | '-' | '(' | ')' | '+');
    if !trimmed.chars().all(allowed) {
        return trimmed.to_string();
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return trimmed.to_string();
    }
    if trimmed.starts_with('+') {
        return format!("+{digits}");
    }

    let subscriber = digits.trim_start_matches('0');
    match calling_code.filter(|code| !code.is_empty()) {
        Some(code) => format!("+{code}{subscriber}"),
        None => digits,
    }
}

pub fn apply_blur(action: BlurAction, value: &Value) -> Option<Value> {
    match action {
        BlurAction::Floor => {
            let number = match value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            let floored = number.floor();
            if floored.abs() < i64::MAX as f64 {
                Some(Value::Number((floored as i64).into()))
            } else {
                Number::from_f64(floored).map(Value::Number)
            }
        }
    }
}
