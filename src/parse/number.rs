// Lenient numeric parsing shared by all parsers
//
// Source fields arrive as JSON numbers, numeric strings, or junk. Parsing takes the
// longest numeric prefix of a string ("12.5kt" -> 12.5) and yields NaN when there is none.

use serde_json::Value;

/// Parse the longest leading decimal literal of `text`; NaN if there is none.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - (end + 1);
        end = j;
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when it has at least one digit
    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric view of a JSON field: numbers as-is, strings via [`parse_float`], anything else NaN.
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float(s),
        _ => f64::NAN,
    }
}

/// Numeric view of a JSON field falling back to 0 when it is not a number.
pub fn value_or_zero(value: &Value) -> f64 {
    let v = value_to_f64(value);
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// Text view of a JSON field; null, false and missing fields become "".
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}

/// Map a bearing into [0, 360).
pub fn normalize_bearing(degrees: f64) -> f64 {
    let b = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}
