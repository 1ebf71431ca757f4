//! Lenient cell decoders used by the input models.
//!
//! Dumps written by dataframe tools carry `NaN`, empty cells and float
//! renderings of integers (`"12.0"`). Identifiers must still decode;
//! everything else degrades to zero or `None`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parse a numeric cell, treating blanks and `NaN` as missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer identifier, accepting `"42"` and `"42.0"`.
pub fn parse_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    parse_number(trimmed)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

fn cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(d)
}

/// Required integer identifier.
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let raw = cell(d)?.unwrap_or_default();
    parse_id(&raw).ok_or_else(|| D::Error::custom(format!("invalid identifier '{}'", raw)))
}

/// Optional integer identifier; blanks and garbage become `None`.
pub fn optional_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(cell(d)?.as_deref().and_then(parse_id))
}

/// Stat counter; blanks and garbage count as zero.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(cell(d)?
        .as_deref()
        .and_then(parse_number)
        .map(|v| v.round() as i64)
        .unwrap_or(0))
}

pub fn optional_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(cell(d)?.as_deref().and_then(parse_number))
}

/// Trimmed text, empty when blank.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(cell(d)?.map(|s| s.trim().to_string()).unwrap_or_default())
}

/// Trimmed text, `None` when blank or `NaN`.
pub fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(cell(d)?.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_blank_and_nan() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("  "), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("3"), Some(3.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_id_accepts_float_rendering() {
        assert_eq!(parse_id("148"), Some(148));
        assert_eq!(parse_id("148.0"), Some(148));
        assert_eq!(parse_id("148.5"), None);
        assert_eq!(parse_id("abc"), None);
    }
}
