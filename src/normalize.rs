//! Field-level coercion helpers used while building catalog entities.
//!
//! Raw cell values arrive as trimmed strings from the record parser; these
//! functions turn them into the typed fields the catalog stores. All of them
//! absorb malformed input into defined defaults; one bad cell must never
//! abort a catalog load.

/// Highest representable price. Values above this are clamped, not rejected.
pub const MAX_PRICE: f64 = 999.99;

/// Collapse a human-facing identifier into a lookup key: trimmed, lowercased,
/// with grouping punctuation (spaces, hyphens, underscores) removed.
///
/// The display value is kept verbatim elsewhere; this key is only ever used
/// for map lookups and comparisons. Idempotent by construction.
pub fn norm_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse the leading integer of a string; anything unparseable yields 0.
pub fn coerce_int(s: &str) -> i64 {
    let t = s.trim();
    let mut end = 0;
    for (i, c) in t.char_indices() {
        if c == '-' && i == 0 {
            end = c.len_utf8();
        } else if c.is_ascii_digit() {
            end = i + 1;
        } else {
            break;
        }
    }
    t[..end].parse().unwrap_or(0)
}

/// Parse a currency amount out of arbitrary text.
///
/// Strips everything except digits, the decimal point, and a sign, then
/// parses as a decimal. Negative amounts clamp to 0.00, amounts above
/// [`MAX_PRICE`] clamp down to it, and the result is rounded to cents.
///
/// Returns `None` when no number can be extracted at all; 0.00 is a valid
/// price, so "unknown" must stay distinguishable from "free".
pub fn coerce_price(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let clamped = value.clamp(0.0, MAX_PRICE);
    Some((clamped * 100.0).round() / 100.0)
}

/// Trim a raw string field. Empty stays empty, never `None`.
pub fn clean_str(s: &str) -> String {
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_key_strips_grouping() {
        assert_eq!(norm_key("  ACM-100 "), "acm100");
        assert_eq!(norm_key("Model_ID 7"), "modelid7");
        assert_eq!(norm_key("WB2X9154"), "wb2x9154");
    }

    #[test]
    fn test_norm_key_idempotent() {
        for s in ["ACM-100", " a b_c-D ", "", "Ä-ö"] {
            assert_eq!(norm_key(&norm_key(s)), norm_key(s));
        }
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int("42"), 42);
        assert_eq!(coerce_int(" 7 rows"), 7);
        assert_eq!(coerce_int("-3"), -3);
        assert_eq!(coerce_int(""), 0);
        assert_eq!(coerce_int("n/a"), 0);
    }

    #[test]
    fn test_coerce_price_clamps_high() {
        assert_eq!(coerce_price("$1,234.56"), Some(999.99));
    }

    #[test]
    fn test_coerce_price_negative_to_zero() {
        assert_eq!(coerce_price("-5"), Some(0.0));
    }

    #[test]
    fn test_coerce_price_unparseable_is_none() {
        assert_eq!(coerce_price(""), None);
        assert_eq!(coerce_price("call for price"), None);
    }

    #[test]
    fn test_coerce_price_rounds_to_cents() {
        assert_eq!(coerce_price("12.999"), Some(13.0));
        assert_eq!(coerce_price("USD 3.10"), Some(3.1));
    }

    #[test]
    fn test_clean_str() {
        assert_eq!(clean_str("  x "), "x");
        assert_eq!(clean_str("   "), "");
    }
}
