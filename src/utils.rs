// Utility functions
use regex::Regex;
use std::sync::LazyLock;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?").expect("decimal pattern is valid")
});

/// Returns the first decimal number found in `text`, e.g. `£51.77` -> `51.77`.
pub fn first_decimal(text: &str) -> Option<f64> {
    DECIMAL
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Trims and collapses runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a stored price. Negative, non-finite or unparsable values are rejected.
pub fn parse_stored_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_decimal_skips_currency_symbols() {
        assert_eq!(first_decimal("£51.77"), Some(51.77));
        assert_eq!(first_decimal("  Â£13.99 "), Some(13.99));
        assert_eq!(first_decimal("price: 20"), Some(20.0));
        assert_eq!(first_decimal("free"), None);
    }

    #[test]
    fn collapse_whitespace_normalizes_availability_text() {
        assert_eq!(
            collapse_whitespace("\n\n    \n        In stock (22 available)\n    \n"),
            "In stock (22 available)"
        );
    }

    #[test]
    fn stored_price_rejects_garbage() {
        assert_eq!(parse_stored_price("12.50"), Some(12.5));
        assert_eq!(parse_stored_price(" 7 "), Some(7.0));
        assert_eq!(parse_stored_price(""), None);
        assert_eq!(parse_stored_price("abc"), None);
        assert_eq!(parse_stored_price("-3.00"), None);
        assert_eq!(parse_stored_price("NaN"), None);
        assert_eq!(parse_stored_price("inf"), None);
    }
}
