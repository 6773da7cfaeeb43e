//! Indian currency helpers.
//!
//! Prices are stored as whole rupees. Labels use the lakh (1,00,000) and
//! crore (1,00,00,000) abbreviations the listing UI shows.

pub const LAKH: i64 = 100_000;
pub const CRORE: i64 = 10_000_000;

/// Compact rupee label: `"12.0L"`, `"1.5Cr"`, or the plain number below one lakh.
pub fn format_inr_compact(amount: i64) -> String {
    if amount >= CRORE {
        format!("{:.1}Cr", amount as f64 / CRORE as f64)
    } else if amount >= LAKH {
        format!("{:.1}L", amount as f64 / LAKH as f64)
    } else {
        amount.to_string()
    }
}

/// Parses an untrusted price bound. Anything that is not a finite,
/// non-negative number yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr_compact() {
        assert_eq!(format_inr_compact(0), "0");
        assert_eq!(format_inr_compact(95_000), "95000");
        assert_eq!(format_inr_compact(200_000), "2.0L");
        assert_eq!(format_inr_compact(1_200_000), "12.0L");
        assert_eq!(format_inr_compact(15_000_000), "1.5Cr");
        assert_eq!(format_inr_compact(20_000_000), "2.0Cr");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1500000"), Some(1_500_000.0));
        assert_eq!(parse_price(" 2.5 "), Some(2.5));
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("-10"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price(""), None);
    }
}
