//! Decimal TON ↔ nanoton conversion.
//!
//! Monetary amounts are integers end to end; the decimal point only exists
//! at the CLI boundary.

use anyhow::{bail, Result};

const DECIMALS: usize = 9;

/// Parse a decimal TON amount ("1", "0.05", "12.340") into nanotons.
pub fn parse_tons(amount: &str) -> Result<u128> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();
    if amount.is_empty() || parts.len() > 2 || parts[0].starts_with('-') {
        bail!("invalid amount: {}", amount);
    }

    let whole = parts[0];
    let fraction = parts.get(1).copied().unwrap_or("");
    if fraction.len() > DECIMALS {
        bail!(
            "invalid amount: {} (at most {} decimal places)",
            amount,
            DECIMALS
        );
    }

    let mut digits = String::with_capacity(whole.len() + DECIMALS);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in 0..DECIMALS - fraction.len() {
        digits.push('0');
    }

    digits
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid amount: {}", amount))
}

/// Format nanotons as a decimal TON string, trimming trailing zeros.
pub fn format_tons(nanotons: u128) -> String {
    let whole = nanotons / 1_000_000_000;
    let fraction = nanotons % 1_000_000_000;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:09}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Format nanotons with the currency suffix.
pub fn format_amount(nanotons: u128) -> String {
    format!("{} TON", format_tons(nanotons))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_amounts() {
        assert_eq!(parse_tons("1").unwrap(), 1_000_000_000);
        assert_eq!(parse_tons("0").unwrap(), 0);
        assert_eq!(parse_tons("250").unwrap(), 250_000_000_000);
    }

    #[test]
    fn test_parse_fractional_amounts() {
        assert_eq!(parse_tons("0.05").unwrap(), 50_000_000);
        assert_eq!(parse_tons("1.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_tons("0.000000001").unwrap(), 1);
        assert_eq!(parse_tons("12.340").unwrap(), 12_340_000_000);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_tons("").is_err());
        assert!(parse_tons("-1").is_err());
        assert!(parse_tons("1.2.3").is_err());
        assert!(parse_tons("0.0000000001").is_err());
        assert!(parse_tons("abc").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_tons(0), "0");
        assert_eq!(format_tons(1_000_000_000), "1");
        assert_eq!(format_tons(1_500_000_000), "1.5");
        assert_eq!(format_tons(1), "0.000000001");
        assert_eq!(format_amount(5_000_000_000), "5 TON");
    }

    #[test]
    fn test_roundtrip() {
        for text in ["0.05", "3", "1.5", "123.456789012"] {
            let nano = parse_tons(text).unwrap();
            assert_eq!(parse_tons(&format_tons(nano)).unwrap(), nano);
        }
    }
}
