//! Fixed-point token amount conversion.
//!
//! Token quantities travel as integers scaled by the token's decimal places
//! (6 for the configured token). User input is parsed exactly, never through
//! floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::TransferError;

/// Convert a user-entered decimal string into base units.
///
/// Rejects non-numeric input, negative amounts, and amounts with more
/// fractional digits than the token carries. `"1.5"` at 6 decimals yields
/// `1_500_000`; `"0"` yields 0.
pub fn to_base_units(amount: &str, decimals: u32) -> Result<u128, TransferError> {
    let parsed: Decimal = amount
        .trim()
        .parse()
        .map_err(|_| TransferError::InvalidAmount(amount.to_string()))?;

    if parsed.is_sign_negative() {
        return Err(TransferError::InvalidAmount(amount.to_string()));
    }

    let factor = Decimal::from(10u64.pow(decimals));
    let scaled = parsed
        .checked_mul(factor)
        .ok_or_else(|| TransferError::InvalidAmount(amount.to_string()))?;

    if !scaled.fract().is_zero() {
        return Err(TransferError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            amount, decimals
        )));
    }

    scaled
        .to_u128()
        .ok_or_else(|| TransferError::InvalidAmount(amount.to_string()))
}

/// Format base units back into a decimal string for display.
///
/// Trailing zeros are trimmed but one fractional digit is always kept, so
/// `2_000_000` at 6 decimals reads `"2.0"`.
pub fn from_base_units(value: u128, decimals: u32) -> String {
    let factor = 10u128.pow(decimals);
    let whole = value / factor;
    let frac = value % factor;

    let frac_str = format!("{:0width$}", frac, width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');

    if trimmed.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units("1.5", 6).unwrap(), 1_500_000);
        assert_eq!(to_base_units("0", 6).unwrap(), 0);
        assert_eq!(to_base_units("10", 6).unwrap(), 10_000_000);
        assert_eq!(to_base_units("0.000001", 6).unwrap(), 1);
        assert_eq!(to_base_units(" 2.25 ", 6).unwrap(), 2_250_000);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(to_base_units("abc", 6).is_err());
        assert!(to_base_units("", 6).is_err());
        assert!(to_base_units("1.5.5", 6).is_err());
        assert!(to_base_units("1,5", 6).is_err());
    }

    #[test]
    fn test_rejects_negative() {
        assert!(to_base_units("-1", 6).is_err());
        assert!(to_base_units("-0.5", 6).is_err());
    }

    #[test]
    fn test_rejects_excess_precision() {
        assert!(to_base_units("0.0000001", 6).is_err());
        assert!(to_base_units("1.1234567", 6).is_err());
        // Exactly at the limit is fine
        assert!(to_base_units("1.123456", 6).is_ok());
    }

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(2_000_000, 6), "2.0");
        assert_eq!(from_base_units(1_500_000, 6), "1.5");
        assert_eq!(from_base_units(123, 6), "0.000123");
        assert_eq!(from_base_units(0, 6), "0.0");
        assert_eq!(from_base_units(10_000_001, 6), "10.000001");
    }

    #[test]
    fn test_roundtrip_display() {
        let units = to_base_units("1.5", 6).unwrap();
        assert_eq!(from_base_units(units, 6), "1.5");
    }
}
