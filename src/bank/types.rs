//! Types used throughout the banking system.

/// Decimal precision for monetary values.
/// This is used to convert floating-point values to fixed-point representation.
pub const DECIMAL_PRECISION: f64 = 10000.0;

/// Bank ID type, assigned sequentially by the registry.
pub type BankId = u32;

/// Client ID type, assigned sequentially by the registry.
pub type ClientId = u32;

/// Account number type: a three-letter type tag followed by a token.
pub type AccountNumber = String;

/// Money type, representing a fixed-point monetary value.
pub type Money = i64;

/// Converts a floating-point amount into fixed-point money, rounding to the nearest unit.
/// Out-of-range values saturate at `Money::MIN`/`Money::MAX` and NaN becomes zero; use
/// [`checked_money_from_f64`] for untrusted input.
pub fn money_from_f64(value: f64) -> Money {
    (value * DECIMAL_PRECISION).round() as Money
}

/// Like [`money_from_f64`], but `None` for non-finite values and values outside the `Money` range.
pub fn checked_money_from_f64(value: f64) -> Option<Money> {
    let scaled = (value * DECIMAL_PRECISION).round();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if !scaled.is_finite() || scaled < Money::MIN as f64 || scaled >= Money::MAX as f64 {
        return None;
    }
    Some(scaled as Money)
}

/// Converts fixed-point money back into a floating-point amount.
pub fn money_to_f64(money: Money) -> f64 {
    money as f64 / DECIMAL_PRECISION
}

/// Formats money with two decimal places.
pub fn format_money(money: Money) -> String {
    format!("{:.2}", money_to_f64(money))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_conversion_rounds() {
        assert_eq!(money_from_f64(0.29), 2900);
        assert_eq!(money_from_f64(0.01), 100);
        assert_eq!(money_from_f64(-1000.0), -10_000_000);
        assert_eq!(format_money(7_000_000), "700.00");
        assert_eq!(format_money(-100), "-0.01");
    }

    #[test]
    fn test_checked_conversion_rejects_unrepresentable() {
        assert_eq!(checked_money_from_f64(1000.5), Some(10_005_000));
        assert_eq!(checked_money_from_f64(1e14), Some(1_000_000_000_000_000_000));
        assert_eq!(checked_money_from_f64(1e15), None);
        assert_eq!(checked_money_from_f64(-1e15), None);
        assert_eq!(checked_money_from_f64(f64::NAN), None);
        assert_eq!(checked_money_from_f64(f64::INFINITY), None);
        assert_eq!(checked_money_from_f64(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_saturating_conversion() {
        assert_eq!(money_from_f64(1e15), Money::MAX);
        assert_eq!(money_from_f64(-1e15), Money::MIN);
        assert_eq!(money_from_f64(f64::NAN), 0);
    }
}
