//! Currency conversion arithmetic.
//!
//! CRITICAL: conversion is exact decimal multiplication. Rounding happens
//! only at the reporting edge (receipts and statements), never inside the
//! engine — a converted credit is persisted at full precision.

use rust_decimal::Decimal;

/// Converts an amount using the given exchange rate.
///
/// Pure multiplication with no rounding: `10.00 * 0.90` yields exactly
/// `9.0000`.
#[must_use]
pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
    amount * rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_multiplies_exactly() {
        assert_eq!(convert(dec!(10.00), dec!(0.90)), dec!(9.00));
        assert_eq!(convert(dec!(100), dec!(150.25)), dec!(15025));
        assert_eq!(convert(dec!(0), dec!(0.90)), dec!(0));
    }

    #[test]
    fn test_convert_keeps_sub_cent_precision() {
        // 0.01 * 0.9 = 0.009: below one cent, but preserved.
        assert_eq!(convert(dec!(0.01), dec!(0.9)), dec!(0.009));
    }

    #[test]
    fn test_identity_rate_changes_nothing() {
        assert_eq!(convert(dec!(123.45), Decimal::ONE), dec!(123.45));
    }
}
