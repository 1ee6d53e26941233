//! Interest accrual eligibility and arithmetic.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Returns true on the last calendar day of `date`'s month.
///
/// Accrual runs only on eligible days; the scheduler tick itself carries no
/// calendar knowledge.
#[must_use]
pub fn is_accrual_day(date: NaiveDate) -> bool {
    match date.succ_opt() {
        Some(next) => next.month() != date.month(),
        // NaiveDate::MAX has no successor; treat it as a month end.
        None => true,
    }
}

/// Multiplier applied to each balance on an eligible day: `1 + rate`.
#[must_use]
pub fn accrual_factor(rate: Decimal) -> Decimal {
    Decimal::ONE + rate
}

/// Balance after one accrual cycle.
#[must_use]
pub fn accrue(balance: Decimal, rate: Decimal) -> Decimal {
    balance * accrual_factor(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(2026, 1, 31)]
    #[case(2026, 2, 28)]
    #[case(2028, 2, 29)] // leap year
    #[case(2026, 4, 30)]
    #[case(2026, 12, 31)]
    fn test_month_ends_are_eligible(#[case] y: i32, #[case] m: u32, #[case] d: u32) {
        assert!(is_accrual_day(NaiveDate::from_ymd_opt(y, m, d).unwrap()));
    }

    #[rstest]
    #[case(2026, 1, 1)]
    #[case(2026, 1, 30)]
    #[case(2026, 2, 27)]
    #[case(2028, 2, 28)] // leap year has a 29th
    #[case(2026, 12, 30)]
    fn test_other_days_are_not_eligible(#[case] y: i32, #[case] m: u32, #[case] d: u32) {
        assert!(!is_accrual_day(NaiveDate::from_ymd_opt(y, m, d).unwrap()));
    }

    #[test]
    fn test_accrual_multiplies_by_one_plus_rate() {
        assert_eq!(accrual_factor(dec!(0.01)), dec!(1.01));
        assert_eq!(accrue(dec!(100.00), dec!(0.01)), dec!(101.0000));
        assert_eq!(accrue(dec!(0), dec!(0.05)), dec!(0));
    }

    #[test]
    fn test_zero_rate_leaves_balance_unchanged() {
        assert_eq!(accrue(dec!(123.45), Decimal::ZERO), dec!(123.45));
    }
}
