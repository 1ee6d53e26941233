//! Property-based tests for the exchange-rate table and conversion.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::conversion::convert;
use super::rates::RateTable;
use crate::engine::EngineError;

/// Positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive exchange rates (0.0001 to 10,000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Three-letter uppercase currency codes.
fn currency_code() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z]{3}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Same-currency lookups are exactly one regardless of what the table
    /// contains.
    #[test]
    fn prop_identity_rate_for_same_currency(
        code in currency_code(),
        noise_rate in positive_rate(),
    ) {
        let mut pairs = HashMap::new();
        pairs.insert(format!("{code}{code}"), noise_rate);
        let table = RateTable::new(pairs);

        // Even a bogus self-pair entry must not shadow the identity.
        prop_assert_eq!(table.rate(&code, &code).unwrap(), Decimal::ONE);
    }

    /// A configured rate comes back exactly as configured.
    #[test]
    fn prop_configured_rate_round_trips(rate in positive_rate()) {
        let mut pairs = HashMap::new();
        pairs.insert("USDEUR".to_string(), rate);
        let table = RateTable::new(pairs);

        prop_assert_eq!(table.rate("USD", "EUR").unwrap(), rate);
    }

    /// Conversion is exact: multiplying and dividing by the same rate
    /// returns the original amount.
    #[test]
    fn prop_conversion_is_exact_multiplication(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let converted = convert(amount, rate);

        prop_assert_eq!(converted, amount * rate);
        prop_assert_eq!(converted / rate, amount);
    }

    /// An empty table rejects every cross-currency pair as a configuration
    /// error, never by inventing a rate.
    #[test]
    fn prop_missing_pair_is_configuration_error(
        from in currency_code(),
        to in currency_code(),
    ) {
        prop_assume!(from != to);
        let table = RateTable::default();

        prop_assert!(matches!(
            table.rate(&from, &to),
            Err(EngineError::Configuration(_))
        ));
    }

    /// Conversion scales linearly: converting a sum equals summing the
    /// conversions.
    #[test]
    fn prop_conversion_is_linear(
        a in positive_amount(),
        b in positive_amount(),
        rate in positive_rate(),
    ) {
        prop_assert_eq!(convert(a + b, rate), convert(a, rate) + convert(b, rate));
    }
}
