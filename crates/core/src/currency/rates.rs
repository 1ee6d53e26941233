//! Exchange-rate table sourced from configuration.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::engine::EngineError;

/// Read-only table of exchange rates, built once at startup.
///
/// Keys are ordered currency pairs (`"USDEUR"`). Pairs are directional:
/// a configured `USDEUR` rate says nothing about `EURUSD` — reciprocal
/// rates are never derived, they must be configured explicitly.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    pairs: HashMap<String, Decimal>,
}

impl RateTable {
    /// Builds a table from configured pair → rate entries.
    #[must_use]
    pub fn new(pairs: HashMap<String, Decimal>) -> Self {
        Self { pairs }
    }

    /// Returns the multiplicative rate from `from` to `to`.
    ///
    /// Same-currency pairs bypass the table entirely and return exactly
    /// one. A missing pair is a configuration error: the operation that
    /// needed it must fail fast rather than guess.
    pub fn rate(&self, from: &str, to: &str) -> Result<Decimal, EngineError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.pairs
            .get(&format!("{from}{to}"))
            .copied()
            .ok_or_else(|| {
                EngineError::Configuration(format!("no exchange rate configured for {from}->{to}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table() -> RateTable {
        let mut pairs = HashMap::new();
        pairs.insert("USDEUR".to_string(), dec!(0.90));
        pairs.insert("EURUSD".to_string(), dec!(1.08));
        RateTable::new(pairs)
    }

    #[test]
    fn test_configured_pair_is_returned_exactly() {
        assert_eq!(table().rate("USD", "EUR").unwrap(), dec!(0.90));
        assert_eq!(table().rate("EUR", "USD").unwrap(), dec!(1.08));
    }

    #[test]
    fn test_same_currency_is_identity() {
        assert_eq!(table().rate("USD", "USD").unwrap(), Decimal::ONE);
        // Identity holds even for currencies the table has never heard of.
        assert_eq!(table().rate("JPY", "JPY").unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_missing_pair_fails_fast() {
        let err = table().rate("USD", "JPY").unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_reciprocal_is_not_derived() {
        let mut pairs = HashMap::new();
        pairs.insert("USDEUR".to_string(), dec!(0.90));
        let one_way = RateTable::new(pairs);

        assert!(one_way.rate("EUR", "USD").is_err());
    }
}
