//! Receipt and statement documents.
//!
//! This module renders the plain-text paperwork produced after successful
//! mutations and writes it to disk:
//! - Banking checks (receipts), one per committed transaction
//! - Account statements (transaction listing over a period)
//! - Money statements (income/outcome aggregates over a period)
//!
//! Document numbering is process-wide and atomic; writing is best-effort and
//! never feeds back into the balance mutation that triggered it.

pub mod error;
pub mod receipt;
pub mod statement;

pub use error::ReportError;
pub use receipt::{ReceiptData, ReceiptWriter, WrittenReceipt};
pub use statement::{
    Statement, StatementEntry, StatementTotals, StatementWriter, WrittenStatement,
    compute_totals,
};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::engine::TransactionKind;

/// Formats an amount for display: scale 2, ceiling rounding, currency suffix.
///
/// Rounding here is reporting-only; engine arithmetic stays exact.
#[must_use]
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity);
    format!("{rounded:.2} {currency}")
}

/// Human-readable transaction type for documents.
pub(crate) fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Withdraw => "Withdrawal",
        TransactionKind::Refill => "Refill",
        TransactionKind::Transfer => "Transfer",
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::format_money;

    #[test]
    fn test_format_money_pads_to_two_places() {
        assert_eq!(format_money(dec!(70), "USD"), "70.00 USD");
        assert_eq!(format_money(dec!(30.5), "EUR"), "30.50 EUR");
    }

    #[test]
    fn test_format_money_rounds_up_sub_cent_amounts() {
        assert_eq!(format_money(dec!(0.009), "EUR"), "0.01 EUR");
        assert_eq!(format_money(dec!(9.991), "USD"), "10.00 USD");
    }

    #[test]
    fn test_format_money_leaves_exact_amounts_alone() {
        assert_eq!(format_money(dec!(123.45), "GBP"), "123.45 GBP");
    }
}
