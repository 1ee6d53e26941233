//! Property-based tests for policy rules and mutation planning.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::currency::RateTable;

use super::error::EngineError;
use super::policy::{lock_order, plan_deposit, plan_transfer, plan_withdrawal};
use super::types::{AccountSnapshot, TransactionKind};

const HOME: i64 = 1;

/// Positive amounts between 0.01 and 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Balances between 0.00 and 100,000.00.
fn balance() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive exchange rates between 0.01 and 100.00.
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..10_000).prop_map(|v| Decimal::new(v, 2))
}

/// Well-formed fixed-width account numbers.
fn account_number() -> impl Strategy<Value = String> {
    (0u64..10_000_000_000_000_000).prop_map(|n| format!("{n:016}"))
}

fn home_account(id: i64, number: String, balance: Decimal, currency: &str) -> AccountSnapshot {
    AccountSnapshot {
        id,
        number,
        balance,
        currency: currency.to_string(),
        user_id: 5,
        bank_id: HOME,
        active: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Withdrawing then depositing the same amount restores the balance
    /// exactly; no residue from decimal arithmetic.
    #[test]
    fn prop_withdraw_then_deposit_round_trips(
        start in balance(),
        delta in amount(),
        number in account_number(),
    ) {
        prop_assume!(delta <= start);
        let acct = home_account(1, number, start, "USD");

        let after_withdraw = plan_withdrawal(&acct, delta, HOME).unwrap().new_balance;
        let drained = AccountSnapshot { balance: after_withdraw, ..acct };
        let restored = plan_deposit(&drained, delta, HOME).unwrap().new_balance;

        prop_assert_eq!(restored, start);
    }

    /// A withdrawal plan debits exactly the requested amount and records a
    /// sender-only draft in the account's currency.
    #[test]
    fn prop_withdrawal_is_exact_and_sender_only(
        start in balance(),
        delta in amount(),
        number in account_number(),
    ) {
        prop_assume!(delta <= start);
        let acct = home_account(9, number, start, "USD");

        let plan = plan_withdrawal(&acct, delta, HOME).unwrap();

        prop_assert_eq!(plan.new_balance + delta, start);
        prop_assert!(plan.new_balance >= Decimal::ZERO);
        prop_assert_eq!(plan.draft.kind, TransactionKind::Withdraw);
        prop_assert_eq!(plan.draft.sender_account_id, Some(9));
        prop_assert_eq!(plan.draft.receiver_account_id, None);
        prop_assert_eq!(plan.draft.amount, delta);
    }

    /// Withdrawal succeeds exactly when the balance covers the amount.
    #[test]
    fn prop_funds_check_is_a_strict_boundary(
        start in balance(),
        delta in amount(),
        number in account_number(),
    ) {
        let acct = home_account(2, number, start, "USD");

        match plan_withdrawal(&acct, delta, HOME) {
            Ok(_) => prop_assert!(delta <= start),
            Err(EngineError::InsufficientFunds { balance, requested }) => {
                prop_assert!(delta > start);
                prop_assert_eq!(balance, start);
                prop_assert_eq!(requested, delta);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// A deposit plan credits exactly the requested amount and records a
    /// receiver-only draft.
    #[test]
    fn prop_deposit_is_exact_and_receiver_only(
        start in balance(),
        delta in amount(),
        number in account_number(),
    ) {
        let acct = home_account(3, number, start, "USD");

        let plan = plan_deposit(&acct, delta, HOME).unwrap();

        prop_assert_eq!(plan.new_balance - delta, start);
        prop_assert_eq!(plan.draft.kind, TransactionKind::Refill);
        prop_assert_eq!(plan.draft.sender_account_id, None);
        prop_assert_eq!(plan.draft.receiver_account_id, Some(3));
    }

    /// Transfer conserves value up to conversion: the sender loses exactly
    /// `amount`, the receiver gains exactly `amount * rate`, and the draft
    /// stays in the sender's currency frame with both ids set.
    #[test]
    fn prop_transfer_conserves_value_up_to_conversion(
        sender_start in balance(),
        receiver_start in balance(),
        delta in amount(),
        fx in rate(),
    ) {
        prop_assume!(delta <= sender_start);
        let sender = home_account(1, "1000000000000001".to_string(), sender_start, "USD");
        let receiver = AccountSnapshot {
            bank_id: 4,
            ..home_account(2, "2000000000000002".to_string(), receiver_start, "EUR")
        };
        let mut pairs = HashMap::new();
        pairs.insert("USDEUR".to_string(), fx);
        let rates = RateTable::new(pairs);

        let plan = plan_transfer(&sender, &receiver, delta, HOME, &rates).unwrap();

        prop_assert_eq!(sender_start - plan.sender_new_balance, delta);
        prop_assert_eq!(plan.credited, delta * fx);
        prop_assert_eq!(plan.receiver_new_balance - receiver_start, delta * fx);
        prop_assert_eq!(plan.draft.currency.as_str(), "USD");
        prop_assert_eq!(plan.draft.amount, delta);
        prop_assert_eq!(plan.draft.sender_account_id, Some(1));
        prop_assert_eq!(plan.draft.receiver_account_id, Some(2));
    }

    /// Transfers where neither side is home-bank never pass policy,
    /// whatever the amounts involved.
    #[test]
    fn prop_foreign_only_transfer_always_rejected(
        sender_start in balance(),
        delta in amount(),
        sender_bank in 2i64..100,
        receiver_bank in 2i64..100,
    ) {
        let sender = AccountSnapshot {
            bank_id: sender_bank,
            ..home_account(1, "1000000000000001".to_string(), sender_start, "USD")
        };
        let receiver = AccountSnapshot {
            bank_id: receiver_bank,
            ..home_account(2, "2000000000000002".to_string(), Decimal::ZERO, "USD")
        };

        let result = plan_transfer(&sender, &receiver, delta, HOME, &RateTable::default());

        prop_assert!(matches!(result, Err(EngineError::PolicyViolation(_))));
    }

    /// The lock order ignores argument order and always yields an ascending
    /// pair.
    #[test]
    fn prop_lock_order_is_canonical(a in account_number(), b in account_number()) {
        let forward = lock_order(&a, &b);
        let backward = lock_order(&b, &a);

        prop_assert_eq!(forward, backward);
        prop_assert!(forward.0 <= forward.1);
    }
}
