//! Policy rules and mutation planning.
//!
//! These functions take account snapshots the store read under lock and
//! decide what (if anything) may be written back. They return fully
//! computed plans; the store persists them verbatim.

use rust_decimal::Decimal;

use crate::currency::{RateTable, convert};

use super::error::EngineError;
use super::types::{AccountSnapshot, MutationPlan, TransactionDraft, TransactionKind, TransferPlan};

/// Rejects non-positive amounts.
pub fn ensure_positive_amount(amount: Decimal) -> Result<(), EngineError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(EngineError::PolicyViolation(format!(
            "amount must be positive, got {amount}"
        )))
    }
}

/// Rejects accounts not held at the home bank.
///
/// Only home-bank accounts may be directly withdrawn from, deposited into,
/// or deleted.
pub fn ensure_home_bank(account: &AccountSnapshot, home_bank_id: i64) -> Result<(), EngineError> {
    if account.bank_id == home_bank_id {
        Ok(())
    } else {
        Err(EngineError::PolicyViolation(format!(
            "account {} is not held at the home bank",
            account.number
        )))
    }
}

/// Rejects debits larger than the current balance.
///
/// The boundary case `requested == balance` is allowed and empties the
/// account.
pub fn ensure_sufficient_funds(
    account: &AccountSnapshot,
    requested: Decimal,
) -> Result<(), EngineError> {
    if account.balance < requested {
        Err(EngineError::InsufficientFunds {
            balance: account.balance,
            requested,
        })
    } else {
        Ok(())
    }
}

/// Canonical lock order for two account numbers.
///
/// Returns the pair in ascending order. Numbers are fixed-width digit
/// strings, so lexicographic order is a total numeric order; both sides of
/// two opposite-direction transfers agree on it, which rules out circular
/// waits.
#[must_use]
pub fn lock_order<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Plans a withdrawal from a home-bank account.
pub fn plan_withdrawal(
    account: &AccountSnapshot,
    amount: Decimal,
    home_bank_id: i64,
) -> Result<MutationPlan, EngineError> {
    ensure_positive_amount(amount)?;
    ensure_home_bank(account, home_bank_id)?;
    ensure_sufficient_funds(account, amount)?;

    Ok(MutationPlan {
        new_balance: account.balance - amount,
        draft: TransactionDraft {
            kind: TransactionKind::Withdraw,
            amount,
            currency: account.currency.clone(),
            sender_account_id: Some(account.id),
            receiver_account_id: None,
        },
    })
}

/// Plans a deposit into a home-bank account.
///
/// Deposits only increase the balance, so there is no funds check.
pub fn plan_deposit(
    account: &AccountSnapshot,
    amount: Decimal,
    home_bank_id: i64,
) -> Result<MutationPlan, EngineError> {
    ensure_positive_amount(amount)?;
    ensure_home_bank(account, home_bank_id)?;

    Ok(MutationPlan {
        new_balance: account.balance + amount,
        draft: TransactionDraft {
            kind: TransactionKind::Refill,
            amount,
            currency: account.currency.clone(),
            sender_account_id: None,
            receiver_account_id: Some(account.id),
        },
    })
}

/// Plans a transfer between two accounts.
///
/// The debit is `amount` in the sender's currency; the credit is
/// `amount * rate(sender currency, receiver currency)` in the receiver's.
/// At least one side must be held at the home bank. The funds check runs
/// in the sender's currency, before conversion.
pub fn plan_transfer(
    sender: &AccountSnapshot,
    receiver: &AccountSnapshot,
    amount: Decimal,
    home_bank_id: i64,
    rates: &RateTable,
) -> Result<TransferPlan, EngineError> {
    ensure_positive_amount(amount)?;

    if sender.number == receiver.number {
        return Err(EngineError::PolicyViolation(
            "cannot transfer from an account to itself".to_string(),
        ));
    }
    if sender.bank_id != home_bank_id && receiver.bank_id != home_bank_id {
        return Err(EngineError::PolicyViolation(format!(
            "neither {} nor {} is held at the home bank",
            sender.number, receiver.number
        )));
    }
    ensure_sufficient_funds(sender, amount)?;

    let rate = rates.rate(&sender.currency, &receiver.currency)?;
    let credited = convert(amount, rate);

    Ok(TransferPlan {
        sender_new_balance: sender.balance - amount,
        receiver_new_balance: receiver.balance + credited,
        credited,
        draft: TransactionDraft {
            kind: TransactionKind::Transfer,
            amount,
            currency: sender.currency.clone(),
            sender_account_id: Some(sender.id),
            receiver_account_id: Some(receiver.id),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    const HOME: i64 = 1;

    fn account(id: i64, number: &str, balance: Decimal, currency: &str, bank_id: i64) -> AccountSnapshot {
        AccountSnapshot {
            id,
            number: number.to_string(),
            balance,
            currency: currency.to_string(),
            user_id: 10,
            bank_id,
            active: true,
        }
    }

    fn usd_eur_rates() -> RateTable {
        let mut pairs = HashMap::new();
        pairs.insert("USDEUR".to_string(), dec!(0.90));
        RateTable::new(pairs)
    }

    #[test]
    fn test_withdrawal_debits_and_records_sender() {
        let acct = account(7, "1000000000000001", dec!(100.00), "USD", HOME);

        let plan = plan_withdrawal(&acct, dec!(30.00), HOME).unwrap();

        assert_eq!(plan.new_balance, dec!(70.00));
        assert_eq!(plan.draft.kind, TransactionKind::Withdraw);
        assert_eq!(plan.draft.amount, dec!(30.00));
        assert_eq!(plan.draft.currency, "USD");
        assert_eq!(plan.draft.sender_account_id, Some(7));
        assert_eq!(plan.draft.receiver_account_id, None);
    }

    #[test]
    fn test_withdrawal_of_entire_balance_leaves_zero() {
        let acct = account(7, "1000000000000001", dec!(100.00), "USD", HOME);

        let plan = plan_withdrawal(&acct, dec!(100.00), HOME).unwrap();

        assert_eq!(plan.new_balance, dec!(0.00));
    }

    #[test]
    fn test_withdrawal_over_balance_fails() {
        let acct = account(7, "1000000000000001", dec!(100.00), "USD", HOME);

        let err = plan_withdrawal(&acct, dec!(100.01), HOME).unwrap_err();

        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                balance: dec!(100.00),
                requested: dec!(100.01),
            }
        );
    }

    #[test]
    fn test_withdrawal_from_foreign_bank_fails() {
        let acct = account(7, "1000000000000001", dec!(100.00), "USD", 3);

        let err = plan_withdrawal(&acct, dec!(10.00), HOME).unwrap_err();

        assert!(matches!(err, EngineError::PolicyViolation(_)));
    }

    #[test]
    fn test_deposit_credits_and_records_receiver() {
        let acct = account(7, "1000000000000001", dec!(5.50), "USD", HOME);

        let plan = plan_deposit(&acct, dec!(4.50), HOME).unwrap();

        assert_eq!(plan.new_balance, dec!(10.00));
        assert_eq!(plan.draft.kind, TransactionKind::Refill);
        assert_eq!(plan.draft.sender_account_id, None);
        assert_eq!(plan.draft.receiver_account_id, Some(7));
    }

    #[test]
    fn test_deposit_has_no_funds_check() {
        let acct = account(7, "1000000000000001", dec!(0), "USD", HOME);

        assert!(plan_deposit(&acct, dec!(1000000), HOME).is_ok());
    }

    #[test]
    fn test_deposit_to_foreign_bank_fails() {
        let acct = account(7, "1000000000000001", dec!(0), "USD", 2);

        assert!(matches!(
            plan_deposit(&acct, dec!(10), HOME),
            Err(EngineError::PolicyViolation(_))
        ));
    }

    #[rstest::rstest]
    #[case(dec!(0))]
    #[case(dec!(-0.01))]
    #[case(dec!(-30))]
    fn test_non_positive_amounts_are_rejected(#[case] amount: Decimal) {
        let acct = account(7, "1000000000000001", dec!(100.00), "USD", HOME);

        assert!(plan_withdrawal(&acct, amount, HOME).is_err());
        assert!(plan_deposit(&acct, amount, HOME).is_err());
    }

    #[test]
    fn test_transfer_converts_credit_and_keeps_sender_frame() {
        let sender = account(1, "1000000000000001", dec!(50.00), "USD", HOME);
        let receiver = account(2, "2000000000000002", dec!(0.00), "EUR", 4);

        let plan = plan_transfer(&sender, &receiver, dec!(10.00), HOME, &usd_eur_rates()).unwrap();

        assert_eq!(plan.sender_new_balance, dec!(40.00));
        assert_eq!(plan.receiver_new_balance, dec!(9.00));
        assert_eq!(plan.credited, dec!(9.00));
        assert_eq!(plan.draft.kind, TransactionKind::Transfer);
        assert_eq!(plan.draft.amount, dec!(10.00));
        assert_eq!(plan.draft.currency, "USD");
        assert_eq!(plan.draft.sender_account_id, Some(1));
        assert_eq!(plan.draft.receiver_account_id, Some(2));
    }

    #[test]
    fn test_same_currency_transfer_skips_conversion() {
        let sender = account(1, "1000000000000001", dec!(50.00), "USD", HOME);
        let receiver = account(2, "2000000000000002", dec!(1.00), "USD", 4);

        let plan = plan_transfer(&sender, &receiver, dec!(12.34), HOME, &RateTable::default()).unwrap();

        assert_eq!(plan.credited, dec!(12.34));
        assert_eq!(plan.receiver_new_balance, dec!(13.34));
    }

    #[test]
    fn test_transfer_missing_rate_is_configuration_error() {
        let sender = account(1, "1000000000000001", dec!(50.00), "EUR", HOME);
        let receiver = account(2, "2000000000000002", dec!(0.00), "USD", 4);

        // Only USDEUR is configured; EURUSD must not be inferred.
        let err =
            plan_transfer(&sender, &receiver, dec!(10.00), HOME, &usd_eur_rates()).unwrap_err();

        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_transfer_requires_one_home_bank_side() {
        let sender = account(1, "1000000000000001", dec!(50.00), "USD", 2);
        let receiver = account(2, "2000000000000002", dec!(0.00), "USD", 3);

        let err =
            plan_transfer(&sender, &receiver, dec!(10.00), HOME, &RateTable::default()).unwrap_err();

        assert!(matches!(err, EngineError::PolicyViolation(_)));
    }

    #[rstest::rstest]
    #[case(HOME, 3)]
    #[case(3, HOME)]
    #[case(HOME, HOME)]
    fn test_transfer_allows_either_side_home(#[case] sender_bank: i64, #[case] receiver_bank: i64) {
        let sender = account(1, "1000000000000001", dec!(50.00), "USD", sender_bank);
        let receiver = account(2, "2000000000000002", dec!(0.00), "USD", receiver_bank);

        assert!(plan_transfer(&sender, &receiver, dec!(10.00), HOME, &RateTable::default()).is_ok());
    }

    #[test]
    fn test_transfer_funds_check_runs_in_sender_currency() {
        let sender = account(1, "1000000000000001", dec!(9.99), "USD", HOME);
        let receiver = account(2, "2000000000000002", dec!(0.00), "EUR", 4);

        let err =
            plan_transfer(&sender, &receiver, dec!(10.00), HOME, &usd_eur_rates()).unwrap_err();

        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                balance: dec!(9.99),
                requested: dec!(10.00),
            }
        );
    }

    #[test]
    fn test_self_transfer_is_rejected() {
        let acct = account(1, "1000000000000001", dec!(50.00), "USD", HOME);

        let err = plan_transfer(&acct, &acct.clone(), dec!(10.00), HOME, &RateTable::default())
            .unwrap_err();

        assert!(matches!(err, EngineError::PolicyViolation(_)));
    }

    #[test]
    fn test_lock_order_is_argument_order_independent() {
        let (first, second) = lock_order("2000000000000002", "1000000000000001");
        assert_eq!(first, "1000000000000001");
        assert_eq!(second, "2000000000000002");

        let (first, second) = lock_order("1000000000000001", "2000000000000002");
        assert_eq!(first, "1000000000000001");
        assert_eq!(second, "2000000000000002");
    }
}
