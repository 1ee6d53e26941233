//! Domain types the engine plans with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money left an account (home bank only).
    Withdraw,
    /// Money arrived into an account (home bank only).
    Refill,
    /// Money moved between two accounts.
    Transfer,
}

impl TransactionKind {
    /// Stable lowercase name, matching the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Withdraw => "withdraw",
            Self::Refill => "refill",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "withdraw" => Ok(Self::Withdraw),
            "refill" => Ok(Self::Refill),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("unknown transaction kind: {s}")),
        }
    }
}

/// Transient copy of one account row, valid for a single operation.
///
/// The engine never caches these across operations; the store re-reads
/// under lock every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Account id.
    pub id: i64,
    /// Human-facing account number (fixed-width digits).
    pub number: String,
    /// Balance at the time of the locked read.
    pub balance: Decimal,
    /// ISO-like 3-letter currency code.
    pub currency: String,
    /// Owning user.
    pub user_id: i64,
    /// Owning bank.
    pub bank_id: i64,
    /// Soft-delete flag.
    pub active: bool,
}

/// A transaction record before the store assigns id and timestamp.
///
/// Polarity convention: `sender_account_id` is set whenever money leaves an
/// account, `receiver_account_id` whenever money arrives. Withdrawals record
/// only a sender, refills only a receiver, transfers both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Kind of mutation this draft records.
    pub kind: TransactionKind,
    /// Positive amount in `currency`.
    pub amount: Decimal,
    /// Currency of `amount` (the sender's currency for transfers).
    pub currency: String,
    /// Account debited, if any.
    pub sender_account_id: Option<i64>,
    /// Account credited, if any.
    pub receiver_account_id: Option<i64>,
}

/// Planned single-account mutation: the balance to persist plus the
/// transaction draft to append with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    /// New balance for the touched account.
    pub new_balance: Decimal,
    /// Audit record to append in the same store transaction.
    pub draft: TransactionDraft,
}

/// Planned two-account transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Sender's balance after the debit.
    pub sender_new_balance: Decimal,
    /// Receiver's balance after the credit.
    pub receiver_new_balance: Decimal,
    /// Amount credited to the receiver, in the receiver's currency.
    pub credited: Decimal,
    /// Audit record to append in the same store transaction.
    pub draft: TransactionDraft,
}
