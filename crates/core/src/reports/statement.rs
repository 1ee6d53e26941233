//! Account and money statements.
//!
//! An account statement lists the transactions touching one account over a
//! period. A money statement additionally carries the income/outcome
//! aggregates for that period, both denominated in the account currency.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::{ReportError, format_money, kind_label};
use crate::currency::{RateTable, convert};
use crate::engine::{AccountSnapshot, EngineError, TransactionKind};

/// Process-wide statement numbering.
static STATEMENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// One transaction as it appears on a statement.
#[derive(Debug, Clone)]
pub struct StatementEntry {
    /// Transaction type.
    pub kind: TransactionKind,
    /// Posted amount, in `currency`.
    pub amount: Decimal,
    /// Currency the amount was posted in (the sender side for transfers).
    pub currency: String,
    /// Debited account, when the type has a sender side.
    pub sender_account_id: Option<i64>,
    /// Credited account, when the type has a receiver side.
    pub receiver_account_id: Option<i64>,
    /// When the transaction was committed.
    pub created_date: DateTime<Utc>,
}

/// Income/outcome aggregates in the account currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTotals {
    /// Money that arrived: refills plus transfers received.
    pub income: Decimal,
    /// Money that left: withdrawals plus transfers sent.
    pub outcome: Decimal,
}

/// Computes the money-statement aggregates for one account.
///
/// Transfers received are converted into the account currency; withdrawals
/// and transfers sent are already denominated in it.
///
/// # Errors
///
/// Returns [`EngineError::Configuration`] when a received transfer was posted
/// in a currency with no configured rate into the account currency.
pub fn compute_totals(
    account: &AccountSnapshot,
    entries: &[StatementEntry],
    rates: &RateTable,
) -> Result<StatementTotals, EngineError> {
    let mut income = Decimal::ZERO;
    let mut outcome = Decimal::ZERO;
    for entry in entries {
        match entry.kind {
            TransactionKind::Refill if entry.receiver_account_id == Some(account.id) => {
                income += entry.amount;
            }
            TransactionKind::Withdraw if entry.sender_account_id == Some(account.id) => {
                outcome += entry.amount;
            }
            TransactionKind::Transfer => {
                if entry.sender_account_id == Some(account.id) {
                    outcome += entry.amount;
                } else if entry.receiver_account_id == Some(account.id) {
                    let rate = rates.rate(&entry.currency, &account.currency)?;
                    income += convert(entry.amount, rate);
                }
            }
            _ => {}
        }
    }
    Ok(StatementTotals { income, outcome })
}

/// A statement ready to be rendered.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Issuing bank name.
    pub bank_name: String,
    /// Account holder, as "name surname".
    pub client_name: String,
    /// Statement account number.
    pub account_number: String,
    /// Statement account currency.
    pub currency: String,
    /// When the account was opened.
    pub account_created: DateTime<Utc>,
    /// Requested period, inclusive on both ends.
    pub period: (NaiveDate, NaiveDate),
    /// When this document was generated.
    pub generated_at: DateTime<Utc>,
    /// Transactions in the period, chronological.
    pub entries: Vec<StatementEntry>,
    /// Aggregates, when a money statement was requested.
    pub totals: Option<StatementTotals>,
}

impl Statement {
    /// Renders the statement as plain text.
    #[must_use]
    pub fn render(&self, number: u64) -> String {
        let title = if self.totals.is_some() {
            "Money statement"
        } else {
            "Account statement"
        };
        let mut lines = vec![
            title.to_string(),
            self.bank_name.clone(),
            format!("Statement No: {number}"),
            format!("Client: {}", self.client_name),
            format!("Account: {}", self.account_number),
            format!("Currency: {}", self.currency),
            format!(
                "Account create date: {}",
                self.account_created.format("%d.%m.%Y")
            ),
            format!(
                "Period: {}-{}",
                self.period.0.format("%d.%m.%Y"),
                self.period.1.format("%d.%m.%Y")
            ),
            format!("Created at: {}", self.generated_at.format("%d.%m.%Y %H:%M")),
            String::new(),
            format!("{:<12}{:<12}{}", "Date", "Note", "Sum"),
        ];
        for entry in &self.entries {
            let date = entry.created_date.format("%d.%m.%Y").to_string();
            lines.push(format!(
                "{date:<12}{:<12}{}",
                kind_label(entry.kind),
                format_money(entry.amount, &entry.currency)
            ));
        }
        if let Some(totals) = &self.totals {
            lines.push(String::new());
            lines.push(format!("{:<16}{}", "Income", "Outcome"));
            lines.push(format!(
                "{:<16}{}",
                format_money(totals.income, &self.currency),
                format_money(totals.outcome, &self.currency)
            ));
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// A statement that has been numbered and persisted.
#[derive(Debug, Clone)]
pub struct WrittenStatement {
    /// Assigned statement number.
    pub number: u64,
    /// Where the file landed.
    pub path: PathBuf,
    /// Rendered statement body.
    pub text: String,
}

/// Writes statements under a configured directory.
#[derive(Debug, Clone)]
pub struct StatementWriter {
    dir: PathBuf,
}

impl StatementWriter {
    /// Creates a writer that stores statements under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Assigns the next statement number, then renders and persists the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the directory or file cannot be
    /// written. The number is consumed either way.
    pub fn write(&self, statement: &Statement) -> Result<WrittenStatement, ReportError> {
        let number = STATEMENT_SEQ.fetch_add(1, Ordering::Relaxed);
        let text = statement.render(number);
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("statement-{number}.txt"));
        fs::write(&path, &text)?;
        Ok(WrittenStatement { number, path, text })
    }
}
