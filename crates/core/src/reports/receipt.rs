//! Banking check generation.
//!
//! Every committed mutation produces one check. Checks are numbered from a
//! process-wide sequence starting at 12345 and stored as plain-text files.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{ReportError, format_money, kind_label};
use crate::engine::TransactionKind;

/// Process-wide check numbering. The first check issued is No. 12345.
static RECEIPT_SEQ: AtomicU64 = AtomicU64::new(12345);

/// Everything a banking check displays about a committed transaction.
#[derive(Debug, Clone)]
pub struct ReceiptData {
    /// Transaction type.
    pub kind: TransactionKind,
    /// Posted amount.
    pub amount: Decimal,
    /// Currency the amount is denominated in.
    pub currency: String,
    /// Account the money left, when the type has a sender side.
    pub sender_number: Option<String>,
    /// Account the money arrived at, when the type has a receiver side.
    pub receiver_number: Option<String>,
    /// When the transaction was committed.
    pub created_at: DateTime<Utc>,
}

impl ReceiptData {
    /// Renders the check as plain text.
    ///
    /// Withdrawals and refills show a single `Client` line for the one
    /// account involved; transfers show both parties.
    #[must_use]
    pub fn render(&self, number: u64) -> String {
        let mut lines = vec![
            "Banking check".to_string(),
            format!("{:<12}{number}", "Check No:"),
            format!(
                "{}  {}",
                self.created_at.format("%Y-%m-%d"),
                self.created_at.format("%H:%M")
            ),
            format!("{:<12}{}", "Type:", kind_label(self.kind)),
        ];
        match self.kind {
            TransactionKind::Withdraw => {
                if let Some(sender) = &self.sender_number {
                    lines.push(format!("{:<12}{sender}", "Client:"));
                }
            }
            TransactionKind::Refill => {
                if let Some(receiver) = &self.receiver_number {
                    lines.push(format!("{:<12}{receiver}", "Client:"));
                }
            }
            TransactionKind::Transfer => {
                if let Some(sender) = &self.sender_number {
                    lines.push(format!("{:<12}{sender}", "Sender:"));
                }
                if let Some(receiver) = &self.receiver_number {
                    lines.push(format!("{:<12}{receiver}", "Receiver:"));
                }
            }
        }
        lines.push(format!(
            "{:<12}{}",
            "Sum:",
            format_money(self.amount, &self.currency)
        ));
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// A check that has been numbered and persisted.
#[derive(Debug, Clone)]
pub struct WrittenReceipt {
    /// Assigned check number.
    pub number: u64,
    /// Where the file landed.
    pub path: PathBuf,
    /// Rendered check body.
    pub text: String,
}

/// Writes banking checks under a configured directory.
#[derive(Debug, Clone)]
pub struct ReceiptWriter {
    dir: PathBuf,
}

impl ReceiptWriter {
    /// Creates a writer that stores checks under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Assigns the next check number, then renders and persists the check.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the directory or file cannot be
    /// written. The number is consumed either way.
    pub fn write(&self, data: &ReceiptData) -> Result<WrittenReceipt, ReportError> {
        let number = RECEIPT_SEQ.fetch_add(1, Ordering::Relaxed);
        let text = data.render(number);
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("receipt-{number}.txt"));
        fs::write(&path, &text)?;
        Ok(WrittenReceipt { number, path, text })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;

    fn withdrawal() -> ReceiptData {
        ReceiptData {
            kind: TransactionKind::Withdraw,
            amount: dec!(30),
            currency: "USD".to_string(),
            sender_number: Some("4050123456789012".to_string()),
            receiver_number: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_withdrawal_check_layout() {
        let text = withdrawal().render(12345);

        let expected = "Banking check\n\
                        Check No:   12345\n\
                        2024-03-15  10:30\n\
                        Type:       Withdrawal\n\
                        Client:     4050123456789012\n\
                        Sum:        30.00 USD\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_refill_check_names_receiver_as_client() {
        let data = ReceiptData {
            kind: TransactionKind::Refill,
            amount: dec!(50),
            currency: "EUR".to_string(),
            sender_number: None,
            receiver_number: Some("4051999888777666".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
        };

        let text = data.render(12346);

        assert!(text.contains("Type:       Refill"));
        assert!(text.contains("Client:     4051999888777666"));
        assert!(!text.contains("Sender:"));
        assert!(!text.contains("Receiver:"));
    }

    #[test]
    fn test_transfer_check_lists_both_parties() {
        let data = ReceiptData {
            kind: TransactionKind::Transfer,
            amount: dec!(10),
            currency: "USD".to_string(),
            sender_number: Some("4050123456789012".to_string()),
            receiver_number: Some("4051999888777666".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap(),
        };

        let text = data.render(12347);

        assert!(text.contains("Type:       Transfer"));
        assert!(text.contains("Sender:     4050123456789012"));
        assert!(text.contains("Receiver:   4051999888777666"));
        assert!(!text.contains("Client:"));
    }

    #[test]
    fn test_writer_persists_checks_with_increasing_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReceiptWriter::new(dir.path());

        let first = writer.write(&withdrawal()).unwrap();
        let second = writer.write(&withdrawal()).unwrap();

        assert!(second.number > first.number);
        assert_eq!(
            first.path.file_name().unwrap().to_string_lossy(),
            format!("receipt-{}.txt", first.number)
        );
        let on_disk = std::fs::read_to_string(&first.path).unwrap();
        assert_eq!(on_disk, first.text);
    }

    #[test]
    fn test_check_numbers_start_at_expected_floor() {
        // The sequence begins at 12345; any number handed out is at or above
        // that floor no matter how many tests ran first.
        let text = withdrawal().render(12345);
        assert!(text.contains("12345"));

        let dir = tempfile::tempdir().unwrap();
        let written = ReceiptWriter::new(dir.path()).write(&withdrawal()).unwrap();
        assert!(written.number >= 12345);
    }
}
