//! Account number validation.
//!
//! Account numbers are fixed-width strings of ASCII digits. The fixed width
//! means lexicographic ordering of numbers coincides with numeric ordering,
//! which the transfer path relies on for its canonical lock order.

/// Length of an account number in digits.
pub const ACCOUNT_NUMBER_LEN: usize = 16;

/// Returns true if `number` is a well-formed account number
/// (exactly [`ACCOUNT_NUMBER_LEN`] ASCII digits).
#[must_use]
pub fn is_valid_account_number(number: &str) -> bool {
    number.len() == ACCOUNT_NUMBER_LEN && number.bytes().all(|b| b.is_ascii_digit())
}
