use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive as _;
use std::fmt;
use std::str::FromStr as _;

/// Textual date representation shared by statement and ledger transactions.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// The normalized form both sources are reduced to before comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: i64) -> Self {
        Transaction {
            date,
            description: description.into(),
            amount,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Date: {}, Amount: {}, Description: {}",
            self.date.format(DATE_FORMAT),
            self.amount,
            self.description
        )
    }
}

/// Parse a decimal amount and drop its fractional part.
///
/// This truncates toward zero, it never rounds: `"12.99"` is `12` and `"-12.99"` is `-12`.
/// Whitespace and `,` thousands separators are ignored.
pub fn truncate_amount(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned).ok()?;
    value.trunc().to_i64()
}
