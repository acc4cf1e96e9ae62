pub mod ledger;
pub mod period;
pub mod reconcile;
pub mod statement;
mod error;
mod transaction;

pub use error::{Error, Result};
pub use transaction::{DATE_FORMAT, Transaction, truncate_amount};
