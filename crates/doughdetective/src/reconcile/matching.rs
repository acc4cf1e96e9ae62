use crate::Transaction;

/// Descriptions are never compared, statement and ledger wording rarely agree.
pub fn statement_matches_ledger(statement: &Transaction, ledger: &Transaction) -> bool {
    statement.date == ledger.date && statement.amount == ledger.amount
}
