//! Finding statement transactions missing from the ledger and vice versa.

mod matching;

pub use matching::statement_matches_ledger;

use crate::Transaction;

/// How statement and ledger transactions are paired up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Each direction is a separate greedy pass in which every transaction on the other side can
    /// be claimed once. Two identical statement rows need two ledger entries.
    #[default]
    Greedy,
    /// A transaction counts as present if any transaction on the other side matches it, so two
    /// identical statement rows are both satisfied by a single ledger entry.
    Existence,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// On the statement, but not in the ledger.
    pub missing_in_ledger: Vec<Transaction>,
    /// In the ledger, but not on the statement.
    pub missing_in_statement: Vec<Transaction>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.missing_in_ledger.is_empty() && self.missing_in_statement.is_empty()
    }
}

/// Compare both sides, reporting unmatched transactions in their original order.
pub fn reconcile(
    statement: &[Transaction],
    ledger: &[Transaction],
    policy: MatchPolicy,
) -> Reconciliation {
    let missing_in_ledger = unmatched(statement, ledger, policy, statement_matches_ledger);
    let missing_in_statement = unmatched(ledger, statement, policy, |l, s| {
        statement_matches_ledger(s, l)
    });

    tracing::debug!(
        "{} statement and {} ledger transactions left unmatched",
        missing_in_ledger.len(),
        missing_in_statement.len()
    );
    Reconciliation {
        missing_in_ledger,
        missing_in_statement,
    }
}

// PERF: O(items*others)
fn unmatched(
    items: &[Transaction],
    others: &[Transaction],
    policy: MatchPolicy,
    matches: impl Fn(&Transaction, &Transaction) -> bool,
) -> Vec<Transaction> {
    let mut claimed = vec![false; others.len()];
    let mut results = Vec::new();

    for item in items {
        let match_at = others
            .iter()
            .enumerate()
            .position(|(i, other)| !claimed[i] && matches(item, other));
        match match_at {
            Some(i) => {
                if policy == MatchPolicy::Greedy {
                    claimed[i] = true;
                }
            }
            None => results.push(item.clone()),
        }
    }

    results
}
