//! Retrieving transactions from a Firefly III ledger.

mod cache;
pub mod model;
mod transport;

pub use cache::{CachedTransport, DEFAULT_EXPIRE_AFTER};
pub use transport::{HttpTransport, LedgerSettings, Transport};

use crate::period::DateRange;
use crate::{Error, Result, Transaction, truncate_amount};
use chrono::DateTime;
use model::{AccountResource, Page, TransactionGroup};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

pub struct LedgerClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> LedgerClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        LedgerClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
            transport,
        }
    }

    /// Request every page of `endpoint`, concatenating the items in page order.
    fn fetch_all<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<R>> {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut params = query.to_vec();
            params.push(("page", page.to_string()));

            let body = self.transport.get(&url, &params)?;
            let response: Page<R> = serde_json::from_value(body)
                .map_err(|e| Error::protocol(endpoint, format!("page {page}: {e}")))?;
            tracing::debug!(
                "Fetched {endpoint} page {page}/{} with {} items",
                response.meta.pagination.total_pages,
                response.data.len()
            );
            items.extend(response.data);

            page += 1;
            if page > response.meta.pagination.total_pages {
                break;
            }
        }

        Ok(items)
    }

    pub fn accounts(&self) -> Result<Vec<AccountResource>> {
        self.fetch_all("accounts", &[])
    }

    /// Map from account display name to account id. The first account wins on duplicate names.
    pub fn account_ids(&self) -> Result<BTreeMap<String, String>> {
        let mut ids = BTreeMap::new();
        for account in self.accounts()? {
            ids.entry(account.attributes.name).or_insert(account.id);
        }
        Ok(ids)
    }

    /// Look up an account by its exact, case-sensitive name.
    pub fn account_id(&self, name: &str) -> Result<Option<String>> {
        let id = self
            .accounts()?
            .into_iter()
            .find(|account| account.attributes.name == name)
            .map(|account| account.id);
        Ok(id)
    }

    /// Transaction groups in `range`, optionally restricted to those whose first split draws
    /// from `account_id`.
    pub fn transaction_groups(
        &self,
        range: &DateRange,
        account_id: Option<&str>,
    ) -> Result<Vec<TransactionGroup>> {
        let groups: Vec<TransactionGroup> = self.fetch_all("transactions", &range.query())?;
        let Some(account_id) = account_id else {
            return Ok(groups);
        };

        let mut kept = Vec::with_capacity(groups.len());
        for group in groups {
            let split = first_split(&group)?;
            if split.source_id.as_deref() == Some(account_id) {
                kept.push(group);
            }
        }
        Ok(kept)
    }

    /// Transactions in `range` in canonical form.
    pub fn transactions(
        &self,
        range: &DateRange,
        account_id: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let transactions = self
            .transaction_groups(range, account_id)?
            .iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(
            "Fetched {} ledger transactions between {} and {}",
            transactions.len(),
            range.start,
            range.end
        );
        Ok(transactions)
    }
}

fn first_split(group: &TransactionGroup) -> Result<&model::Split> {
    group.first_split().ok_or_else(|| {
        Error::protocol(
            "transactions",
            format!("transaction group {} has no splits", group.id),
        )
    })
}

fn split_amount(group: &TransactionGroup, amount: &str) -> Result<i64> {
    truncate_amount(amount).ok_or_else(|| {
        Error::protocol(
            "transactions",
            format!("transaction group {} has invalid amount '{amount}'", group.id),
        )
    })
}

/// Reduce a transaction group to a single transaction.
///
/// A titled group is a split transaction: its amount is the sum of the truncated split amounts and
/// its description is the title. Otherwise only the first split counts. The date always comes from
/// the first split.
fn canonicalize(group: &TransactionGroup) -> Result<Transaction> {
    let first = first_split(group)?;

    let (description, amount) = match group.title() {
        Some(title) => {
            let mut total: i64 = 0;
            for split in &group.attributes.transactions {
                total = total
                    .checked_add(split_amount(group, &split.amount)?)
                    .ok_or_else(|| {
                        Error::protocol(
                            "transactions",
                            format!("transaction group {} amounts overflow", group.id),
                        )
                    })?;
            }
            (title.to_owned(), total)
        }
        None => (first.description.clone(), split_amount(group, &first.amount)?),
    };

    let date = DateTime::parse_from_rfc3339(&first.date)
        .map_err(|e| {
            Error::protocol(
                "transactions",
                format!("transaction group {} has invalid date '{}': {e}", group.id, first.date),
            )
        })?
        .date_naive();

    Ok(Transaction::new(date, description, amount))
}
