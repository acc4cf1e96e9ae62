//! The subset of the Firefly III JSON API we consume.

use serde::Deserialize;

/// One page of a paginated listing.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResource {
    pub id: String,
    pub attributes: AccountAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountAttributes {
    pub name: String,
}

/// A transaction group. Groups with more than one split carry a title.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionGroup {
    pub id: String,
    pub attributes: GroupAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupAttributes {
    #[serde(default)]
    pub group_title: Option<String>,
    pub transactions: Vec<Split>,
}

/// A single leg of a transaction group.
#[derive(Debug, Clone, Deserialize)]
pub struct Split {
    #[serde(default)]
    pub source_id: Option<String>,
    /// Decimal string, e.g. `"1200.000000000000"`.
    pub amount: String,
    /// RFC 3339 timestamp.
    pub date: String,
    pub description: String,
}

impl TransactionGroup {
    pub fn first_split(&self) -> Option<&Split> {
        self.attributes.transactions.first()
    }

    /// The group title, if this is a split transaction.
    pub fn title(&self) -> Option<&str> {
        self.attributes
            .group_title
            .as_deref()
            .filter(|title| !title.is_empty())
    }
}
