//! Reading card and bank statements exported as CSV.

use crate::{Error, Result, Transaction, truncate_amount};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Deserialize;
use std::io;
use std::path::Path;

/// Marks amounts shown in the original currency of a foreign purchase.
pub const CONVERSION_MARKER: &str = "現地利用額";
/// Marks revolving credit (ribo) charges and installments.
pub const REVOLVING_MARKER: &str = "リボ";

/// Column layout of one statement export.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatementFormat {
    pub date_column: usize,
    pub description_column: usize,
    pub amount_column: usize,
    /// A chrono format string, e.g. `%Y/%m/%d`.
    pub date_format: String,
    #[serde(default)]
    pub has_header: bool,
    /// Exclude foreign currency conversion rows and revolving credit rows.
    #[serde(default)]
    pub has_ribo: bool,
    /// Second column searched for the revolving credit marker.
    #[serde(default = "default_ribo_column")]
    pub ribo_column: usize,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
}

fn default_ribo_column() -> usize {
    3
}

/// Drop every row where one of `columns` contains `marker`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExclusionRule {
    pub marker: String,
    pub columns: Vec<usize>,
}

/// Decides which statement rows never take part in reconciliation.
pub trait RowFilter {
    fn excludes(&self, row: &StringRecord) -> bool;
}

impl<F: Fn(&StringRecord) -> bool> RowFilter for F {
    fn excludes(&self, row: &StringRecord) -> bool {
        self(row)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerFilter {
    rules: Vec<ExclusionRule>,
}

impl MarkerFilter {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        MarkerFilter { rules }
    }

    /// The configured exclusions, plus the ribo rules if the format asks for them.
    pub fn from_format(format: &StatementFormat) -> Self {
        let mut rules = format.exclusions.clone();
        if format.has_ribo {
            rules.push(ExclusionRule {
                marker: CONVERSION_MARKER.to_owned(),
                columns: vec![format.description_column],
            });
            rules.push(ExclusionRule {
                marker: REVOLVING_MARKER.to_owned(),
                columns: vec![format.description_column, format.ribo_column],
            });
        }
        MarkerFilter { rules }
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }
}

impl RowFilter for MarkerFilter {
    fn excludes(&self, row: &StringRecord) -> bool {
        self.rules.iter().any(|rule| {
            rule.columns
                .iter()
                .filter_map(|&column| row.get(column))
                .any(|field| field.contains(&rule.marker))
        })
    }
}

/// Read the statement at `path` using the exclusion rules derived from `format`.
pub fn read_statement(path: impl AsRef<Path>, format: &StatementFormat) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    let filter = MarkerFilter::from_format(format);
    tracing::debug!("Excluding rows matching {:?}", filter.rules());
    let transactions = parse_statement(file, format, &filter)?;
    tracing::info!(
        "Read {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}

/// Normalize every row of a statement. The first malformed row aborts the whole statement.
pub fn parse_statement(
    reader: impl io::Read,
    format: &StatementFormat,
    filter: &dyn RowFilter,
) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(format.has_header)
        .flexible(true)
        .from_reader(reader);

    let mut transactions = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        if filter.excludes(&record) {
            tracing::debug!("Excluding statement row {:?}", record);
            continue;
        }
        transactions.push(parse_row(&record, format)?);
    }

    Ok(transactions)
}

fn parse_row(record: &StringRecord, format: &StatementFormat) -> Result<Transaction> {
    let line = record.position().map_or(0, |pos| pos.line());
    let column = |index: usize, name: &str| {
        record.get(index).ok_or_else(|| {
            Error::malformed(
                line,
                format!(
                    "{name} column {index} missing, row has {} fields",
                    record.len()
                ),
            )
        })
    };

    let raw_date = column(format.date_column, "date")?;
    let description = column(format.description_column, "description")?;
    let raw_amount = column(format.amount_column, "amount")?;

    let date = NaiveDate::parse_from_str(raw_date.trim(), &format.date_format).map_err(|e| {
        Error::malformed(
            line,
            format!(
                "date '{raw_date}' does not match '{}': {e}",
                format.date_format
            ),
        )
    })?;
    let amount = truncate_amount(raw_amount)
        .ok_or_else(|| Error::malformed(line, format!("amount '{raw_amount}' is not a number")))?;

    Ok(Transaction::new(date, description, amount))
}
