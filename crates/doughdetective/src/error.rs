use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A statement row could not be turned into a transaction.
    #[error("malformed statement row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// The ledger answered with a non-success status.
    #[error("ledger request to {url} failed with status {status}")]
    Transport {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The ledger could not be reached at all.
    #[error("ledger request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The ledger response lacked a field we rely on.
    #[error("unexpected ledger response from {endpoint}: {reason}")]
    Protocol { endpoint: String, reason: String },

    #[error("ledger has no account named '{0}'")]
    AccountNotFound(String),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Error::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn protocol(endpoint: &str, reason: impl Into<String>) -> Self {
        Error::Protocol {
            endpoint: endpoint.to_owned(),
            reason: reason.into(),
        }
    }
}
