use crate::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

/// Performs a single authenticated GET against the ledger and returns the decoded JSON body.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        (**self).get(url, query)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        (**self).get(url, query)
    }
}

/// Where the ledger lives and how to authenticate against it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSettings {
    /// API base, e.g. `https://firefly.example.com/api/v1`.
    pub server: String,
    /// Personal access token.
    pub token: String,
    /// Skip certificate validation, for self-signed ledger instances.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

pub struct HttpTransport {
    client: Client,
    token: String,
}

impl HttpTransport {
    /// The client is dedicated to the ledger, so relaxed TLS never applies to other hosts.
    pub fn new(settings: &LedgerSettings) -> Result<Self> {
        if settings.accept_invalid_certs {
            tracing::warn!(
                "Certificate validation is disabled for {}",
                settings.server
            );
        }
        let client = Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|source| Error::Request {
                url: settings.server.clone(),
                source,
            })?;

        Ok(HttpTransport {
            client,
            token: settings.token.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!("GET {url} {query:?}");
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| Error::Request {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport {
                url: url.to_owned(),
                status,
            });
        }

        response
            .json()
            .map_err(|e| Error::protocol(url, format!("body is not JSON: {e}")))
    }
}
