//! A response cache that can be layered over any [`Transport`].
//!
//! Entries are JSON files named after the SHA-256 of the request, stamped with the time they were
//! fetched. Errors are never cached, and a cache that cannot be read or written only costs a request.

use super::Transport;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(60);

pub struct CachedTransport<T> {
    inner: T,
    dir: PathBuf,
    expire_after: Duration,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    /// Unix timestamp in seconds.
    fetched_at: i64,
    body: Value,
}

impl<T: Transport> CachedTransport<T> {
    pub fn new(inner: T, dir: impl Into<PathBuf>, expire_after: Duration) -> Self {
        CachedTransport {
            inner,
            dir: dir.into(),
            expire_after,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn entry_path(&self, url: &str, query: &[(&str, String)]) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        for (key, value) in query {
            hasher.update(b"\0");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        self.dir.join(format!("{:x}.json", hasher.finalize()))
    }

    fn lookup(&self, path: &Path, now: i64) -> Option<Value> {
        let contents = std::fs::read(path).ok()?;
        let entry: CacheEntry = match serde_json::from_slice(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring unreadable cache entry {}: {e}", path.display());
                return None;
            }
        };
        let age = u64::try_from(now - entry.fetched_at).ok()?;
        (age < self.expire_after.as_secs()).then_some(entry.body)
    }

    fn store(&self, path: &Path, body: &Value, now: i64) {
        let entry = CacheEntry {
            fetched_at: now,
            body: body.clone(),
        };
        let result = std::fs::create_dir_all(&self.dir).and_then(|()| {
            let contents = serde_json::to_vec(&entry)?;
            std::fs::write(path, contents)
        });
        if let Err(e) = result {
            tracing::debug!("Failed to write cache entry {}: {e}", path.display());
        }
    }
}

impl<T: Transport> Transport for CachedTransport<T> {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let path = self.entry_path(url, query);
        let now = chrono::Utc::now().timestamp();

        if let Some(body) = self.lookup(&path, now) {
            tracing::debug!("Cache hit for {url} {query:?}");
            return Ok(body);
        }

        let body = self.inner.get(url, query)?;
        self.store(&path, &body, now);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
        fail: bool,
    }

    impl Counting {
        fn new(fail: bool) -> Self {
            Counting {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl Transport for Counting {
        fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(Error::Transport {
                    url: url.to_owned(),
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            Ok(json!({ "url": url, "page": query.last().map(|(_, v)| v.clone()) }))
        }
    }

    fn cache_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "doughdetective-cache-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn second_request_is_served_from_cache() {
        let dir = cache_dir("hit");
        let cache = CachedTransport::new(Counting::new(false), &dir, DEFAULT_EXPIRE_AFTER);
        let query = [("page", "1".to_string())];

        let first = cache.get("https://ledger/api/v1/accounts", &query).unwrap();
        let second = cache.get("https://ledger/api/v1/accounts", &query).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.into_inner().calls.get(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn different_query_is_a_different_entry() {
        let dir = cache_dir("query");
        let cache = CachedTransport::new(Counting::new(false), &dir, DEFAULT_EXPIRE_AFTER);

        let first = cache.get("https://ledger/api/v1/accounts", &[("page", "1".to_string())]).unwrap();
        let second = cache.get("https://ledger/api/v1/accounts", &[("page", "2".to_string())]).unwrap();
        assert_ne!(first, second);
        assert_eq!(cache.into_inner().calls.get(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let dir = cache_dir("expired");
        let cache = CachedTransport::new(Counting::new(false), &dir, Duration::ZERO);

        cache.get("https://ledger/api/v1/accounts", &[]).unwrap();
        cache.get("https://ledger/api/v1/accounts", &[]).unwrap();
        assert_eq!(cache.into_inner().calls.get(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn errors_are_not_cached() {
        let dir = cache_dir("errors");
        let cache = CachedTransport::new(Counting::new(true), &dir, DEFAULT_EXPIRE_AFTER);

        assert!(cache.get("https://ledger/api/v1/accounts", &[]).is_err());
        assert!(cache.get("https://ledger/api/v1/accounts", &[]).is_err());
        assert_eq!(cache.into_inner().calls.get(), 2);
        assert!(!dir.exists());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = cache_dir("corrupt");
        let cache = CachedTransport::new(Counting::new(false), &dir, DEFAULT_EXPIRE_AFTER);
        let path = cache.entry_path("https://ledger/api/v1/accounts", &[]);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        cache.get("https://ledger/api/v1/accounts", &[]).unwrap();
        assert_eq!(cache.into_inner().calls.get(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
