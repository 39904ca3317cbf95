// SPDX-License-Identifier: MPL-2.0
//! Persistence gateway.
//!
//! A best-effort async key/value store over a fixed fallback chain: the
//! privileged host store when the embedding host provides one, then the local
//! persistent store. The chain is chosen once when the gateway is built.
//! Every call walks it in order and stops at the first store that answers;
//! failures are logged and never reach the caller.

pub mod host;
pub mod local;

pub use host::HostStore;
pub use local::LocalStore;

use crate::error::Result;
use serde_json::Value;
use std::path::PathBuf;

/// Key of the persisted editor document.
pub const DOCUMENT_KEY: &str = "easel-document";

/// One backend of the gateway chain.
#[derive(Debug, Clone)]
pub enum Store {
    Host(HostStore),
    Local(LocalStore),
}

impl Store {
    pub fn name(&self) -> &'static str {
        match self {
            Store::Host(_) => "host",
            Store::Local(_) => "local",
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match self {
            Store::Host(store) => store.get(key).await,
            Store::Local(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        match self {
            Store::Host(store) => store.set(key, value).await,
            Store::Local(store) => store.set(key, value).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    chain: Vec<Store>,
}

impl Gateway {
    pub fn new(chain: Vec<Store>) -> Self {
        Self { chain }
    }

    /// Builds the standard chain: host store first when `host_dir` is set,
    /// then the local store in `data_dir`.
    pub fn from_dirs(host_dir: Option<PathBuf>, data_dir: PathBuf) -> Self {
        let mut chain = Vec::with_capacity(2);
        if let Some(dir) = host_dir {
            chain.push(Store::Host(HostStore::new(dir)));
        }
        chain.push(Store::Local(LocalStore::new(data_dir)));
        tracing::debug!(
            stores = ?chain.iter().map(Store::name).collect::<Vec<_>>(),
            "persistence chain selected"
        );
        Self { chain }
    }

    pub fn stores(&self) -> &[Store] {
        &self.chain
    }

    /// Returns the value under `key` from the first store that can be read.
    ///
    /// `None` means either the key is absent or no store could be read.
    pub async fn get(&self, key: &str) -> Option<Value> {
        for store in &self.chain {
            match store.get(key).await {
                Ok(value) => return value,
                Err(err) => {
                    tracing::warn!(store = store.name(), key, %err, "persistence read failed");
                }
            }
        }
        None
    }

    /// Writes `value` to the first store that accepts it.
    pub async fn set(&self, key: &str, value: &Value) {
        for store in &self.chain {
            match store.set(key, value).await {
                Ok(()) => return,
                Err(err) => {
                    tracing::warn!(store = store.name(), key, %err, "persistence write failed");
                }
            }
        }
        tracing::warn!(key, "value was not persisted by any store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn chain_without_host_is_local_only() {
        let gateway = Gateway::from_dirs(None, PathBuf::from("/tmp/data"));
        let names: Vec<_> = gateway.stores().iter().map(Store::name).collect();
        assert_eq!(names, ["local"]);
    }

    #[test]
    fn chain_with_host_prefers_host() {
        let gateway = Gateway::from_dirs(Some("/tmp/host".into()), PathBuf::from("/tmp/data"));
        let names: Vec<_> = gateway.stores().iter().map(Store::name).collect();
        assert_eq!(names, ["host", "local"]);
    }

    #[tokio::test]
    async fn writes_go_to_host_when_available() {
        let host = tempdir().expect("host");
        let data = tempdir().expect("data");
        let gateway = Gateway::from_dirs(Some(host.path().into()), data.path().into());

        gateway.set(DOCUMENT_KEY, &json!({"theme": "light"})).await;

        assert!(host.path().join("host-store.cbor").exists());
        assert!(!data.path().join(format!("{DOCUMENT_KEY}.json")).exists());
        assert_eq!(
            gateway.get(DOCUMENT_KEY).await,
            Some(json!({"theme": "light"}))
        );
    }

    #[tokio::test]
    async fn broken_host_falls_back_to_local() {
        let data = tempdir().expect("data");
        let gateway = Gateway::from_dirs(
            Some(data.path().join("missing-host")),
            data.path().join("local"),
        );

        gateway.set(DOCUMENT_KEY, &json!([1, 2, 3])).await;

        assert!(data
            .path()
            .join("local")
            .join(format!("{DOCUMENT_KEY}.json"))
            .exists());
        assert_eq!(gateway.get(DOCUMENT_KEY).await, Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn all_stores_failing_is_silent() {
        let data = tempdir().expect("data");
        let blocker = data.path().join("file");
        std::fs::write(&blocker, b"x").expect("write");
        // a regular file cannot serve as a directory for either store
        let gateway = Gateway::from_dirs(Some(blocker.clone()), blocker.join("local"));

        gateway.set("k", &json!(1)).await;
        assert_eq!(gateway.get("k").await, None);
    }
}
