// SPDX-License-Identifier: MPL-2.0
//! Privileged key/value store provided by an embedding host.
//!
//! The host hands over a directory; all keys live in a single CBOR map in
//! `host-store.cbor` inside it. The store is unavailable when the directory
//! does not exist, which lets the gateway fall back to the local store.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Store file name within the host directory.
const STORE_FILE: &str = "host-store.cbor";

type Entries = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
pub struct HostStore {
    dir: PathBuf,
}

impl HostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    async fn ensure_available(&self) -> Result<()> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(Error::Storage(format!(
                "host store unavailable at {}",
                self.dir.display()
            ))),
        }
    }

    async fn read_entries(&self) -> Result<Entries> {
        self.ensure_available().await?;
        let bytes = match tokio::fs::read(self.file()).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(err.into()),
        };
        ciborium::from_reader(bytes.as_slice())
            .map_err(|err| Error::Storage(format!("host store is corrupt: {err}")))
    }

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the host directory is missing or the
    /// store cannot be decoded, [`Error::Io`] on read failures.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    /// Stores `value` under `key`, keeping all other entries.
    ///
    /// # Errors
    ///
    /// Same conditions as [`HostStore::get`], plus write failures.
    pub async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.clone());

        let mut bytes = Vec::new();
        ciborium::into_writer(&entries, &mut bytes)
            .map_err(|err| Error::Storage(format!("host store encoding failed: {err}")))?;
        tokio::fs::write(self.file(), bytes).await?;
        Ok(())
    }
}
