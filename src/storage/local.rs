// SPDX-License-Identifier: MPL-2.0
//! Local persistent store: one JSON text file per key in the data directory.

use crate::error::Result;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    fn file_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Reads and parses the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io) on read failures and
    /// [`Error::Storage`](crate::error::Error::Storage) for malformed JSON.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        match tokio::fs::read_to_string(self.file_for(key)).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Serializes `value` as JSON text and writes it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io) if the directory or
    /// file cannot be written.
    pub async fn set(&self, key: &str, value: &Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let text = serde_json::to_string(value)?;
        tokio::fs::write(self.file_for(key), text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn round_trips_json_text() {
        let dir = tempdir().expect("tempdir");
        let store = LocalStore::new(dir.path().join("nested"));
        store.set("doc", &json!({"quality": 0.5})).await.expect("set");
        assert_eq!(
            store.get("doc").await.expect("get"),
            Some(json!({"quality": 0.5}))
        );
        let raw = std::fs::read_to_string(dir.path().join("nested/doc.json")).expect("read");
        assert!(raw.contains("quality"));
    }

    #[tokio::test]
    async fn unknown_key_is_none() {
        let dir = tempdir().expect("tempdir");
        let store = LocalStore::new(dir.path());
        assert_eq!(store.get("missing").await.expect("get"), None);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let store = LocalStore::new("/tmp/x");
        assert_eq!(store.file_for("a/b c"), PathBuf::from("/tmp/x/a_b_c.json"));
    }
}
