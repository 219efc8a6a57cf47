// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device store backed by a JSON document on disk.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::model::{DeviceId, DeviceRecord};
use crate::reconcile::{DeviceUpdate, NewDevice};
use crate::types::MacAddress;

use super::table::DeviceTable;
use super::{Commit, CommitSink, DeviceStore};

/// Options for opening a [`JsonFileStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonFileOptions {
    /// Create an empty document when the file does not exist.
    pub create_if_missing: bool,
    /// Write indented JSON.
    pub pretty: bool,
}

impl Default for JsonFileOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            pretty: false,
        }
    }
}

/// Device store that persists every device in one JSON file.
///
/// Each write serializes the complete new table into a temporary sibling
/// file, flushes it, and renames it over the target. The in-memory copy is
/// only replaced after the rename succeeded, so a failed write leaves both
/// disk and memory as they were. Writes are serialized by an async mutex held
/// for the whole transaction.
///
/// The document is rewritten in full on every change, which suits the small
/// device counts of a home installation.
///
/// # Examples
///
/// ```no_run
/// use smartlight_store::{JsonFileStore, SmartLightDatabase};
///
/// # async fn example() -> smartlight_store::Result<()> {
/// let store = JsonFileStore::open("/var/lib/lights/devices.json").await?;
/// let db = SmartLightDatabase::new(store);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    options: JsonFileOptions,
    /// `None` once the store is closed.
    table: Mutex<Option<DeviceTable>>,
}

impl JsonFileStore {
    /// Opens the store at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read, parsed or created.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, JsonFileOptions::default()).await
    }

    /// Opens the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` with `NotFound` if the file is missing and
    /// `create_if_missing` is off, or another `StoreError` if the file cannot
    /// be read, parsed or created.
    pub async fn open_with(path: impl AsRef<Path>, options: JsonFileOptions) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let table: DeviceTable = serde_json::from_slice(&bytes)?;
                tracing::info!(path = %path.display(), devices = table.len(), "Loaded device store");
                table
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && options.create_if_missing => {
                let table = DeviceTable::new();
                write_document(&path, &table, options.pretty).await?;
                tracing::info!(path = %path.display(), "Created empty device store");
                table
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            options,
            table: Mutex::new(Some(table)),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn write_document(path: &Path, table: &DeviceTable, pretty: bool) -> StoreResult<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(table)?
    } else {
        serde_json::to_vec(table)?
    };

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = replace_file(&tmp, path, &bytes).await {
        // The temp file may not exist yet
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Writes `bytes` to `tmp`, flushes it to disk and moves it over `path`.
async fn replace_file(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp, path).await
}

impl DeviceStore for JsonFileStore {
    async fn find(&self, address: &MacAddress) -> StoreResult<Option<DeviceRecord>> {
        let guard = self.table.lock().await;
        let table = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(table.find(address).cloned())
    }

    async fn insert(&self, device: NewDevice, sink: &dyn CommitSink) -> StoreResult<DeviceRecord> {
        let mut guard = self.table.lock().await;
        let current = guard.as_ref().ok_or(StoreError::Closed)?;
        let mut next = current.clone();
        let record = next.insert(device)?;
        write_document(&self.path, &next, self.options.pretty).await?;
        *guard = Some(next);
        sink.committed(Commit::Inserted(&record));
        Ok(record)
    }

    async fn apply_update(
        &self,
        device: DeviceId,
        update: DeviceUpdate,
        sink: &dyn CommitSink,
    ) -> StoreResult<DeviceRecord> {
        let mut guard = self.table.lock().await;
        let current = guard.as_ref().ok_or(StoreError::Closed)?;
        let mut next = current.clone();
        let record = next.apply(device, update)?;
        write_document(&self.path, &next, self.options.pretty).await?;
        *guard = Some(next);
        sink.committed(Commit::Updated(&record));
        Ok(record)
    }

    async fn remove(
        &self,
        address: &MacAddress,
        sink: &dyn CommitSink,
    ) -> StoreResult<Option<DeviceRecord>> {
        let mut guard = self.table.lock().await;
        let current = guard.as_ref().ok_or(StoreError::Closed)?;
        if current.find(address).is_none() {
            return Ok(None);
        }
        let mut next = current.clone();
        let removed = next.remove(address);
        write_document(&self.path, &next, self.options.pretty).await?;
        *guard = Some(next);
        sink.committed(Commit::Removed(address));
        Ok(removed)
    }

    async fn list_all(&self) -> StoreResult<Vec<DeviceRecord>> {
        let guard = self.table.lock().await;
        let table = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(table.list())
    }

    async fn close(&self) -> StoreResult<()> {
        if self.table.lock().await.take().is_some() {
            tracing::info!(path = %self.path.display(), "Closed device store");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::model::{Observation, Timestamp};
    use crate::store::testing::RecordingSink;

    fn now() -> Timestamp {
        DateTime::parse_from_rfc3339("2024-01-15T10:00:00+02:00").unwrap()
    }

    fn mac() -> MacAddress {
        MacAddress::new("12:34:56:78:90:10").unwrap()
    }

    fn new_device() -> NewDevice {
        NewDevice {
            address: mac(),
            name: "Lamp".into(),
            created: now(),
            observations: vec![Observation::new(now(), true).with_address("192.168.1.4")],
        }
    }

    #[tokio::test]
    async fn creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(path.exists());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = JsonFileOptions {
            create_if_missing: false,
            pretty: false,
        };

        let err = JsonFileStore::open_with(dir.path().join("absent.json"), options)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        let sink = RecordingSink::default();

        let record = {
            let store = JsonFileStore::open(&path).await.unwrap();
            let record = store.insert(new_device(), &sink).await.unwrap();
            store.close().await.unwrap();
            record
        };

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.find(&mac()).await.unwrap(), Some(record));
        assert_eq!(sink.take(), vec![("inserted", mac())]);
    }

    #[tokio::test]
    async fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        let sink = RecordingSink::default();

        let store = JsonFileStore::open(&path).await.unwrap();
        store.insert(new_device(), &sink).await.unwrap();
        assert!(store.remove(&mac(), &sink).await.unwrap().is_some());
        assert!(store.remove(&mac(), &sink).await.unwrap().is_none());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert!(reopened.find(&mac()).await.unwrap().is_none());
        assert_eq!(sink.take(), vec![("inserted", mac()), ("removed", mac())]);
    }

    #[tokio::test]
    async fn failed_update_keeps_disk_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        let sink = RecordingSink::default();

        let store = JsonFileStore::open(&path).await.unwrap();
        let record = store.insert(new_device(), &sink).await.unwrap();
        let before = tokio::fs::read(&path).await.unwrap();

        let update = DeviceUpdate {
            name: Some("Renamed".into()),
            insert: vec![],
            delete: vec![crate::model::ObservationId::new()],
            last_updated: now(),
        };
        assert!(store.apply_update(record.id(), update, &sink).await.is_err());

        assert_eq!(tokio::fs::read(&path).await.unwrap(), before);
        assert_eq!(store.find(&mac()).await.unwrap(), Some(record));
        assert_eq!(sink.take(), vec![("inserted", mac())]);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        let sink = RecordingSink::default();

        let store = JsonFileStore::open(&path).await.unwrap();
        // A directory in place of the document makes the final rename fail
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        let err = store.insert(new_device(), &sink).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
        assert_eq!(store.find(&mac()).await.unwrap(), None);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn pretty_output_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        let options = JsonFileOptions {
            create_if_missing: true,
            pretty: true,
        };

        let store = JsonFileStore::open_with(&path, options).await.unwrap();
        store.insert(new_device(), &RecordingSink::default()).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.contains("\n  \"devices\""));
        assert!(text.contains("2024-01-15T10:00:00+02:00"));
    }

    #[tokio::test]
    async fn closed_store_rejects_reads() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("devices.json")).await.unwrap();
        store.close().await.unwrap();
        assert!(matches!(store.find(&mac()).await, Err(StoreError::Closed)));
    }
}
