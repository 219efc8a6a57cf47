// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store selected at runtime from a [`StoreConfig`].

use crate::database::StoreConfig;
use crate::error::StoreResult;
use crate::model::{DeviceId, DeviceRecord};
use crate::reconcile::{DeviceUpdate, NewDevice};
use crate::types::MacAddress;

use super::{CommitSink, DeviceStore, JsonFileOptions, JsonFileStore, MemoryStore};

/// One of the bundled stores.
#[derive(Debug)]
pub enum ConfiguredStore {
    /// Process memory.
    Memory(MemoryStore),
    /// JSON document on disk.
    JsonFile(JsonFileStore),
}

impl ConfiguredStore {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a file-backed store cannot be opened.
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        match config {
            StoreConfig::InMemory => Ok(Self::Memory(MemoryStore::new())),
            StoreConfig::JsonFile {
                path,
                create_if_missing,
                pretty,
            } => {
                let options = JsonFileOptions {
                    create_if_missing: *create_if_missing,
                    pretty: *pretty,
                };
                JsonFileStore::open_with(path, options).await.map(Self::JsonFile)
            }
        }
    }

    /// Returns `true` if the data lives in process memory only.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }

    /// Returns `true` if the data is persisted to a file.
    #[must_use]
    pub fn is_json_file(&self) -> bool {
        matches!(self, Self::JsonFile(_))
    }
}

impl From<MemoryStore> for ConfiguredStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<JsonFileStore> for ConfiguredStore {
    fn from(store: JsonFileStore) -> Self {
        Self::JsonFile(store)
    }
}

impl DeviceStore for ConfiguredStore {
    async fn find(&self, address: &MacAddress) -> StoreResult<Option<DeviceRecord>> {
        match self {
            Self::Memory(store) => store.find(address).await,
            Self::JsonFile(store) => store.find(address).await,
        }
    }

    async fn insert(&self, device: NewDevice, sink: &dyn CommitSink) -> StoreResult<DeviceRecord> {
        match self {
            Self::Memory(store) => store.insert(device, sink).await,
            Self::JsonFile(store) => store.insert(device, sink).await,
        }
    }

    async fn apply_update(
        &self,
        device: DeviceId,
        update: DeviceUpdate,
        sink: &dyn CommitSink,
    ) -> StoreResult<DeviceRecord> {
        match self {
            Self::Memory(store) => store.apply_update(device, update, sink).await,
            Self::JsonFile(store) => store.apply_update(device, update, sink).await,
        }
    }

    async fn remove(
        &self,
        address: &MacAddress,
        sink: &dyn CommitSink,
    ) -> StoreResult<Option<DeviceRecord>> {
        match self {
            Self::Memory(store) => store.remove(address, sink).await,
            Self::JsonFile(store) => store.remove(address, sink).await,
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<DeviceRecord>> {
        match self {
            Self::Memory(store) => store.list_all().await,
            Self::JsonFile(store) => store.list_all().await,
        }
    }

    async fn close(&self) -> StoreResult<()> {
        match self {
            Self::Memory(store) => store.close().await,
            Self::JsonFile(store) => store.close().await,
        }
    }
}
