// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device store.

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::model::{DeviceId, DeviceRecord};
use crate::reconcile::{DeviceUpdate, NewDevice};
use crate::types::MacAddress;

use super::table::DeviceTable;
use super::{Commit, CommitSink, DeviceStore};

/// Device store that keeps everything in process memory.
///
/// Writes take an exclusive lock for the duration of the change and the
/// commit notification; nothing is awaited while the lock is held.
///
/// # Examples
///
/// ```
/// use smartlight_store::{MemoryStore, SmartLightDatabase};
///
/// let db = SmartLightDatabase::new(MemoryStore::new());
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    /// `None` once the store is closed.
    table: RwLock<Option<DeviceTable>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Some(DeviceTable::new())),
        }
    }

    /// Returns the number of stored devices, or 0 once closed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().as_ref().map_or(0, DeviceTable::len)
    }

    /// Returns `true` if no device is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore for MemoryStore {
    async fn find(&self, address: &MacAddress) -> StoreResult<Option<DeviceRecord>> {
        let guard = self.table.read();
        let table = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(table.find(address).cloned())
    }

    async fn insert(&self, device: NewDevice, sink: &dyn CommitSink) -> StoreResult<DeviceRecord> {
        let mut guard = self.table.write();
        let table = guard.as_mut().ok_or(StoreError::Closed)?;
        let record = table.insert(device)?;
        sink.committed(Commit::Inserted(&record));
        Ok(record)
    }

    async fn apply_update(
        &self,
        device: DeviceId,
        update: DeviceUpdate,
        sink: &dyn CommitSink,
    ) -> StoreResult<DeviceRecord> {
        let mut guard = self.table.write();
        let table = guard.as_mut().ok_or(StoreError::Closed)?;
        let record = table.apply(device, update)?;
        sink.committed(Commit::Updated(&record));
        Ok(record)
    }

    async fn remove(
        &self,
        address: &MacAddress,
        sink: &dyn CommitSink,
    ) -> StoreResult<Option<DeviceRecord>> {
        let mut guard = self.table.write();
        let table = guard.as_mut().ok_or(StoreError::Closed)?;
        let removed = table.remove(address);
        if removed.is_some() {
            sink.committed(Commit::Removed(address));
        }
        Ok(removed)
    }

    async fn list_all(&self) -> StoreResult<Vec<DeviceRecord>> {
        let guard = self.table.read();
        let table = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(table.list())
    }

    async fn close(&self) -> StoreResult<()> {
        self.table.write().take();
        Ok(())
    }
}
