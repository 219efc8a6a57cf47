// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process device table shared by the bundled stores.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::model::{DeviceId, DeviceRecord, ObservationId, StoredObservation, Timestamp};
use crate::reconcile::{DeviceUpdate, NewDevice};
use crate::types::MacAddress;

/// Current version of the persisted document layout.
const DOCUMENT_VERSION: u32 = 1;

/// All device rows, keyed by MAC address.
///
/// Every mutating method either applies completely or leaves the table
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "TableDocument", try_from = "TableDocument")]
pub(crate) struct DeviceTable {
    devices: BTreeMap<MacAddress, DeviceRecord>,
}

#[derive(Serialize, Deserialize)]
struct TableDocument {
    version: u32,
    devices: Vec<DeviceRecord>,
}

impl From<DeviceTable> for TableDocument {
    fn from(table: DeviceTable) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            devices: table.devices.into_values().collect(),
        }
    }
}

impl TryFrom<TableDocument> for DeviceTable {
    type Error = StoreError;

    /// Rebuilds the table, rejecting documents edited into a state the
    /// store never writes.
    fn try_from(document: TableDocument) -> StoreResult<Self> {
        let mut devices = BTreeMap::new();
        for mut record in document.devices {
            let history = record.history_mut();
            history.sort_by_key(|row| row.timestamp());
            let clash = history
                .windows(2)
                .find(|pair| pair[0].timestamp() == pair[1].timestamp())
                .map(|pair| pair[1].timestamp());
            if let Some(timestamp) = clash {
                return Err(StoreError::ConflictingObservation {
                    device: record.id(),
                    timestamp,
                });
            }
            if devices.contains_key(record.address()) {
                return Err(StoreError::DuplicateAddress(record.address().clone()));
            }
            devices.insert(record.address().clone(), record);
        }
        Ok(Self { devices })
    }
}

impl DeviceTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn find(&self, address: &MacAddress) -> Option<&DeviceRecord> {
        self.devices.get(address)
    }

    pub(crate) fn list(&self) -> Vec<DeviceRecord> {
        self.devices.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.devices.len()
    }

    pub(crate) fn insert(&mut self, device: NewDevice) -> StoreResult<DeviceRecord> {
        if self.devices.contains_key(&device.address) {
            return Err(StoreError::DuplicateAddress(device.address));
        }

        let id = DeviceId::new();
        let mut taken = HashSet::new();
        if let Some(clash) = device
            .observations
            .iter()
            .find(|observation| !taken.insert(observation.timestamp()))
        {
            return Err(StoreError::ConflictingObservation {
                device: id,
                timestamp: clash.timestamp(),
            });
        }

        let history = device
            .observations
            .into_iter()
            .map(|observation| StoredObservation::new(ObservationId::new(), observation))
            .collect();
        let record = DeviceRecord::from_parts(
            id,
            device.address.clone(),
            device.name,
            device.created,
            device.created,
            history,
        );

        self.devices.insert(device.address, record.clone());
        Ok(record)
    }

    pub(crate) fn apply(&mut self, id: DeviceId, update: DeviceUpdate) -> StoreResult<DeviceRecord> {
        let record = self
            .devices
            .values_mut()
            .find(|record| record.id() == id)
            .ok_or(StoreError::UnknownDevice(id))?;

        let known: HashSet<ObservationId> = record.history().iter().map(StoredObservation::id).collect();
        if let Some(missing) = update.delete.iter().find(|stale| !known.contains(stale)) {
            return Err(StoreError::UnknownObservation {
                device: id,
                observation: *missing,
            });
        }

        let DeviceUpdate {
            name,
            insert,
            delete,
            last_updated,
        } = update;

        // A plan computed from an outdated read may target an instant that
        // is already stored
        let delete: HashSet<ObservationId> = delete.into_iter().collect();
        let mut taken: HashSet<Timestamp> = record
            .history()
            .iter()
            .filter(|row| !delete.contains(&row.id()))
            .map(|row| row.timestamp())
            .collect();
        if let Some(clash) = insert.iter().find(|observation| !taken.insert(observation.timestamp())) {
            return Err(StoreError::ConflictingObservation {
                device: id,
                timestamp: clash.timestamp(),
            });
        }

        if let Some(name) = name {
            record.set_name(name);
        }
        record.touch(last_updated);

        let history = record.history_mut();
        history.retain(|row| !delete.contains(&row.id()));
        history.extend(
            insert
                .into_iter()
                .map(|observation| StoredObservation::new(ObservationId::new(), observation)),
        );
        history.sort_by_key(|row| row.timestamp());

        Ok(record.clone())
    }

    pub(crate) fn remove(&mut self, address: &MacAddress) -> Option<DeviceRecord> {
        self.devices.remove(address)
    }
}
