// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write-sets produced by the reconciler.

use crate::model::{Observation, ObservationId, Timestamp};
use crate::types::MacAddress;

/// Classification of a merge outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A new device row will be created.
    Inserted,
    /// An existing device will be renamed and/or have its history changed.
    Updated,
    /// Nothing differs from what is stored.
    NoChange,
}

/// A device that does not exist yet, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    /// MAC address of the new device.
    pub address: MacAddress,
    /// Display name.
    pub name: String,
    /// Creation time, also used as the initial update time.
    pub created: Timestamp,
    /// Observations to write, ascending by timestamp with unique timestamps.
    pub observations: Vec<Observation>,
}

/// Changes to apply to an existing device in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceUpdate {
    /// New name, if it changed.
    pub name: Option<String>,
    /// Observations to insert.
    pub insert: Vec<Observation>,
    /// Stored observations to delete, together with their capabilities.
    pub delete: Vec<ObservationId>,
    /// New last-updated time.
    pub last_updated: Timestamp,
}

impl DeviceUpdate {
    /// Returns `true` if the history changes.
    #[must_use]
    pub fn changes_history(&self) -> bool {
        !self.insert.is_empty() || !self.delete.is_empty()
    }

    /// Returns `true` if the device gets renamed.
    #[must_use]
    pub fn renames(&self) -> bool {
        self.name.is_some()
    }
}

/// The minimal write-set that brings stored state in line with a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum MergePlan {
    /// Insert a device that was not stored before.
    Insert(NewDevice),
    /// Update an existing device.
    Update(DeviceUpdate),
    /// Nothing to write.
    NoChange,
}

impl MergePlan {
    /// Returns the change classification of this plan.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Insert(_) => ChangeKind::Inserted,
            Self::Update(_) => ChangeKind::Updated,
            Self::NoChange => ChangeKind::NoChange,
        }
    }

    /// Returns `true` if applying the plan writes nothing.
    #[must_use]
    pub fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    /// Returns the number of observations the plan inserts.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        match self {
            Self::Insert(device) => device.observations.len(),
            Self::Update(update) => update.insert.len(),
            Self::NoChange => 0,
        }
    }

    /// Returns the number of stored observations the plan deletes.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        match self {
            Self::Update(update) => update.delete.len(),
            Self::Insert(_) | Self::NoChange => 0,
        }
    }
}
