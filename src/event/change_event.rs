// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change event types.

use serde::{Deserialize, Serialize};

use crate::model::DeviceRecord;
use crate::store::Commit;
use crate::types::MacAddress;

/// The net effect of one committed write on a device.
///
/// Inserts and updates carry the device record as stored after the write.
///
/// # Examples
///
/// ```
/// use smartlight_store::event::ChangeEvent;
/// use smartlight_store::MacAddress;
///
/// let address: MacAddress = "12:34:56:78:90:10".parse()?;
/// let event = ChangeEvent::removed(address.clone());
///
/// assert!(event.is_removed());
/// assert_eq!(event.address(), &address);
/// assert!(event.record().is_none());
/// # Ok::<(), smartlight_store::ValueError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A device was stored for the first time.
    Inserted(DeviceRecord),

    /// A stored device was renamed or its history changed.
    Updated(DeviceRecord),

    /// A device and its whole history were deleted.
    Removed {
        /// The address of the deleted device.
        address: MacAddress,
    },
}

impl ChangeEvent {
    /// Creates an insert event.
    #[must_use]
    pub fn inserted(record: DeviceRecord) -> Self {
        Self::Inserted(record)
    }

    /// Creates an update event.
    #[must_use]
    pub fn updated(record: DeviceRecord) -> Self {
        Self::Updated(record)
    }

    /// Creates a removal event.
    #[must_use]
    pub fn removed(address: MacAddress) -> Self {
        Self::Removed { address }
    }

    /// Returns the address of the affected device.
    #[must_use]
    pub fn address(&self) -> &MacAddress {
        match self {
            Self::Inserted(record) | Self::Updated(record) => record.address(),
            Self::Removed { address } => address,
        }
    }

    /// Returns the stored record for inserts and updates.
    #[must_use]
    pub fn record(&self) -> Option<&DeviceRecord> {
        match self {
            Self::Inserted(record) | Self::Updated(record) => Some(record),
            Self::Removed { .. } => None,
        }
    }

    /// Returns `true` if this is an insert event.
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    /// Returns `true` if this is an update event.
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }

    /// Returns `true` if this is a removal event.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }
}

impl From<Commit<'_>> for ChangeEvent {
    fn from(commit: Commit<'_>) -> Self {
        match commit {
            Commit::Inserted(record) => Self::inserted(record.clone()),
            Commit::Updated(record) => Self::updated(record.clone()),
            Commit::Removed(address) => Self::removed(address.clone()),
        }
    }
}
