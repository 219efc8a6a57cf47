// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the smart light store.
//!
//! [`Error`] is what the database facade returns. Storage backends report
//! [`StoreError`], which the facade surfaces as [`Error::Internal`] with the
//! backend error as its source. [`ValueError`] comes from the validated value
//! types.

use thiserror::Error;

use crate::model::{DeviceId, ObservationId, Timestamp};
use crate::types::MacAddress;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// No device is stored under the requested address.
    #[error("no smart light found for {0}")]
    NotFound(MacAddress),

    /// The upsert did not differ from what is already stored.
    ///
    /// This is an expected outcome of resubmitting the same data.
    #[error("value is not different to the current value")]
    NoChange,

    /// The database has been closed.
    #[error("database is closed")]
    Closed,

    /// The storage backend failed.
    #[error("internal error: {0}")]
    Internal(#[from] StoreError),
}

impl Error {
    /// Returns `true` for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`Error::NoChange`].
    #[must_use]
    pub fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    /// Returns `true` for [`Error::Closed`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// The string is not a MAC address.
    #[error("invalid MAC address: {0:?}")]
    InvalidMacAddress(String),

    /// An integer value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A normalized component is outside `[0, 1]` or not finite.
    #[error("{field} value {value} is out of range [0, 1]")]
    OutOfUnitRange {
        /// The component name.
        field: &'static str,
        /// The actual value that was provided.
        value: f32,
    },

    /// A location path is blank or too long.
    #[error("invalid location: {0:?}")]
    InvalidLocation(String),
}

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A device with this address already exists.
    #[error("a device with address {0} already exists")]
    DuplicateAddress(MacAddress),

    /// The device row does not exist.
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    /// An observation scheduled for deletion does not belong to the device.
    #[error("unknown observation {observation} for device {device}")]
    UnknownObservation {
        /// The device being updated.
        device: DeviceId,
        /// The missing observation.
        observation: ObservationId,
    },

    /// A device would hold two observations for the same instant.
    #[error("observation at {timestamp} already stored for device {device}")]
    ConflictingObservation {
        /// The device being written.
        device: DeviceId,
        /// The instant held twice.
        timestamp: Timestamp,
    },

    /// The store has been closed.
    #[error("store is closed")]
    Closed,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by storage backends.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
