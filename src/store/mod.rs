// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage backends for device records.
//!
//! The database facade talks to storage through the [`DeviceStore`] trait.
//! Each trait method is one transaction: it either applies completely or
//! fails without leaving partial rows behind.
//!
//! # Backends
//!
//! - [`MemoryStore`]: keeps all rows in process memory
//! - [`JsonFileStore`]: keeps all rows in a JSON document on disk, replaced
//!   atomically on every write
//! - [`ConfiguredStore`]: one of the above, chosen by
//!   [`StoreConfig`](crate::StoreConfig)
//!
//! # Commit notifications
//!
//! Mutating methods receive a [`CommitSink`]. A store calls it exactly once
//! per successful write, after the write is durable and before any other
//! writer can observe or modify the same device. Listeners therefore see
//! changes to one device in commit order.

mod configured;
mod file;
mod memory;
mod table;

pub use configured::ConfiguredStore;
pub use file::{JsonFileOptions, JsonFileStore};
pub use memory::MemoryStore;

use crate::error::StoreResult;
use crate::model::{DeviceId, DeviceRecord};
use crate::reconcile::{DeviceUpdate, NewDevice};
use crate::types::MacAddress;

/// A committed write, as announced to a [`CommitSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Commit<'a> {
    /// A device row was created.
    Inserted(&'a DeviceRecord),
    /// A device row or its history changed.
    Updated(&'a DeviceRecord),
    /// A device and all of its observations were deleted.
    Removed(&'a MacAddress),
}

impl Commit<'_> {
    /// Returns the address of the affected device.
    #[must_use]
    pub fn address(&self) -> &MacAddress {
        match self {
            Self::Inserted(record) | Self::Updated(record) => record.address(),
            Self::Removed(address) => address,
        }
    }
}

/// Receiver of committed writes.
pub trait CommitSink: Send + Sync {
    /// Called once per committed write, while the device is still held by
    /// the writing transaction. Must not block.
    fn committed(&self, commit: Commit<'_>);
}

/// A sink that ignores every commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardCommits;

impl CommitSink for DiscardCommits {
    fn committed(&self, _commit: Commit<'_>) {}
}

/// Durable keyed storage of device records.
///
/// Implementations serialize writes per device and make every method
/// atomic. After [`close`](Self::close) every method fails with
/// [`StoreError::Closed`](crate::StoreError::Closed).
#[allow(async_fn_in_trait)]
pub trait DeviceStore {
    /// Looks up a device by MAC address.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails or is closed.
    async fn find(&self, address: &MacAddress) -> StoreResult<Option<DeviceRecord>>;

    /// Inserts a new device with its observations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateAddress` if the address is already
    /// stored, `StoreError::ConflictingObservation` if two observations share
    /// an instant, or another `StoreError` if the backend fails.
    async fn insert(&self, device: NewDevice, sink: &dyn CommitSink) -> StoreResult<DeviceRecord>;

    /// Applies a rename, bulk delete and bulk insert to a stored device.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownDevice` or `StoreError::UnknownObservation`
    /// if the update does not match stored rows,
    /// `StoreError::ConflictingObservation` if an insert targets an instant
    /// that stays stored, or another `StoreError` if the backend fails.
    async fn apply_update(
        &self,
        device: DeviceId,
        update: DeviceUpdate,
        sink: &dyn CommitSink,
    ) -> StoreResult<DeviceRecord>;

    /// Deletes a device and everything it owns, returning the deleted record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails or is closed.
    async fn remove(
        &self,
        address: &MacAddress,
        sink: &dyn CommitSink,
    ) -> StoreResult<Option<DeviceRecord>>;

    /// Returns every stored device, ordered by MAC address.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails or is closed.
    async fn list_all(&self) -> StoreResult<Vec<DeviceRecord>>;

    /// Releases the backend. Closing twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if pending data cannot be released cleanly.
    async fn close(&self) -> StoreResult<()>;
}
