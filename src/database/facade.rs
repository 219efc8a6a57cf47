// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The smart light database facade.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use crate::error::{Error, Result, StoreError};
use crate::event::{ChangeNotifier, Subscription};
use crate::model::{DeviceRecord, DeviceSnapshot};
use crate::reconcile::{plan_insert, plan_update};
use crate::store::{ConfiguredStore, DeviceStore};
use crate::types::MacAddress;

use super::config::DatabaseConfig;

/// Persistent smart light state with change notifications.
///
/// The database merges every reported [`DeviceSnapshot`] into the stored
/// history of its device, writes the minimal change set in one store
/// transaction, and notifies the subscribers of that device.
///
/// All methods take `&self`; the database can be shared behind an `Arc`.
/// No lock is held across store calls. Concurrent upserts to the same
/// device are serialized by the store.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use smartlight_store::{DeviceSnapshot, MemoryStore, Observation, SmartLightDatabase};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> smartlight_store::Result<()> {
/// let db = SmartLightDatabase::new(MemoryStore::new());
/// let address = "12:34:56:78:90:10".parse()?;
///
/// let snapshot = DeviceSnapshot::new(address, "Desk lamp")
///     .with_observation(Observation::new(Utc::now().fixed_offset(), true));
/// let record = db.upsert(snapshot.clone()).await?;
/// assert_eq!(record.name(), "Desk lamp");
///
/// // Resubmitting the same data changes nothing
/// assert!(db.upsert(snapshot).await.unwrap_err().is_no_change());
///
/// db.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SmartLightDatabase<S> {
    store: S,
    notifier: ChangeNotifier,
    closed: AtomicBool,
}

impl SmartLightDatabase<ConfiguredStore> {
    /// Opens a database with the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the store cannot be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use smartlight_store::{DatabaseConfig, SmartLightDatabase};
    ///
    /// # async fn example() -> smartlight_store::Result<()> {
    /// let db = SmartLightDatabase::open(&DatabaseConfig::json_file("devices.json")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let store = ConfiguredStore::open(&config.store).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to open device store");
            Error::Internal(e)
        })?;
        tracing::info!(in_memory = config.is_in_memory(), "Smart light database opened");
        Ok(Self::new(store))
    }
}

impl<S: DeviceStore> SmartLightDatabase<S> {
    /// Creates a database on top of an opened store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            notifier: ChangeNotifier::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns `true` once [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns every stored device, ordered by MAC address.
    ///
    /// A closed database lists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the store fails.
    pub async fn list(&self) -> Result<Vec<DeviceRecord>> {
        if self.is_closed() {
            return Ok(Vec::new());
        }
        match self.store.list_all().await {
            Ok(devices) => Ok(devices),
            Err(StoreError::Closed) => Ok(Vec::new()),
            Err(e) => Err(store_failure("list", None, e)),
        }
    }

    /// Returns the device stored under `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such device is stored,
    /// [`Error::Closed`] after close, or [`Error::Internal`] if the store
    /// fails.
    pub async fn get(&self, address: &MacAddress) -> Result<DeviceRecord> {
        self.ensure_open()?;
        self.store
            .find(address)
            .await
            .map_err(|e| store_failure("get", Some(address), e))?
            .ok_or_else(|| Error::NotFound(address.clone()))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Merges a reported snapshot into the stored state of its device.
    ///
    /// An unknown address creates the device. A known one is renamed if the
    /// name differs, and observations that are new in time and content are
    /// added to its history. Subscribers of the address receive one
    /// [`ChangeEvent`](crate::ChangeEvent) for the write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChange`] if nothing differs from what is stored,
    /// [`Error::Closed`] after close, or [`Error::Internal`] if the store
    /// fails.
    pub async fn upsert(&self, snapshot: DeviceSnapshot) -> Result<DeviceRecord> {
        self.ensure_open()?;
        let address = snapshot.address().clone();

        let existing = self
            .store
            .find(&address)
            .await
            .map_err(|e| store_failure("upsert", Some(&address), e))?;
        let now = Utc::now().fixed_offset();

        let Some(current) = existing else {
            let device = plan_insert(&snapshot, now);
            let observations = device.observations.len();
            let record = self
                .store
                .insert(device, &self.notifier)
                .await
                .map_err(|e| store_failure("upsert", Some(&address), e))?;
            tracing::info!(%address, observations, "Smart light inserted");
            return Ok(record);
        };

        let Some(update) = plan_update(&current, &snapshot, now) else {
            tracing::debug!(%address, "Upsert changed nothing");
            return Err(Error::NoChange);
        };
        tracing::debug!(
            %address,
            renamed = update.renames(),
            inserted = update.insert.len(),
            deleted = update.delete.len(),
            "Applying merge plan"
        );
        self.store
            .apply_update(current.id(), update, &self.notifier)
            .await
            .map_err(|e| store_failure("upsert", Some(&address), e))
    }

    /// Deletes the device stored under `address` together with its history.
    ///
    /// Returns the deleted record. Subscribers of the address receive a
    /// removal event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such device is stored,
    /// [`Error::Closed`] after close, or [`Error::Internal`] if the store
    /// fails.
    pub async fn remove(&self, address: &MacAddress) -> Result<DeviceRecord> {
        self.ensure_open()?;
        let removed = self
            .store
            .remove(address, &self.notifier)
            .await
            .map_err(|e| store_failure("remove", Some(address), e))?
            .ok_or_else(|| Error::NotFound(address.clone()))?;
        tracing::info!(%address, observations = removed.history().len(), "Smart light removed");
        Ok(removed)
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to changes of the device stored under `address`.
    ///
    /// The device does not need to exist yet. After close the returned
    /// subscription yields nothing.
    #[must_use]
    pub fn subscribe(&self, address: &MacAddress) -> Subscription {
        self.notifier.subscribe(address)
    }

    /// Returns the number of live subscriptions for `address`.
    #[must_use]
    pub fn subscriber_count(&self, address: &MacAddress) -> usize {
        self.notifier.subscriber_count(address)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Closes the store and ends every subscription.
    ///
    /// Closing twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the store fails to close. The database
    /// counts as closed regardless.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let result = self.store.close().await;
        self.notifier.close();

        match result {
            Ok(()) => {
                tracing::info!("Smart light database closed");
                Ok(())
            }
            Err(e) => Err(store_failure("close", None, e)),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }
}

fn store_failure(operation: &'static str, address: Option<&MacAddress>, error: StoreError) -> Error {
    if matches!(error, StoreError::Closed) {
        return Error::Closed;
    }
    match address {
        Some(address) => tracing::warn!(operation, %address, error = %error, "Store operation failed"),
        None => tracing::warn!(operation, error = %error, "Store operation failed"),
    }
    Error::Internal(error)
}
