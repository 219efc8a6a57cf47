// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-address subscription handles.

use std::fmt;
use std::sync::Weak;

use tokio::sync::mpsc;

use crate::types::MacAddress;

use super::ChangeEvent;
use super::notifier::Registry;

/// Unique identifier for a subscription.
///
/// IDs are unique within one notifier's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Stream of change events for one device address.
///
/// Events arrive in the order the writes were committed. The subscription is
/// unregistered when dropped or [cancelled](Self::cancel); after the
/// database closes, buffered events can still be drained and then
/// [`recv`](Self::recv) returns `None`.
///
/// # Examples
///
/// ```
/// use smartlight_store::{DeviceSnapshot, MemoryStore, Observation, SmartLightDatabase};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> smartlight_store::Result<()> {
/// let db = SmartLightDatabase::new(MemoryStore::new());
/// let address = "12:34:56:78:90:10".parse()?;
/// let mut changes = db.subscribe(&address);
///
/// let now = chrono::Utc::now().fixed_offset();
/// db.upsert(DeviceSnapshot::new(address, "Lamp").with_observation(Observation::new(now, true)))
///     .await?;
///
/// let event = changes.recv().await.expect("subscription open");
/// assert!(event.is_inserted());
/// # Ok(())
/// # }
/// ```
pub struct Subscription {
    id: SubscriptionId,
    address: MacAddress,
    receiver: mpsc::UnboundedReceiver<ChangeEvent>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        address: MacAddress,
        receiver: mpsc::UnboundedReceiver<ChangeEvent>,
        registry: Weak<Registry>,
    ) -> Self {
        Self {
            id,
            address,
            receiver,
            registry,
        }
    }

    /// Returns the subscription ID.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the address this subscription listens to.
    #[must_use]
    pub fn address(&self) -> &MacAddress {
        &self.address
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the subscription is cancelled or the database is
    /// closed and every buffered event has been received.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns `true` if no further events can arrive.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }

    /// Stops receiving events for this address.
    ///
    /// Events already buffered can still be drained.
    pub fn cancel(&mut self) {
        self.unregister();
        self.receiver.close();
    }

    fn unregister(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(&self.address, self.id);
        }
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("closed", &self.receiver.is_closed())
            .finish_non_exhaustive()
    }
}
