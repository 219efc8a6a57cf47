// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-address change notifier.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::store::{Commit, CommitSink};
use crate::types::MacAddress;

use super::{ChangeEvent, Subscription, SubscriptionId};

type Senders = HashMap<SubscriptionId, mpsc::UnboundedSender<ChangeEvent>>;

#[derive(Debug, Default)]
struct RegistryState {
    closed: bool,
    by_address: HashMap<MacAddress, Senders>,
}

/// Shared subscriber table. Subscriptions hold a weak reference to it.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    state: RwLock<RegistryState>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn unregister(&self, address: &MacAddress, id: SubscriptionId) {
        let mut state = self.state.write();
        if let Some(senders) = state.by_address.get_mut(address) {
            if senders.remove(&id).is_some() {
                tracing::debug!(%address, subscription = %id, "Subscription dropped");
            }
            if senders.is_empty() {
                state.by_address.remove(address);
            }
        }
    }
}

/// Publish/subscribe hub keyed by device address.
///
/// Each subscription owns an unbounded channel, so a slow subscriber never
/// delays a writer or another subscriber. The notifier is the [`CommitSink`]
/// handed to the store, which turns every committed write into exactly one
/// [`ChangeEvent`] for the subscribers of that address.
///
/// # Examples
///
/// ```
/// use smartlight_store::event::{ChangeEvent, ChangeNotifier};
/// use smartlight_store::MacAddress;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), smartlight_store::ValueError> {
/// let notifier = ChangeNotifier::new();
/// let address: MacAddress = "12:34:56:78:90:10".parse()?;
/// let mut subscription = notifier.subscribe(&address);
///
/// notifier.publish(ChangeEvent::removed(address.clone()));
/// assert!(subscription.recv().await.is_some_and(|e| e.is_removed()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Registry>,
}

impl ChangeNotifier {
    /// Creates a notifier without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to changes of one device address.
    ///
    /// The address does not have to be stored yet. After [`close`](Self::close)
    /// the returned subscription is already closed.
    #[must_use]
    pub fn subscribe(&self, address: &MacAddress) -> Subscription {
        let id = SubscriptionId::new(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut state = self.registry.state.write();
        if state.closed {
            drop(sender);
        } else {
            state
                .by_address
                .entry(address.clone())
                .or_default()
                .insert(id, sender);
            tracing::debug!(%address, subscription = %id, "Subscription registered");
        }
        drop(state);

        Subscription::new(id, address.clone(), receiver, Arc::downgrade(&self.registry))
    }

    /// Delivers an event to every subscriber of its address.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let address = event.address().clone();
        let mut delivered = 0;
        let mut dead = Vec::new();

        {
            let state = self.registry.state.read();
            let Some(senders) = state.by_address.get(&address) else {
                return 0;
            };
            for (id, sender) in senders {
                if sender.send(event.clone()).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(*id);
                }
            }
        }

        for id in dead {
            tracing::warn!(%address, subscription = %id, "Pruning subscriber with closed channel");
            self.registry.unregister(&address, id);
        }
        delivered
    }

    /// Returns the number of live subscriptions for an address.
    #[must_use]
    pub fn subscriber_count(&self, address: &MacAddress) -> usize {
        self.registry
            .state
            .read()
            .by_address
            .get(address)
            .map_or(0, HashMap::len)
    }

    /// Returns the number of live subscriptions across all addresses.
    #[must_use]
    pub fn total_subscribers(&self) -> usize {
        self.registry.state.read().by_address.values().map(HashMap::len).sum()
    }

    /// Returns `true` once [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.registry.state.read().closed
    }

    /// Drops every subscriber channel.
    ///
    /// Subscribers drain what is buffered, then receive `None`.
    pub fn close(&self) {
        let mut state = self.registry.state.write();
        if !state.closed {
            state.closed = true;
            let count: usize = state.by_address.values().map(HashMap::len).sum();
            state.by_address.clear();
            tracing::debug!(subscriptions = count, "Change notifier closed");
        }
    }
}

impl CommitSink for ChangeNotifier {
    fn committed(&self, commit: Commit<'_>) {
        if self.subscriber_count(commit.address()) > 0 {
            self.publish(ChangeEvent::from(commit));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new(format!("AA:BB:CC:DD:EE:{last:02X}")).unwrap()
    }

    #[test]
    fn new_notifier_has_no_subscribers() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.total_subscribers(), 0);
        assert_eq!(notifier.publish(ChangeEvent::removed(mac(1))), 0);
    }

    #[test]
    fn subscribe_and_drop_update_counts() {
        let notifier = ChangeNotifier::new();

        let first = notifier.subscribe(&mac(1));
        let second = notifier.subscribe(&mac(1));
        let _other = notifier.subscribe(&mac(2));
        assert_ne!(first.id(), second.id());
        assert_eq!(notifier.subscriber_count(&mac(1)), 2);
        assert_eq!(notifier.total_subscribers(), 3);

        drop(first);
        assert_eq!(notifier.subscriber_count(&mac(1)), 1);
        drop(second);
        assert_eq!(notifier.subscriber_count(&mac(1)), 0);
        assert_eq!(notifier.total_subscribers(), 1);
    }

    #[tokio::test]
    async fn events_reach_only_matching_address() {
        let notifier = ChangeNotifier::new();
        let mut one = notifier.subscribe(&mac(1));
        let mut two = notifier.subscribe(&mac(2));

        assert_eq!(notifier.publish(ChangeEvent::removed(mac(1))), 1);

        assert_eq!(one.recv().await, Some(ChangeEvent::removed(mac(1))));
        assert!(two.try_recv().is_none());
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy_in_order() {
        let notifier = ChangeNotifier::new();
        let mut a = notifier.subscribe(&mac(1));
        let mut b = notifier.subscribe(&mac(1));

        notifier.committed(Commit::Removed(&mac(1)));
        notifier.publish(ChangeEvent::removed(mac(1)));

        for sub in [&mut a, &mut b] {
            assert!(sub.recv().await.is_some());
            assert!(sub.recv().await.is_some());
            assert!(sub.try_recv().is_none());
        }
    }

    #[tokio::test]
    async fn cancel_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe(&mac(1));

        notifier.publish(ChangeEvent::removed(mac(1)));
        sub.cancel();
        assert_eq!(notifier.subscriber_count(&mac(1)), 0);
        assert_eq!(notifier.publish(ChangeEvent::removed(mac(1))), 0);

        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
        assert!(sub.is_closed());
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe(&mac(1));

        notifier.publish(ChangeEvent::removed(mac(1)));
        notifier.close();
        notifier.close();

        assert!(notifier.is_closed());
        assert_eq!(notifier.total_subscribers(), 0);
        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn subscribe_after_close_is_closed() {
        let notifier = ChangeNotifier::new();
        notifier.close();

        let mut sub = notifier.subscribe(&mac(1));
        assert!(sub.is_closed());
        assert!(sub.recv().await.is_none());
        assert_eq!(notifier.total_subscribers(), 0);
    }

    #[test]
    fn subscription_outliving_notifier_drops_cleanly() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe(&mac(1));
        drop(notifier);
        drop(sub);
    }
}
