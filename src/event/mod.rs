// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notifications for stored devices.
//!
//! Every committed write produces one [`ChangeEvent`] for the subscribers of
//! the affected address. Upserts that change nothing produce no event.
//!
//! # Ordering
//!
//! A subscriber sees the events of its address in commit order. There is no
//! ordering guarantee between different addresses.
//!
//! # Examples
//!
//! ```
//! use smartlight_store::event::ChangeEvent;
//! use smartlight_store::{MemoryStore, SmartLightDatabase};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> smartlight_store::Result<()> {
//! let db = SmartLightDatabase::new(MemoryStore::new());
//! let mut changes = db.subscribe(&"12:34:56:78:90:10".parse()?);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = changes.recv().await {
//!         match event {
//!             ChangeEvent::Inserted(record) | ChangeEvent::Updated(record) => {
//!                 println!("{} is now {}", record.name(), record.is_on());
//!             }
//!             ChangeEvent::Removed { address } => println!("{address} removed"),
//!         }
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod change_event;
mod notifier;
mod subscription;

pub use change_event::ChangeEvent;
pub use notifier::ChangeNotifier;
pub use subscription::{Subscription, SubscriptionId};
