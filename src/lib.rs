// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `smartlight_store` - Persistent smart light state with history
//! reconciliation.
//!
//! This library stores what networked lights report about themselves
//! (on/off state, color, location and network address) as a time-ordered
//! history per device, and notifies subscribers when a device changes.
//!
//! # Features
//!
//! - **Reconciliation**: reported snapshots are merged into the stored
//!   history without duplicate instants or repeated readings
//! - **Minimal writes**: each upsert becomes one store transaction holding
//!   only the rows that changed
//! - **Change events**: per-device subscriptions receive inserts, updates and
//!   removals in commit order
//! - **Pluggable storage**: in-memory and JSON file stores, or your own
//!   [`DeviceStore`]
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use smartlight_store::types::{Color, Location};
//! use smartlight_store::{DeviceSnapshot, MemoryStore, Observation, SmartLightDatabase};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> smartlight_store::Result<()> {
//!     let db = SmartLightDatabase::new(MemoryStore::new());
//!     let address = "12:34:56:78:90:10".parse()?;
//!     let mut changes = db.subscribe(&address);
//!
//!     let reading = Observation::new(Utc::now().fixed_offset(), true)
//!         .with_address("192.168.1.20")
//!         .with_capability(Color::kelvin(2700, 0.8)?)
//!         .with_capability(Location::new("home/living-room")?);
//!     db.upsert(DeviceSnapshot::new(address, "Reading lamp").with_observation(reading))
//!         .await?;
//!
//!     if let Some(event) = changes.recv().await {
//!         println!("{} changed", event.address());
//!     }
//!
//!     db.close().await
//! }
//! ```
//!
//! # Durable storage
//!
//! ```no_run
//! use smartlight_store::{DatabaseConfig, SmartLightDatabase};
//!
//! #[tokio::main]
//! async fn main() -> smartlight_store::Result<()> {
//!     let db = SmartLightDatabase::open(&DatabaseConfig::json_file("devices.json")).await?;
//!     println!("{} devices", db.list().await?.len());
//!     db.close().await
//! }
//! ```

pub mod database;
pub mod error;
pub mod event;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod types;

pub use database::{DatabaseConfig, SmartLightDatabase, StoreConfig};
pub use error::{Error, Result, StoreError, StoreResult, ValueError};
pub use event::{ChangeEvent, ChangeNotifier, Subscription, SubscriptionId};
pub use model::{
    DeviceId, DeviceRecord, DeviceSnapshot, Observation, ObservationId, StoredObservation, Timestamp,
};
pub use reconcile::{ChangeKind, MergePlan};
pub use store::{
    Commit, CommitSink, ConfiguredStore, DeviceStore, JsonFileOptions, JsonFileStore, MemoryStore,
};
pub use types::{Capabilities, Capability, Color, HsbColor, KelvinColor, Location, MacAddress};
