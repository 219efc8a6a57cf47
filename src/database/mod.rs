// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level database API.
//!
//! [`SmartLightDatabase`] ties the pieces together: it reads the stored
//! device, asks the reconciler for a merge plan, hands the plan to the
//! store, and lets the store announce the commit to the change notifier.
//!
//! # Choosing a store
//!
//! Wrap a store directly with [`SmartLightDatabase::new`], or describe it in
//! a [`DatabaseConfig`] and call [`SmartLightDatabase::open`]:
//!
//! ```no_run
//! use smartlight_store::{DatabaseConfig, SmartLightDatabase};
//!
//! #[tokio::main]
//! async fn main() -> smartlight_store::Result<()> {
//!     let config = DatabaseConfig::json_file("/var/lib/lights/devices.json").pretty(true);
//!     let db = SmartLightDatabase::open(&config).await?;
//!
//!     for device in db.list().await? {
//!         println!("{} ({})", device.name(), device.address());
//!     }
//!
//!     db.close().await
//! }
//! ```

mod config;
mod facade;

pub use config::{DatabaseConfig, StoreConfig};
pub use facade::SmartLightDatabase;
