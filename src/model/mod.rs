// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data model of persisted smart lights.
//!
//! - [`Observation`]: one timestamped reading (power, address, capabilities)
//! - [`StoredObservation`]: an observation that has a storage id
//! - [`DeviceRecord`]: a stored device with its ordered history
//! - [`DeviceSnapshot`]: what callers submit to the database

mod device;
mod ids;
mod observation;

pub use device::{DeviceRecord, DeviceSnapshot};
pub use ids::{DeviceId, ObservationId};
pub use observation::{Observation, StoredObservation, Timestamp};
