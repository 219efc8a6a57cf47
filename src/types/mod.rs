// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types with built-in validation.
//!
//! Every type here validates on construction and on deserialization, so a
//! value that made it into a [`DeviceSnapshot`](crate::DeviceSnapshot) is
//! always within range.

mod capability;
mod mac_address;

pub use capability::{Capabilities, Capability, Color, HsbColor, KelvinColor, Location};
pub use mac_address::MacAddress;
