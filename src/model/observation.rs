// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timestamped readings of a smart light.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::types::{Capabilities, Capability};

use super::ObservationId;

/// Point in time of a reading.
///
/// Carries its UTC offset; comparisons are by instant, so the same moment
/// written in two offsets compares equal.
pub type Timestamp = DateTime<FixedOffset>;

/// One timestamped reading of a device's state.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use smartlight_store::Observation;
/// use smartlight_store::types::{Capabilities, Location};
///
/// let at = DateTime::parse_from_rfc3339("2024-01-15T10:30:00+01:00").unwrap();
/// let reading = Observation::new(at, true)
///     .with_address("192.168.1.20")
///     .with_capabilities(Capabilities::new().with_location(Location::new("Home").unwrap()));
///
/// // Same reading, reported later
/// let later = DateTime::parse_from_rfc3339("2024-01-15T10:35:00+01:00").unwrap();
/// let repeat = Observation::new(later, true)
///     .with_address("192.168.1.20")
///     .with_capabilities(reading.capabilities().clone());
///
/// assert!(reading.same_reading(&repeat));
/// assert_ne!(reading, repeat);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    timestamp: Timestamp,
    #[serde(default)]
    address: Option<String>,
    is_on: bool,
    #[serde(default)]
    capabilities: Capabilities,
}

impl Observation {
    /// Creates a reading with no network address and no capabilities.
    #[must_use]
    pub fn new(timestamp: Timestamp, is_on: bool) -> Self {
        Self {
            timestamp,
            address: None,
            is_on,
            capabilities: Capabilities::new(),
        }
    }

    /// Sets the network address the device had at the time of the reading.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Replaces the capability readings.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Adds a single capability reading, replacing one of the same kind.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Returns when the reading was taken.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the network address at the time of the reading.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the power state.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Returns the capability readings.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns `true` if both readings carry the same content.
    ///
    /// Address, power state and capabilities are compared; the timestamp is
    /// not.
    #[must_use]
    pub fn same_reading(&self, other: &Self) -> bool {
        self.address == other.address
            && self.is_on == other.is_on
            && self.capabilities == other.capabilities
    }
}

/// An observation that has been persisted and carries its storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObservation {
    id: ObservationId,
    #[serde(flatten)]
    observation: Observation,
}

impl StoredObservation {
    /// Pairs an observation with its storage id.
    #[must_use]
    pub fn new(id: ObservationId, observation: Observation) -> Self {
        Self { id, observation }
    }

    /// Returns the storage id.
    #[must_use]
    pub fn id(&self) -> ObservationId {
        self.id
    }

    /// Returns the observation.
    #[must_use]
    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    /// Consumes the row and returns the observation.
    #[must_use]
    pub fn into_observation(self) -> Observation {
        self.observation
    }
}

impl std::ops::Deref for StoredObservation {
    type Target = Observation;

    fn deref(&self) -> &Self::Target {
        &self.observation
    }
}
