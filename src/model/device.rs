// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device records and incoming snapshots.

use serde::{Deserialize, Serialize};

use crate::types::MacAddress;

use super::{DeviceId, Observation, StoredObservation, Timestamp};

/// A persisted smart light.
///
/// The history is ordered ascending by timestamp and never holds two
/// observations for the same instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    id: DeviceId,
    address: MacAddress,
    name: String,
    created: Timestamp,
    last_updated: Timestamp,
    #[serde(default)]
    history: Vec<StoredObservation>,
}

impl DeviceRecord {
    /// Assembles a record from stored parts.
    ///
    /// Intended for storage backends. The history is sorted by timestamp.
    #[must_use]
    pub fn from_parts(
        id: DeviceId,
        address: MacAddress,
        name: String,
        created: Timestamp,
        last_updated: Timestamp,
        mut history: Vec<StoredObservation>,
    ) -> Self {
        history.sort_by_key(|row| row.timestamp());
        Self {
            id,
            address,
            name,
            created,
            last_updated,
            history,
        }
    }

    /// Returns the storage id.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the MAC address.
    #[must_use]
    pub fn address(&self) -> &MacAddress {
        &self.address
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the device was first stored.
    #[must_use]
    pub fn created(&self) -> Timestamp {
        self.created
    }

    /// Returns when the device was last changed.
    #[must_use]
    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    /// Returns the stored history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StoredObservation] {
        &self.history
    }

    /// Iterates the observations without their storage ids, oldest first.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.history.iter().map(StoredObservation::observation)
    }

    /// Returns the most recent observation.
    #[must_use]
    pub fn latest(&self) -> Option<&Observation> {
        self.history.last().map(StoredObservation::observation)
    }

    /// Returns `true` if the most recent observation reports the light on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.latest().is_some_and(Observation::is_on)
    }

    pub(crate) fn history_mut(&mut self) -> &mut Vec<StoredObservation> {
        &mut self.history
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn touch(&mut self, at: Timestamp) {
        self.last_updated = at;
    }
}

/// A snapshot of a smart light as reported by a caller.
///
/// Observations carry no storage identity yet; the reconciler decides which
/// of them get written.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use smartlight_store::{DeviceSnapshot, Observation};
/// use smartlight_store::types::MacAddress;
///
/// let mac = MacAddress::new("12:34:56:78:90:10").unwrap();
/// let snapshot = DeviceSnapshot::new(mac, "Desk Lamp")
///     .with_observation(Observation::new(Utc::now().fixed_offset(), true));
///
/// assert_eq!(snapshot.observations().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    address: MacAddress,
    name: String,
    #[serde(default)]
    observations: Vec<Observation>,
}

impl DeviceSnapshot {
    /// Creates a snapshot with no observations.
    #[must_use]
    pub fn new(address: MacAddress, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            observations: Vec::new(),
        }
    }

    /// Appends an observation.
    #[must_use]
    pub fn with_observation(mut self, observation: Observation) -> Self {
        self.observations.push(observation);
        self
    }

    /// Appends several observations.
    #[must_use]
    pub fn with_observations(mut self, observations: impl IntoIterator<Item = Observation>) -> Self {
        self.observations.extend(observations);
        self
    }

    /// Replaces the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the MAC address.
    #[must_use]
    pub fn address(&self) -> &MacAddress {
        &self.address
    }

    /// Returns the reported name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the reported observations in submission order.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}

impl From<&DeviceRecord> for DeviceSnapshot {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            address: record.address.clone(),
            name: record.name.clone(),
            observations: record.observations().cloned().collect(),
        }
    }
}

impl From<DeviceRecord> for DeviceSnapshot {
    fn from(record: DeviceRecord) -> Self {
        Self {
            address: record.address,
            name: record.name,
            observations: record
                .history
                .into_iter()
                .map(StoredObservation::into_observation)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::model::ObservationId;

    fn at(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn mac() -> MacAddress {
        MacAddress::new("12:34:56:78:90:10").unwrap()
    }

    #[test]
    fn from_parts_sorts_history() {
        let late = StoredObservation::new(
            ObservationId::new(),
            Observation::new(at("2024-01-15T12:00:00Z"), false),
        );
        let early = StoredObservation::new(
            ObservationId::new(),
            Observation::new(at("2024-01-15T10:00:00Z"), true),
        );
        let now = at("2024-01-15T12:00:00Z");
        let record = DeviceRecord::from_parts(
            DeviceId::new(),
            mac(),
            "Lamp".to_string(),
            now,
            now,
            vec![late.clone(), early.clone()],
        );

        assert_eq!(record.history(), &[early, late]);
        assert!(!record.is_on());
        assert_eq!(record.latest().map(Observation::timestamp), Some(now));
    }

    #[test]
    fn empty_history_is_off() {
        let now = at("2024-01-15T12:00:00Z");
        let record =
            DeviceRecord::from_parts(DeviceId::new(), mac(), "Lamp".into(), now, now, vec![]);
        assert!(record.latest().is_none());
        assert!(!record.is_on());
    }

    #[test]
    fn snapshot_builders() {
        let obs = Observation::new(at("2024-01-15T10:00:00Z"), true);
        let snapshot = DeviceSnapshot::new(mac(), "Lamp")
            .with_observations([obs.clone(), obs.clone()])
            .with_name("Desk Lamp");
        assert_eq!(snapshot.name(), "Desk Lamp");
        assert_eq!(snapshot.observations().len(), 2);
        assert_eq!(snapshot.address(), &mac());
    }

    #[test]
    fn snapshot_from_record() {
        let now = at("2024-01-15T12:00:00Z");
        let obs = Observation::new(at("2024-01-15T10:00:00Z"), true);
        let record = DeviceRecord::from_parts(
            DeviceId::new(),
            mac(),
            "Lamp".into(),
            now,
            now,
            vec![StoredObservation::new(ObservationId::new(), obs.clone())],
        );
        let snapshot = DeviceSnapshot::from(&record);
        assert_eq!(snapshot.observations(), &[obs]);
        assert_eq!(snapshot.name(), "Lamp");
    }

    #[test]
    fn owned_record_into_snapshot() {
        let now = at("2024-01-15T12:00:00Z");
        let early = Observation::new(at("2024-01-15T10:00:00Z"), true).with_address("10.0.0.1");
        let late = Observation::new(at("2024-01-15T11:00:00Z"), false);
        let record = DeviceRecord::from_parts(
            DeviceId::new(),
            mac(),
            "Lamp".into(),
            now,
            now,
            vec![
                StoredObservation::new(ObservationId::new(), late.clone()),
                StoredObservation::new(ObservationId::new(), early.clone()),
            ],
        );
        let borrowed = DeviceSnapshot::from(&record);

        let snapshot = DeviceSnapshot::from(record);
        assert_eq!(snapshot.observations(), &[early, late]);
        assert_eq!(snapshot, borrowed);
    }
}
