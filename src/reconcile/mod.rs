// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! History reconciliation.
//!
//! [`reconcile`] compares what is stored for a device with a freshly reported
//! [`DeviceSnapshot`] and computes a [`MergePlan`]: the observations to
//! insert, the stored observations to delete, and whether the name changed.
//! It never touches storage. [`plan_insert`] and [`plan_update`] are the
//! two halves of it for callers that already know whether a record exists.
//!
//! # Merge rule
//!
//! Stored and incoming observations are merged into one list sorted by
//! timestamp. Two neighbours collapse into one when they share a timestamp
//! or carry the same reading ([`Observation::same_reading`]). The survivor
//! is chosen by origin:
//!
//! | current | next   | survivor | effect                     |
//! |---------|--------|----------|----------------------------|
//! | stored  | stored | current  | next is deleted from store |
//! | stored  | new    | current  | next is dropped            |
//! | new     | stored | next     | current is dropped         |
//! | new     | new    | current  | next is dropped            |
//!
//! A shared timestamp collapses even when the readings differ, so the stored
//! reading for an instant is never overwritten by a later submission.
//!
//! A device seen for the first time has its observations walked with the
//! same rule, so only the first of a run of repeated readings is stored.
//!
//! # Examples
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use smartlight_store::reconcile::{ChangeKind, reconcile};
//! use smartlight_store::{DeviceSnapshot, Observation};
//! use smartlight_store::types::MacAddress;
//!
//! let mac = MacAddress::new("12:34:56:78:90:10").unwrap();
//! let at = DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z").unwrap();
//! let snapshot = DeviceSnapshot::new(mac, "Lamp").with_observation(Observation::new(at, true));
//!
//! let plan = reconcile(None, &snapshot, Utc::now().fixed_offset());
//! assert_eq!(plan.kind(), ChangeKind::Inserted);
//! ```

mod plan;

pub use plan::{ChangeKind, DeviceUpdate, MergePlan, NewDevice};

use crate::model::{DeviceRecord, DeviceSnapshot, Observation, ObservationId, Timestamp};

/// An entry of the merged list; stored entries carry their id.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    id: Option<ObservationId>,
    observation: &'a Observation,
}

fn collapses(current: &Observation, next: &Observation) -> bool {
    current.timestamp() == next.timestamp() || current.same_reading(next)
}

/// Computes the write-set that merges `incoming` into `existing`.
///
/// `now` becomes the creation time of a new device or the last-updated time
/// of a changed one.
#[must_use]
pub fn reconcile(
    existing: Option<&DeviceRecord>,
    incoming: &DeviceSnapshot,
    now: Timestamp,
) -> MergePlan {
    match existing {
        None => MergePlan::Insert(plan_insert(incoming, now)),
        Some(existing) => {
            plan_update(existing, incoming, now).map_or(MergePlan::NoChange, MergePlan::Update)
        }
    }
}

/// Builds the device to store for an address seen for the first time.
///
/// The observations are sorted and walked with the merge rule, so storing
/// the same snapshot again plans no change.
#[must_use]
pub fn plan_insert(incoming: &DeviceSnapshot, now: Timestamp) -> NewDevice {
    let mut observations = incoming.observations().to_vec();
    observations.sort_by_key(Observation::timestamp);
    // `dedup_by` hands the later element first and compares it to the
    // last survivor
    observations.dedup_by(|next, current| collapses(current, next));

    NewDevice {
        address: incoming.address().clone(),
        name: incoming.name().to_string(),
        created: now,
        observations,
    }
}

/// Computes the changes that merge `incoming` into a stored record.
///
/// Returns `None` when the record already reflects the snapshot.
#[must_use]
pub fn plan_update(
    existing: &DeviceRecord,
    incoming: &DeviceSnapshot,
    now: Timestamp,
) -> Option<DeviceUpdate> {
    let mut candidates: Vec<Candidate<'_>> = existing
        .history()
        .iter()
        .map(|row| Candidate {
            id: Some(row.id()),
            observation: row.observation(),
        })
        .chain(incoming.observations().iter().map(|observation| Candidate {
            id: None,
            observation,
        }))
        .collect();
    // Stable, so stored entries stay ahead of new ones for the same instant
    candidates.sort_by_key(|c| c.observation.timestamp());

    let mut delete = Vec::new();
    let mut index = 0;
    while index + 1 < candidates.len() {
        let current = candidates[index];
        let next = candidates[index + 1];
        if !collapses(current.observation, next.observation) {
            index += 1;
            continue;
        }

        match (current.id, next.id) {
            (Some(_), Some(stale)) => {
                tracing::trace!(observation = %stale, "Collapsing duplicate stored observation");
                delete.push(stale);
                candidates.remove(index + 1);
            }
            (Some(_) | None, None) => {
                candidates.remove(index + 1);
            }
            (None, Some(_)) => {
                candidates.remove(index);
            }
        }
    }

    let insert: Vec<Observation> = candidates
        .into_iter()
        .filter(|c| c.id.is_none())
        .map(|c| c.observation.clone())
        .collect();
    let name = (existing.name() != incoming.name()).then(|| incoming.name().to_string());

    if name.is_none() && insert.is_empty() && delete.is_empty() {
        return None;
    }

    Some(DeviceUpdate {
        name,
        insert,
        delete,
        last_updated: now,
    })
}
