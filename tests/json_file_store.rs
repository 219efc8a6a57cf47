// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the database on a JSON file store.

use std::path::Path;

use chrono::{DateTime, Duration};
use smartlight_store::types::{Color, Location};
use smartlight_store::{
    ChangeEvent, ConfiguredStore, DatabaseConfig, DeviceSnapshot, Error, JsonFileStore,
    MacAddress, Observation, SmartLightDatabase, StoreError, Timestamp,
};

fn t(minutes: i64) -> Timestamp {
    DateTime::parse_from_rfc3339("2024-03-01T18:30:00-05:00").unwrap() + Duration::minutes(minutes)
}

fn mac() -> MacAddress {
    MacAddress::new("AA:BB:CC:00:11:22").unwrap()
}

fn reading(minutes: i64, hue: f32) -> Observation {
    Observation::new(t(minutes), true)
        .with_address("10.0.0.7")
        .with_capability(Color::hsb(hue, 1.0, 0.75).unwrap())
        .with_capability(Location::new("home/kitchen").unwrap())
}

async fn open(path: &Path) -> SmartLightDatabase<ConfiguredStore> {
    SmartLightDatabase::open(&DatabaseConfig::json_file(path)).await.unwrap()
}

// ============================================================================
// Durability
// ============================================================================

mod durability {
    use super::*;

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");

        let stored = {
            let db = open(&path).await;
            db.upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1)))
                .await
                .unwrap();
            let stored = db
                .upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(5, 0.6)))
                .await
                .unwrap();
            db.close().await.unwrap();
            stored
        };

        let db = open(&path).await;
        let loaded = db.get(&mac()).await.unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(loaded.history().len(), 2);
        assert_eq!(loaded.history()[0].timestamp().offset(), t(0).offset());
    }

    #[tokio::test]
    async fn merge_continues_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");
        let data = DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1));

        {
            let db = open(&path).await;
            db.upsert(data.clone()).await.unwrap();
            db.close().await.unwrap();
        }

        let db = open(&path).await;
        assert!(db.upsert(data).await.unwrap_err().is_no_change());
    }

    #[tokio::test]
    async fn removal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");

        {
            let db = open(&path).await;
            db.upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1)))
                .await
                .unwrap();
            db.remove(&mac()).await.unwrap();
            db.close().await.unwrap();
        }

        let db = open(&path).await;
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_temporary_file_is_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");

        let db = open(&path).await;
        db.upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1)))
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("lights.json")]);
    }

    #[tokio::test]
    async fn hand_edited_document_with_repeated_device_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");

        {
            let db = open(&path).await;
            db.upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1)))
                .await
                .unwrap();
            db.close().await.unwrap();
        }

        let mut document: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let mut copy = document["devices"][0].clone();
        copy["name"] = "Kitchen copy".into();
        document["devices"].as_array_mut().unwrap().push(copy);
        std::fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();

        let err = SmartLightDatabase::open(&DatabaseConfig::json_file(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(StoreError::Serialization(_))));
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod configuration {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_rejected_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::json_file(dir.path().join("lights.json")).create_if_missing(false);

        let err = SmartLightDatabase::open(&config).await.unwrap_err();
        assert!(matches!(err, Error::Internal(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn existing_file_opens_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");
        open(&path).await.close().await.unwrap();

        let config = DatabaseConfig::json_file(&path).create_if_missing(false);
        let db = SmartLightDatabase::open(&config).await.unwrap();
        assert!(db.store().is_json_file());
    }

    #[tokio::test]
    async fn pretty_document_is_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");
        let db = SmartLightDatabase::open(&DatabaseConfig::json_file(&path).pretty(true))
            .await
            .unwrap();

        db.upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1)))
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(text.lines().count() > 1);
        assert_eq!(document["devices"][0]["address"], "AA:BB:CC:00:11:22");
        assert_eq!(document["devices"][0]["name"], "Kitchen");
    }

    #[tokio::test]
    async fn store_can_be_wrapped_directly() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("lights.json")).await.unwrap();
        let db = SmartLightDatabase::new(store);

        let mut sub = db.subscribe(&mac());
        let record = db
            .upsert(DeviceSnapshot::new(mac(), "Kitchen").with_observation(reading(0, 0.1)))
            .await
            .unwrap();

        assert_eq!(sub.recv().await, Some(ChangeEvent::Inserted(record)));
        assert_eq!(db.store().path(), dir.path().join("lights.json"));
    }
}
