// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Database configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for [`SmartLightDatabase::open`](super::SmartLightDatabase::open).
///
/// The type is serde-(de)serializable so applications can embed it in their
/// own configuration files.
///
/// # Examples
///
/// ```
/// use smartlight_store::DatabaseConfig;
///
/// // Ephemeral store
/// let config = DatabaseConfig::in_memory();
///
/// // Durable store
/// let config = DatabaseConfig::json_file("/var/lib/lights/devices.json");
///
/// // With optional settings
/// let config = DatabaseConfig::json_file("devices.json")
///     .create_if_missing(false)
///     .pretty(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// The storage backend.
    pub store: StoreConfig,
}

impl DatabaseConfig {
    /// Creates a configuration for an in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: StoreConfig::InMemory,
        }
    }

    /// Creates a configuration for a JSON file store at `path`.
    ///
    /// The file is created if it does not exist and written compactly.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig::JsonFile {
                path: path.into(),
                create_if_missing: true,
                pretty: false,
            },
        }
    }

    /// Sets whether a missing file is created.
    ///
    /// Only applicable for JSON file stores.
    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        if let StoreConfig::JsonFile {
            create_if_missing, ..
        } = &mut self.store
        {
            *create_if_missing = create;
        }
        self
    }

    /// Sets whether the file is written as indented JSON.
    ///
    /// Only applicable for JSON file stores.
    #[must_use]
    pub fn pretty(mut self, enabled: bool) -> Self {
        if let StoreConfig::JsonFile { pretty, .. } = &mut self.store {
            *pretty = enabled;
        }
        self
    }

    /// Returns true if this is an in-memory store.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        matches!(self.store, StoreConfig::InMemory)
    }

    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.store {
            StoreConfig::InMemory => None,
            StoreConfig::JsonFile { path, .. } => Some(path),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Keep all devices in memory.
    InMemory,
    /// Keep all devices in one JSON document.
    JsonFile {
        /// Path of the document.
        path: PathBuf,
        /// Create an empty document when the file is missing.
        #[serde(default = "default_create_if_missing")]
        create_if_missing: bool,
        /// Write indented JSON.
        #[serde(default)]
        pretty: bool,
    },
}

fn default_create_if_missing() -> bool {
    true
}
