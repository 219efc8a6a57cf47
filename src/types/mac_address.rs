// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware address of a smart light.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// MAC address identifying a smart light.
///
/// Accepts six two-digit hexadecimal groups separated by `:` or `-` and
/// normalizes them to upper-case colon form, so `aa-bb-cc-dd-ee-ff` and
/// `AA:BB:CC:DD:EE:FF` name the same device.
///
/// # Examples
///
/// ```
/// use smartlight_store::types::MacAddress;
///
/// let mac: MacAddress = "12:34:56:78:9a:bc".parse().unwrap();
/// assert_eq!(mac.as_str(), "12:34:56:78:9A:BC");
///
/// assert!("12:34:56".parse::<MacAddress>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Number of octets in a MAC address.
    pub const OCTETS: usize = 6;

    /// Parses and normalizes a MAC address.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMacAddress` if the input is not six
    /// two-digit hex groups separated by `:` or `-`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValueError> {
        let raw = value.as_ref().trim();
        let invalid = || ValueError::InvalidMacAddress(raw.to_string());

        let separator = if raw.contains('-') { '-' } else { ':' };
        let groups: Vec<&str> = raw.split(separator).collect();
        if groups.len() != Self::OCTETS {
            return Err(invalid());
        }

        let mut normalized = String::with_capacity(Self::OCTETS * 3 - 1);
        for (i, group) in groups.iter().enumerate() {
            if group.len() != 2 || !group.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            if i > 0 {
                normalized.push(':');
            }
            normalized.push_str(&group.to_ascii_uppercase());
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MacAddress {
    type Error = ValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

impl AsRef<str> for MacAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_form() {
        let mac = MacAddress::new("12:34:56:78:90:10").unwrap();
        assert_eq!(mac.as_str(), "12:34:56:78:90:10");
    }

    #[test]
    fn normalizes_case_and_separator() {
        let dashed = MacAddress::new("aa-bb-cc-dd-ee-0f").unwrap();
        let colon = MacAddress::new("AA:BB:CC:DD:EE:0F").unwrap();
        assert_eq!(dashed, colon);
        assert_eq!(dashed.to_string(), "AA:BB:CC:DD:EE:0F");
    }

    #[test]
    fn trims_whitespace() {
        let mac = MacAddress::new("  11:12:13:14:15:16\n").unwrap();
        assert_eq!(mac.as_str(), "11:12:13:14:15:16");
    }

    #[test]
    fn rejects_wrong_group_count() {
        assert!(MacAddress::new("12:34:56:78:90").is_err());
        assert!(MacAddress::new("12:34:56:78:90:10:11").is_err());
        assert!(MacAddress::new("").is_err());
    }

    #[test]
    fn rejects_malformed_groups() {
        assert!(MacAddress::new("12:34:56:78:90:101").is_err());
        assert!(MacAddress::new("12:34:56:78:90:1").is_err());
        assert!(MacAddress::new("12:34:56:78:90:zz").is_err());
        assert!(MacAddress::new("12:34-56:78:90:10").is_err());
    }

    #[test]
    fn error_carries_input() {
        let err = MacAddress::new("nope").unwrap_err();
        assert_eq!(err, ValueError::InvalidMacAddress("nope".to_string()));
    }

    #[test]
    fn serde_uses_normalized_string() {
        let mac = MacAddress::new("aa:bb:cc:dd:ee:ff").unwrap();
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"AA:BB:CC:DD:EE:FF\"");

        let back: MacAddress = serde_json::from_str("\"aa-bb-cc-dd-ee-ff\"").unwrap();
        assert_eq!(back, mac);

        assert!(serde_json::from_str::<MacAddress>("\"bogus\"").is_err());
    }
}
