// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability readings attached to an observation.
//!
//! A smart light reports at most one color reading and at most one location.
//! Colors come in two shapes:
//!
//! - [`HsbColor`]: hue, saturation and brightness, each normalized to `[0, 1]`
//! - [`KelvinColor`]: white color temperature in Kelvin plus brightness
//!
//! Equality is structural, so two readings with the same numbers compare
//! equal regardless of where they came from.
//!
//! # Examples
//!
//! ```
//! use smartlight_store::types::{Capabilities, Color, Location};
//!
//! let caps = Capabilities::new()
//!     .with_color(Color::kelvin(2700, 0.8).unwrap())
//!     .with_location(Location::new("Home/Bedroom").unwrap());
//!
//! assert_eq!(caps.len(), 2);
//! assert_eq!(caps.color().map(Color::brightness), Some(0.8));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

fn unit_interval(field: &'static str, value: f32) -> Result<f32, ValueError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValueError::OutOfUnitRange { field, value })
    }
}

/// Color expressed as hue, saturation and brightness.
///
/// All three components are normalized floats in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHsb")]
pub struct HsbColor {
    hue: f32,
    saturation: f32,
    brightness: f32,
}

#[derive(Deserialize)]
struct RawHsb {
    hue: f32,
    saturation: f32,
    brightness: f32,
}

impl TryFrom<RawHsb> for HsbColor {
    type Error = ValueError;

    fn try_from(raw: RawHsb) -> Result<Self, Self::Error> {
        Self::new(raw.hue, raw.saturation, raw.brightness)
    }
}

impl HsbColor {
    /// Creates a new HSB color.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfUnitRange` if any component is outside
    /// `[0.0, 1.0]` or not finite.
    pub fn new(hue: f32, saturation: f32, brightness: f32) -> Result<Self, ValueError> {
        Ok(Self {
            hue: unit_interval("hue", hue)?,
            saturation: unit_interval("saturation", saturation)?,
            brightness: unit_interval("brightness", brightness)?,
        })
    }

    /// Returns the hue.
    #[must_use]
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Returns the saturation.
    #[must_use]
    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Returns the brightness.
    #[must_use]
    pub fn brightness(&self) -> f32 {
        self.brightness
    }
}

/// White color temperature with brightness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKelvin")]
pub struct KelvinColor {
    kelvin: u16,
    brightness: f32,
}

#[derive(Deserialize)]
struct RawKelvin {
    kelvin: u16,
    brightness: f32,
}

impl TryFrom<RawKelvin> for KelvinColor {
    type Error = ValueError;

    fn try_from(raw: RawKelvin) -> Result<Self, Self::Error> {
        Self::new(raw.kelvin, raw.brightness)
    }
}

impl KelvinColor {
    /// Lowest accepted color temperature.
    pub const MIN_KELVIN: u16 = 1000;

    /// Highest accepted color temperature.
    pub const MAX_KELVIN: u16 = 10_000;

    /// Creates a new color temperature reading.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `kelvin` is outside
    /// [`MIN_KELVIN`](Self::MIN_KELVIN)..=[`MAX_KELVIN`](Self::MAX_KELVIN), or
    /// `ValueError::OutOfUnitRange` for an invalid brightness.
    pub fn new(kelvin: u16, brightness: f32) -> Result<Self, ValueError> {
        if !(Self::MIN_KELVIN..=Self::MAX_KELVIN).contains(&kelvin) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN_KELVIN,
                max: Self::MAX_KELVIN,
                actual: kelvin,
            });
        }
        Ok(Self {
            kelvin,
            brightness: unit_interval("brightness", brightness)?,
        })
    }

    /// Returns the color temperature in Kelvin.
    #[must_use]
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Returns the brightness.
    #[must_use]
    pub fn brightness(&self) -> f32 {
        self.brightness
    }
}

/// Color reading of a light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Color {
    /// Hue/saturation/brightness color.
    Hsb(HsbColor),
    /// Color temperature.
    Kelvin(KelvinColor),
}

impl Color {
    /// Creates an HSB color reading.
    ///
    /// # Errors
    ///
    /// See [`HsbColor::new`].
    pub fn hsb(hue: f32, saturation: f32, brightness: f32) -> Result<Self, ValueError> {
        HsbColor::new(hue, saturation, brightness).map(Self::Hsb)
    }

    /// Creates a color temperature reading.
    ///
    /// # Errors
    ///
    /// See [`KelvinColor::new`].
    pub fn kelvin(kelvin: u16, brightness: f32) -> Result<Self, ValueError> {
        KelvinColor::new(kelvin, brightness).map(Self::Kelvin)
    }

    /// Returns the brightness, which both color modes carry.
    #[must_use]
    pub fn brightness(&self) -> f32 {
        match self {
            Self::Hsb(c) => c.brightness(),
            Self::Kelvin(c) => c.brightness(),
        }
    }

    /// Returns `true` for an HSB color.
    #[must_use]
    pub fn is_hsb(&self) -> bool {
        matches!(self, Self::Hsb(_))
    }

    /// Returns `true` for a color temperature.
    #[must_use]
    pub fn is_kelvin(&self) -> bool {
        matches!(self, Self::Kelvin(_))
    }
}

/// Free-text location path of a light, such as `Home/Bedroom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// Maximum length of a location path in characters.
    pub const MAX_LEN: usize = 50;

    /// Creates a location.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidLocation` if the path is blank or longer
    /// than [`MAX_LEN`](Self::MAX_LEN) characters.
    pub fn new(path: impl Into<String>) -> Result<Self, ValueError> {
        let path = path.into();
        if path.trim().is_empty() || path.chars().count() > Self::MAX_LEN {
            return Err(ValueError::InvalidLocation(path));
        }
        Ok(Self(path))
    }

    /// Returns the location path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Location {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0
    }
}

/// A single capability reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// Color reading.
    Color(Color),
    /// Location reading.
    Location(Location),
}

impl From<Color> for Capability {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<Location> for Capability {
    fn from(location: Location) -> Self {
        Self::Location(location)
    }
}

/// The capabilities reported with one observation.
///
/// Holds at most one color and at most one location; inserting a second
/// reading of the same kind replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

impl Capabilities {
    /// Creates an empty capability set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the color reading.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the location reading.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Inserts a capability, returning the reading of the same kind it replaced.
    pub fn insert(&mut self, capability: Capability) -> Option<Capability> {
        match capability {
            Capability::Color(color) => self.color.replace(color).map(Capability::Color),
            Capability::Location(location) => {
                self.location.replace(location).map(Capability::Location)
            }
        }
    }

    /// Returns the color reading.
    #[must_use]
    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    /// Returns the location reading.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Returns the number of readings present (0 to 2).
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.color.is_some()) + usize::from(self.location.is_some())
    }

    /// Returns `true` if no capability was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the readings, color first.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.color
            .iter()
            .copied()
            .map(Capability::Color)
            .chain(self.location.iter().cloned().map(Capability::Location))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut caps = Self::new();
        for capability in iter {
            caps.insert(capability);
        }
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsb_validates_components() {
        assert!(Color::hsb(0.5, 0.5, 0.5).is_ok());
        assert!(Color::hsb(0.0, 1.0, 0.0).is_ok());
        assert_eq!(
            Color::hsb(1.5, 0.5, 0.5),
            Err(ValueError::OutOfUnitRange {
                field: "hue",
                value: 1.5
            })
        );
        assert!(Color::hsb(0.5, -0.1, 0.5).is_err());
        assert!(Color::hsb(0.5, 0.5, f32::NAN).is_err());
    }

    #[test]
    fn kelvin_validates_range() {
        assert!(Color::kelvin(1000, 1.0).is_ok());
        assert!(Color::kelvin(10_000, 0.0).is_ok());
        assert_eq!(
            Color::kelvin(999, 0.5),
            Err(ValueError::OutOfRange {
                min: 1000,
                max: 10_000,
                actual: 999
            })
        );
        assert!(Color::kelvin(2700, 2.0).is_err());
    }

    #[test]
    fn brightness_for_both_modes() {
        assert_eq!(Color::hsb(0.1, 0.2, 0.3).unwrap().brightness(), 0.3);
        assert_eq!(Color::kelvin(4000, 0.7).unwrap().brightness(), 0.7);
    }

    #[test]
    fn modes_are_distinct() {
        let hsb = Color::hsb(0.1, 0.2, 0.5).unwrap();
        let kelvin = Color::kelvin(4000, 0.5).unwrap();
        assert!(hsb.is_hsb());
        assert!(kelvin.is_kelvin());
        assert_ne!(hsb, kelvin);
    }

    #[test]
    fn location_validation() {
        assert!(Location::new("Home/Bedroom").is_ok());
        assert!(Location::new("").is_err());
        assert!(Location::new("   ").is_err());
        assert!(Location::new("x".repeat(Location::MAX_LEN)).is_ok());
        assert!(Location::new("x".repeat(Location::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn insert_replaces_same_kind() {
        let mut caps = Capabilities::new();
        let warm = Color::kelvin(2700, 0.5).unwrap();
        let cool = Color::kelvin(6500, 0.5).unwrap();

        assert!(caps.insert(warm.into()).is_none());
        assert_eq!(caps.insert(cool.into()), Some(Capability::Color(warm)));
        assert_eq!(caps.color(), Some(&cool));
        assert_eq!(caps.len(), 1);
    }

    #[test]
    fn collect_and_iterate() {
        let location = Location::new("Home/Kitchen").unwrap();
        let color = Color::hsb(0.2, 0.4, 0.6).unwrap();
        let caps: Capabilities = vec![
            Capability::Location(location.clone()),
            Capability::Color(color),
        ]
        .into_iter()
        .collect();

        let items: Vec<Capability> = caps.iter().collect();
        assert_eq!(
            items,
            vec![Capability::Color(color), Capability::Location(location)]
        );
    }

    #[test]
    fn structural_equality() {
        let a = Capabilities::new()
            .with_color(Color::hsb(0.2, 0.4, 0.6).unwrap())
            .with_location(Location::new("Home").unwrap());
        let b = Capabilities::new()
            .with_location(Location::new("Home").unwrap())
            .with_color(Color::hsb(0.2, 0.4, 0.6).unwrap());
        assert_eq!(a, b);
        assert!(Capabilities::new().is_empty());
    }

    #[test]
    fn deserialize_rejects_invalid_values() {
        let ok = r#"{"mode":"kelvin","kelvin":2700,"brightness":0.5}"#;
        assert!(serde_json::from_str::<Color>(ok).is_ok());

        let bad = r#"{"mode":"kelvin","kelvin":50,"brightness":0.5}"#;
        assert!(serde_json::from_str::<Color>(bad).is_err());

        let bad_hsb = r#"{"mode":"hsb","hue":4.0,"saturation":0.5,"brightness":0.5}"#;
        assert!(serde_json::from_str::<Color>(bad_hsb).is_err());
    }
}
