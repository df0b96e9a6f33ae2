// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length units carried by every portable entity.

use serde::{Deserialize, Serialize};

/// A length unit tag.
///
/// [`Units::None`] marks unitless values (face parameter space) that must
/// never be scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Units {
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "cm")]
    Centimeters,
    #[default]
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "yd")]
    Yards,
    #[serde(rename = "mi")]
    Miles,
    #[serde(rename = "none")]
    None,
}

impl Units {
    /// Length of one unit in metres, or `None` for unitless values.
    pub fn meters_per_unit(self) -> Option<f64> {
        match self {
            Units::Millimeters => Some(1e-3),
            Units::Centimeters => Some(1e-2),
            Units::Meters => Some(1.0),
            Units::Kilometers => Some(1e3),
            Units::Inches => Some(0.0254),
            Units::Feet => Some(0.3048),
            Units::Yards => Some(0.9144),
            Units::Miles => Some(1609.344),
            Units::None => None,
        }
    }

    /// Factor that converts a value in `self` into `to`.
    ///
    /// Returns `1.0` when either side is unitless.
    pub fn conversion_factor(self, to: Units) -> f64 {
        match (self.meters_per_unit(), to.meters_per_unit()) {
            (Some(from), Some(to)) => from / to,
            _ => 1.0,
        }
    }

    /// Short symbol used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Millimeters => "mm",
            Units::Centimeters => "cm",
            Units::Meters => "m",
            Units::Kilometers => "km",
            Units::Inches => "in",
            Units::Feet => "ft",
            Units::Yards => "yd",
            Units::Miles => "mi",
            Units::None => "none",
        }
    }

    /// `true` for [`Units::None`].
    pub fn is_unitless(self) -> bool {
        matches!(self, Units::None)
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" | "millimetres" => Ok(Units::Millimeters),
            "cm" | "centimeters" | "centimetres" => Ok(Units::Centimeters),
            "m" | "meters" | "metres" => Ok(Units::Meters),
            "km" | "kilometers" | "kilometres" => Ok(Units::Kilometers),
            "in" | "inches" => Ok(Units::Inches),
            "ft" | "feet" => Ok(Units::Feet),
            "yd" | "yards" => Ok(Units::Yards),
            "mi" | "miles" => Ok(Units::Miles),
            "none" | "" => Ok(Units::None),
            other => Err(format!("unknown length unit '{other}'")),
        }
    }
}
