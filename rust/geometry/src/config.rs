// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converter settings, optionally loaded from environment variables.

use georelay_kernel::SHORT_CURVE_TOLERANCE;

/// Tolerances and switches for a [`crate::GeometryConverter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterSettings {
    /// Endpoint distance under which a curve counts as closed.
    pub closed_curve_tolerance: f64,
    /// Polyline segments shorter than this are skipped on import.
    pub short_curve_tolerance: f64,
    /// Let the solid builder accept edges below the kernel's short-curve
    /// tolerance.
    pub allow_short_edges: bool,
    /// Let the solid builder drop faces it cannot close. A dropped face
    /// still fails the conversion.
    pub allow_face_removal: bool,
    /// Segments in the preview polyline of exported NURBS curves.
    pub curve_display_segments: usize,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            closed_curve_tolerance: 1e-6,
            short_curve_tolerance: SHORT_CURVE_TOLERANCE,
            allow_short_edges: true,
            allow_face_removal: true,
            curve_display_segments: 32,
        }
    }
}

impl ConverterSettings {
    /// Load settings from `GEORELAY_*` environment variables, keeping the
    /// default for anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            closed_curve_tolerance: std::env::var("GEORELAY_CLOSED_CURVE_TOLERANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.closed_curve_tolerance),
            short_curve_tolerance: std::env::var("GEORELAY_SHORT_CURVE_TOLERANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.short_curve_tolerance),
            allow_short_edges: std::env::var("GEORELAY_ALLOW_SHORT_EDGES")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.allow_short_edges),
            allow_face_removal: std::env::var("GEORELAY_ALLOW_FACE_REMOVAL")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.allow_face_removal),
            curve_display_segments: std::env::var("GEORELAY_CURVE_DISPLAY_SEGMENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.curve_display_segments),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
