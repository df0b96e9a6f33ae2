// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render materials attached to meshes and solids.

use serde::{Deserialize, Serialize};

/// Appearance of a mesh, in a PBR-style parameterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMaterial {
    pub name: String,
    /// `0.0` fully transparent, `1.0` opaque.
    pub opacity: f64,
    pub metalness: f64,
    pub roughness: f64,
    /// Base color as `0xAARRGGBB`.
    pub diffuse: u32,
    /// Emissive color as `0xAARRGGBB`.
    pub emissive: u32,
}

impl RenderMaterial {
    /// Packs opaque RGB components as ARGB.
    pub fn argb(r: u8, g: u8, b: u8) -> u32 {
        0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }
}

impl Default for RenderMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            opacity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
            diffuse: Self::argb(0x80, 0x80, 0x80),
            emissive: 0xFF00_0000,
        }
    }
}
