// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The conversion facade.
//!
//! A [`GeometryConverter`] holds settings plus shared references to its
//! collaborators and nothing else. Every conversion keeps its working state
//! (edge maps, material buckets, the solid builder) in locals of the call,
//! so one converter can serve several threads at once.

use georelay_schema::Units;

use crate::config::ConverterSettings;
use crate::materials::{MaterialResolver, NoMaterials};
use crate::units::LengthScale;

/// Converts geometry between the host kernel and the portable schema.
pub struct GeometryConverter<'a> {
    pub(crate) settings: ConverterSettings,
    pub(crate) scale: &'a dyn LengthScale,
    pub(crate) materials: &'a dyn MaterialResolver,
}

impl<'a> GeometryConverter<'a> {
    /// Creates a converter with default settings.
    pub fn new(scale: &'a dyn LengthScale, materials: &'a dyn MaterialResolver) -> Self {
        Self::with_settings(ConverterSettings::default(), scale, materials)
    }

    pub fn with_settings(
        settings: ConverterSettings,
        scale: &'a dyn LengthScale,
        materials: &'a dyn MaterialResolver,
    ) -> Self {
        Self {
            settings,
            scale,
            materials,
        }
    }

    /// A converter that resolves no material.
    pub fn without_materials(scale: &'a dyn LengthScale) -> Self {
        Self::new(scale, &NoMaterials)
    }

    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Units portable output is written in.
    pub fn model_units(&self) -> Units {
        self.scale.model_units()
    }
}

impl std::fmt::Debug for GeometryConverter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryConverter")
            .field("settings", &self.settings)
            .field("model_units", &self.model_units())
            .finish_non_exhaustive()
    }
}
