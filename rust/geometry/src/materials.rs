// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host material lookup and render-material mapping.

use georelay_kernel::{Material, MaterialId, MaterialTable};
use georelay_schema::RenderMaterial;

/// Resolves host material ids into render materials.
pub trait MaterialResolver: Send + Sync {
    /// Render material for a host material id, if the id is known.
    fn resolve(&self, id: MaterialId) -> Option<RenderMaterial>;

    /// Host material matching a render material, if one exists.
    fn host_material(&self, _material: &RenderMaterial) -> Option<MaterialId> {
        None
    }
}

/// A resolver that knows no material.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMaterials;

impl MaterialResolver for NoMaterials {
    fn resolve(&self, _id: MaterialId) -> Option<RenderMaterial> {
        None
    }
}

impl MaterialResolver for MaterialTable {
    fn resolve(&self, id: MaterialId) -> Option<RenderMaterial> {
        self.get(id).map(render_material_from_host)
    }

    fn host_material(&self, material: &RenderMaterial) -> Option<MaterialId> {
        self.find_by_name(&material.name).map(|m| m.id)
    }
}

/// Maps host appearance settings onto a render material.
pub fn render_material_from_host(material: &Material) -> RenderMaterial {
    RenderMaterial {
        name: material.name.clone(),
        opacity: 1.0 - f64::from(material.transparency) / 100.0,
        metalness: f64::from(material.shininess) / 128.0,
        roughness: 1.0 - f64::from(material.smoothness) / 100.0,
        diffuse: RenderMaterial::argb(material.color.r, material.color.g, material.color.b),
        emissive: RenderMaterial::default().emissive,
    }
}

/// Content key of a render material. Names never take part, so two
/// materials that render alike share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MaterialKey {
    diffuse: u32,
    emissive: u32,
    opacity: u64,
    metalness: u64,
    roughness: u64,
}

impl MaterialKey {
    pub(crate) fn of(material: &RenderMaterial) -> Self {
        Self {
            diffuse: material.diffuse,
            emissive: material.emissive,
            opacity: material.opacity.to_bits(),
            metalness: material.metalness.to_bits(),
            roughness: material.roughness.to_bits(),
        }
    }
}
