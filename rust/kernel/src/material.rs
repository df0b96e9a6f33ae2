// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host materials.

use rustc_hash::FxHashMap;

use crate::keys::MaterialId;

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A host material element.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub color: Color,
    /// Percentage, `0` opaque to `100` fully transparent.
    pub transparency: u8,
    /// `0..=128`.
    pub shininess: u8,
    /// Percentage, `0..=100`.
    pub smoothness: u8,
}

/// The document's material table.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: FxHashMap<MaterialId, Material>,
    next_id: u32,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material and returns its id.
    pub fn insert(&mut self, name: impl Into<String>, color: Color, transparency: u8, shininess: u8, smoothness: u8) -> MaterialId {
        self.next_id += 1;
        let id = MaterialId(self.next_id);
        self.materials.insert(
            id,
            Material {
                id,
                name: name.into(),
                color,
                transparency: transparency.min(100),
                shininess: shininess.min(128),
                smoothness: smoothness.min(100),
            },
        );
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Material> {
        let mut matches: Vec<&Material> = self
            .materials
            .values()
            .filter(|m| m.name.eq_ignore_ascii_case(name))
            .collect();
        // Hash order is arbitrary; the oldest material wins.
        matches.sort_by_key(|m| m.id);
        matches.first().copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
