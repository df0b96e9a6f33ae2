// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Solids and builders hand out slotmap keys. Keys of a [`crate::Solid`] are
//! only meaningful for the solid that created them, and builder ids only for
//! their [`crate::BRepBuilder`].

use slotmap::new_key_type;

new_key_type! {
    /// Key for a face of a solid.
    pub struct FaceKey;

    /// Key for a loop (closed chain of edge uses) of a solid face.
    pub struct LoopKey;

    /// Key for an edge of a solid.
    pub struct EdgeKey;

    /// Id of a face under construction.
    pub struct BuilderFaceId;

    /// Id of a loop under construction.
    pub struct BuilderLoopId;

    /// Id of an edge geometry record handed to a builder.
    pub struct BuilderEdgeId;
}

/// Host material element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// A key that can reference any builder entity, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderKey {
    Face(BuilderFaceId),
    Loop(BuilderLoopId),
    Edge(BuilderEdgeId),
}

impl BuilderKey {
    /// Returns the entity type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            BuilderKey::Face(_) => "face",
            BuilderKey::Loop(_) => "loop",
            BuilderKey::Edge(_) => "edge",
        }
    }
}

impl From<BuilderFaceId> for BuilderKey {
    fn from(k: BuilderFaceId) -> Self {
        BuilderKey::Face(k)
    }
}

impl From<BuilderLoopId> for BuilderKey {
    fn from(k: BuilderLoopId) -> Self {
        BuilderKey::Loop(k)
    }
}

impl From<BuilderEdgeId> for BuilderKey {
    fn from(k: BuilderEdgeId) -> Self {
        BuilderKey::Edge(k)
    }
}

impl std::fmt::Display for BuilderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.type_name(), self)
    }
}
