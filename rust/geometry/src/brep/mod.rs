// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid topology conversion.
//!
//! [`GeometryConverter::solid_to_portable`] flattens a host solid into the
//! portable face/loop/trim/edge tables, sharing one 3D curve per host edge.
//! [`GeometryConverter::solid_from_portable`] replays those tables through a
//! [`georelay_kernel::BRepBuilder`]; [`GeometryConverter::brep_to_host_shape`]
//! falls back to the display meshes when the builder gives up.
//!
//! [`GeometryConverter::solid_to_portable`]: crate::GeometryConverter::solid_to_portable
//! [`GeometryConverter::solid_from_portable`]: crate::GeometryConverter::solid_from_portable
//! [`GeometryConverter::brep_to_host_shape`]: crate::GeometryConverter::brep_to_host_shape

mod decompose;
mod reconstruct;

use georelay_kernel::{Solid, TriangleMesh};

/// What a portable solid became on the host side.
#[derive(Debug, Clone)]
pub enum HostShape {
    Solid(Solid),
    /// Display meshes used in place of a solid the builder rejected.
    Meshes(Vec<TriangleMesh>),
}

impl HostShape {
    pub fn is_solid(&self) -> bool {
        matches!(self, HostShape::Solid(_))
    }

    pub fn as_solid(&self) -> Option<&Solid> {
        match self {
            HostShape::Solid(solid) => Some(solid),
            HostShape::Meshes(_) => None,
        }
    }
}
