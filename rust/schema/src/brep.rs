// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Portable boundary-representation solids.
//!
//! A [`Brep`] is a set of flat tables. Faces point at surfaces and loops,
//! loops point at trims, trims point at 2D curves and edges, and edges point
//! at 3D curves and back at every trim that uses them. An edge shared by two
//! faces is stored once and referenced by two trims.

use serde::{Deserialize, Serialize};

use crate::base::Interval;
use crate::curve::Curve;
use crate::material::RenderMaterial;
use crate::mesh::Mesh;
use crate::surface::Surface;
use crate::units::Units;

/// Orientation of the solid's surface normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrepOrientation {
    None,
    Inward,
    Outward,
    #[default]
    Unknown,
}

/// Role of a loop within its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrepLoopType {
    #[default]
    Unknown,
    Outer,
    Inner,
    Slit,
    CurveOnSurface,
    PointOnSurface,
}

/// Role of a trim within its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrepTrimType {
    #[default]
    Unknown,
    /// Edge used by this face only.
    Boundary,
    /// Edge shared with another face.
    Mated,
    /// Edge joining the face to itself across a periodic seam.
    Seam,
    Singular,
    CurveOnSurface,
    PointOnSurface,
    Slit,
}

impl BrepTrimType {
    /// Trims that bound material and take part in topology.
    pub fn is_topological(self) -> bool {
        matches!(self, BrepTrimType::Boundary | BrepTrimType::Mated | BrepTrimType::Seam)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrepFace {
    pub surface_index: usize,
    pub loop_indices: Vec<usize>,
    pub outer_loop_index: usize,
    pub orientation_reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrepLoop {
    pub face_index: usize,
    pub trim_indices: Vec<usize>,
    #[serde(rename = "type")]
    pub loop_type: BrepLoopType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrepTrim {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edge_index: Option<usize>,
    pub face_index: usize,
    pub loop_index: usize,
    /// Index into [`Brep::curve_2d`].
    pub curve_index: usize,
    pub trim_type: BrepTrimType,
    /// The trim runs opposite its edge's 3D curve.
    pub is_reversed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub domain: Option<Interval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrepEdge {
    /// Index into [`Brep::curve_3d`].
    pub curve_index: usize,
    pub trim_indices: Vec<usize>,
    /// The edge runs opposite its 3D curve.
    pub flipped: bool,
    /// Sub-range of the 3D curve covered by the edge.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub domain: Option<Interval>,
}

/// A boundary-representation solid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brep {
    pub surfaces: Vec<Surface>,
    #[serde(rename = "curve2D")]
    pub curve_2d: Vec<Curve>,
    #[serde(rename = "curve3D")]
    pub curve_3d: Vec<Curve>,
    pub faces: Vec<BrepFace>,
    pub loops: Vec<BrepLoop>,
    pub trims: Vec<BrepTrim>,
    pub edges: Vec<BrepEdge>,
    pub orientation: BrepOrientation,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub render_material: Option<RenderMaterial>,
    /// Meshes consumers fall back to when the solid cannot be rebuilt.
    pub display_value: Vec<Mesh>,
    pub units: Units,
}

impl Brep {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            ..Default::default()
        }
    }

    /// `true` when there is no face to rebuild.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Trims that reference `edge_index`, found by scanning the trim table.
    pub fn trims_of_edge(&self, edge_index: usize) -> impl Iterator<Item = (usize, &BrepTrim)> {
        self.trims
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.edge_index == Some(edge_index))
    }

    /// `true` if any display mesh carries at least one face.
    pub fn has_display_value(&self) -> bool {
        self.display_value.iter().any(|m| !m.faces.is_empty())
    }
}
