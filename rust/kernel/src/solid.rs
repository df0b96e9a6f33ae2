// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for built solids.
//!
//! A [`Solid`] owns its faces, loops and edges in slot maps with stable
//! keys. Faces are bounded by loops; a loop is an ordered chain of edges;
//! an edge carries its 3D curve and one entry per face that uses it
//! ([`EdgeUse`]), recording the edge's direction relative to the loop and
//! its image in that face's parameter space.
//!
//! Solids are produced by [`crate::BRepBuilder`] and are immutable
//! afterwards. Iteration follows construction order.

use nalgebra::Point2;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::builder::BRepType;
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::keys::{EdgeKey, FaceKey, LoopKey, MaterialId};
use crate::surface::{BoundingBoxUV, FaceSurface};

/// Segments used when sampling curved edges of a face for bounds and areas.
pub(crate) const FACE_CURVE_SEGMENTS: usize = 16;

/// Data stored for a face.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub(crate) surface: FaceSurface,
    pub(crate) loops: Vec<LoopKey>,
    pub(crate) orientation_matches_surface: bool,
    pub(crate) material: Option<MaterialId>,
}

impl FaceData {
    pub fn surface(&self) -> &FaceSurface {
        &self.surface
    }

    /// Loops in construction order.
    pub fn loops(&self) -> &[LoopKey] {
        &self.loops
    }

    /// `false` if the face normal points against the surface normal.
    pub fn orientation_matches_surface(&self) -> bool {
        self.orientation_matches_surface
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }
}

/// Data stored for a loop: edges in traversal order.
#[derive(Debug, Clone)]
pub struct LoopData {
    pub(crate) face: FaceKey,
    pub(crate) edges: Vec<EdgeKey>,
}

impl LoopData {
    pub fn face(&self) -> FaceKey {
        self.face
    }

    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }
}

/// One face's view of an edge.
#[derive(Debug, Clone)]
pub struct EdgeUse {
    pub(crate) face: FaceKey,
    pub(crate) flipped: bool,
    pub(crate) curve_uv: Curve,
}

impl EdgeUse {
    pub fn face(&self) -> FaceKey {
        self.face
    }

    /// `true` when the face's loop runs against the edge curve.
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// The edge in the face's parameter space, in the edge's direction.
    pub fn curve_uv(&self) -> &Curve {
        &self.curve_uv
    }
}

/// Data stored for an edge: its 3D curve and the faces using it.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub(crate) curve: Curve,
    pub(crate) uses: SmallVec<[EdgeUse; 2]>,
}

impl EdgeData {
    /// The bound 3D curve, in the edge's own direction.
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn uses(&self) -> &[EdgeUse] {
        &self.uses
    }

    /// Face on `side` (`0` or `1`).
    pub fn face(&self, side: usize) -> Option<FaceKey> {
        self.uses.get(side).map(|u| u.face)
    }

    /// Which side `face` is on.
    pub fn side_of(&self, face: FaceKey) -> Option<usize> {
        self.uses.iter().position(|u| u.face == face)
    }

    pub fn is_flipped_on_face(&self, side: usize) -> Option<bool> {
        self.uses.get(side).map(|u| u.flipped)
    }

    pub fn curve_uv(&self, side: usize) -> Option<&Curve> {
        self.uses.get(side).map(|u| &u.curve_uv)
    }
}

/// A built boundary-representation solid.
#[derive(Debug, Clone)]
pub struct Solid {
    pub(crate) shell_type: BRepType,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) loops: SlotMap<LoopKey, LoopData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
}

impl Solid {
    pub(crate) fn new(shell_type: BRepType) -> Self {
        Self {
            shell_type,
            faces: SlotMap::with_key(),
            loops: SlotMap::with_key(),
            edges: SlotMap::with_key(),
        }
    }

    /// The shell type the solid was built as.
    pub fn shell_type(&self) -> BRepType {
        self.shell_type
    }

    // --- Face operations ---

    pub fn face(&self, key: FaceKey) -> Result<&FaceData> {
        self.faces.get(key).ok_or(Error::FaceNotFound(key))
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Faces in construction order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &FaceData)> {
        self.faces.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    // --- Loop operations ---

    pub fn loop_data(&self, key: LoopKey) -> Result<&LoopData> {
        self.loops.get(key).ok_or(Error::LoopNotFound(key))
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    // --- Edge operations ---

    pub fn edge(&self, key: EdgeKey) -> Result<&EdgeData> {
        self.edges.get(key).ok_or(Error::EdgeNotFound(key))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &EdgeData)> {
        self.edges.iter()
    }

    // --- Parameter space ---

    /// Sampled parameter-space polygon of a loop, in traversal order. The
    /// closing point is not repeated.
    pub fn loop_uv_polygon(&self, face: FaceKey, key: LoopKey) -> Result<Vec<Point2<f64>>> {
        let lp = self.loop_data(key)?;
        let mut ring = Vec::new();
        for &edge_key in &lp.edges {
            let edge = self.edge(edge_key)?;
            let side = edge.side_of(face).ok_or(Error::EdgeNotFound(edge_key))?;
            let edge_use = &edge.uses[side];
            let mut points = edge_use.curve_uv.tessellate(FACE_CURVE_SEGMENTS);
            if edge_use.flipped {
                points.reverse();
            }
            points.pop();
            ring.extend(points.into_iter().map(|p| Point2::new(p.x, p.y)));
        }
        Ok(ring)
    }

    /// Signed area enclosed by a loop in parameter space.
    pub fn loop_uv_area(&self, face: FaceKey, key: LoopKey) -> Result<f64> {
        Ok(signed_area(&self.loop_uv_polygon(face, key)?))
    }

    /// Bounds of a face's loops in parameter space.
    pub fn face_uv_bounds(&self, key: FaceKey) -> Result<BoundingBoxUV> {
        let face = self.face(key)?;
        let mut points = Vec::new();
        for &lp in &face.loops {
            points.extend(self.loop_uv_polygon(key, lp)?);
        }
        BoundingBoxUV::from_points(&points).ok_or_else(|| Error::DegenerateFace("face has no boundary".into()))
    }
}

/// Shoelace area, positive for counter-clockwise rings.
pub(crate) fn signed_area(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::make_box;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_box_counts() {
        let solid = make_box(Point3::origin(), Point3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(solid.face_count(), 6);
        assert_eq!(solid.edge_count(), 12);
        assert_eq!(solid.loop_count(), 6);
        assert_eq!(solid.shell_type(), BRepType::Solid);
        for (_, edge) in solid.edges() {
            assert_eq!(edge.uses().len(), 2);
            assert_ne!(edge.is_flipped_on_face(0), edge.is_flipped_on_face(1));
        }
    }

    #[test]
    fn test_box_loops_are_counter_clockwise_in_uv() {
        let solid = make_box(Point3::origin(), Point3::new(2.0, 2.0, 2.0)).unwrap();
        for (key, face) in solid.faces() {
            let area = solid.loop_uv_area(key, face.loops()[0]).unwrap();
            assert_relative_eq!(area, 4.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_face_uv_bounds() {
        let solid = make_box(Point3::origin(), Point3::new(1.0, 2.0, 3.0)).unwrap();
        let (key, _) = solid.faces().next().unwrap();
        let bounds = solid.face_uv_bounds(key).unwrap();
        assert!(bounds.width() > 0.0 && bounds.height() > 0.0);
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)];
        let mut cw = ccw;
        cw.reverse();
        assert_relative_eq!(signed_area(&ccw), 1.0);
        assert_relative_eq!(signed_area(&cw), -1.0);
    }
}
