// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face triangulation.
//!
//! A face is tessellated from its boundary: every loop is sampled in 3D,
//! mapped into the face's parameter space, and the resulting rings are
//! ear-clipped with `earcutr`, the largest ring acting as the outer
//! boundary. Vertices are the sampled boundary points themselves.
//! Triangles wind counter-clockwise around the face normal.

use nalgebra::{Point2, Point3};

use crate::error::{Error, Result};
use crate::keys::{FaceKey, LoopKey};
use crate::mesh::TriangleMesh;
use crate::solid::{signed_area, Solid, FACE_CURVE_SEGMENTS};

impl Solid {
    /// Sampled 3D polygon of a loop, in traversal order, without the
    /// repeated closing point.
    pub fn loop_points(&self, face: FaceKey, key: LoopKey) -> Result<Vec<Point3<f64>>> {
        let lp = self.loop_data(key)?;
        let mut ring = Vec::new();
        for &edge_key in lp.edges() {
            let edge = self.edge(edge_key)?;
            let side = edge.side_of(face).ok_or(Error::EdgeNotFound(edge_key))?;
            let mut points = edge.curve().tessellate(FACE_CURVE_SEGMENTS);
            if edge.uses()[side].is_flipped() {
                points.reverse();
            }
            points.pop();
            ring.extend(points);
        }
        Ok(ring)
    }

    /// Triangulates one face. The mesh carries the face's material.
    pub fn triangulate_face(&self, key: FaceKey) -> Result<TriangleMesh> {
        let face = self.face(key)?;
        let mut rings_3d = Vec::with_capacity(face.loops().len());
        let mut rings_uv = Vec::with_capacity(face.loops().len());
        for &lp in face.loops() {
            let ring = self.loop_points(key, lp)?;
            if ring.len() < 3 {
                continue;
            }
            rings_uv.push(face.surface().unwrap_samples(&ring));
            rings_3d.push(ring);
        }
        if rings_3d.is_empty() {
            return Err(Error::DegenerateFace("face has no loop with area".into()));
        }

        // Outer ring first, holes after.
        let outer = rings_uv
            .iter()
            .enumerate()
            .max_by(|a, b| signed_area(a.1).abs().total_cmp(&signed_area(b.1).abs()))
            .map_or(0, |(i, _)| i);
        rings_uv.swap(0, outer);
        rings_3d.swap(0, outer);

        let total: usize = rings_uv.iter().map(Vec::len).sum();
        let mut flat = Vec::with_capacity(total * 2);
        let mut holes = Vec::with_capacity(rings_uv.len() - 1);
        for (i, ring) in rings_uv.iter().enumerate() {
            if i > 0 {
                holes.push(flat.len() / 2);
            }
            for p in ring {
                flat.push(p.x);
                flat.push(p.y);
            }
        }
        let indices = earcutr::earcut(&flat, &holes, 2).map_err(|e| Error::Triangulation(format!("{:?}", e)))?;

        let uv: Vec<Point2<f64>> = rings_uv.into_iter().flatten().collect();
        let counter_clockwise = face.orientation_matches_surface();
        let mut mesh = TriangleMesh::with_capacity(total, indices.len() / 3);
        mesh.vertices = rings_3d.into_iter().flatten().collect();
        mesh.material = face.material();
        for tri in indices.chunks_exact(3) {
            let (a, mut b, mut c) = (tri[0], tri[1], tri[2]);
            let area = signed_area(&[uv[a], uv[b], uv[c]]);
            if (area > 0.0) != counter_clockwise {
                std::mem::swap(&mut b, &mut c);
            }
            mesh.add_triangle(a as u32, b as u32, c as u32);
        }
        Ok(mesh)
    }
}
