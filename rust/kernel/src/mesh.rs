// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host mesh geometry.

use nalgebra::Point3;

use crate::keys::MaterialId;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    pub material: Option<MaterialId>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            material: None,
        }
    }

    #[inline]
    pub fn add_vertex(&mut self, p: Point3<f64>) -> u32 {
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    #[inline]
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push([a, b, c]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Appends `other`, offsetting its indices.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]));
    }

    /// Total area of all triangles.
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let a = self.vertices[t[0] as usize];
                let b = self.vertices[t[1] as usize];
                let c = self.vertices[t[2] as usize];
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }
}

/// A mesh of arbitrary planar polygons, each listing vertex indices in
/// winding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMesh {
    pub vertices: Vec<Point3<f64>>,
    pub polygons: Vec<Vec<u32>>,
    pub material: Option<MaterialId>,
}

impl PolygonMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_polygon(&mut self, points: &[Point3<f64>]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(points);
        self.polygons.push((0..points.len() as u32).map(|i| base + i).collect());
    }

    /// `true` if every polygon is a triangle.
    pub fn is_triangulated(&self) -> bool {
        self.polygons.iter().all(|p| p.len() == 3)
    }
}
