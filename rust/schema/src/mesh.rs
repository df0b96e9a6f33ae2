// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Portable polygon meshes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::material::RenderMaterial;
use crate::units::Units;

/// A polygon mesh with flat vertex and face arrays.
///
/// `faces` is a sequence of runs `[n, i0, .., i(n-1)]`. A leading `0` or `1`
/// is the legacy encoding of a triangle or a quad.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    /// Vertex coordinates as `[x, y, z, ...]`.
    pub vertices: Vec<f64>,
    pub faces: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub render_material: Option<RenderMaterial>,
    pub units: Units,
}

impl Mesh {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            ..Default::default()
        }
    }

    /// Number of vertices (`vertices.len() / 3`).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// `true` when the mesh has no vertex or no face.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Vertex `index` as `[x, y, z]`.
    #[inline]
    pub fn vertex(&self, index: usize) -> Option<[f64; 3]> {
        self.vertices
            .get(index * 3..index * 3 + 3)
            .map(|v| [v[0], v[1], v[2]])
    }

    /// Decodes the face runs, validating every index against the vertex list.
    pub fn face_runs(&self) -> Result<Vec<&[u32]>> {
        if self.vertices.len() % 3 != 0 {
            return Err(Error::MalformedArray {
                len: self.vertices.len(),
                stride: 3,
            });
        }
        let vertex_count = self.vertex_count();
        let mut runs = Vec::new();
        let mut offset = 0;
        while offset < self.faces.len() {
            let mut count = self.faces[offset] as usize;
            if count < 3 {
                count += 3;
            }
            let run = self
                .faces
                .get(offset + 1..offset + 1 + count)
                .ok_or(Error::TruncatedFace { offset, count })?;
            if let Some(&bad) = run.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::VertexOutOfRange {
                    index: bad as usize,
                    vertex_count,
                });
            }
            runs.push(run);
            offset += count + 1;
        }
        Ok(runs)
    }

    /// Number of faces, or `None` when the face list is malformed.
    pub fn face_count(&self) -> Option<usize> {
        self.face_runs().ok().map(|runs| runs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh(faces: Vec<u32>) -> Mesh {
        Mesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            faces,
            render_material: None,
            units: Units::Meters,
        }
    }

    #[test]
    fn test_face_runs_mixed_sizes() {
        let mesh = quad_mesh(vec![3, 0, 1, 2, 4, 0, 1, 2, 3]);
        let runs = mesh.face_runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1], &[0, 1, 2, 3]);
    }

    #[test]
    fn test_legacy_face_counts() {
        // 0 => triangle, 1 => quad
        let mesh = quad_mesh(vec![0, 0, 1, 2, 1, 0, 1, 2, 3]);
        let runs = mesh.face_runs().unwrap();
        assert_eq!(runs[0].len(), 3);
        assert_eq!(runs[1].len(), 4);
    }

    #[test]
    fn test_out_of_range_index() {
        let mesh = quad_mesh(vec![3, 0, 1, 9]);
        assert!(matches!(
            mesh.face_runs(),
            Err(Error::VertexOutOfRange { index: 9, vertex_count: 4 })
        ));
        assert_eq!(mesh.face_count(), None);
    }

    #[test]
    fn test_truncated_run() {
        let mesh = quad_mesh(vec![4, 0, 1]);
        assert!(matches!(mesh.face_runs(), Err(Error::TruncatedFace { offset: 0, count: 4 })));
    }
}
