// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh batching by material.
//!
//! Fragments are triangulated and appended to one accumulator per distinct
//! render material, plus a shared accumulator for fragments without one.
//! Materials are told apart by content, never by name or host id.

use georelay_kernel::{MaterialId, Point3, PolygonMesh, Solid, TriangleMesh, VERTEX_TOLERANCE};
use georelay_schema::{Mesh, Units};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::materials::MaterialKey;
use crate::triangulation::{is_planar_quad, triangulate_polygon_3d};
use crate::{Error, GeometryConverter, Result};

/// Host geometry that can be batched into portable meshes.
#[derive(Debug, Clone, Copy)]
pub enum MeshFragment<'a> {
    Triangles(&'a TriangleMesh),
    Polygons(&'a PolygonMesh),
    /// Every face is triangulated on its own.
    Solid(&'a Solid),
}

/// Per-call material buckets.
struct Batcher {
    units: Units,
    buckets: Vec<Mesh>,
    index: FxHashMap<MaterialKey, usize>,
    unassigned: Mesh,
}

impl Batcher {
    fn new(units: Units) -> Self {
        Self {
            units,
            buckets: Vec::new(),
            index: FxHashMap::default(),
            unassigned: Mesh::new(units),
        }
    }

    fn bucket(&mut self, converter: &GeometryConverter<'_>, material: Option<MaterialId>) -> &mut Mesh {
        let Some(render) = material.and_then(|id| converter.materials.resolve(id)) else {
            return &mut self.unassigned;
        };
        let key = MaterialKey::of(&render);
        let index = match self.index.get(&key) {
            Some(&index) => index,
            None => {
                let mut mesh = Mesh::new(self.units);
                mesh.render_material = Some(render);
                self.buckets.push(mesh);
                self.index.insert(key, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[index]
    }

    fn finish(self) -> Vec<Mesh> {
        self.buckets
            .into_iter()
            .chain(std::iter::once(self.unassigned))
            .filter(|m| !m.vertices.is_empty() && !m.faces.is_empty())
            .collect()
    }
}

impl GeometryConverter<'_> {
    /// Batches fragments into the fewest meshes that keep one material per
    /// mesh. Materialized meshes come in first-seen order, followed by the
    /// mesh of fragments without a material. Empty meshes are dropped.
    pub fn build_meshes(&self, fragments: &[MeshFragment<'_>]) -> Result<Vec<Mesh>> {
        let mut batcher = Batcher::new(self.model_units());
        for fragment in fragments {
            match *fragment {
                MeshFragment::Triangles(mesh) => {
                    if let Some(bad) = mesh
                        .triangles
                        .iter()
                        .flatten()
                        .find(|&&i| i as usize >= mesh.vertices.len())
                    {
                        return Err(Error::degenerate(format!(
                            "triangle index {bad} out of range for {} vertices",
                            mesh.vertices.len()
                        )));
                    }
                    self.append(&mut batcher, mesh.material, &mesh.vertices, &mesh.triangles);
                }
                MeshFragment::Polygons(mesh) => {
                    let triangles = polygon_triangles(mesh)?;
                    self.append(&mut batcher, mesh.material, &mesh.vertices, &triangles);
                }
                MeshFragment::Solid(solid) => {
                    for (key, _) in solid.faces() {
                        match solid.triangulate_face(key) {
                            Ok(mesh) => self.append(&mut batcher, mesh.material, &mesh.vertices, &mesh.triangles),
                            Err(e) => warn!(face = ?key, error = %e, "skipping face that failed to tessellate"),
                        }
                    }
                }
            }
        }
        let meshes = batcher.finish();
        debug!(fragments = fragments.len(), meshes = meshes.len(), "batched meshes");
        Ok(meshes)
    }

    fn append(
        &self,
        batcher: &mut Batcher,
        material: Option<MaterialId>,
        vertices: &[Point3<f64>],
        triangles: &[[u32; 3]],
    ) {
        if triangles.is_empty() {
            return;
        }
        let units = batcher.units;
        let mesh = batcher.bucket(self, material);
        let offset = (mesh.vertices.len() / 3) as u32;
        mesh.vertices.extend(self.flat_points_out(vertices, units));
        mesh.faces.reserve(triangles.len() * 4);
        for &[a, b, c] in triangles {
            mesh.faces.extend_from_slice(&[3, a + offset, b + offset, c + offset]);
        }
    }

    /// Converts a portable mesh into a host triangle mesh.
    ///
    /// Quads split along their `1-3` diagonal when they are not planar;
    /// larger faces are ear-clipped.
    pub fn mesh_to_host(&self, mesh: &Mesh) -> Result<TriangleMesh> {
        let runs = mesh.face_runs()?;
        let mut out = TriangleMesh::with_capacity(mesh.vertex_count(), runs.len());
        out.vertices = self.flat_points_in(&mesh.vertices, mesh.units)?;
        out.material = mesh
            .render_material
            .as_ref()
            .and_then(|m| self.materials.host_material(m));

        for run in runs {
            match *run {
                [a, b, c] => out.add_triangle(a, b, c),
                [a, b, c, d] => {
                    let quad = [a, b, c, d].map(|i| out.vertices[i as usize]);
                    if is_planar_quad(&quad, VERTEX_TOLERANCE) {
                        out.add_triangle(a, b, c);
                        out.add_triangle(a, c, d);
                    } else {
                        out.add_triangle(a, b, d);
                        out.add_triangle(b, c, d);
                    }
                }
                _ => {
                    let points: Vec<Point3<f64>> = run.iter().map(|&i| out.vertices[i as usize]).collect();
                    for [a, b, c] in triangulate_polygon_3d(&points)? {
                        out.add_triangle(run[a], run[b], run[c]);
                    }
                }
            }
        }
        Ok(out)
    }
}

fn polygon_triangles(mesh: &PolygonMesh) -> Result<Vec<[u32; 3]>> {
    let mut triangles = Vec::with_capacity(mesh.polygons.len());
    for (p, polygon) in mesh.polygons.iter().enumerate() {
        if polygon.len() < 3 {
            return Err(Error::degenerate(format!("polygon {p} has {} vertices", polygon.len())));
        }
        if let Some(&bad) = polygon.iter().find(|&&i| i as usize >= mesh.vertices.len()) {
            return Err(Error::degenerate(format!(
                "polygon {p} index {bad} out of range for {} vertices",
                mesh.vertices.len()
            )));
        }
        let points: Vec<Point3<f64>> = polygon.iter().map(|&i| mesh.vertices[i as usize]).collect();
        for [a, b, c] in triangulate_polygon_3d(&points)? {
            triangles.push([polygon[a], polygon[b], polygon[c]]);
        }
    }
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, UnitScale};
    use approx::assert_relative_eq;
    use georelay_kernel::{make_box_with_material, Color, MaterialTable};

    fn triangle(material: Option<MaterialId>, x: f64) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let a = mesh.add_vertex(Point3::new(x, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(x + 1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(x, 1.0, 0.0));
        mesh.add_triangle(a, b, c);
        mesh.material = material;
        mesh
    }

    #[test]
    fn test_batches_by_material_content() {
        let mut table = MaterialTable::new();
        let red = table.insert("Red", Color::new(255, 0, 0), 0, 0, 50);
        let red_copy = table.insert("Red copy", Color::new(255, 0, 0), 0, 0, 50);
        let blue = table.insert("Blue", Color::new(0, 0, 255), 0, 0, 50);
        let scale = UnitScale::identity(Units::Meters);
        let c = GeometryConverter::new(&scale, &table);

        let meshes = [
            triangle(None, 0.0),
            triangle(Some(blue), 1.0),
            triangle(Some(red), 2.0),
            triangle(Some(red_copy), 3.0),
            triangle(Some(MaterialId(42)), 4.0),
        ];
        let fragments: Vec<MeshFragment> = meshes.iter().map(MeshFragment::Triangles).collect();
        let out = c.build_meshes(&fragments).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].render_material.as_ref().unwrap().name, "Blue");
        assert_eq!(out[1].render_material.as_ref().unwrap().name, "Red");
        assert!(out[2].render_material.is_none());
        // The two reds share one mesh; indices of the second are offset
        assert_eq!(out[1].faces, vec![3, 0, 1, 2, 3, 3, 4, 5]);
        // Unknown material ids land with the unassigned fragments
        assert_eq!(out[2].vertex_count(), 6);
    }

    #[test]
    fn test_empty_input_and_all_unassigned() {
        let scale = UnitScale::identity(Units::Meters);
        let c = GeometryConverter::without_materials(&scale);
        assert!(c.build_meshes(&[]).unwrap().is_empty());

        let meshes = [triangle(None, 0.0), triangle(Some(MaterialId(1)), 5.0)];
        let fragments: Vec<MeshFragment> = meshes.iter().map(MeshFragment::Triangles).collect();
        let out = c.build_meshes(&fragments).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].render_material.is_none());
        assert_eq!(out[0].faces.len(), 8);
    }

    #[test]
    fn test_vertices_are_scaled() {
        let scale = UnitScale::new(Units::Feet, Units::Meters);
        let c = GeometryConverter::without_materials(&scale);
        let mesh = triangle(None, 0.0);
        let out = c.build_meshes(&[MeshFragment::Triangles(&mesh)]).unwrap();
        assert_relative_eq!(out[0].vertices[3], 0.3048, epsilon = 1e-12);
        assert_eq!(out[0].units, Units::Meters);
    }

    #[test]
    fn test_polygons_are_triangulated() {
        let scale = UnitScale::identity(Units::Meters);
        let c = GeometryConverter::without_materials(&scale);
        let mut mesh = PolygonMesh::new();
        mesh.add_polygon(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]);
        let out = c.build_meshes(&[MeshFragment::Polygons(&mesh)]).unwrap();
        assert_eq!(out[0].faces.len(), 4 * 4);
        assert!(out[0].faces.chunks(4).all(|f| f[0] == 3));

        mesh.polygons.push(vec![0, 1]);
        let err = c.build_meshes(&[MeshFragment::Polygons(&mesh)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);
    }

    #[test]
    fn test_bad_triangle_index() {
        let scale = UnitScale::identity(Units::Meters);
        let c = GeometryConverter::without_materials(&scale);
        let mut mesh = triangle(None, 0.0);
        mesh.triangles.push([0, 1, 9]);
        assert!(c.build_meshes(&[MeshFragment::Triangles(&mesh)]).is_err());
    }

    #[test]
    fn test_solid_faces_share_material_mesh() {
        let mut table = MaterialTable::new();
        let id = table.insert("Concrete", Color::new(128, 128, 128), 0, 0, 90);
        let scale = UnitScale::identity(Units::Meters);
        let c = GeometryConverter::new(&scale, &table);
        let solid = make_box_with_material(Point3::origin(), Point3::new(1.0, 1.0, 1.0), Some(id)).unwrap();
        let out = c.build_meshes(&[MeshFragment::Solid(&solid)]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].vertex_count(), 24);
        assert_eq!(out[0].faces.len(), 48);
    }

    #[test]
    fn test_mesh_to_host_splits_faces() {
        let scale = UnitScale::identity(Units::Meters);
        let c = GeometryConverter::without_materials(&scale);
        let mut mesh = Mesh::new(Units::Meters);
        mesh.vertices = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.5, //
            0.0, 1.0, 0.0, //
            2.0, 0.0, 0.0, //
            3.0, 0.0, 0.0, //
            3.5, 1.0, 0.0, //
            2.5, 2.0, 0.0, //
            1.5, 1.0, 0.0, //
        ];
        // Warped quad, then a legacy triangle marker, then a pentagon
        mesh.faces = vec![4, 0, 1, 2, 3, 0, 0, 1, 3, 5, 4, 5, 6, 7, 8];
        let host = c.mesh_to_host(&mesh).unwrap();
        assert_eq!(host.vertex_count(), 9);
        assert_eq!(host.triangles[0], [0, 1, 3]);
        assert_eq!(host.triangles[1], [1, 2, 3]);
        assert_eq!(host.triangles[2], [0, 1, 3]);
        assert_eq!(host.triangles[3], [4, 5, 6]);
        assert_eq!(host.triangle_count(), 2 + 1 + 3);
    }
}
