// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive solids built through [`BRepBuilder`].

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::builder::{BRepBuilder, BRepType, BuilderOutcome, EdgeGeometry};
use crate::curve::{Arc, Curve};
use crate::error::{Error, Result};
use crate::keys::{BuilderEdgeId, MaterialId};
use crate::solid::Solid;
use crate::surface::{Cylinder, FaceSurface, Plane};

/// Corner quads of a box, counter-clockwise seen from outside. Corner `i`
/// takes `max` on axis `k` when bit `k` of `i` is set.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1], // bottom
    [4, 5, 7, 6], // top
    [0, 1, 5, 4], // front
    [2, 6, 7, 3], // back
    [0, 4, 6, 2], // left
    [1, 3, 7, 5], // right
];

fn finish(mut builder: BRepBuilder) -> Result<Solid> {
    match builder.finish() {
        BuilderOutcome::Success => builder.get_result(),
        BuilderOutcome::Failure => Err(builder.failure_reason().map_or(Error::NoResult, |e| {
            Error::DegenerateFace(e.to_string())
        })),
    }
}

/// An axis-aligned box between `min` and `max`.
pub fn make_box(min: Point3<f64>, max: Point3<f64>) -> Result<Solid> {
    make_box_with_material(min, max, None)
}

/// An axis-aligned box whose faces all carry `material`.
pub fn make_box_with_material(min: Point3<f64>, max: Point3<f64>, material: Option<MaterialId>) -> Result<Solid> {
    let corner = |i: usize| {
        Point3::new(
            if i & 1 != 0 { max.x } else { min.x },
            if i & 2 != 0 { max.y } else { min.y },
            if i & 4 != 0 { max.z } else { min.z },
        )
    };

    let mut builder = BRepBuilder::new(BRepType::Solid);
    // Edges run from the lower to the higher corner index.
    let mut edges: FxHashMap<(usize, usize), BuilderEdgeId> = FxHashMap::default();

    for quad in BOX_FACES {
        let p0 = corner(quad[0]);
        let x_dir = corner(quad[1]) - p0;
        let normal = x_dir.cross(&(corner(quad[3]) - p0));
        let plane = Plane::from_normal(p0, normal, x_dir)?;
        let face = builder.add_face(FaceSurface::Plane(plane), false)?;
        if let Some(material) = material {
            builder.set_face_material_id(face, material)?;
        }
        let lp = builder.add_loop(face)?;
        for i in 0..4 {
            let a = quad[i];
            let b = quad[(i + 1) % 4];
            let key = (a.min(b), a.max(b));
            let edge = match edges.get(&key) {
                Some(&edge) => edge,
                None => {
                    let curve = Curve::line(corner(key.0), corner(key.1))?;
                    let edge = builder.add_edge(EdgeGeometry::new(curve)?)?;
                    edges.insert(key, edge);
                    edge
                }
            };
            builder.add_co_edge(lp, edge, a > b)?;
        }
        builder.finish_loop(lp)?;
        builder.finish_face(face)?;
    }
    finish(builder)
}

/// A cylinder standing on `base` along +Z.
///
/// The side is two half-cylinder faces joined by two vertical seam lines,
/// and each circular rim is two half arcs.
pub fn make_cylinder(base: Point3<f64>, radius: f64, height: f64) -> Result<Solid> {
    let top = base + Vector3::z() * height;
    let (x, y, z) = (Vector3::x(), Vector3::y(), Vector3::z());
    let half_arc = |center: Point3<f64>, start: f64| -> Result<Curve> {
        Ok(Curve::Arc(Arc::new(center, x, y, radius, start, start + PI)?))
    };

    let mut builder = BRepBuilder::new(BRepType::Solid);
    let mut edge = |curve: Curve| -> Result<BuilderEdgeId> { builder.add_edge(EdgeGeometry::new(curve)?) };
    let bottom_0 = edge(half_arc(base, 0.0)?)?;
    let bottom_1 = edge(half_arc(base, PI)?)?;
    let top_0 = edge(half_arc(top, 0.0)?)?;
    let top_1 = edge(half_arc(top, PI)?)?;
    let seam_0 = edge(Curve::line(base + x * radius, top + x * radius)?)?;
    let seam_pi = edge(Curve::line(base - x * radius, top - x * radius)?)?;

    let faces = vec![
        (
            FaceSurface::Cylinder(Cylinder::new(base, z, x, radius)?),
            vec![(bottom_0, false), (seam_pi, false), (top_0, true), (seam_0, true)],
        ),
        (
            FaceSurface::Cylinder(Cylinder::new(base, z, -x, radius)?),
            vec![(bottom_1, false), (seam_0, false), (top_1, true), (seam_pi, true)],
        ),
        (FaceSurface::Plane(Plane::new(top, x, y)?), vec![(top_0, false), (top_1, false)]),
        (
            FaceSurface::Plane(Plane::from_normal(base, -z, x)?),
            vec![(bottom_1, true), (bottom_0, true)],
        ),
    ];

    for (surface, coedges) in faces {
        let face = builder.add_face(surface, false)?;
        let lp = builder.add_loop(face)?;
        for (edge, reversed) in coedges {
            builder.add_co_edge(lp, edge, reversed)?;
        }
        builder.finish_loop(lp)?;
        builder.finish_face(face)?;
    }
    finish(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_edges_pair_up() {
        let solid = make_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(solid.face_count(), 6);
        assert_eq!(solid.edge_count(), 12);
    }

    #[test]
    fn test_degenerate_box_rejected() {
        assert!(make_box(Point3::origin(), Point3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_cylinder_topology() {
        let solid = make_cylinder(Point3::origin(), 1.0, 2.0).unwrap();
        assert_eq!(solid.face_count(), 4);
        assert_eq!(solid.edge_count(), 6);
        let curved = solid
            .faces()
            .filter(|(_, f)| matches!(f.surface(), FaceSurface::Cylinder(_)))
            .count();
        assert_eq!(curved, 2);
    }

    #[test]
    fn test_box_material_on_every_face() {
        let solid = make_box_with_material(Point3::origin(), Point3::new(1.0, 1.0, 1.0), Some(MaterialId(7))).unwrap();
        assert!(solid.faces().all(|(_, f)| f.material() == Some(MaterialId(7))));
    }
}
