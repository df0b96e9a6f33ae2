// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Triangles pass through, convex polygons are fanned, anything else is
//! projected onto its best-fit plane and ear-clipped with earcutr.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i8;
    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross.abs() > 1e-10 {
            let current = if cross > 0.0 { 1 } else { -1 };
            if sign == 0 {
                sign = current;
            } else if sign != current {
                return false;
            }
        }
    }
    true
}

/// Fan triangles `(0, i, i + 1)` over `n` vertices.
#[inline]
fn fan_triangulate(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

/// Triangulate a simple planar polygon given in 2D.
/// Returns triangles as indices into `points`.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::degenerate(format!("polygon has {n} vertices, need at least 3")));
    }
    if n == 3 {
        return Ok(vec![[0, 1, 2]]);
    }
    if is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut flat = Vec::with_capacity(n * 2);
    for p in points {
        flat.push(p.x);
        flat.push(p.y);
    }
    let indices = earcutr::earcut(&flat, &[], 2).map_err(|e| Error::degenerate(format!("ear clipping failed: {e:?}")))?;
    if indices.is_empty() {
        return Err(Error::degenerate("polygon has no area"));
    }
    Ok(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
}

/// Triangulate a polygon in 3D by projecting it onto its best-fit plane.
/// The triangles keep the polygon's winding.
pub fn triangulate_polygon_3d(points: &[Point3<f64>]) -> Result<Vec<[usize; 3]>> {
    if points.len() == 3 {
        return Ok(vec![[0, 1, 2]]);
    }
    let normal = calculate_polygon_normal(points);
    let projected = project_to_2d(points, &normal);
    triangulate_polygon(&projected).map(|tris| {
        tris.into_iter()
            .map(|[a, b, c]| {
                // earcutr does not promise the input winding
                let (pa, pb, pc) = (projected[a], projected[b], projected[c]);
                let cross = (pb - pa).perp(&(pc - pa));
                if cross < 0.0 {
                    [a, c, b]
                } else {
                    [a, b, c]
                }
            })
            .collect()
    })
}

/// Project 3D points onto the plane through the first point with `normal`.
/// The 2D frame is right-handed around `normal`, so a polygon wound
/// counter-clockwise around `normal` stays counter-clockwise.
pub fn project_to_2d(points_3d: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(&origin) = points_3d.first() else {
        return Vec::new();
    };

    // Find the axis least parallel to the normal for a stable cross product
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    let reference = if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u_axis = reference.cross(normal).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Calculate the normal of a polygon with Newell's method.
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    let len = normal.norm();
    if len > 1e-10 {
        normal / len
    } else {
        Vector3::z()
    }
}

/// `true` when the fourth corner of a quad lies in the plane of the first
/// three.
pub fn is_planar_quad(quad: &[Point3<f64>; 4], tolerance: f64) -> bool {
    let normal = (quad[1] - quad[0]).cross(&(quad[2] - quad[0]));
    let len = normal.norm();
    if len < 1e-12 {
        return true;
    }
    ((quad[3] - quad[0]).dot(&normal) / len).abs() <= tolerance
}
