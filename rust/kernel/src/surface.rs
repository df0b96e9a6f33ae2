// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face surfaces and their parameter spaces.

use std::f64::consts::TAU;

use nalgebra::{Isometry3, Matrix3, Point2, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::curve::{orthonormal_frame, Curve, NurbSpline};
use crate::error::{Error, Result};
use crate::nurbs;

/// Seed grid resolution for point inversion on NURBS surfaces.
const INVERSION_SEEDS: usize = 8;
const INVERSION_ITERATIONS: usize = 24;

/// Samples used when a curve is mapped into a non-planar parameter space.
const UV_CURVE_SAMPLES: usize = 16;

/// Axis-aligned bounds in a face's parameter space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxUV {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingBoxUV {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = BoundingBoxUV { min: first, max: first };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// An oriented plane. Parameters are distances along `x_dir` and `y_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub(crate) origin: Point3<f64>,
    pub(crate) x_dir: Vector3<f64>,
    pub(crate) y_dir: Vector3<f64>,
}

impl Plane {
    pub fn new(origin: Point3<f64>, x_dir: Vector3<f64>, y_dir: Vector3<f64>) -> Result<Self> {
        let (x_dir, y_dir) =
            orthonormal_frame(&x_dir, &y_dir).map_err(|e| Error::InvalidSurface(e.to_string()))?;
        Ok(Self { origin, x_dir, y_dir })
    }

    /// Plane through `origin` with the given normal and in-plane x axis.
    pub fn from_normal(origin: Point3<f64>, normal: Vector3<f64>, x_dir: Vector3<f64>) -> Result<Self> {
        Self::new(origin, x_dir, normal.cross(&x_dir))
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn x_direction(&self) -> Vector3<f64> {
        self.x_dir
    }

    pub fn y_direction(&self) -> Vector3<f64> {
        self.y_dir
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.x_dir.cross(&self.y_dir)
    }

    /// Rigid transform taking world coordinates into the plane frame.
    pub fn world_to_local(&self) -> Isometry3<f64> {
        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[self.x_dir, self.y_dir, self.normal()]));
        Isometry3::from_parts(
            Translation3::from(self.origin.coords),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
        .inverse()
    }

    fn evaluate(&self, uv: Point2<f64>) -> Point3<f64> {
        self.origin + self.x_dir * uv.x + self.y_dir * uv.y
    }

    fn parameter_at(&self, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.origin;
        Point2::new(d.dot(&self.x_dir), d.dot(&self.y_dir))
    }
}

/// A right circular cylinder. Parameters are `(angle, height)`, with the
/// angle in `[0, 2π)` measured from `x_dir` around `axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    pub(crate) origin: Point3<f64>,
    pub(crate) axis: Vector3<f64>,
    pub(crate) x_dir: Vector3<f64>,
    pub(crate) radius: f64,
}

impl Cylinder {
    pub fn new(origin: Point3<f64>, axis: Vector3<f64>, x_dir: Vector3<f64>, radius: f64) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(Error::InvalidSurface(format!("cylinder radius {radius} is not positive")));
        }
        let (x_dir, axis) = orthonormal_frame(&x_dir, &axis).map_err(|e| Error::InvalidSurface(e.to_string()))?;
        Ok(Self {
            origin,
            axis,
            x_dir,
            radius,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn axis(&self) -> Vector3<f64> {
        self.axis
    }

    fn y_dir(&self) -> Vector3<f64> {
        self.axis.cross(&self.x_dir)
    }

    fn evaluate(&self, uv: Point2<f64>) -> Point3<f64> {
        self.origin + (self.x_dir * uv.x.cos() + self.y_dir() * uv.x.sin()) * self.radius + self.axis * uv.y
    }

    fn parameter_at(&self, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.origin;
        let mut angle = d.dot(&self.y_dir()).atan2(d.dot(&self.x_dir));
        if angle < 0.0 {
            angle += TAU;
        }
        if angle > TAU - 1e-9 {
            angle = 0.0;
        }
        Point2::new(angle, d.dot(&self.axis))
    }
}

/// A tensor-product NURBS surface with clamped knot vectors.
///
/// Control points are stored u-major: the point at `(i, j)` lives at
/// `i * count_v + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsSurfaceData {
    pub(crate) degree_u: usize,
    pub(crate) degree_v: usize,
    pub(crate) knots_u: Vec<f64>,
    pub(crate) knots_v: Vec<f64>,
    pub(crate) count_u: usize,
    pub(crate) count_v: usize,
    pub(crate) control_points: Vec<Point3<f64>>,
    pub(crate) weights: Vec<f64>,
}

impl NurbsSurfaceData {
    /// Validates and creates surface data. An empty `weights` list means a
    /// non-rational surface.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        count_u: usize,
        count_v: usize,
        control_points: Vec<Point3<f64>>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        if control_points.len() != count_u * count_v {
            return Err(Error::InvalidNurbs(format!(
                "expected {count_u}x{count_v} control points, got {}",
                control_points.len()
            )));
        }
        nurbs::validate_knots(count_u, degree_u, &knots_u)?;
        nurbs::validate_knots(count_v, degree_v, &knots_v)?;
        let weights = if weights.is_empty() {
            vec![1.0; control_points.len()]
        } else {
            weights
        };
        nurbs::validate_weights(control_points.len(), &weights)?;
        Ok(Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            count_u,
            count_v,
            control_points,
            weights,
        })
    }

    /// A degree-1 patch reproducing the affine map
    /// `(u, v) -> origin + u * x_dir + v * y_dir` over `bounds`.
    pub fn bilinear(plane: &Plane, bounds: &BoundingBoxUV) -> Result<Self> {
        let (u0, u1) = (bounds.min.x, bounds.max.x);
        let (v0, v1) = (bounds.min.y, bounds.max.y);
        let corner = |u: f64, v: f64| plane.evaluate(Point2::new(u, v));
        Self::create(
            1,
            1,
            vec![u0, u0, u1, u1],
            vec![v0, v0, v1, v1],
            2,
            2,
            vec![corner(u0, v0), corner(u0, v1), corner(u1, v0), corner(u1, v1)],
            Vec::new(),
        )
    }

    pub fn degree_u(&self) -> usize {
        self.degree_u
    }

    pub fn degree_v(&self) -> usize {
        self.degree_v
    }

    pub fn knots_u(&self) -> &[f64] {
        &self.knots_u
    }

    pub fn knots_v(&self) -> &[f64] {
        &self.knots_v
    }

    pub fn count_u(&self) -> usize {
        self.count_u
    }

    pub fn count_v(&self) -> usize {
        self.count_v
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn control_point(&self, u: usize, v: usize) -> Option<(Point3<f64>, f64)> {
        let idx = u * self.count_v + v;
        Some((*self.control_points.get(idx)?, *self.weights.get(idx)?))
    }

    pub fn is_rational(&self) -> bool {
        self.weights.iter().any(|w| (w - 1.0).abs() > 1e-12)
    }

    pub fn domain_u(&self) -> (f64, f64) {
        (self.knots_u[self.degree_u], self.knots_u[self.count_u])
    }

    pub fn domain_v(&self) -> (f64, f64) {
        (self.knots_v[self.degree_v], self.knots_v[self.count_v])
    }

    /// Point at `(u, v)`, clamped into the domain.
    pub fn evaluate(&self, u: f64, v: f64) -> Point3<f64> {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let u = u.clamp(u0, u1);
        let v = v.clamp(v0, v1);
        let span_u = nurbs::find_span(self.count_u, self.degree_u, u, &self.knots_u);
        let span_v = nurbs::find_span(self.count_v, self.degree_v, v, &self.knots_v);
        let basis_u = nurbs::basis_functions(span_u, u, self.degree_u, &self.knots_u);
        let basis_v = nurbs::basis_functions(span_v, v, self.degree_v, &self.knots_v);

        let mut sum = Vector3::zeros();
        let mut weight = 0.0;
        for (a, nu) in basis_u.iter().enumerate() {
            let i = span_u - self.degree_u + a;
            for (b, nv) in basis_v.iter().enumerate() {
                let j = span_v - self.degree_v + b;
                let idx = i * self.count_v + j;
                let w = nu * nv * self.weights[idx];
                sum += self.control_points[idx].coords * w;
                weight += w;
            }
        }
        Point3::from(sum / weight)
    }

    /// Parameters of the surface point closest to `p`: a seeded grid search
    /// refined with Gauss-Newton steps.
    pub fn parameter_at(&self, p: &Point3<f64>) -> Point2<f64> {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();

        let mut best = (u0, v0, f64::INFINITY);
        for i in 0..=INVERSION_SEEDS {
            for j in 0..=INVERSION_SEEDS {
                let u = u0 + (u1 - u0) * i as f64 / INVERSION_SEEDS as f64;
                let v = v0 + (v1 - v0) * j as f64 / INVERSION_SEEDS as f64;
                let d = (self.evaluate(u, v) - p).norm_squared();
                if d < best.2 {
                    best = (u, v, d);
                }
            }
        }

        let (mut u, mut v, _) = best;
        let hu = (u1 - u0) * 1e-6;
        let hv = (v1 - v0) * 1e-6;
        for _ in 0..INVERSION_ITERATIONS {
            let r = self.evaluate(u, v) - p;
            let (ua, ub) = ((u - hu).max(u0), (u + hu).min(u1));
            let (va, vb) = ((v - hv).max(v0), (v + hv).min(v1));
            let su = (self.evaluate(ub, v) - self.evaluate(ua, v)) / (ub - ua);
            let sv = (self.evaluate(u, vb) - self.evaluate(u, va)) / (vb - va);

            let a = su.dot(&su);
            let b = su.dot(&sv);
            let c = sv.dot(&sv);
            let det = a * c - b * b;
            if det.abs() < 1e-30 {
                break;
            }
            let gu = su.dot(&r);
            let gv = sv.dot(&r);
            let du = -(c * gu - b * gv) / det;
            let dv = -(a * gv - b * gu) / det;
            u = (u + du).clamp(u0, u1);
            v = (v + dv).clamp(v0, v1);
            if du.abs() + dv.abs() < 1e-13 {
                break;
            }
        }
        Point2::new(u, v)
    }
}

/// The surface underlying a face.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSurface {
    Plane(Plane),
    Cylinder(Cylinder),
    Nurbs(NurbsSurfaceData),
}

impl FaceSurface {
    pub fn type_name(&self) -> &'static str {
        match self {
            FaceSurface::Plane(_) => "Plane",
            FaceSurface::Cylinder(_) => "Cylinder",
            FaceSurface::Nurbs(_) => "Nurbs",
        }
    }

    pub fn evaluate(&self, uv: Point2<f64>) -> Point3<f64> {
        match self {
            FaceSurface::Plane(s) => s.evaluate(uv),
            FaceSurface::Cylinder(s) => s.evaluate(uv),
            FaceSurface::Nurbs(s) => s.evaluate(uv.x, uv.y),
        }
    }

    /// Parameters of the surface point closest to `p`.
    pub fn parameter_at(&self, p: &Point3<f64>) -> Point2<f64> {
        match self {
            FaceSurface::Plane(s) => s.parameter_at(p),
            FaceSurface::Cylinder(s) => s.parameter_at(p),
            FaceSurface::Nurbs(s) => s.parameter_at(p),
        }
    }

    /// Maps a 3D curve lying on the surface into parameter space, as a curve
    /// in the `z = 0` plane. Exact for planes; sampled elsewhere.
    pub fn curve_to_uv(&self, curve: &Curve) -> Result<Curve> {
        if let FaceSurface::Plane(plane) = self {
            return Ok(curve.transformed(&plane.world_to_local()));
        }
        // Lines are sampled too: their image in a curved parameter space is not straight.
        let samples: Vec<Point3<f64>> = (0..=UV_CURVE_SAMPLES)
            .map(|i| curve.evaluate_normalized(i as f64 / UV_CURVE_SAMPLES as f64))
            .collect();
        let uv = self.unwrap_samples(&samples);
        NurbSpline::polyline(uv.into_iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect()).map(Curve::NurbSpline)
    }

    /// Parameters for a run of consecutive points. Periodic angles are kept
    /// continuous along the run.
    pub fn unwrap_samples(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        let mut out: Vec<Point2<f64>> = Vec::with_capacity(points.len());
        for p in points {
            let mut uv = self.parameter_at(p);
            if let (FaceSurface::Cylinder(_), Some(prev)) = (self, out.last()) {
                while uv.x - prev.x > std::f64::consts::PI {
                    uv.x -= TAU;
                }
                while prev.x - uv.x > std::f64::consts::PI {
                    uv.x += TAU;
                }
            }
            out.push(uv);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tilted_plane() -> Plane {
        Plane::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap()
    }

    #[test]
    fn test_plane_round_trip() {
        let plane = FaceSurface::Plane(tilted_plane());
        let uv = Point2::new(0.7, -1.5);
        let p = plane.evaluate(uv);
        assert_relative_eq!(plane.parameter_at(&p), uv, epsilon = 1e-12);
    }

    #[test]
    fn test_world_to_local_flattens_in_plane_curves() {
        let plane = tilted_plane();
        let surface = FaceSurface::Plane(plane.clone());
        let a = plane.evaluate(Point2::new(0.0, 0.0));
        let b = plane.evaluate(Point2::new(2.0, 1.0));
        let uv = surface.curve_to_uv(&Curve::line(a, b).unwrap()).unwrap();
        assert_relative_eq!(uv.end_point(1), Point3::new(2.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_bilinear_patch_matches_plane() {
        let plane = tilted_plane();
        let bounds = BoundingBoxUV {
            min: Point2::new(-1.0, 0.0),
            max: Point2::new(3.0, 2.0),
        };
        let patch = NurbsSurfaceData::bilinear(&plane, &bounds).unwrap();
        assert_eq!(patch.domain_u(), (-1.0, 3.0));
        let p = patch.evaluate(0.5, 1.25);
        assert_relative_eq!(p, plane.evaluate(Point2::new(0.5, 1.25)), epsilon = 1e-12);
        assert_relative_eq!(patch.parameter_at(&p), Point2::new(0.5, 1.25), epsilon = 1e-8);
    }

    #[test]
    fn test_curved_patch_inversion() {
        // Biquadratic bump over the unit square
        let mut points = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                let z = if i == 1 && j == 1 { 1.0 } else { 0.0 };
                points.push(Point3::new(i as f64 / 2.0, j as f64 / 2.0, z));
            }
        }
        let knots = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let patch = NurbsSurfaceData::create(2, 2, knots.clone(), knots, 3, 3, points, vec![]).unwrap();
        let p = patch.evaluate(0.3, 0.65);
        assert_relative_eq!(patch.parameter_at(&p), Point2::new(0.3, 0.65), epsilon = 1e-7);
    }

    #[test]
    fn test_surface_grid_count_mismatch() {
        let knots = vec![0.0, 0.0, 1.0, 1.0];
        let result = NurbsSurfaceData::create(1, 1, knots.clone(), knots, 2, 2, vec![Point3::origin(); 3], vec![]);
        assert!(matches!(result, Err(Error::InvalidNurbs(_))));
    }

    #[test]
    fn test_cylinder_angles_stay_continuous() {
        let cylinder = FaceSurface::Cylinder(Cylinder::new(Point3::origin(), Vector3::z(), Vector3::x(), 1.0).unwrap());
        let points: Vec<Point3<f64>> = [-0.2f64, -0.1, 0.0, 0.1]
            .iter()
            .map(|a| Point3::new(a.cos(), a.sin(), 0.5))
            .collect();
        let uv = cylinder.unwrap_samples(&points);
        for pair in uv.windows(2) {
            assert_relative_eq!(pair[1].x - pair[0].x, 0.1, epsilon = 1e-9);
        }
    }
}
