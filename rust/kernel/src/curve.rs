// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Native curves.
//!
//! Every curve has a natural parameterization and optional bounds. Lines are
//! always bound. Arcs and ellipses are periodic over `[0, 2π)` and are full
//! (closed) when unbound. NURBS and Hermite splines are parameterized by
//! their knots and node parameters.
//!
//! Parameters passed to [`Curve::evaluate`] are raw parameters;
//! [`Curve::evaluate_normalized`] maps `[0, 1]` onto the bounded range.

use std::f64::consts::TAU;

use nalgebra::{Isometry3, Point3, Vector3};

use crate::error::{Error, Result};
use crate::nurbs;
use crate::{SHORT_CURVE_TOLERANCE, VERTEX_TOLERANCE};

/// Slack allowed when checking bounds against a domain.
const PARAMETER_SLACK: f64 = 1e-9;

/// Samples used for lengths without a closed form.
const LENGTH_SAMPLES: usize = 128;

/// Discriminant of a native curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Line,
    Arc,
    Ellipse,
    NurbSpline,
    HermiteSpline,
    CylindricalHelix,
}

impl CurveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Line => "Line",
            CurveKind::Arc => "Arc",
            CurveKind::Ellipse => "Ellipse",
            CurveKind::NurbSpline => "NurbSpline",
            CurveKind::HermiteSpline => "HermiteSpline",
            CurveKind::CylindricalHelix => "CylindricalHelix",
        }
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes `x` and makes `y` orthonormal to it.
pub(crate) fn orthonormal_frame(x: &Vector3<f64>, y: &Vector3<f64>) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let x_len = x.norm();
    if x_len < 1e-12 {
        return Err(Error::InvalidCurve("frame x direction has zero length".into()));
    }
    let x = x / x_len;
    let y = y - x * x.dot(y);
    let y_len = y.norm();
    if y_len < 1e-12 {
        return Err(Error::InvalidCurve("frame directions are parallel".into()));
    }
    Ok((x, y / y_len))
}

/// Signed angle from `from` to `to` around `normal`, in `[0, 2π)`.
pub fn angle_on_plane_to(from: &Vector3<f64>, to: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
    let angle = from.cross(to).dot(normal).atan2(from.dot(to));
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

fn check_bounds(start: f64, end: f64) -> Result<()> {
    if !(start.is_finite() && end.is_finite()) || end - start <= PARAMETER_SLACK {
        return Err(Error::InvalidBounds(start, end));
    }
    Ok(())
}

fn check_periodic_bounds(start: f64, end: f64) -> Result<()> {
    check_bounds(start, end)?;
    if end - start > TAU + PARAMETER_SLACK {
        return Err(Error::InvalidBounds(start, end));
    }
    Ok(())
}

fn check_domain_bounds(start: f64, end: f64, domain: (f64, f64)) -> Result<()> {
    check_bounds(start, end)?;
    if start < domain.0 - PARAMETER_SLACK || end > domain.1 + PARAMETER_SLACK {
        return Err(Error::InvalidBounds(start, end));
    }
    Ok(())
}

// --- Line ---

/// A straight line, parameterized by arc length from `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub(crate) origin: Point3<f64>,
    pub(crate) direction: Vector3<f64>,
    pub(crate) bounds: (f64, f64),
}

impl Line {
    /// Creates a bound line from `start` to `end`.
    pub fn create_bound(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        let delta = end - start;
        let length = delta.norm();
        if length < VERTEX_TOLERANCE {
            return Err(Error::CurveTooShort(length));
        }
        Ok(Self {
            origin: start,
            direction: delta / length,
            bounds: (0.0, length),
        })
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    fn evaluate(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

// --- Arc ---

/// A circular arc, or a full circle when unbound.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub(crate) center: Point3<f64>,
    pub(crate) x_dir: Vector3<f64>,
    pub(crate) y_dir: Vector3<f64>,
    pub(crate) radius: f64,
    pub(crate) bounds: Option<(f64, f64)>,
}

impl Arc {
    /// Creates an arc on the frame `(center, x_dir, y_dir)` from angle
    /// `start` to `end`.
    pub fn new(
        center: Point3<f64>,
        x_dir: Vector3<f64>,
        y_dir: Vector3<f64>,
        radius: f64,
        start: f64,
        end: f64,
    ) -> Result<Self> {
        let mut arc = Self::circle(center, x_dir, y_dir, radius)?;
        check_periodic_bounds(start, end)?;
        arc.bounds = Some((start, end));
        Ok(arc)
    }

    /// Creates an unbound (full) circle.
    pub fn circle(center: Point3<f64>, x_dir: Vector3<f64>, y_dir: Vector3<f64>, radius: f64) -> Result<Self> {
        if !(radius > VERTEX_TOLERANCE) {
            return Err(Error::InvalidCurve(format!("arc radius {radius} is not positive")));
        }
        let (x_dir, y_dir) = orthonormal_frame(&x_dir, &y_dir)?;
        Ok(Self {
            center,
            x_dir,
            y_dir,
            radius,
            bounds: None,
        })
    }

    /// Creates the arc that starts at `start`, passes through `through` and
    /// ends at `end`.
    pub fn by_three_points(start: Point3<f64>, end: Point3<f64>, through: Point3<f64>) -> Result<Self> {
        let ab = through - start;
        let ac = end - start;
        let n = ab.cross(&ac);
        let n_sq = n.norm_squared();
        if n_sq < 1e-18 {
            return Err(Error::InvalidCurve("arc points are collinear".into()));
        }
        let center = start + (n.cross(&ab) * ac.norm_squared() + ac.cross(&n) * ab.norm_squared()) / (2.0 * n_sq);
        let to_start = start - center;
        let radius = to_start.norm();
        let normal = n / n_sq.sqrt();
        let x_dir = to_start / radius;
        let y_dir = normal.cross(&x_dir);
        let sweep = angle_on_plane_to(&x_dir, &(end - center), &normal);
        Self::new(center, x_dir, y_dir, radius, 0.0, sweep)
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
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

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn evaluate(&self, angle: f64) -> Point3<f64> {
        self.center + (self.x_dir * angle.cos() + self.y_dir * angle.sin()) * self.radius
    }
}

// --- Ellipse ---

/// An ellipse, full when unbound.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub(crate) center: Point3<f64>,
    pub(crate) x_dir: Vector3<f64>,
    pub(crate) y_dir: Vector3<f64>,
    pub(crate) radius_x: f64,
    pub(crate) radius_y: f64,
    pub(crate) bounds: Option<(f64, f64)>,
}

impl Ellipse {
    /// Creates a full ellipse.
    pub fn new(
        center: Point3<f64>,
        x_dir: Vector3<f64>,
        y_dir: Vector3<f64>,
        radius_x: f64,
        radius_y: f64,
    ) -> Result<Self> {
        if !(radius_x > VERTEX_TOLERANCE && radius_y > VERTEX_TOLERANCE) {
            return Err(Error::InvalidCurve(format!(
                "ellipse radii ({radius_x}, {radius_y}) must be positive"
            )));
        }
        let (x_dir, y_dir) = orthonormal_frame(&x_dir, &y_dir)?;
        Ok(Self {
            center,
            x_dir,
            y_dir,
            radius_x,
            radius_y,
            bounds: None,
        })
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
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

    pub fn radius_x(&self) -> f64 {
        self.radius_x
    }

    pub fn radius_y(&self) -> f64 {
        self.radius_y
    }

    fn evaluate(&self, angle: f64) -> Point3<f64> {
        self.center + self.x_dir * (self.radius_x * angle.cos()) + self.y_dir * (self.radius_y * angle.sin())
    }
}

// --- NurbSpline ---

/// A (possibly rational) B-spline curve with a clamped knot vector.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbSpline {
    pub(crate) degree: usize,
    pub(crate) control_points: Vec<Point3<f64>>,
    pub(crate) weights: Vec<f64>,
    pub(crate) knots: Vec<f64>,
    pub(crate) bounds: Option<(f64, f64)>,
}

impl NurbSpline {
    /// Creates a spline from explicit knots. An empty `weights` list means a
    /// non-rational spline.
    pub fn create(degree: usize, knots: Vec<f64>, control_points: Vec<Point3<f64>>, weights: Vec<f64>) -> Result<Self> {
        let count = control_points.len();
        nurbs::validate_knots(count, degree, &knots)?;
        let weights = if weights.is_empty() { vec![1.0; count] } else { weights };
        nurbs::validate_weights(count, &weights)?;
        Ok(Self {
            degree,
            control_points,
            weights,
            knots,
            bounds: None,
        })
    }

    /// Creates a spline of degree `min(3, n - 1)` with clamped uniform knots.
    pub fn with_uniform_knots(control_points: Vec<Point3<f64>>, weights: Vec<f64>) -> Result<Self> {
        Self::uniform(3, control_points, weights)
    }

    /// Creates a spline with clamped uniform knots. `degree` is lowered to
    /// `n - 1` when there are too few control points for it.
    pub fn uniform(degree: usize, control_points: Vec<Point3<f64>>, weights: Vec<f64>) -> Result<Self> {
        if control_points.len() < 2 {
            return Err(Error::InvalidNurbs("at least two control points are required".into()));
        }
        if degree == 0 {
            return Err(Error::InvalidNurbs("degree must be at least 1".into()));
        }
        let degree = degree.min(control_points.len() - 1);
        let knots = nurbs::clamped_uniform_knots(control_points.len(), degree);
        Self::create(degree, knots, control_points, weights)
    }

    /// A degree-1 spline through `points`, parameterized on `[0, 1]`.
    pub fn polyline(points: Vec<Point3<f64>>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::InvalidNurbs("at least two control points are required".into()));
        }
        let knots = nurbs::clamped_uniform_knots(points.len(), 1);
        Self::create(1, knots, points, Vec::new())
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// `true` when any weight differs from 1.
    pub fn is_rational(&self) -> bool {
        self.weights.iter().any(|w| (w - 1.0).abs() > 1e-12)
    }

    /// Parameter range spanned by the knot vector.
    pub fn knot_domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.control_points.len()])
    }

    fn evaluate(&self, u: f64) -> Point3<f64> {
        let (lo, hi) = self.knot_domain();
        let u = u.clamp(lo, hi);
        let count = self.control_points.len();
        let span = nurbs::find_span(count, self.degree, u, &self.knots);
        let basis = nurbs::basis_functions(span, u, self.degree, &self.knots);
        let mut sum = Vector3::zeros();
        let mut weight = 0.0;
        for (i, n) in basis.iter().enumerate() {
            let idx = span - self.degree + i;
            let w = n * self.weights[idx];
            sum += self.control_points[idx].coords * w;
            weight += w;
        }
        Point3::from(sum / weight)
    }

    fn reversed(&self) -> Self {
        let a = self.knots[0];
        let b = self.knots[self.knots.len() - 1];
        Self {
            degree: self.degree,
            control_points: self.control_points.iter().rev().copied().collect(),
            weights: self.weights.iter().rev().copied().collect(),
            knots: self.knots.iter().rev().map(|k| a + b - k).collect(),
            bounds: self.bounds.map(|(s, e)| (a + b - e, a + b - s)),
        }
    }
}

// --- HermiteSpline ---

/// A cubic Hermite spline through `control_points` with the given tangents.
#[derive(Debug, Clone, PartialEq)]
pub struct HermiteSpline {
    pub(crate) control_points: Vec<Point3<f64>>,
    pub(crate) tangents: Vec<Vector3<f64>>,
    pub(crate) parameters: Vec<f64>,
    pub(crate) bounds: Option<(f64, f64)>,
}

impl HermiteSpline {
    /// Creates a spline. Without explicit parameters the nodes sit at
    /// `0, 1, 2, ...`.
    pub fn create(
        control_points: Vec<Point3<f64>>,
        tangents: Vec<Vector3<f64>>,
        parameters: Option<Vec<f64>>,
    ) -> Result<Self> {
        let count = control_points.len();
        if count < 2 {
            return Err(Error::InvalidCurve("hermite spline needs at least two points".into()));
        }
        if tangents.len() != count {
            return Err(Error::InvalidCurve(format!(
                "hermite spline has {count} points but {} tangents",
                tangents.len()
            )));
        }
        let parameters = parameters.unwrap_or_else(|| (0..count).map(|i| i as f64).collect());
        if parameters.len() != count || parameters.windows(2).any(|w| w[1] - w[0] <= PARAMETER_SLACK) {
            return Err(Error::InvalidCurve("hermite parameters must be strictly increasing".into()));
        }
        Ok(Self {
            control_points,
            tangents,
            parameters,
            bounds: None,
        })
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control_points
    }

    pub fn tangents(&self) -> &[Vector3<f64>] {
        &self.tangents
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    fn natural_domain(&self) -> (f64, f64) {
        (self.parameters[0], self.parameters[self.parameters.len() - 1])
    }

    fn evaluate(&self, u: f64) -> Point3<f64> {
        let (lo, hi) = self.natural_domain();
        let u = u.clamp(lo, hi);
        let i = self
            .parameters
            .windows(2)
            .position(|w| u <= w[1])
            .unwrap_or(self.parameters.len() - 2);
        let h = self.parameters[i + 1] - self.parameters[i];
        let s = (u - self.parameters[i]) / h;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        let p = self.control_points[i].coords * h00
            + self.tangents[i] * (h10 * h)
            + self.control_points[i + 1].coords * h01
            + self.tangents[i + 1] * (h11 * h);
        Point3::from(p)
    }

    /// Exact cubic B-spline form: one Bezier segment per node interval,
    /// joined with triple interior knots.
    pub fn to_nurb_spline(&self) -> Result<NurbSpline> {
        let count = self.control_points.len();
        let mut points = Vec::with_capacity(3 * (count - 1) + 1);
        let mut knots = Vec::with_capacity(3 * count + 2);
        knots.push(self.parameters[0]);
        for i in 0..count - 1 {
            let h = self.parameters[i + 1] - self.parameters[i];
            let p0 = self.control_points[i];
            let p1 = self.control_points[i + 1];
            points.push(p0);
            points.push(p0 + self.tangents[i] * (h / 3.0));
            points.push(p1 - self.tangents[i + 1] * (h / 3.0));
            knots.extend(std::iter::repeat(self.parameters[i]).take(3));
        }
        points.push(self.control_points[count - 1]);
        knots.extend(std::iter::repeat(self.parameters[count - 1]).take(4));
        let mut spline = NurbSpline::create(3, knots, points, Vec::new())?;
        spline.bounds = self.bounds;
        Ok(spline)
    }

    fn reversed(&self) -> Self {
        let (lo, hi) = self.natural_domain();
        Self {
            control_points: self.control_points.iter().rev().copied().collect(),
            tangents: self.tangents.iter().rev().map(|t| -t).collect(),
            parameters: self.parameters.iter().rev().map(|u| lo + hi - u).collect(),
            bounds: self.bounds.map(|(s, e)| (lo + hi - e, lo + hi - s)),
        }
    }
}

// --- CylindricalHelix ---

/// A helix on a cylinder, parameterized by rotation angle.
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalHelix {
    pub(crate) base: Point3<f64>,
    pub(crate) axis: Vector3<f64>,
    pub(crate) x_dir: Vector3<f64>,
    pub(crate) radius: f64,
    pub(crate) pitch: f64,
    pub(crate) height: f64,
}

impl CylindricalHelix {
    pub fn new(
        base: Point3<f64>,
        axis: Vector3<f64>,
        x_dir: Vector3<f64>,
        radius: f64,
        pitch: f64,
        height: f64,
    ) -> Result<Self> {
        if !(radius > VERTEX_TOLERANCE && pitch.abs() > VERTEX_TOLERANCE && height > VERTEX_TOLERANCE) {
            return Err(Error::InvalidCurve("helix radius, pitch and height must be positive".into()));
        }
        let (x_dir, axis) = orthonormal_frame(&x_dir, &axis)?;
        Ok(Self {
            base,
            axis,
            x_dir,
            radius,
            pitch,
            height,
        })
    }

    fn end_angle(&self) -> f64 {
        TAU * self.height / self.pitch.abs()
    }

    fn evaluate(&self, angle: f64) -> Point3<f64> {
        let y_dir = self.axis.cross(&self.x_dir) * self.pitch.signum();
        self.base
            + (self.x_dir * angle.cos() + y_dir * angle.sin()) * self.radius
            + self.axis * (self.pitch.abs() * angle / TAU)
    }
}

// --- Curve ---

/// A native curve of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Line(Line),
    Arc(Arc),
    Ellipse(Ellipse),
    NurbSpline(NurbSpline),
    HermiteSpline(HermiteSpline),
    CylindricalHelix(CylindricalHelix),
}

impl Curve {
    /// Shorthand for a bound line.
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        Line::create_bound(start, end).map(Curve::Line)
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line(_) => CurveKind::Line,
            Curve::Arc(_) => CurveKind::Arc,
            Curve::Ellipse(_) => CurveKind::Ellipse,
            Curve::NurbSpline(_) => CurveKind::NurbSpline,
            Curve::HermiteSpline(_) => CurveKind::HermiteSpline,
            Curve::CylindricalHelix(_) => CurveKind::CylindricalHelix,
        }
    }

    pub fn is_bound(&self) -> bool {
        match self {
            Curve::Line(_) | Curve::CylindricalHelix(_) => true,
            Curve::Arc(c) => c.bounds.is_some(),
            Curve::Ellipse(c) => c.bounds.is_some(),
            Curve::NurbSpline(c) => c.bounds.is_some(),
            Curve::HermiteSpline(c) => c.bounds.is_some(),
        }
    }

    /// Period of periodic curves.
    pub fn period(&self) -> Option<f64> {
        match self {
            Curve::Arc(_) | Curve::Ellipse(_) => Some(TAU),
            _ => None,
        }
    }

    /// The range the curve currently spans: its bounds, or its natural
    /// domain when unbound.
    pub fn parameter_range(&self) -> (f64, f64) {
        match self {
            Curve::Line(c) => c.bounds,
            Curve::Arc(c) => c.bounds.unwrap_or((0.0, TAU)),
            Curve::Ellipse(c) => c.bounds.unwrap_or((0.0, TAU)),
            Curve::NurbSpline(c) => c.bounds.unwrap_or_else(|| c.knot_domain()),
            Curve::HermiteSpline(c) => c.bounds.unwrap_or_else(|| c.natural_domain()),
            Curve::CylindricalHelix(c) => (0.0, c.end_angle()),
        }
    }

    /// Start (`0`) or end (`1`) parameter.
    pub fn end_parameter(&self, index: usize) -> f64 {
        let (start, end) = self.parameter_range();
        if index == 0 {
            start
        } else {
            end
        }
    }

    /// Start (`0`) or end (`1`) point.
    pub fn end_point(&self, index: usize) -> Point3<f64> {
        self.evaluate(self.end_parameter(index))
    }

    /// Point at a raw parameter.
    pub fn evaluate(&self, parameter: f64) -> Point3<f64> {
        match self {
            Curve::Line(c) => c.evaluate(parameter),
            Curve::Arc(c) => c.evaluate(parameter),
            Curve::Ellipse(c) => c.evaluate(parameter),
            Curve::NurbSpline(c) => c.evaluate(parameter),
            Curve::HermiteSpline(c) => c.evaluate(parameter),
            Curve::CylindricalHelix(c) => c.evaluate(parameter),
        }
    }

    /// Point at `t` in `[0, 1]` across [`Curve::parameter_range`].
    pub fn evaluate_normalized(&self, t: f64) -> Point3<f64> {
        let (start, end) = self.parameter_range();
        self.evaluate(start + (end - start) * t)
    }

    /// Restricts the curve to `[start, end]`.
    pub fn make_bound(&mut self, start: f64, end: f64) -> Result<()> {
        match self {
            Curve::Line(c) => {
                check_bounds(start, end)?;
                c.bounds = (start, end);
            }
            Curve::Arc(c) => {
                check_periodic_bounds(start, end)?;
                c.bounds = Some((start, end));
            }
            Curve::Ellipse(c) => {
                check_periodic_bounds(start, end)?;
                c.bounds = Some((start, end));
            }
            Curve::NurbSpline(c) => {
                check_domain_bounds(start, end, c.knot_domain())?;
                c.bounds = Some((start, end));
            }
            Curve::HermiteSpline(c) => {
                check_domain_bounds(start, end, c.natural_domain())?;
                c.bounds = Some((start, end));
            }
            Curve::CylindricalHelix(_) => {
                return Err(Error::InvalidCurve("a helix cannot be re-bound".into()));
            }
        }
        Ok(())
    }

    /// Drops the bounds of a curve that has a natural domain.
    pub fn make_unbound(&mut self) -> Result<()> {
        match self {
            Curve::Arc(c) => c.bounds = None,
            Curve::Ellipse(c) => c.bounds = None,
            Curve::NurbSpline(c) => c.bounds = None,
            Curve::HermiteSpline(c) => c.bounds = None,
            Curve::Line(_) | Curve::CylindricalHelix(_) => {
                return Err(Error::InvalidCurve(format!("a {} cannot be unbound", self.kind())));
            }
        }
        Ok(())
    }

    /// The same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Result<Curve> {
        Ok(match self {
            Curve::Line(c) => Curve::Line(Line {
                origin: c.origin,
                direction: -c.direction,
                bounds: (-c.bounds.1, -c.bounds.0),
            }),
            Curve::Arc(c) => Curve::Arc(Arc {
                y_dir: -c.y_dir,
                bounds: c.bounds.map(|(s, e)| (-e, -s)),
                ..c.clone()
            }),
            Curve::Ellipse(c) => Curve::Ellipse(Ellipse {
                y_dir: -c.y_dir,
                bounds: c.bounds.map(|(s, e)| (-e, -s)),
                ..c.clone()
            }),
            Curve::NurbSpline(c) => Curve::NurbSpline(c.reversed()),
            Curve::HermiteSpline(c) => Curve::HermiteSpline(c.reversed()),
            Curve::CylindricalHelix(_) => {
                return Err(Error::InvalidCurve("a helix cannot be reversed".into()));
            }
        })
    }

    /// Arc length of the bounded range.
    pub fn length(&self) -> f64 {
        let (start, end) = self.parameter_range();
        match self {
            Curve::Line(_) => end - start,
            Curve::Arc(c) => c.radius * (end - start),
            Curve::CylindricalHelix(c) => {
                let turn = (TAU * c.radius).hypot(c.pitch.abs());
                turn * c.height / c.pitch.abs()
            }
            _ => self
                .tessellate(LENGTH_SAMPLES)
                .windows(2)
                .map(|w| (w[1] - w[0]).norm())
                .sum(),
        }
    }

    /// `true` when the endpoints coincide within `tolerance`.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        (self.end_point(1) - self.end_point(0)).norm() < tolerance
    }

    /// `true` when the bounded curve is shorter than the kernel's
    /// short-curve tolerance.
    pub fn is_short(&self) -> bool {
        self.length() < SHORT_CURVE_TOLERANCE
    }

    /// Samples the bounded range. Lines yield their two endpoints; other
    /// curves `segments + 1` evenly spaced parameters.
    pub fn tessellate(&self, segments: usize) -> Vec<Point3<f64>> {
        if let Curve::Line(_) = self {
            return vec![self.end_point(0), self.end_point(1)];
        }
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.evaluate_normalized(i as f64 / segments as f64))
            .collect()
    }

    /// The curve moved by a rigid transform.
    pub fn transformed(&self, iso: &Isometry3<f64>) -> Curve {
        match self {
            Curve::Line(c) => Curve::Line(Line {
                origin: iso * c.origin,
                direction: iso * c.direction,
                bounds: c.bounds,
            }),
            Curve::Arc(c) => Curve::Arc(Arc {
                center: iso * c.center,
                x_dir: iso * c.x_dir,
                y_dir: iso * c.y_dir,
                ..c.clone()
            }),
            Curve::Ellipse(c) => Curve::Ellipse(Ellipse {
                center: iso * c.center,
                x_dir: iso * c.x_dir,
                y_dir: iso * c.y_dir,
                ..c.clone()
            }),
            Curve::NurbSpline(c) => Curve::NurbSpline(NurbSpline {
                control_points: c.control_points.iter().map(|p| iso * p).collect(),
                ..c.clone()
            }),
            Curve::HermiteSpline(c) => Curve::HermiteSpline(HermiteSpline {
                control_points: c.control_points.iter().map(|p| iso * p).collect(),
                tangents: c.tangents.iter().map(|t| iso * t).collect(),
                ..c.clone()
            }),
            Curve::CylindricalHelix(c) => Curve::CylindricalHelix(CylindricalHelix {
                base: iso * c.base,
                axis: iso * c.axis,
                x_dir: iso * c.x_dir,
                ..c.clone()
            }),
        }
    }
}
