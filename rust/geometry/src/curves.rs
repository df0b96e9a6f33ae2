// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve codec.
//!
//! Export dispatches on the closed set of host curve kinds; anything the
//! schema cannot express fails instead of being skipped. Import may expand
//! one portable curve into several host curves (polylines and polycurves).

use std::f64::consts::TAU;

use georelay_kernel::{angle_on_plane_to, Arc, Curve, Ellipse, NurbSpline, Point3};
use georelay_schema as schema;
use georelay_schema::{Interval, Polycurve, Polyline, Units};
use tracing::{trace, warn};

use crate::{Error, GeometryConverter, Result};

impl GeometryConverter<'_> {
    /// Converts a host curve into model units.
    pub fn curve_to_portable(&self, curve: &Curve) -> Result<schema::Curve> {
        self.curve_out(curve, self.model_units())
    }

    /// Converts a host curve tagged with `units`. Unitless output keeps raw
    /// coordinates, which is how parameter-space curves are written.
    pub(crate) fn curve_out(&self, curve: &Curve, units: Units) -> Result<schema::Curve> {
        let (start, end) = curve.parameter_range();
        let domain = Interval::new(start, end);
        let length = self.length_out(curve.length(), units);
        Ok(match curve {
            Curve::Line(_) => schema::Curve::Line(schema::Line {
                start: self.point_out(&curve.end_point(0), units),
                end: self.point_out(&curve.end_point(1), units),
                domain,
                length,
                units,
            }),
            Curve::Arc(arc) if !curve.is_bound() => schema::Curve::Circle(schema::Circle {
                plane: self.plane_out(&arc.center(), &arc.x_direction(), &arc.y_direction(), units),
                radius: self.length_out(arc.radius(), units),
                domain,
                length,
                units,
            }),
            Curve::Arc(arc) => {
                let center = arc.center();
                let normal = arc.normal();
                let angle_to = |p: Point3<f64>| angle_on_plane_to(&arc.x_direction(), &(p - center), &normal);
                let start_point = curve.end_point(0);
                let end_point = curve.end_point(1);
                schema::Curve::Arc(schema::Arc {
                    plane: self.plane_out(&center, &arc.x_direction(), &arc.y_direction(), units),
                    radius: self.length_out(arc.radius(), units),
                    start_angle: angle_to(start_point),
                    end_angle: angle_to(end_point),
                    angle_radians: end - start,
                    start_point: self.point_out(&start_point, units),
                    mid_point: self.point_out(&curve.evaluate_normalized(0.5), units),
                    end_point: self.point_out(&end_point, units),
                    domain,
                    length,
                    units,
                })
            }
            Curve::Ellipse(ellipse) => schema::Curve::Ellipse(schema::Ellipse {
                plane: self.plane_out(&ellipse.center(), &ellipse.x_direction(), &ellipse.y_direction(), units),
                first_radius: self.length_out(ellipse.radius_x(), units),
                second_radius: self.length_out(ellipse.radius_y(), units),
                domain: Interval::new(0.0, TAU),
                trim_domain: curve.is_bound().then_some(domain),
                length,
                units,
            }),
            Curve::NurbSpline(spline) => schema::Curve::Nurbs(self.nurbs_out(spline, curve, units)),
            Curve::HermiteSpline(hermite) => {
                let spline = hermite
                    .to_nurb_spline()
                    .map_err(|e| Error::construction("hermite spline", e))?;
                let as_curve = Curve::NurbSpline(spline.clone());
                schema::Curve::Nurbs(self.nurbs_out(&spline, &as_curve, units))
            }
            Curve::CylindricalHelix(_) => {
                return Err(Error::unsupported(format!("{} curves have no portable form", curve.kind())));
            }
        })
    }

    fn nurbs_out(&self, spline: &NurbSpline, curve: &Curve, units: Units) -> schema::NurbsCurve {
        let (start, end) = curve.parameter_range();
        let display = curve.tessellate(self.settings.curve_display_segments);
        schema::NurbsCurve {
            points: self.flat_points_out(spline.control_points(), units),
            weights: spline.weights().to_vec(),
            knots: spline.knots().to_vec(),
            degree: spline.degree(),
            rational: spline.is_rational(),
            closed: curve.is_closed(self.settings.closed_curve_tolerance),
            domain: Interval::new(start, end),
            length: self.length_out(curve.length(), units),
            display_value: Some(self.polyline_out(&display, false, units)),
            units,
        }
    }

    /// Converts a portable curve into one or more host curves.
    pub fn curve_to_host(&self, curve: &schema::Curve) -> Result<Vec<Curve>> {
        trace!(kind = curve.type_name(), "importing curve");
        match curve {
            schema::Curve::Line(line) => {
                let host = Curve::line(self.point_in(&line.start), self.point_in(&line.end))
                    .map_err(|e| Error::construction("line", e))?;
                Ok(vec![host])
            }
            schema::Curve::Arc(arc) => self.arc_in(arc).map(|a| vec![Curve::Arc(a)]),
            schema::Curve::Circle(circle) => {
                let (origin, x_dir, y_dir) = self.plane_in(&circle.plane);
                let radius = self.length_in(circle.radius, circle.units);
                let host = Arc::circle(origin, x_dir, y_dir, radius).map_err(|e| Error::construction("circle", e))?;
                Ok(vec![Curve::Arc(host)])
            }
            schema::Curve::Ellipse(ellipse) => self.ellipse_in(ellipse).map(|c| vec![c]),
            schema::Curve::Nurbs(nurbs) => self.nurbs_in(nurbs).map(|c| vec![c]),
            schema::Curve::Polyline(polyline) => self.polyline_in(polyline),
            schema::Curve::Polycurve(polycurve) => {
                let mut out = Vec::with_capacity(polycurve.segments.len());
                for segment in &polycurve.segments {
                    out.extend(self.curve_to_host(segment)?);
                }
                Ok(out)
            }
        }
    }

    fn arc_in(&self, arc: &schema::Arc) -> Result<Arc> {
        let start = self.point_in(&arc.start_point);
        let end = self.point_in(&arc.end_point);
        let host = if (end - start).norm() < self.settings.closed_curve_tolerance {
            let (origin, x_dir, y_dir) = self.plane_in(&arc.plane);
            let radius = self.length_in(arc.radius, arc.units);
            let sweep = if arc.angle_radians > 0.0 { arc.angle_radians.min(TAU) } else { TAU };
            Arc::new(origin, x_dir, y_dir, radius, arc.start_angle, arc.start_angle + sweep)
        } else {
            Arc::by_three_points(start, end, self.point_in(&arc.mid_point))
        };
        host.map_err(|e| Error::construction("arc", e))
    }

    fn ellipse_in(&self, ellipse: &schema::Ellipse) -> Result<Curve> {
        let (origin, x_dir, y_dir) = self.plane_in(&ellipse.plane);
        let host = Ellipse::new(
            origin,
            x_dir,
            y_dir,
            self.length_in(ellipse.first_radius, ellipse.units),
            self.length_in(ellipse.second_radius, ellipse.units),
        )
        .map_err(|e| Error::construction("ellipse", e))?;
        let bounds = ellipse.trim_domain.unwrap_or(ellipse.domain);
        let mut curve = Curve::Ellipse(host);
        curve
            .make_bound(bounds.start, bounds.end)
            .map_err(|e| Error::construction("ellipse bounds", e))?;
        Ok(curve)
    }

    fn nurbs_in(&self, nurbs: &schema::NurbsCurve) -> Result<Curve> {
        if nurbs.points.is_empty() {
            return Err(Error::degenerate("nurbs curve has no control points"));
        }
        let points = self.flat_points_in(&nurbs.points, nurbs.units)?;
        let count = points.len();
        // Missing weights mean a non-rational curve; any other count mismatch
        // is left for the host to reject.
        let weights = if nurbs.weights.is_empty() {
            vec![1.0; count]
        } else {
            nurbs.weights.clone()
        };

        let spline = if nurbs.knots.is_empty() {
            NurbSpline::uniform(nurbs.degree, points, weights)
        } else {
            NurbSpline::create(nurbs.degree, pad_knots(&nurbs.knots, count, nurbs.degree), points, weights)
        }
        .map_err(|e| Error::unsupported(format!("host rejected nurbs curve: {e}")))?;

        let mut curve = Curve::NurbSpline(spline);
        let (lo, hi) = curve.parameter_range();
        let domain = nurbs.domain;
        let eps = 1e-9 * (hi - lo).abs().max(1.0);
        let narrower = domain.start > lo + eps || domain.end < hi - eps;
        if narrower && domain.start >= lo - eps && domain.end <= hi + eps && domain.end > domain.start {
            curve
                .make_bound(domain.start.max(lo), domain.end.min(hi))
                .map_err(|e| Error::construction("nurbs domain", e))?;
        }
        Ok(curve)
    }

    fn polyline_in(&self, polyline: &Polyline) -> Result<Vec<Curve>> {
        let points: Vec<Point3<f64>> = polyline.points()?.iter().map(|p| self.point_in(p)).collect();
        let mut pairs: Vec<(Point3<f64>, Point3<f64>)> = points.windows(2).map(|w| (w[0], w[1])).collect();
        if polyline.closed && points.len() > 2 {
            pairs.push((points[points.len() - 1], points[0]));
        }

        let mut lines = Vec::with_capacity(pairs.len());
        for (i, (a, b)) in pairs.into_iter().enumerate() {
            let length = (b - a).norm();
            if length < self.settings.short_curve_tolerance {
                warn!(segment = i, length, "skipping short polyline segment");
                continue;
            }
            lines.push(Curve::line(a, b).map_err(|e| Error::construction("polyline segment", e))?);
        }
        if lines.is_empty() {
            return Err(Error::degenerate("polyline has no segment long enough to import"));
        }
        Ok(lines)
    }

    /// Converts a chain of host curves into one polycurve. The polycurve is
    /// closed when the chain's first start meets its last end.
    pub fn curve_loop_to_portable(&self, curves: &[Curve]) -> Result<Polycurve> {
        let (Some(first), Some(last)) = (curves.first(), curves.last()) else {
            return Err(Error::degenerate("curve loop is empty"));
        };
        let units = self.model_units();
        let segments = curves
            .iter()
            .map(|c| self.curve_out(c, units))
            .collect::<Result<Vec<_>>>()?;
        let closed = (last.end_point(1) - first.end_point(0)).norm() < self.settings.closed_curve_tolerance;
        let length = segments.iter().map(schema::Curve::length).sum();
        Ok(Polycurve {
            segments,
            closed,
            domain: Interval::unit(),
            length,
            units,
        })
    }

    /// Writes host points as a polyline in model units.
    pub fn points_to_polyline(&self, points: &[Point3<f64>], closed: bool) -> Polyline {
        self.polyline_out(points, closed, self.model_units())
    }

    fn polyline_out(&self, points: &[Point3<f64>], closed: bool, units: Units) -> Polyline {
        let points: Vec<schema::Point> = points.iter().map(|p| self.point_out(p, units)).collect();
        Polyline::from_points(&points, closed, units)
    }
}

/// Knot vectors that omit the two end knots (`n + p - 1` entries) are
/// expanded by repeating their first and last value. Full vectors pass
/// through unchanged.
pub(crate) fn pad_knots(knots: &[f64], count: usize, degree: usize) -> Vec<f64> {
    match (knots.first(), knots.last()) {
        (Some(&first), Some(&last)) if knots.len() + 1 == count + degree => {
            let mut padded = Vec::with_capacity(knots.len() + 2);
            padded.push(first);
            padded.extend_from_slice(knots);
            padded.push(last);
            padded
        }
        _ => knots.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, UnitScale};
    use approx::assert_relative_eq;
    use georelay_kernel::{CylindricalHelix, HermiteSpline, Vector3};
    use std::f64::consts::PI;

    fn with_converter<R>(host: Units, model: Units, f: impl FnOnce(&GeometryConverter) -> R) -> R {
        let scale = UnitScale::new(host, model);
        let converter = GeometryConverter::without_materials(&scale);
        f(&converter)
    }

    fn meters<R>(f: impl FnOnce(&GeometryConverter) -> R) -> R {
        with_converter(Units::Meters, Units::Meters, f)
    }

    fn single(curves: Vec<Curve>) -> Curve {
        assert_eq!(curves.len(), 1);
        curves.into_iter().next().unwrap()
    }

    #[test]
    fn test_pad_knots() {
        // 4 points, degree 3: 6 stored knots expand to 8
        let padded = pad_knots(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 4, 3);
        assert_eq!(padded, vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let full = pad_knots(&padded, 4, 3);
        assert_eq!(full, padded);
    }

    #[test]
    fn test_line_is_scaled_to_model_units() {
        with_converter(Units::Feet, Units::Meters, |c| {
            let line = Curve::line(Point3::origin(), Point3::new(10.0, 0.0, 0.0)).unwrap();
            let schema::Curve::Line(out) = c.curve_to_portable(&line).unwrap() else {
                panic!("expected a line");
            };
            assert_relative_eq!(out.end.x, 3.048, epsilon = 1e-12);
            assert_relative_eq!(out.length, 3.048, epsilon = 1e-12);
            assert_eq!(out.units, Units::Meters);

            let back = single(c.curve_to_host(&schema::Curve::Line(out)).unwrap());
            assert_relative_eq!(back.end_point(1).x, 10.0, epsilon = 1e-9);
        });
    }

    #[test]
    fn test_unbound_arc_exports_as_circle() {
        meters(|c| {
            let circle = Curve::Arc(Arc::circle(Point3::origin(), Vector3::x(), Vector3::y(), 2.0).unwrap());
            let out = c.curve_to_portable(&circle).unwrap();
            let schema::Curve::Circle(circle) = &out else {
                panic!("expected a circle, got {}", out.type_name());
            };
            assert_relative_eq!(circle.radius, 2.0);
            assert_relative_eq!(circle.length, 4.0 * PI, epsilon = 1e-9);

            let back = single(c.curve_to_host(&out).unwrap());
            assert!(!back.is_bound());
        });
    }

    #[test]
    fn test_bound_arc_exports_angles_and_points() {
        meters(|c| {
            let arc = Curve::Arc(Arc::new(Point3::origin(), Vector3::x(), Vector3::y(), 1.0, 0.0, PI / 2.0).unwrap());
            let schema::Curve::Arc(out) = c.curve_to_portable(&arc).unwrap() else {
                panic!("expected an arc");
            };
            assert_relative_eq!(out.start_angle, 0.0, epsilon = 1e-12);
            assert_relative_eq!(out.end_angle, PI / 2.0, epsilon = 1e-12);
            assert_relative_eq!(out.angle_radians, PI / 2.0, epsilon = 1e-12);
            assert_relative_eq!(out.mid_point.x, (PI / 4.0).cos(), epsilon = 1e-12);
            assert_relative_eq!(out.end_point.y, 1.0, epsilon = 1e-12);

            let back = single(c.curve_to_host(&schema::Curve::Arc(out)).unwrap());
            assert_relative_eq!(back.end_point(1).y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(back.evaluate_normalized(0.5).x, (PI / 4.0).cos(), epsilon = 1e-9);
            assert_relative_eq!(back.length(), PI / 2.0, epsilon = 1e-9);
        });
    }

    #[test]
    fn test_half_arc_stays_an_arc() {
        meters(|c| {
            let arc = Curve::Arc(Arc::new(Point3::new(1.0, 2.0, 0.0), Vector3::x(), Vector3::y(), 3.0, 0.0, PI).unwrap());
            let out = c.curve_to_portable(&arc).unwrap();
            let schema::Curve::Arc(portable) = &out else {
                panic!("expected an arc, got {}", out.type_name());
            };
            assert_relative_eq!(portable.angle_radians, PI, epsilon = 1e-12);

            let back = single(c.curve_to_host(&out).unwrap());
            assert!(matches!(back, Curve::Arc(_)));
            assert!(back.is_bound());
            for t in [0.0, 0.5, 1.0] {
                let (a, b) = (arc.evaluate_normalized(t), back.evaluate_normalized(t));
                assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-9);
            }
        });
    }

    #[test]
    fn test_arc_with_coincident_ends_uses_angles() {
        meters(|c| {
            let arc = Curve::Arc(Arc::new(Point3::origin(), Vector3::x(), Vector3::y(), 1.0, 0.0, TAU).unwrap());
            let out = c.curve_to_portable(&arc).unwrap();
            assert_eq!(out.type_name(), "Arc");
            let back = single(c.curve_to_host(&out).unwrap());
            assert!(back.is_bound());
            assert_relative_eq!(back.length(), TAU, epsilon = 1e-9);
        });
    }

    #[test]
    fn test_ellipse_trim_domain() {
        meters(|c| {
            let mut curve = Curve::Ellipse(Ellipse::new(Point3::origin(), Vector3::x(), Vector3::y(), 3.0, 1.0).unwrap());
            let schema::Curve::Ellipse(full) = c.curve_to_portable(&curve).unwrap() else {
                panic!("expected an ellipse");
            };
            assert!(full.trim_domain.is_none());
            assert_relative_eq!(full.domain.end, TAU);

            curve.make_bound(0.0, PI).unwrap();
            let out = c.curve_to_portable(&curve).unwrap();
            let schema::Curve::Ellipse(half) = &out else { unreachable!() };
            assert_relative_eq!(half.trim_domain.unwrap().end, PI);

            // Import is always bound, whether a trim domain is present or not
            let back = single(c.curve_to_host(&out).unwrap());
            assert!(back.is_bound());
            assert_relative_eq!(back.end_point(1).x, -3.0, epsilon = 1e-9);
            let full_back = single(c.curve_to_host(&schema::Curve::Ellipse(full)).unwrap());
            assert!(full_back.is_bound());
        });
    }

    #[test]
    fn test_nurbs_round_trip() {
        meters(|c| {
            let points = vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ];
            let spline = NurbSpline::with_uniform_knots(points, vec![1.0, 2.0, 2.0, 1.0]).unwrap();
            let curve = Curve::NurbSpline(spline);
            let out = c.curve_to_portable(&curve).unwrap();
            let schema::Curve::Nurbs(nurbs) = &out else {
                panic!("expected nurbs");
            };
            assert_eq!(nurbs.points.len(), 12);
            assert!(nurbs.rational);
            assert!(!nurbs.closed);
            assert_eq!(nurbs.display_value.as_ref().unwrap().value.len(), 3 * 33);

            let back = single(c.curve_to_host(&out).unwrap());
            for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
                let (a, b) = (curve.evaluate_normalized(t), back.evaluate_normalized(t));
                assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-9);
            }
        });
    }

    #[test]
    fn test_nurbs_import_pads_knots_and_weights() {
        meters(|c| {
            let nurbs = schema::NurbsCurve {
                points: vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0, 3.0, 0.0, 0.0],
                weights: Vec::new(),
                knots: vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
                degree: 3,
                rational: false,
                closed: false,
                domain: Interval::new(0.0, 1.0),
                length: 0.0,
                display_value: None,
                units: Units::Meters,
            };
            let Curve::NurbSpline(spline) = single(c.curve_to_host(&schema::Curve::Nurbs(nurbs)).unwrap()) else {
                panic!("expected a spline");
            };
            assert_eq!(spline.knots().len(), 8);
            assert!(spline.weights().iter().all(|&w| w == 1.0));
        });
    }

    #[test]
    fn test_nurbs_narrow_domain_rebounds() {
        meters(|c| {
            let points = vec![Point3::origin(), Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
            let curve = Curve::NurbSpline(NurbSpline::with_uniform_knots(points, Vec::new()).unwrap());
            let schema::Curve::Nurbs(mut nurbs) = c.curve_to_portable(&curve).unwrap() else {
                panic!("expected nurbs");
            };
            nurbs.domain = Interval::new(0.25, 0.75);
            let back = single(c.curve_to_host(&schema::Curve::Nurbs(nurbs)).unwrap());
            assert_eq!(back.parameter_range(), (0.25, 0.75));
        });
    }

    #[test]
    fn test_nurbs_rejections() {
        meters(|c| {
            let mut nurbs = schema::NurbsCurve {
                points: vec![0.0, 0.0],
                weights: Vec::new(),
                knots: Vec::new(),
                degree: 1,
                rational: false,
                closed: false,
                domain: Interval::unit(),
                length: 0.0,
                display_value: None,
                units: Units::Meters,
            };
            let err = c.curve_to_host(&schema::Curve::Nurbs(nurbs.clone())).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DegenerateInput);

            nurbs.points = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
            nurbs.knots = vec![0.0, 1.0, 0.5, 0.0];
            let err = c.curve_to_host(&schema::Curve::Nurbs(nurbs.clone())).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedGeometry);

            // Two weights for four control points
            nurbs.points = vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0, 3.0, 0.0, 0.0];
            nurbs.degree = 3;
            nurbs.knots = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
            nurbs.weights = vec![2.0, 2.0];
            nurbs.rational = true;
            let err = c.curve_to_host(&schema::Curve::Nurbs(nurbs.clone())).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedGeometry);

            // Too many weights are not truncated either
            nurbs.weights = vec![1.0, 2.0, 2.0, 1.0, 1.0];
            let err = c.curve_to_host(&schema::Curve::Nurbs(nurbs)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedGeometry);
        });
    }

    #[test]
    fn test_nurbs_without_knots_keeps_degree() {
        meters(|c| {
            let mut nurbs = schema::NurbsCurve {
                points: vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0, 3.0, 0.0, 0.0, 4.0, 1.0, 0.0],
                weights: Vec::new(),
                knots: Vec::new(),
                degree: 2,
                rational: false,
                closed: false,
                domain: Interval::unit(),
                length: 0.0,
                display_value: None,
                units: Units::Meters,
            };
            let Curve::NurbSpline(spline) = single(c.curve_to_host(&schema::Curve::Nurbs(nurbs.clone())).unwrap())
            else {
                panic!("expected a spline");
            };
            assert_eq!(spline.degree(), 2);
            assert_eq!(spline.knots().len(), 5 + 2 + 1);

            // Degree above what the points support is lowered
            nurbs.degree = 7;
            let Curve::NurbSpline(spline) = single(c.curve_to_host(&schema::Curve::Nurbs(nurbs)).unwrap()) else {
                panic!("expected a spline");
            };
            assert_eq!(spline.degree(), 4);
        });
    }

    #[test]
    fn test_hermite_exports_as_nurbs() {
        meters(|c| {
            let hermite = HermiteSpline::create(
                vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 0.0)],
                vec![Vector3::x(), Vector3::x(), Vector3::y()],
                None,
            )
            .unwrap();
            let curve = Curve::HermiteSpline(hermite);
            let out = c.curve_to_portable(&curve).unwrap();
            assert_eq!(out.type_name(), "Nurbs");
            let back = single(c.curve_to_host(&out).unwrap());
            let (a, b) = (curve.evaluate_normalized(0.7), back.evaluate_normalized(0.7));
            assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-9);
        });
    }

    #[test]
    fn test_helix_is_unsupported() {
        meters(|c| {
            let helix = CylindricalHelix::new(Point3::origin(), Vector3::z(), Vector3::x(), 1.0, 0.5, 2.0).unwrap();
            let err = c.curve_to_portable(&Curve::CylindricalHelix(helix)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedGeometry);
        });
    }

    #[test]
    fn test_polyline_skips_short_segments_and_closes() {
        meters(|c| {
            let pts = [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0005, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ];
            let polyline = c.points_to_polyline(&pts, true);
            let lines = c.curve_to_host(&schema::Curve::Polyline(polyline)).unwrap();
            // 3 open segments, one too short, plus the closing segment
            assert_eq!(lines.len(), 3);
            assert_relative_eq!(lines[2].end_point(1).x, 0.0, epsilon = 1e-12);
        });
    }

    #[test]
    fn test_degenerate_polyline() {
        meters(|c| {
            let polyline = c.points_to_polyline(&[Point3::origin(), Point3::new(1e-4, 0.0, 0.0)], false);
            let err = c.curve_to_host(&schema::Curve::Polyline(polyline)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DegenerateInput);
        });
    }

    #[test]
    fn test_curve_loop_to_polycurve() {
        meters(|c| {
            let a = Point3::origin();
            let b = Point3::new(2.0, 0.0, 0.0);
            let arc = Arc::by_three_points(b, a, Point3::new(1.0, 1.0, 0.0)).unwrap();
            let curves = vec![Curve::line(a, b).unwrap(), Curve::Arc(arc)];
            let polycurve = c.curve_loop_to_portable(&curves).unwrap();
            assert!(polycurve.closed);
            assert_eq!(polycurve.segments.len(), 2);
            assert_relative_eq!(polycurve.length, 2.0 + PI, epsilon = 1e-9);

            let back = c.curve_to_host(&schema::Curve::Polycurve(polycurve)).unwrap();
            assert_eq!(back.len(), 2);
            assert!(c.curve_loop_to_portable(&[]).is_err());
        });
    }
}
