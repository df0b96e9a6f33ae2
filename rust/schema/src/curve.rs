// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Portable curve variants.
//!
//! [`Curve`] is a closed tagged union. Consumers match on it exhaustively;
//! there is no open-ended "other curve" escape hatch.

use serde::{Deserialize, Serialize};

use crate::base::{Interval, Plane, Point};
use crate::error::Result;
use crate::units::Units;

/// A straight segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub domain: Interval,
    pub length: f64,
    pub units: Units,
}

/// A bounded circular arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub plane: Plane,
    pub radius: f64,
    /// Angle from the plane X axis to the start point, in `[0, 2π)`.
    pub start_angle: f64,
    /// Angle from the plane X axis to the end point, in `[0, 2π)`.
    pub end_angle: f64,
    /// Swept angle.
    pub angle_radians: f64,
    pub start_point: Point,
    pub mid_point: Point,
    pub end_point: Point,
    pub domain: Interval,
    pub length: f64,
    pub units: Units,
}

/// A full circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub plane: Plane,
    pub radius: f64,
    pub domain: Interval,
    pub length: f64,
    pub units: Units,
}

/// An ellipse, optionally trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub plane: Plane,
    pub first_radius: f64,
    pub second_radius: f64,
    pub domain: Interval,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trim_domain: Option<Interval>,
    pub length: f64,
    pub units: Units,
}

/// A NURBS curve with flattened control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NurbsCurve {
    /// Control points as `[x, y, z, ...]`.
    pub points: Vec<f64>,
    pub weights: Vec<f64>,
    pub knots: Vec<f64>,
    pub degree: usize,
    pub rational: bool,
    pub closed: bool,
    pub domain: Interval,
    pub length: f64,
    /// Tessellated preview for consumers without NURBS support.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_value: Option<Polyline>,
    pub units: Units,
}

impl NurbsCurve {
    pub fn control_point_count(&self) -> usize {
        self.points.len() / 3
    }
}

/// A polyline through flattened vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polyline {
    /// Vertices as `[x, y, z, ...]`.
    pub value: Vec<f64>,
    pub closed: bool,
    pub domain: Interval,
    pub length: f64,
    pub units: Units,
}

impl Polyline {
    /// Builds a polyline and computes its length, including the closing
    /// segment when `closed`.
    pub fn from_points(points: &[Point], closed: bool, units: Units) -> Self {
        let mut length: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
        if closed && points.len() > 2 {
            length += points[points.len() - 1].distance_to(&points[0]);
        }
        Self {
            value: Point::flatten(points),
            closed,
            domain: Interval::unit(),
            length,
            units,
        }
    }

    pub fn points(&self) -> Result<Vec<Point>> {
        Point::from_flat(&self.value, self.units)
    }
}

/// An ordered sequence of curve segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polycurve {
    pub segments: Vec<Curve>,
    pub closed: bool,
    pub domain: Interval,
    pub length: f64,
    pub units: Units,
}

/// Every curve that can cross the interchange boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Curve {
    Line(Line),
    Arc(Arc),
    Circle(Circle),
    Ellipse(Ellipse),
    Nurbs(NurbsCurve),
    Polyline(Polyline),
    Polycurve(Polycurve),
}

impl Curve {
    pub fn units(&self) -> Units {
        match self {
            Curve::Line(c) => c.units,
            Curve::Arc(c) => c.units,
            Curve::Circle(c) => c.units,
            Curve::Ellipse(c) => c.units,
            Curve::Nurbs(c) => c.units,
            Curve::Polyline(c) => c.units,
            Curve::Polycurve(c) => c.units,
        }
    }

    /// Parameter domain of the curve.
    pub fn domain(&self) -> Interval {
        match self {
            Curve::Line(c) => c.domain,
            Curve::Arc(c) => c.domain,
            Curve::Circle(c) => c.domain,
            Curve::Ellipse(c) => c.trim_domain.unwrap_or(c.domain),
            Curve::Nurbs(c) => c.domain,
            Curve::Polyline(c) => c.domain,
            Curve::Polycurve(c) => c.domain,
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Curve::Line(c) => c.length,
            Curve::Arc(c) => c.length,
            Curve::Circle(c) => c.length,
            Curve::Ellipse(c) => c.length,
            Curve::Nurbs(c) => c.length,
            Curve::Polyline(c) => c.length,
            Curve::Polycurve(c) => c.length,
        }
    }

    /// Variant name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Curve::Line(_) => "Line",
            Curve::Arc(_) => "Arc",
            Curve::Circle(_) => "Circle",
            Curve::Ellipse(_) => "Ellipse",
            Curve::Nurbs(_) => "Nurbs",
            Curve::Polyline(_) => "Polyline",
            Curve::Polycurve(_) => "Polycurve",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y, 0.0, Units::Meters)
    }

    #[test]
    fn test_closed_polyline_length_includes_closing_segment() {
        let square = [pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
        let open = Polyline::from_points(&square, false, Units::Meters);
        let closed = Polyline::from_points(&square, true, Units::Meters);
        assert_relative_eq!(open.length, 3.0);
        assert_relative_eq!(closed.length, 4.0);
    }

    #[test]
    fn test_curve_is_tagged_on_the_wire() {
        let line = Curve::Line(Line {
            start: pt(0.0, 0.0),
            end: pt(2.0, 0.0),
            domain: Interval::new(0.0, 2.0),
            length: 2.0,
            units: Units::Meters,
        });
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["type"], "Line");
        assert_eq!(json["units"], "m");

        let back: Curve = serde_json::from_value(json).unwrap();
        assert_eq!(back.type_name(), "Line");
        assert_relative_eq!(back.length(), 2.0);
    }
}
