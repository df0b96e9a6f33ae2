// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length scaling between host internal units and model units.

use georelay_schema::{Plane, Point, Units, Vector};

use crate::{GeometryConverter, Point3, Vector3};

/// Converts lengths at the interchange boundary.
pub trait LengthScale: Send + Sync {
    /// Units portable output is written in.
    fn model_units(&self) -> Units;

    /// Host internal length to model units.
    fn to_portable(&self, value: f64) -> f64;

    /// Length tagged with `units` to host internal units. Unitless values
    /// pass through.
    fn to_host(&self, value: f64, units: Units) -> f64;
}

/// Fixed host and model units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitScale {
    pub host: Units,
    pub model: Units,
}

impl UnitScale {
    pub fn new(host: Units, model: Units) -> Self {
        Self { host, model }
    }

    /// Host and model share `units`.
    pub fn identity(units: Units) -> Self {
        Self::new(units, units)
    }
}

impl LengthScale for UnitScale {
    fn model_units(&self) -> Units {
        self.model
    }

    fn to_portable(&self, value: f64) -> f64 {
        value * self.host.conversion_factor(self.model)
    }

    fn to_host(&self, value: f64, units: Units) -> f64 {
        if units.is_unitless() {
            value
        } else {
            value * units.conversion_factor(self.host)
        }
    }
}

impl GeometryConverter<'_> {
    /// Scales a host length for output in `units`; unitless output is not
    /// scaled.
    #[inline]
    pub(crate) fn length_out(&self, value: f64, units: Units) -> f64 {
        if units.is_unitless() {
            value
        } else {
            self.scale.to_portable(value)
        }
    }

    #[inline]
    pub(crate) fn length_in(&self, value: f64, units: Units) -> f64 {
        self.scale.to_host(value, units)
    }

    pub(crate) fn point_out(&self, p: &Point3<f64>, units: Units) -> Point {
        Point::new(
            self.length_out(p.x, units),
            self.length_out(p.y, units),
            self.length_out(p.z, units),
            units,
        )
    }

    pub(crate) fn point_in(&self, p: &Point) -> Point3<f64> {
        Point3::new(
            self.length_in(p.x, p.units),
            self.length_in(p.y, p.units),
            self.length_in(p.z, p.units),
        )
    }

    /// Flat `[x, y, z, ...]` coordinates tagged with `units` into host points.
    pub(crate) fn flat_points_in(&self, values: &[f64], units: Units) -> crate::Result<Vec<Point3<f64>>> {
        Ok(Point::from_flat(values, units)?.iter().map(|p| self.point_in(p)).collect())
    }

    pub(crate) fn flat_points_out(&self, points: &[Point3<f64>], units: Units) -> Vec<f64> {
        let mut out = Vec::with_capacity(points.len() * 3);
        for p in points {
            out.extend_from_slice(&[
                self.length_out(p.x, units),
                self.length_out(p.y, units),
                self.length_out(p.z, units),
            ]);
        }
        out
    }

    /// Directions are never scaled.
    pub(crate) fn vector_out(&self, v: &Vector3<f64>, units: Units) -> Vector {
        Vector::new(v.x, v.y, v.z, units)
    }

    pub(crate) fn vector_in(&self, v: &Vector) -> Vector3<f64> {
        Vector3::new(v.x, v.y, v.z)
    }

    pub(crate) fn plane_out(&self, origin: &Point3<f64>, x_dir: &Vector3<f64>, y_dir: &Vector3<f64>, units: Units) -> Plane {
        Plane {
            origin: self.point_out(origin, units),
            normal: self.vector_out(&x_dir.cross(y_dir), units),
            xdir: self.vector_out(x_dir, units),
            ydir: self.vector_out(y_dir, units),
            units,
        }
    }

    /// Origin and in-plane axes of a portable plane.
    pub(crate) fn plane_in(&self, plane: &Plane) -> (Point3<f64>, Vector3<f64>, Vector3<f64>) {
        (self.point_in(&plane.origin), self.vector_in(&plane.xdir), self.vector_in(&plane.ydir))
    }
}
