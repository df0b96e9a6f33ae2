// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive positional entities.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::Units;

/// A position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub units: Units,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, units: Units) -> Self {
        Self { x, y, z, units }
    }

    /// Euclidean distance, ignoring unit tags.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Reads a flat `[x, y, z, x, y, z, ...]` array.
    pub fn from_flat(values: &[f64], units: Units) -> Result<Vec<Point>> {
        if values.len() % 3 != 0 {
            return Err(Error::MalformedArray {
                len: values.len(),
                stride: 3,
            });
        }
        Ok(values
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2], units))
            .collect())
    }

    /// Flattens points into `[x, y, z, ...]`.
    pub fn flatten(points: &[Point]) -> Vec<f64> {
        let mut out = Vec::with_capacity(points.len() * 3);
        for p in points {
            out.extend_from_slice(&[p.x, p.y, p.z]);
        }
        out
    }
}

/// A direction or displacement in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub units: Units,
}

impl Vector {
    pub fn new(x: f64, y: f64, z: f64, units: Units) -> Self {
        Self { x, y, z, units }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// An oriented plane with an in-plane frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point,
    pub normal: Vector,
    pub xdir: Vector,
    pub ydir: Vector,
    pub units: Units,
}

/// A closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).abs()
    }

    /// The interval `[0, 1]`.
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// `true` when both bounds agree with `other` within `tolerance`.
    pub fn approx_eq(&self, other: &Interval, tolerance: f64) -> bool {
        (self.start - other.start).abs() <= tolerance && (self.end - other.end).abs() <= tolerance
    }
}

/// A weighted NURBS control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub weight: f64,
    pub units: Units,
}

impl ControlPoint {
    pub fn new(x: f64, y: f64, z: f64, weight: f64, units: Units) -> Self {
        Self {
            x,
            y,
            z,
            weight,
            units,
        }
    }
}
