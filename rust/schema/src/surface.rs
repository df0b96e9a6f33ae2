// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Portable NURBS surfaces.

use serde::{Deserialize, Serialize};

use crate::base::{ControlPoint, Interval};
use crate::error::{Error, Result};
use crate::units::Units;

/// A NURBS surface.
///
/// Knot vectors are stored without their duplicated end knots, so
/// `knots_u.len() == count_u + degree_u - 1`. Control points are laid out
/// u-major in `point_data` with stride 4 (`x, y, z, w`): the point at
/// `(u, v)` starts at `(u * count_v + v) * 4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    pub degree_u: usize,
    pub degree_v: usize,
    pub rational: bool,
    pub closed_u: bool,
    pub closed_v: bool,
    pub domain_u: Interval,
    pub domain_v: Interval,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
    pub count_u: usize,
    pub count_v: usize,
    pub point_data: Vec<f64>,
    pub units: Units,
}

impl Surface {
    /// Control points as rows over `u`, each row running over `v`.
    pub fn control_points(&self) -> Result<Vec<Vec<ControlPoint>>> {
        let expected = self.count_u * self.count_v;
        if self.point_data.len() % 4 != 0 {
            return Err(Error::MalformedArray {
                len: self.point_data.len(),
                stride: 4,
            });
        }
        if self.point_data.len() / 4 != expected {
            return Err(Error::ControlGridMismatch {
                count_u: self.count_u,
                count_v: self.count_v,
                actual: self.point_data.len() / 4,
            });
        }
        Ok(self
            .point_data
            .chunks_exact(4 * self.count_v.max(1))
            .map(|row| {
                row.chunks_exact(4)
                    .map(|c| ControlPoint::new(c[0], c[1], c[2], c[3], self.units))
                    .collect()
            })
            .collect())
    }

    /// Replaces the control grid. Rows run over `u`.
    pub fn set_control_points(&mut self, grid: &[Vec<ControlPoint>]) {
        self.count_u = grid.len();
        self.count_v = grid.first().map_or(0, Vec::len);
        self.point_data.clear();
        self.point_data.reserve(self.count_u * self.count_v * 4);
        for row in grid {
            for cp in row {
                self.point_data.extend_from_slice(&[cp.x, cp.y, cp.z, cp.weight]);
            }
        }
    }
}
