// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface codec.
//!
//! Portable surfaces store knot vectors without their two end knots, the
//! way most NURBS exchange formats do; host knot vectors are complete.

use georelay_kernel::{FaceKey, FaceSurface, NurbsSurfaceData, Point3, Solid};
use georelay_schema::{ControlPoint, Interval, Surface};

use crate::curves::pad_knots;
use crate::{Error, GeometryConverter, Result};

impl GeometryConverter<'_> {
    /// Converts the surface of a solid's face. Planar faces become an exact
    /// degree-1 patch over the face's parameter bounds.
    pub fn face_surface_to_portable(&self, solid: &Solid, face: FaceKey) -> Result<Surface> {
        let data = solid.face(face).map_err(|e| Error::degenerate(e.to_string()))?;
        match data.surface() {
            FaceSurface::Plane(plane) => {
                let bounds = solid
                    .face_uv_bounds(face)
                    .map_err(|e| Error::construction("planar face bounds", e))?;
                let patch =
                    NurbsSurfaceData::bilinear(plane, &bounds).map_err(|e| Error::construction("planar face", e))?;
                Ok(self.surface_to_portable(&patch))
            }
            FaceSurface::Nurbs(nurbs) => Ok(self.surface_to_portable(nurbs)),
            other => Err(Error::unsupported(format!("{} faces have no portable form", other.type_name()))),
        }
    }

    /// Converts a host NURBS surface into model units.
    pub fn surface_to_portable(&self, surface: &NurbsSurfaceData) -> Surface {
        let units = self.model_units();
        let (count_u, count_v) = (surface.count_u(), surface.count_v());
        let tol = self.settings.closed_curve_tolerance;
        let point_at = |u: usize, v: usize| surface.control_points()[u * count_v + v];
        let closed_u = (0..count_v).all(|v| (point_at(0, v) - point_at(count_u - 1, v)).norm() < tol);
        let closed_v = (0..count_u).all(|u| (point_at(u, 0) - point_at(u, count_v - 1)).norm() < tol);

        let grid: Vec<Vec<ControlPoint>> = (0..count_u)
            .map(|u| {
                (0..count_v)
                    .map(|v| {
                        let idx = u * count_v + v;
                        let p = self.point_out(&surface.control_points()[idx], units);
                        ControlPoint::new(p.x, p.y, p.z, surface.weights()[idx], units)
                    })
                    .collect()
            })
            .collect();

        let (u0, u1) = surface.domain_u();
        let (v0, v1) = surface.domain_v();
        let mut out = Surface {
            degree_u: surface.degree_u(),
            degree_v: surface.degree_v(),
            rational: surface.is_rational(),
            closed_u,
            closed_v,
            domain_u: Interval::new(u0, u1),
            domain_v: Interval::new(v0, v1),
            knots_u: trim_end_knots(surface.knots_u()),
            knots_v: trim_end_knots(surface.knots_v()),
            count_u: 0,
            count_v: 0,
            point_data: Vec::new(),
            units,
        };
        out.set_control_points(&grid);
        out
    }

    /// Converts a portable surface into host NURBS data.
    pub fn surface_to_host(&self, surface: &Surface) -> Result<NurbsSurfaceData> {
        let grid = surface.control_points()?;
        if grid.is_empty() || surface.count_v == 0 {
            return Err(Error::degenerate("surface has no control points"));
        }
        let mut points = Vec::with_capacity(surface.count_u * surface.count_v);
        let mut weights = Vec::with_capacity(points.capacity());
        for cp in grid.iter().flatten() {
            points.push(Point3::new(
                self.length_in(cp.x, cp.units),
                self.length_in(cp.y, cp.units),
                self.length_in(cp.z, cp.units),
            ));
            weights.push(cp.weight);
        }
        NurbsSurfaceData::create(
            surface.degree_u,
            surface.degree_v,
            pad_knots(&surface.knots_u, surface.count_u, surface.degree_u),
            pad_knots(&surface.knots_v, surface.count_v, surface.degree_v),
            surface.count_u,
            surface.count_v,
            points,
            weights,
        )
        .map_err(|e| Error::unsupported(format!("host rejected nurbs surface: {e}")))
    }

    /// Face surface for a portable surface.
    pub(crate) fn face_surface_to_host(&self, surface: &Surface) -> Result<FaceSurface> {
        self.surface_to_host(surface).map(FaceSurface::Nurbs)
    }
}

fn trim_end_knots(knots: &[f64]) -> Vec<f64> {
    if knots.len() < 2 {
        return knots.to_vec();
    }
    knots[1..knots.len() - 1].to_vec()
}
