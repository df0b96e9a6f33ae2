// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Portable B-Rep to host solid.

use georelay_kernel::{
    BRepBuilder, BRepType, BuilderEdgeId, BuilderOutcome, Curve, EdgeGeometry, Solid, VERTEX_TOLERANCE,
};
use georelay_schema::{Brep, BrepEdge, BrepFace, BrepOrientation, Interval};
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::HostShape;
use crate::{Error, GeometryConverter, Result};

/// Builder edges of one portable edge. Closed edges split in two.
type EdgeIds = SmallVec<[BuilderEdgeId; 2]>;

/// Builder edges created for each portable edge, filled on first use.
type EdgeCache = Vec<Option<EdgeIds>>;

impl GeometryConverter<'_> {
    /// Rebuilds a host solid from a portable B-Rep.
    ///
    /// The builder is owned by this call and dropped on every exit path.
    /// Any dropped face, or a builder that cannot finish, fails the whole
    /// conversion.
    pub fn solid_from_portable(&self, brep: &Brep) -> Result<Solid> {
        if brep.is_empty() {
            return Err(Error::degenerate("brep has no faces"));
        }
        let brep_type = match brep.orientation {
            BrepOrientation::Inward => BRepType::Void,
            BrepOrientation::Outward => BRepType::Solid,
            BrepOrientation::None | BrepOrientation::Unknown => BRepType::OpenShell,
        };
        let mut builder = BRepBuilder::new(brep_type);
        builder.set_allow_short_edges(self.settings.allow_short_edges);
        builder.allow_removal_of_problematic_faces(self.settings.allow_face_removal);

        let mut cache: EdgeCache = vec![None; brep.edges.len()];
        for (i, face) in brep.faces.iter().enumerate() {
            self.rebuild_face(&mut builder, brep, face, &mut cache)
                .map_err(|e| match e {
                    Error::TopologyReconstruction(msg) => Error::topology(format!("face {i}: {msg}")),
                    other => other,
                })?;
        }

        if builder.finish() == BuilderOutcome::Failure {
            let reason = builder
                .failure_reason()
                .map_or_else(|| "unknown reason".to_string(), ToString::to_string);
            return Err(Error::topology(format!("builder could not finish: {reason}")));
        }
        if builder.removed_some_faces() {
            return Err(Error::topology("builder dropped faces it could not close"));
        }
        let solid = builder.get_result().map_err(|e| Error::builder("result", e))?;
        debug!(
            faces = solid.face_count(),
            edges = solid.edge_count(),
            shell = ?solid.shell_type(),
            "rebuilt solid"
        );
        Ok(solid)
    }

    /// Rebuilds the solid, or falls back to the display meshes when that
    /// fails and the B-Rep carries any.
    pub fn brep_to_host_shape(&self, brep: &Brep) -> Result<HostShape> {
        match self.solid_from_portable(brep) {
            Ok(solid) => Ok(HostShape::Solid(solid)),
            Err(err) if brep.has_display_value() => {
                warn!(error = %err, meshes = brep.display_value.len(), "falling back to display meshes");
                let meshes = brep
                    .display_value
                    .iter()
                    .filter(|m| !m.is_empty())
                    .map(|m| self.mesh_to_host(m))
                    .collect::<Result<Vec<_>>>()?;
                Ok(HostShape::Meshes(meshes))
            }
            Err(err) => Err(err),
        }
    }

    fn rebuild_face(
        &self,
        builder: &mut BRepBuilder,
        brep: &Brep,
        face: &BrepFace,
        cache: &mut EdgeCache,
    ) -> Result<()> {
        let surface = brep
            .surfaces
            .get(face.surface_index)
            .ok_or_else(|| Error::degenerate(format!("face references missing surface {}", face.surface_index)))?;
        let face_id = builder
            .add_face(self.face_surface_to_host(surface)?, face.orientation_reversed)
            .map_err(|e| Error::builder("add face", e))?;
        if let Some(material) = brep.render_material.as_ref().and_then(|m| self.materials.host_material(m)) {
            builder
                .set_face_material_id(face_id, material)
                .map_err(|e| Error::builder("face material", e))?;
        }

        for &loop_index in &face.loop_indices {
            let lp = brep
                .loops
                .get(loop_index)
                .ok_or_else(|| Error::degenerate(format!("face references missing loop {loop_index}")))?;
            let loop_id = builder.add_loop(face_id).map_err(|e| Error::builder("add loop", e))?;

            let mut trims = lp.trim_indices.clone();
            if face.orientation_reversed {
                trims.reverse();
            }
            for trim_index in trims {
                let trim = brep
                    .trims
                    .get(trim_index)
                    .ok_or_else(|| Error::degenerate(format!("loop references missing trim {trim_index}")))?;
                let Some(edge_index) = trim.edge_index.filter(|_| trim.trim_type.is_topological()) else {
                    continue;
                };
                let edges = self.builder_edges(builder, brep, edge_index, cache)?;
                let reversed = face.orientation_reversed != trim.is_reversed;
                if reversed {
                    for &edge in edges.iter().rev() {
                        builder
                            .add_co_edge(loop_id, edge, true)
                            .map_err(|e| Error::builder("add co-edge", e))?;
                    }
                } else {
                    for &edge in &edges {
                        builder
                            .add_co_edge(loop_id, edge, false)
                            .map_err(|e| Error::builder("add co-edge", e))?;
                    }
                }
            }
            builder.finish_loop(loop_id).map_err(|e| Error::builder("finish loop", e))?;
        }
        builder.finish_face(face_id).map_err(|e| Error::builder("finish face", e))
    }

    /// Builder edges for a portable edge, created once per conversion.
    fn builder_edges(
        &self,
        builder: &mut BRepBuilder,
        brep: &Brep,
        edge_index: usize,
        cache: &mut EdgeCache,
    ) -> Result<EdgeIds> {
        let slot = cache
            .get_mut(edge_index)
            .ok_or_else(|| Error::degenerate(format!("trim references missing edge {edge_index}")))?;
        if let Some(ids) = slot {
            return Ok(ids.clone());
        }
        let edge = &brep.edges[edge_index];
        let mut ids = EdgeIds::new();
        for curve in self.brep_edge_to_host(brep, edge)? {
            let geometry = EdgeGeometry::new(curve).map_err(|e| Error::construction("edge geometry", e))?;
            ids.push(builder.add_edge(geometry).map_err(|e| Error::builder("add edge", e))?);
        }
        *slot = Some(ids.clone());
        Ok(ids)
    }

    /// Host curves for one portable edge, in the edge's direction.
    ///
    /// A closed curve is split at its parametric midpoint, so every returned
    /// curve has distinct endpoints.
    pub fn brep_edge_to_host(&self, brep: &Brep, edge: &BrepEdge) -> Result<Vec<Curve>> {
        let portable = brep
            .curve_3d
            .get(edge.curve_index)
            .ok_or_else(|| Error::degenerate(format!("edge references missing curve {}", edge.curve_index)))?;
        let mut curves = self.curve_to_host(portable)?;

        if curves.len() > 1 {
            if !edge.flipped {
                return Ok(curves);
            }
            curves.reverse();
            return curves
                .iter()
                .map(|c| c.reversed().map_err(|e| Error::construction("edge segment", e)))
                .collect();
        }

        let Some(mut curve) = curves.pop() else {
            return Err(Error::degenerate("edge curve produced no host curve"));
        };
        if let Some(domain) = edge.domain {
            rebound(&mut curve, portable.domain(), domain)?;
        }
        if !curve.is_bound() {
            let (start, end) = curve.parameter_range();
            let end = curve.period().map_or(end, |period| start + period);
            curve
                .make_bound(start, end)
                .map_err(|e| Error::construction("edge bounds", e))?;
        }
        if edge.flipped {
            curve = curve.reversed().map_err(|e| Error::construction("edge direction", e))?;
        }

        // Never looser than the builder's own closed-edge check.
        let tolerance = self.settings.closed_curve_tolerance.max(VERTEX_TOLERANCE);
        if !curve.is_closed(tolerance) {
            return Ok(vec![curve]);
        }
        let (start, end) = curve.parameter_range();
        let mid = 0.5 * (start + end);
        debug!(curve = edge.curve_index, "splitting closed edge curve at {mid}");
        let mut first = curve.clone();
        first.make_bound(start, mid).map_err(|e| Error::construction("closed edge split", e))?;
        let mut second = curve;
        second.make_bound(mid, end).map_err(|e| Error::construction("closed edge split", e))?;
        Ok(vec![first, second])
    }
}

/// Restricts `curve` to the part of `native` covered by `domain`, through
/// the normalized parameter. Matching domains leave the curve untouched.
fn rebound(curve: &mut Curve, native: Interval, domain: Interval) -> Result<()> {
    let span = native.length();
    if domain.approx_eq(&native, 1e-9 * span.abs().max(1.0)) || span.abs() < f64::EPSILON {
        return Ok(());
    }
    let (start, end) = curve.parameter_range();
    let at = |value: f64| start + (end - start) * (value - native.start) / span;
    curve
        .make_bound(at(domain.start), at(domain.end))
        .map_err(|e| Error::construction("edge domain", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, UnitScale};
    use approx::assert_relative_eq;
    use georelay_kernel::{make_box, Arc, NurbSpline, Point3, Vector3};
    use georelay_schema::Units;
    use std::f64::consts::TAU;

    fn converter_test(f: impl FnOnce(&GeometryConverter)) {
        let scale = UnitScale::identity(Units::Meters);
        f(&GeometryConverter::without_materials(&scale));
    }

    #[test]
    fn test_box_round_trip() {
        converter_test(|c| {
            let solid = make_box(Point3::origin(), Point3::new(2.0, 1.0, 1.0)).unwrap();
            let brep = c.solid_to_portable(&solid).unwrap();
            let back = c.solid_from_portable(&brep).unwrap();
            assert_eq!(back.face_count(), 6);
            assert_eq!(back.edge_count(), 12);
            assert_eq!(back.shell_type(), BRepType::Solid);
            for (_, edge) in back.edges() {
                assert_eq!(edge.uses().len(), 2);
            }
        });
    }

    #[test]
    fn test_closed_edge_is_split() {
        converter_test(|c| {
            let circle = Curve::Arc(Arc::circle(Point3::origin(), Vector3::x(), Vector3::y(), 1.0).unwrap());
            let mut brep = Brep::new(Units::Meters);
            brep.curve_3d.push(c.curve_to_portable(&circle).unwrap());
            let edge = BrepEdge {
                curve_index: 0,
                trim_indices: Vec::new(),
                flipped: false,
                domain: Some(Interval::new(0.0, TAU)),
            };
            let halves = c.brep_edge_to_host(&brep, &edge).unwrap();
            assert_eq!(halves.len(), 2);
            assert_relative_eq!((halves[0].end_point(1) - halves[1].end_point(0)).norm(), 0.0, epsilon = 1e-12);
            assert_relative_eq!((halves[1].end_point(1) - halves[0].end_point(0)).norm(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(halves[0].end_point(1).x, -1.0, epsilon = 1e-12);
        });
    }

    #[test]
    fn test_nearly_closed_edge_is_split_under_tight_tolerance() {
        let scale = UnitScale::identity(Units::Meters);
        let settings = crate::ConverterSettings {
            closed_curve_tolerance: 1e-9,
            ..Default::default()
        };
        let c = GeometryConverter::with_settings(settings, &scale, &crate::NoMaterials);
        let points = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5e-7, 0.0, 0.0),
        ];
        let curve = Curve::NurbSpline(NurbSpline::uniform(1, points, Vec::new()).unwrap());
        let mut brep = Brep::new(Units::Meters);
        brep.curve_3d.push(c.curve_to_portable(&curve).unwrap());
        let edge = BrepEdge {
            curve_index: 0,
            trim_indices: Vec::new(),
            flipped: false,
            domain: None,
        };
        let pieces = c.brep_edge_to_host(&brep, &edge).unwrap();
        assert_eq!(pieces.len(), 2);
        for piece in pieces {
            assert!(EdgeGeometry::new(piece).is_ok());
        }
    }

    #[test]
    fn test_edge_domain_rebounds_curve() {
        converter_test(|c| {
            let line = Curve::line(Point3::origin(), Point3::new(4.0, 0.0, 0.0)).unwrap();
            let mut brep = Brep::new(Units::Meters);
            brep.curve_3d.push(c.curve_to_portable(&line).unwrap());
            let edge = BrepEdge {
                curve_index: 0,
                trim_indices: Vec::new(),
                flipped: true,
                domain: Some(Interval::new(1.0, 3.0)),
            };
            let curves = c.brep_edge_to_host(&brep, &edge).unwrap();
            assert_eq!(curves.len(), 1);
            assert_relative_eq!(curves[0].end_point(0).x, 3.0, epsilon = 1e-12);
            assert_relative_eq!(curves[0].end_point(1).x, 1.0, epsilon = 1e-12);
        });
    }

    #[test]
    fn test_dangling_references_are_degenerate() {
        converter_test(|c| {
            let solid = make_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap();
            let mut brep = c.solid_to_portable(&solid).unwrap();
            brep.trims[0].edge_index = Some(99);
            let err = c.solid_from_portable(&brep).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DegenerateInput);
            assert!(c.solid_from_portable(&Brep::new(Units::Meters)).is_err());
        });
    }

    #[test]
    fn test_missing_face_fails_topology() {
        converter_test(|c| {
            let solid = make_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap();
            let mut brep = c.solid_to_portable(&solid).unwrap();
            brep.faces.pop();
            let err = c.solid_from_portable(&brep).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TopologyReconstruction);
        });
    }
}
