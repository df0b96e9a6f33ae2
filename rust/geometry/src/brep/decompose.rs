// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host solid to portable B-Rep.

use georelay_kernel::{BRepType, EdgeKey, FaceKey, FaceData, Solid};
use georelay_schema::{
    Brep, BrepEdge, BrepFace, BrepLoop, BrepLoopType, BrepOrientation, BrepTrim, BrepTrimType, Interval, Units,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::meshes::MeshFragment;
use crate::{Error, GeometryConverter, Result};

/// Per-call state of one decomposition.
struct Decomposition<'s> {
    solid: &'s Solid,
    brep: Brep,
    /// Host edge to portable edge index, in first-visit order.
    edge_index: FxHashMap<EdgeKey, usize>,
}

impl GeometryConverter<'_> {
    /// Converts a host solid into a portable B-Rep with display meshes.
    pub fn solid_to_portable(&self, solid: &Solid) -> Result<Brep> {
        if solid.is_empty() {
            return Err(Error::degenerate("solid has no faces"));
        }
        let mut state = Decomposition {
            solid,
            brep: Brep::new(self.model_units()),
            edge_index: FxHashMap::default(),
        };
        for (key, face) in solid.faces() {
            self.decompose_face(&mut state, key, face)?;
        }

        let mut brep = state.brep;
        brep.orientation = match solid.shell_type() {
            BRepType::Solid => BrepOrientation::Outward,
            BRepType::Void => BrepOrientation::Inward,
            BRepType::OpenShell => BrepOrientation::Unknown,
        };
        brep.display_value = self.build_meshes(&[MeshFragment::Solid(solid)])?;
        if let [mesh] = brep.display_value.as_slice() {
            brep.render_material = mesh.render_material.clone();
        }
        debug!(
            faces = brep.faces.len(),
            edges = brep.edges.len(),
            trims = brep.trims.len(),
            "decomposed solid"
        );
        Ok(brep)
    }

    /// Converts independent solids in parallel. Each result stands alone.
    pub fn solids_to_portable(&self, solids: &[Solid]) -> Vec<Result<Brep>> {
        solids
            .par_iter()
            .enumerate()
            .map(|(i, solid)| {
                self.solid_to_portable(solid).inspect_err(|e| {
                    warn!(solid = i, error = %e, "solid conversion failed");
                })
            })
            .collect()
    }

    fn decompose_face(&self, state: &mut Decomposition<'_>, key: FaceKey, face: &FaceData) -> Result<()> {
        let solid = state.solid;
        let surface = self.face_surface_to_portable(solid, key)?;
        let surface_index = state.brep.surfaces.len();
        state.brep.surfaces.push(surface);

        let face_index = state.brep.faces.len();
        let reversed = !face.orientation_matches_surface();

        // The outer loop encloses the largest parameter-space area.
        let mut outer = 0;
        let mut outer_area = f64::NEG_INFINITY;
        for (i, &lp) in face.loops().iter().enumerate() {
            let area = solid
                .loop_uv_area(key, lp)
                .map_err(|e| Error::degenerate(e.to_string()))?
                .abs();
            if area > outer_area {
                outer = i;
                outer_area = area;
            }
        }

        let mut loop_indices = Vec::with_capacity(face.loops().len());
        for (i, &lp) in face.loops().iter().enumerate() {
            let loop_index = state.brep.loops.len();
            let loop_type = if i == outer { BrepLoopType::Outer } else { BrepLoopType::Inner };
            // A reversed face is walked backwards so trims follow the surface.
            let mut edges = solid
                .loop_data(lp)
                .map_err(|e| Error::degenerate(e.to_string()))?
                .edges()
                .to_vec();
            if reversed {
                edges.reverse();
            }

            let mut trim_indices = Vec::with_capacity(edges.len());
            for edge_key in edges {
                let trim_index = self.decompose_edge_use(state, key, edge_key, face_index, loop_index, reversed)?;
                trim_indices.push(trim_index);
            }
            state.brep.loops.push(BrepLoop {
                face_index,
                trim_indices,
                loop_type,
            });
            loop_indices.push(loop_index);
        }

        state.brep.faces.push(BrepFace {
            surface_index,
            outer_loop_index: loop_indices.get(outer).copied().unwrap_or_default(),
            loop_indices,
            orientation_reversed: reversed,
        });
        Ok(())
    }

    fn decompose_edge_use(
        &self,
        state: &mut Decomposition<'_>,
        face: FaceKey,
        edge_key: EdgeKey,
        face_index: usize,
        loop_index: usize,
        face_reversed: bool,
    ) -> Result<usize> {
        let solid = state.solid;
        let edge = solid.edge(edge_key).map_err(|e| Error::degenerate(e.to_string()))?;
        let side = edge
            .side_of(face)
            .ok_or_else(|| Error::degenerate("loop edge is not used by its face"))?;
        let flipped = edge.is_flipped_on_face(side).unwrap_or(false);

        let curve_uv = edge
            .curve_uv(side)
            .ok_or_else(|| Error::degenerate("edge use has no parameter-space curve"))?;
        let (uv_start, uv_end) = curve_uv.parameter_range();
        let curve_index = state.brep.curve_2d.len();
        state.brep.curve_2d.push(self.curve_out(curve_uv, Units::None)?);

        let edge_index = match state.edge_index.get(&edge_key) {
            Some(&index) => index,
            None => {
                let curve_index = state.brep.curve_3d.len();
                state.brep.curve_3d.push(self.curve_to_portable(edge.curve())?);
                let (start, end) = edge.curve().parameter_range();
                let index = state.brep.edges.len();
                state.brep.edges.push(BrepEdge {
                    curve_index,
                    trim_indices: Vec::with_capacity(2),
                    flipped: false,
                    domain: Some(Interval::new(start, end)),
                });
                state.edge_index.insert(edge_key, index);
                index
            }
        };

        let trim_index = state.brep.trims.len();
        state.brep.trims.push(BrepTrim {
            edge_index: Some(edge_index),
            face_index,
            loop_index,
            curve_index,
            trim_type: if edge.uses().len() == 2 { BrepTrimType::Mated } else { BrepTrimType::Boundary },
            is_reversed: face_reversed ^ flipped,
            domain: Some(Interval::new(uv_start, uv_end)),
        });
        state.brep.edges[edge_index].trim_indices.push(trim_index);
        Ok(trim_index)
    }
}
