// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental solid construction.
//!
//! [`BRepBuilder`] collects faces, loops, edges and co-edges, validates
//! them, and produces a [`Solid`] in two phases: [`BRepBuilder::finish`]
//! checks and assembles the topology, then [`BRepBuilder::get_result`]
//! hands the solid out. A builder yields at most one result and refuses
//! any call once finished.
//!
//! # Example
//!
//! ```
//! use georelay_kernel::{
//!     BRepBuilder, BRepType, BuilderOutcome, Curve, EdgeGeometry, FaceSurface, Plane, Point3, Vector3,
//! };
//!
//! let plane = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
//! let mut builder = BRepBuilder::new(BRepType::OpenShell);
//! let face = builder.add_face(FaceSurface::Plane(plane), false).unwrap();
//! let lp = builder.add_loop(face).unwrap();
//! let corners = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! for i in 0..3 {
//!     let curve = Curve::line(corners[i], corners[(i + 1) % 3]).unwrap();
//!     let edge = builder.add_edge(EdgeGeometry::new(curve).unwrap()).unwrap();
//!     builder.add_co_edge(lp, edge, false).unwrap();
//! }
//! builder.finish_loop(lp).unwrap();
//! builder.finish_face(face).unwrap();
//!
//! assert_eq!(builder.finish(), BuilderOutcome::Success);
//! let solid = builder.get_result().unwrap();
//! assert_eq!(solid.face_count(), 1);
//! ```

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::keys::{BuilderEdgeId, BuilderFaceId, BuilderLoopId, EdgeKey, MaterialId};
use crate::solid::{EdgeData, EdgeUse, FaceData, LoopData, Solid};
use crate::surface::FaceSurface;
use crate::VERTEX_TOLERANCE;

/// What kind of shell the builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BRepType {
    /// Closed shell with outward normals.
    Solid,
    /// Closed shell with inward normals.
    Void,
    /// Shell that may have boundary edges.
    OpenShell,
}

impl BRepType {
    /// `true` when every edge must be shared by exactly two co-edges.
    pub fn is_closed(self) -> bool {
        matches!(self, BRepType::Solid | BRepType::Void)
    }
}

/// Outcome of [`BRepBuilder::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderOutcome {
    Success,
    Failure,
}

/// Geometry of one edge given to a builder: a bound, open 3D curve.
#[derive(Debug, Clone)]
pub struct EdgeGeometry {
    curve: Curve,
}

impl EdgeGeometry {
    /// Rejects unbound curves and curves whose endpoints coincide. A closed
    /// curve has to be split into pieces before it can bound a face.
    pub fn new(curve: Curve) -> Result<Self> {
        if !curve.is_bound() {
            return Err(Error::UnboundCurve);
        }
        if curve.is_closed(VERTEX_TOLERANCE) {
            return Err(Error::CoincidentEndpoints);
        }
        Ok(Self { curve })
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn into_curve(self) -> Curve {
        self.curve
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Open,
    Finished,
    Extracted,
}

#[derive(Debug, Clone, Copy)]
struct CoEdge {
    edge: BuilderEdgeId,
    reversed: bool,
}

impl CoEdge {
    fn start(&self, geometry: &EdgeGeometry) -> Point3<f64> {
        geometry.curve.end_point(usize::from(self.reversed))
    }

    fn end(&self, geometry: &EdgeGeometry) -> Point3<f64> {
        geometry.curve.end_point(usize::from(!self.reversed))
    }
}

#[derive(Debug)]
struct PendingFace {
    surface: FaceSurface,
    reversed: bool,
    material: Option<MaterialId>,
    loops: Vec<BuilderLoopId>,
    finished: bool,
    problem: Option<Error>,
}

#[derive(Debug)]
struct PendingLoop {
    face: BuilderFaceId,
    coedges: Vec<CoEdge>,
    finished: bool,
}

/// Builds a [`Solid`] from faces, loops and co-edges.
#[derive(Debug)]
pub struct BRepBuilder {
    brep_type: BRepType,
    state: BuilderState,
    faces: SlotMap<BuilderFaceId, PendingFace>,
    face_order: Vec<BuilderFaceId>,
    loops: SlotMap<BuilderLoopId, PendingLoop>,
    edges: SlotMap<BuilderEdgeId, EdgeGeometry>,
    allow_short_edges: bool,
    allow_face_removal: bool,
    removed_faces: usize,
    result: Option<Solid>,
    failure: Option<Error>,
}

impl BRepBuilder {
    pub fn new(brep_type: BRepType) -> Self {
        Self {
            brep_type,
            state: BuilderState::Open,
            faces: SlotMap::with_key(),
            face_order: Vec::new(),
            loops: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            allow_short_edges: false,
            allow_face_removal: false,
            removed_faces: 0,
            result: None,
            failure: None,
        }
    }

    pub fn brep_type(&self) -> BRepType {
        self.brep_type
    }

    /// Accept edges shorter than the short-curve tolerance.
    pub fn set_allow_short_edges(&mut self, allow: bool) {
        self.allow_short_edges = allow;
    }

    /// Drop faces whose loops cannot be closed instead of failing.
    /// [`BRepBuilder::removed_some_faces`] reports whether it happened.
    pub fn allow_removal_of_problematic_faces(&mut self, allow: bool) {
        self.allow_face_removal = allow;
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            BuilderState::Open => Ok(()),
            BuilderState::Finished => Err(Error::OutOfSequence("builder is already finished")),
            BuilderState::Extracted => Err(Error::OutOfSequence("builder result was already taken")),
        }
    }

    // --- Face operations ---

    /// Adds a face on `surface`. `reversed` means the face normal points
    /// against the surface normal.
    pub fn add_face(&mut self, surface: FaceSurface, reversed: bool) -> Result<BuilderFaceId> {
        self.ensure_open()?;
        let id = self.faces.insert(PendingFace {
            surface,
            reversed,
            material: None,
            loops: Vec::new(),
            finished: false,
            problem: None,
        });
        self.face_order.push(id);
        Ok(id)
    }

    pub fn set_face_material_id(&mut self, face: BuilderFaceId, material: MaterialId) -> Result<()> {
        self.ensure_open()?;
        let data = self.faces.get_mut(face).ok_or(Error::InvalidBuilderId(face.into()))?;
        data.material = Some(material);
        Ok(())
    }

    /// Closes a face. A face without loops, or one with a loop that could
    /// not be closed, is dropped when problematic-face removal is allowed
    /// and rejected otherwise.
    pub fn finish_face(&mut self, face: BuilderFaceId) -> Result<()> {
        self.ensure_open()?;
        let data = self.faces.get_mut(face).ok_or(Error::InvalidBuilderId(face.into()))?;
        if data.finished {
            return Err(Error::OutOfSequence("face is already finished"));
        }
        if data.loops.is_empty() && data.problem.is_none() {
            data.problem = Some(Error::DegenerateFace("face has no loops".into()));
        }
        if let Some(&open) = data.loops.iter().find(|&&l| !self.loops[l].finished) {
            return Err(Error::InvalidBuilderId(open.into()));
        }
        data.finished = true;
        if let Some(problem) = data.problem.take() {
            if !self.allow_face_removal {
                return Err(problem);
            }
            self.remove_face(face);
        }
        Ok(())
    }

    fn remove_face(&mut self, face: BuilderFaceId) {
        if let Some(data) = self.faces.remove(face) {
            for lp in data.loops {
                self.loops.remove(lp);
            }
            self.face_order.retain(|&f| f != face);
            self.removed_faces += 1;
        }
    }

    /// `true` if any face was dropped as problematic.
    pub fn removed_some_faces(&self) -> bool {
        self.removed_faces > 0
    }

    // --- Loop operations ---

    pub fn add_loop(&mut self, face: BuilderFaceId) -> Result<BuilderLoopId> {
        self.ensure_open()?;
        let data = self.faces.get(face).ok_or(Error::InvalidBuilderId(face.into()))?;
        if data.finished {
            return Err(Error::OutOfSequence("cannot add a loop to a finished face"));
        }
        let id = self.loops.insert(PendingLoop {
            face,
            coedges: Vec::new(),
            finished: false,
        });
        self.faces[face].loops.push(id);
        Ok(id)
    }

    /// Appends a co-edge to a loop. `reversed` means the loop runs from the
    /// edge curve's end to its start.
    pub fn add_co_edge(&mut self, lp: BuilderLoopId, edge: BuilderEdgeId, reversed: bool) -> Result<()> {
        self.ensure_open()?;
        if !self.edges.contains_key(edge) {
            return Err(Error::InvalidBuilderId(edge.into()));
        }
        let data = self.loops.get_mut(lp).ok_or(Error::InvalidBuilderId(lp.into()))?;
        if data.finished {
            return Err(Error::OutOfSequence("cannot add a co-edge to a finished loop"));
        }
        data.coedges.push(CoEdge { edge, reversed });
        Ok(())
    }

    /// Closes a loop, checking that its co-edges form a closed chain.
    pub fn finish_loop(&mut self, lp: BuilderLoopId) -> Result<()> {
        self.ensure_open()?;
        let data = self.loops.get(lp).ok_or(Error::InvalidBuilderId(lp.into()))?;
        if data.finished {
            return Err(Error::OutOfSequence("loop is already finished"));
        }
        let face = data.face;
        let problem = self.check_chain(&data.coedges).err();
        self.loops[lp].finished = true;
        if let Some(problem) = problem {
            if !self.allow_face_removal {
                return Err(problem);
            }
            let face = &mut self.faces[face];
            face.problem.get_or_insert(problem);
        }
        Ok(())
    }

    fn check_chain(&self, coedges: &[CoEdge]) -> Result<()> {
        if coedges.is_empty() {
            return Err(Error::EmptyLoop);
        }
        let n = coedges.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let a = &self.edges[coedges[i].edge];
            let b = &self.edges[coedges[j].edge];
            if (coedges[i].end(a) - coedges[j].start(b)).norm() > VERTEX_TOLERANCE {
                return Err(Error::OpenLoop(i, j));
            }
        }
        Ok(())
    }

    // --- Edge operations ---

    pub fn add_edge(&mut self, geometry: EdgeGeometry) -> Result<BuilderEdgeId> {
        self.ensure_open()?;
        if !self.allow_short_edges && geometry.curve.is_short() {
            return Err(Error::CurveTooShort(geometry.curve.length()));
        }
        Ok(self.edges.insert(geometry))
    }

    pub fn is_valid_edge_id(&self, edge: BuilderEdgeId) -> bool {
        self.edges.contains_key(edge)
    }

    // --- Completion ---

    /// Validates and assembles the solid.
    pub fn finish(&mut self) -> BuilderOutcome {
        if self.state != BuilderState::Open {
            return BuilderOutcome::Failure;
        }
        let outcome = match self.assemble() {
            Ok(solid) => {
                self.result = Some(solid);
                BuilderOutcome::Success
            }
            Err(e) => {
                self.failure = Some(e);
                BuilderOutcome::Failure
            }
        };
        self.state = BuilderState::Finished;
        outcome
    }

    /// Why [`BRepBuilder::finish`] failed.
    pub fn failure_reason(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    pub fn is_result_available(&self) -> bool {
        self.state == BuilderState::Finished && self.result.is_some()
    }

    /// Takes the built solid. Only succeeds once, after a successful
    /// [`BRepBuilder::finish`].
    pub fn get_result(&mut self) -> Result<Solid> {
        if self.state != BuilderState::Finished {
            return Err(Error::OutOfSequence("get_result needs a finished builder"));
        }
        let solid = self.result.take().ok_or(Error::NoResult)?;
        self.state = BuilderState::Extracted;
        Ok(solid)
    }

    fn assemble(&self) -> Result<Solid> {
        if self.face_order.is_empty() {
            return Err(Error::DegenerateFace("no faces to build".into()));
        }
        if self.face_order.iter().any(|&f| !self.faces[f].finished) {
            return Err(Error::OutOfSequence("every face must be finished"));
        }

        let mut usage: FxHashMap<BuilderEdgeId, SmallVec<[bool; 2]>> = FxHashMap::default();
        for &f in &self.face_order {
            for &lp in &self.faces[f].loops {
                for co in &self.loops[lp].coedges {
                    usage.entry(co.edge).or_default().push(co.reversed);
                }
            }
        }
        for (&edge, senses) in &usage {
            let bad = if self.brep_type.is_closed() {
                senses.len() != 2 || senses[0] == senses[1]
            } else {
                senses.len() > 2
            };
            if bad {
                return Err(Error::NonManifoldEdge(edge, senses.len()));
            }
        }

        let mut solid = Solid::new(self.brep_type);
        let mut edge_keys: FxHashMap<BuilderEdgeId, EdgeKey> = FxHashMap::default();
        for &f in &self.face_order {
            let face = &self.faces[f];
            let face_key = solid.faces.insert(FaceData {
                surface: face.surface.clone(),
                loops: Vec::with_capacity(face.loops.len()),
                orientation_matches_surface: !face.reversed,
                material: face.material,
            });
            for &lp in &face.loops {
                let loop_key = solid.loops.insert(LoopData {
                    face: face_key,
                    edges: Vec::with_capacity(self.loops[lp].coedges.len()),
                });
                for co in &self.loops[lp].coedges {
                    let geometry = &self.edges[co.edge];
                    let edge_key = match edge_keys.get(&co.edge) {
                        Some(&key) => key,
                        None => {
                            let key = solid.edges.insert(EdgeData {
                                curve: geometry.curve.clone(),
                                uses: SmallVec::new(),
                            });
                            edge_keys.insert(co.edge, key);
                            key
                        }
                    };
                    let curve_uv = face.surface.curve_to_uv(&geometry.curve)?;
                    solid.edges[edge_key].uses.push(EdgeUse {
                        face: face_key,
                        flipped: co.reversed,
                        curve_uv,
                    });
                    solid.loops[loop_key].edges.push(edge_key);
                }
                solid.faces[face_key].loops.push(loop_key);
            }
        }
        Ok(solid)
    }
}
