// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoRelay Kernel
//!
//! An in-memory boundary-representation kernel: the "host" side of the
//! GeoRelay interchange engine.
//!
//! ## Entities
//!
//! - [`Curve`]: lines, arcs, ellipses, NURBS and Hermite splines, helices
//! - [`FaceSurface`]: planes, cylinders and NURBS surfaces
//! - [`Solid`]: faces bounded by loops of shared edges, stored in slot maps
//! - [`BRepBuilder`]: the only way to create a [`Solid`]
//! - [`TriangleMesh`], [`PolygonMesh`], [`Material`]
//!
//! Lengths are in the kernel's internal units. The kernel knows nothing
//! about the interchange schema.

pub mod builder;
pub mod curve;
pub mod error;
pub mod keys;
pub mod material;
pub mod mesh;
mod nurbs;
pub mod primitives;
pub mod solid;
pub mod surface;
mod tessellation;

pub use nalgebra::{Point2, Point3, Vector3};

pub use builder::{BRepBuilder, BRepType, BuilderOutcome, EdgeGeometry};
pub use curve::{angle_on_plane_to, Arc, Curve, CurveKind, CylindricalHelix, Ellipse, HermiteSpline, Line, NurbSpline};
pub use error::{Error, Result};
pub use keys::{BuilderEdgeId, BuilderFaceId, BuilderLoopId, EdgeKey, FaceKey, LoopKey, MaterialId};
pub use material::{Color, Material, MaterialTable};
pub use mesh::{PolygonMesh, TriangleMesh};
pub use primitives::{make_box, make_box_with_material, make_cylinder};
pub use solid::{EdgeData, EdgeUse, FaceData, LoopData, Solid};
pub use surface::{BoundingBoxUV, Cylinder, FaceSurface, NurbsSurfaceData, Plane};

/// Distance under which two points are the same vertex.
pub const VERTEX_TOLERANCE: f64 = 1e-6;

/// Edges shorter than this are rejected unless the builder allows them.
pub const SHORT_CURVE_TOLERANCE: f64 = 2.56e-3;
