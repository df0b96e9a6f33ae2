// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoRelay Schema
//!
//! Portable geometry entities exchanged with the surrounding document layer.
//! Everything here is plain data: no kernel handles, no caches, no
//! references between entities other than indices into a [`Brep`]'s tables.
//!
//! ## Entities
//!
//! - [`Point`], [`Vector`], [`Plane`], [`Interval`], [`ControlPoint`]
//! - [`Curve`]: a closed set of curve variants, tagged by `type` on the wire
//! - [`Surface`]: NURBS surfaces with a rectangular control grid
//! - [`Brep`]: faces, loops, trims and edges addressing shared curve tables
//! - [`Mesh`], [`RenderMaterial`]
//!
//! Every entity that carries coordinates also carries its [`Units`].

pub mod base;
pub mod brep;
pub mod curve;
pub mod error;
pub mod material;
pub mod mesh;
pub mod surface;
pub mod units;

pub use base::{ControlPoint, Interval, Plane, Point, Vector};
pub use brep::{Brep, BrepEdge, BrepFace, BrepLoop, BrepLoopType, BrepOrientation, BrepTrim, BrepTrimType};
pub use curve::{Arc, Circle, Curve, Ellipse, Line, NurbsCurve, Polycurve, Polyline};
pub use error::{Error, Result};
pub use material::RenderMaterial;
pub use mesh::Mesh;
pub use surface::Surface;
pub use units::Units;
