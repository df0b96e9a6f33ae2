// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoRelay Geometry
//!
//! Converts geometry between the GeoRelay host kernel and the portable
//! interchange schema.
//!
//! - Curves and NURBS surfaces, in both directions ([`GeometryConverter::curve_to_portable`],
//!   [`GeometryConverter::curve_to_host`], [`GeometryConverter::surface_to_host`])
//! - Solids flattened into B-Rep tables and rebuilt through the kernel's
//!   builder ([`GeometryConverter::solid_to_portable`],
//!   [`GeometryConverter::solid_from_portable`])
//! - Display meshes batched by material ([`GeometryConverter::build_meshes`])
//!
//! ```rust,ignore
//! use georelay_geometry::{GeometryConverter, UnitScale};
//! use georelay_schema::Units;
//!
//! let scale = UnitScale::new(Units::Feet, Units::Meters);
//! let converter = GeometryConverter::without_materials(&scale);
//! let brep = converter.solid_to_portable(&solid)?;
//! ```

pub mod brep;
pub mod config;
pub mod converter;
pub mod curves;
pub mod error;
pub mod materials;
pub mod meshes;
pub mod surfaces;
pub mod triangulation;
pub mod units;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use brep::HostShape;
pub use config::ConverterSettings;
pub use converter::GeometryConverter;
pub use error::{Error, ErrorKind, Result};
pub use materials::{render_material_from_host, MaterialResolver, NoMaterials};
pub use meshes::MeshFragment;
pub use units::{LengthScale, UnitScale};
