// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for kernel operations.

use crate::keys::{BuilderEdgeId, BuilderKey, EdgeKey, FaceKey, LoopKey};

/// Result type alias for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the host kernel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Curve construction arguments are invalid.
    #[error("invalid curve: {0}")]
    InvalidCurve(String),

    /// The curve is shorter than the short-curve tolerance.
    #[error("curve length {0} is below the short-curve tolerance")]
    CurveTooShort(f64),

    /// Requested bounds are empty or fall outside the curve's domain.
    #[error("parameter range [{0}, {1}] is not valid for this curve")]
    InvalidBounds(f64, f64),

    /// The operation needs a bounded curve.
    #[error("curve is unbounded")]
    UnboundCurve,

    /// An edge curve starts and ends at the same point.
    #[error("edge curve endpoints coincide; closed curves must be split before use as an edge")]
    CoincidentEndpoints,

    /// NURBS control data is inconsistent.
    #[error("invalid NURBS data: {0}")]
    InvalidNurbs(String),

    /// Surface construction arguments are invalid.
    #[error("invalid surface: {0}")]
    InvalidSurface(String),

    /// Face key not found in the solid.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    /// Loop key not found in the solid.
    #[error("loop not found: {0:?}")]
    LoopNotFound(LoopKey),

    /// Edge key not found in the solid.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// A builder id does not name a live entity of that builder.
    #[error("invalid builder id: {0}")]
    InvalidBuilderId(BuilderKey),

    /// A builder call was made in the wrong lifecycle state.
    #[error("builder call out of sequence: {0}")]
    OutOfSequence(&'static str),

    /// Consecutive co-edges of a loop do not meet.
    #[error("loop is open: co-edge {0} does not meet co-edge {1}")]
    OpenLoop(usize, usize),

    /// A loop was finished without any co-edge.
    #[error("loop has no co-edges")]
    EmptyLoop,

    /// An edge is used by the wrong number of co-edges for the shell type.
    #[error("edge {0:?} is used by {1} co-edges")]
    NonManifoldEdge(BuilderEdgeId, usize),

    /// The face cannot be built.
    #[error("degenerate face: {0}")]
    DegenerateFace(String),

    /// No built result is available.
    #[error("builder has no result available")]
    NoResult,

    /// Triangulation failed.
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}
