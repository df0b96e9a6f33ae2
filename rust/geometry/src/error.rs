// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry conversion.

use thiserror::Error;

/// Result type for geometry conversion
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedGeometry,
    TopologyReconstruction,
    DegenerateInput,
}

/// Errors that can occur while converting one item of geometry
#[derive(Error, Debug)]
pub enum Error {
    /// The geometry kind has no counterpart on the other side, or the host
    /// refused to construct it.
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// The solid builder could not produce a valid solid.
    #[error("Topology reconstruction failed: {0}")]
    TopologyReconstruction(String),

    /// The input is empty, malformed, or references missing entities.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedGeometry(_) => ErrorKind::UnsupportedGeometry,
            Error::TopologyReconstruction(_) => ErrorKind::TopologyReconstruction,
            Error::DegenerateInput(_) => ErrorKind::DegenerateInput,
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedGeometry(msg.into())
    }

    pub fn topology(msg: impl Into<String>) -> Self {
        Error::TopologyReconstruction(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateInput(msg.into())
    }

    /// Wraps a kernel error raised while building a solid.
    pub(crate) fn builder(context: &str, err: georelay_kernel::Error) -> Self {
        Error::TopologyReconstruction(format!("{context}: {err}"))
    }

    /// Wraps a kernel error raised while constructing curves or surfaces.
    pub(crate) fn construction(context: &str, err: georelay_kernel::Error) -> Self {
        use georelay_kernel::Error as K;
        match err {
            K::CurveTooShort(_) | K::CoincidentEndpoints | K::InvalidBounds(..) | K::UnboundCurve => {
                Error::DegenerateInput(format!("{context}: {err}"))
            }
            _ => Error::UnsupportedGeometry(format!("{context}: {err}")),
        }
    }
}

impl From<georelay_schema::Error> for Error {
    fn from(err: georelay_schema::Error) -> Self {
        Error::DegenerateInput(err.to_string())
    }
}
