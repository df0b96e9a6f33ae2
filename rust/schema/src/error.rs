// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for malformed interchange data.

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading structure out of flat interchange arrays.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A flat coordinate array is not a multiple of its stride.
    #[error("flat array of length {len} is not a multiple of stride {stride}")]
    MalformedArray { len: usize, stride: usize },

    /// A mesh face run claims more indices than remain in the face list.
    #[error("mesh face run at offset {offset} declares {count} vertices but the face list ends early")]
    TruncatedFace { offset: usize, count: usize },

    /// A mesh face references a vertex that does not exist.
    #[error("mesh face references vertex {index} but only {vertex_count} vertices exist")]
    VertexOutOfRange { index: usize, vertex_count: usize },

    /// A surface's control grid does not match its declared counts.
    #[error("surface declares {count_u}x{count_v} control points but carries {actual}")]
    ControlGridMismatch {
        count_u: usize,
        count_v: usize,
        actual: usize,
    },
}
