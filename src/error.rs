//! Error types for mscomplex.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh and Morse-Smale complex operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A vertex loop passes through a non-manifold vertex.
    #[error("loop passes through non-manifold vertex {vertex}")]
    NonManifoldLoopVertex {
        /// The offending vertex.
        vertex: usize,
    },

    /// A vertex loop is not closed or has consecutive vertices that are not adjacent.
    #[error("not a closed loop: {details}")]
    OpenLoop {
        /// Description of where the loop breaks.
        details: String,
    },

    /// A loop half-edge used to seed a flood fill has no incident face.
    #[error("half-edge {halfedge} from vertex {from} to {to} has no incident face")]
    MissingFace {
        /// The half-edge index.
        halfedge: usize,
        /// Origin vertex of the half-edge.
        from: usize,
        /// Destination vertex of the half-edge.
        to: usize,
    },

    /// A per-vertex scalar field does not match the mesh.
    #[error("scalar field has {actual} values but the mesh has {expected} vertices")]
    FieldSizeMismatch {
        /// Number of mesh vertices.
        expected: usize,
        /// Number of scalar values supplied.
        actual: usize,
    },

    /// A critical point handle is out of range.
    #[error("unknown critical point {0}")]
    UnknownCriticalPoint(usize),

    /// An integration line handle is out of range.
    #[error("unknown integration line {0}")]
    UnknownIntegrationLine(usize),

    /// An integration line does not start and end at its critical points.
    #[error("integration line from vertex {first} to {last} does not connect vertices {from} and {to}")]
    LineEndpointMismatch {
        /// Mesh vertex of the starting critical point.
        from: usize,
        /// Mesh vertex of the ending critical point.
        to: usize,
        /// First vertex of the path.
        first: usize,
        /// Last vertex of the path.
        last: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a non-manifold error from a description.
    pub(crate) fn non_manifold(details: impl Into<String>) -> Self {
        MeshError::NonManifold {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MeshError::InvalidVertexIndex { face: 3, vertex: 9 };
        assert_eq!(err.to_string(), "face 3 references invalid vertex index 9");

        let err = MeshError::invalid_param("flat_epsilon", -1.0, "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid parameter: flat_epsilon = -1 (must be non-negative)"
        );
    }
}
