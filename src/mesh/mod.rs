//! Core mesh data structures.
//!
//! This module provides the polygon mesh store and the passes that derive its
//! topology from a face-vertex list.
//!
//! # Overview
//!
//! The primary type is [`PolyMesh`]. Faces are arbitrary polygons given as
//! vertex loops; from them the mesh derives undirected edges, vertex/edge/face
//! adjacency tables, normals, boundary and non-manifold status, global
//! descriptors ([`MeshInfo`]) and, for manifold input, a half-edge structure
//! with closed exterior loops along each boundary.
//!
//! Vertex adjacency is finally put in counter-clockwise order (see
//! [`PolyMesh::order_adjacency`]), which downstream passes rely on when they
//! walk around a vertex.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`FaceId`] - Identifies a face
//! - [`HalfEdgeId`] - Identifies a half-edge
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use mscomplex::mesh::{PolyMesh, build_from_polygons};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.5, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
//!
//! let mesh: PolyMesh = build_from_polygons(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_edges(), 6);
//! assert!(mesh.is_manifold());
//! ```

mod analysis;
mod builder;
mod index;
mod ordering;
mod polymesh;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use ordering::VertexRing;
pub use polymesh::{
    BoundingBox, BoundingSphere, Edge, EdgeStatus, Face, FaceStatus, HalfEdge, HalfEdgeLoopIter,
    MeshInfo, MeshKind, PolyMesh, Vertex, VertexStatus,
};
