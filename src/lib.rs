//! # mscomplex
//!
//! Morse-Smale complexes of scalar fields on polygon meshes.
//!
//! The crate derives a consistent topology from a face-vertex soup, classifies
//! the critical points of a per-vertex scalar field and assembles the quad
//! patches bounded by the integration lines between them.
//!
//! ## Features
//!
//! - **Polygon mesh store**: arenas with type-safe handles, adjacency tables,
//!   boundary/non-manifold classification and a half-edge structure
//! - **CCW 1-rings**: vertex adjacency ordered counter-clockwise
//! - **Constrained shortest paths**: Dijkstra over a chosen subset of edges
//! - **Critical points**: minima, maxima and (multi-)saddles with flat-region
//!   tie breaking
//! - **Quad patches**: closure of 4-cycles of integration lines and their
//!   interior faces
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use mscomplex::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//! assert!(mesh.is_manifold());
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use mscomplex::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let faces = vec![[0, 1, 2]];
//! # let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
//! // Neighbors of a vertex, counter-clockwise
//! let v = VertexId::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! // Walk the exterior boundary loop
//! let he = mesh.halfedge_between(VertexId::new(1), VertexId::new(0)).unwrap();
//! assert!(mesh.halfedge(he).is_boundary());
//! assert_eq!(mesh.halfedge_loop(he).count(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod msc;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use mscomplex::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, EdgeId,
        Face, FaceId, HalfEdge, HalfEdgeId, MeshIndex, PolyMesh, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        // Closed mesh: 4 faces * 3 sides, no exterior half-edges
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());
        assert_eq!(mesh.info().components, 1);

        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
            assert_eq!(mesh.vertex_neighbors(v).len(), 3);
        }
    }
}
