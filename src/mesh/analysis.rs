//! Mesh classification and global descriptors.
//!
//! Marks boundary, non-manifold and isolated elements, determines the face
//! kind of the mesh, and computes normals, bounding volumes, average edge
//! length and the number of connected components.

use std::collections::VecDeque;

use nalgebra::{Point3, Vector3};

use super::index::{MeshIndex, VertexId};
use super::polymesh::{
    BoundingBox, BoundingSphere, EdgeStatus, FaceStatus, MeshKind, PolyMesh, VertexStatus,
};

/// Normals shorter than this fall back to the Z axis.
const NORMAL_EPSILON: f64 = 1e-12;

impl<I: MeshIndex> PolyMesh<I> {
    /// Classify every vertex, edge and face and set the mesh-level kind and
    /// manifold flag.
    ///
    /// - An edge with one face is boundary (and so are its end points); with
    ///   zero or more than two faces it is non-manifold.
    /// - A vertex without neighbors is isolated; a vertex with a single
    ///   neighbor or more than two boundary edges is non-manifold.
    /// - A face with fewer than three vertices, a repeated vertex or a
    ///   non-manifold edge is non-manifold; a face on a boundary edge is
    ///   boundary.
    pub fn classify(&mut self) {
        let mut manifold = true;

        for v in &mut self.vertices {
            v.status = VertexStatus::default();
        }

        for (ei, edge) in self.edges.iter_mut().enumerate() {
            edge.status = EdgeStatus::default();
            match self.adjacency.edge_faces[ei].len() {
                1 => {
                    edge.status.boundary = true;
                    for v in edge.vertices {
                        self.vertices[v.index()].status.boundary = true;
                    }
                }
                2 => {}
                _ => {
                    edge.status.non_manifold = true;
                    manifold = false;
                }
            }
        }

        for (vi, vertex) in self.vertices.iter_mut().enumerate() {
            match self.adjacency.vertex_vertices[vi].len() {
                0 => vertex.status.isolated = true,
                1 => {
                    vertex.status.non_manifold = true;
                    manifold = false;
                }
                _ => {}
            }

            let boundary_edges = self.adjacency.vertex_edges[vi]
                .iter()
                .filter(|e| self.edges[e.index()].status.boundary)
                .count();
            if boundary_edges > 2 {
                vertex.status.non_manifold = true;
                manifold = false;
            }
        }

        let (mut has_tri, mut has_quad, mut has_poly) = (false, false, false);
        for face in &mut self.faces {
            face.status = FaceStatus::default();
            match face.degree() {
                3 => has_tri = true,
                4 => has_quad = true,
                _ => has_poly = true,
            }

            let n = face.degree();
            let repeated = (0..n).any(|i| face.vertices[i + 1..].contains(&face.vertices[i]));
            if n < 3 || repeated {
                face.status.non_manifold = true;
                manifold = false;
            }

            for e in &face.edges {
                let status = self.edges[e.index()].status;
                face.status.boundary |= status.boundary;
                face.status.non_manifold |= status.non_manifold;
            }
        }

        self.info.kind = match (has_tri, has_quad, has_poly) {
            (_, _, true) => MeshKind::Polygon,
            (true, true, false) => MeshKind::Mixed,
            (false, true, false) => MeshKind::Quad,
            _ => MeshKind::Triangle,
        };
        self.info.manifold = manifold;
    }

    /// Count connected components of the vertex adjacency graph.
    ///
    /// Isolated vertices count as components of their own.
    pub fn count_components(&self) -> usize {
        let n = self.num_vertices();
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        let mut components = 0;

        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            components += 1;
            visited[seed] = true;
            queue.push_back(seed);

            while let Some(v) = queue.pop_front() {
                for u in &self.adjacency.vertex_vertices[v] {
                    if !visited[u.index()] {
                        visited[u.index()] = true;
                        queue.push_back(u.index());
                    }
                }
            }
        }

        components
    }

    /// Total edge length divided by the number of edges.
    ///
    /// Returns `None` for a mesh without edges.
    pub fn average_edge_length(&self) -> Option<f64> {
        if self.edges.is_empty() {
            return None;
        }
        let total: f64 = self.edge_ids().map(|e| self.edge_length(e)).sum();
        Some(total / self.edges.len() as f64)
    }

    /// Axis-aligned bounding box of all vertices, `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.vertices.first()?.position;
        let (min, max) = self.vertices.iter().fold((first, first), |(mut min, mut max), v| {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
            (min, max)
        });
        Some(BoundingBox { min, max })
    }

    /// Centroid of the vertices and the largest distance from it.
    ///
    /// Not the minimal enclosing sphere. `None` for an empty mesh.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.position.coords);
        let center = Point3::from(sum / self.vertices.len() as f64);
        let radius = self
            .vertices
            .iter()
            .map(|v| (v.position - center).norm())
            .fold(0.0, f64::max);
        Some(BoundingSphere { center, radius })
    }

    /// Normal of a vertex loop from its first three vertices.
    ///
    /// Loops with fewer than three vertices or collinear corners get the Z axis.
    pub fn polygon_normal(&self, vertices: &[VertexId<I>]) -> Vector3<f64> {
        if vertices.len() < 3 {
            return Vector3::z();
        }
        let p0 = self.position(vertices[0]);
        let p1 = self.position(vertices[1]);
        let p2 = self.position(vertices[2]);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(NORMAL_EPSILON)
            .unwrap_or_else(Vector3::z)
    }

    /// Recompute all face normals.
    pub fn compute_face_normals(&mut self) {
        let normals: Vec<Vector3<f64>> = self
            .faces
            .iter()
            .map(|f| self.polygon_normal(&f.vertices))
            .collect();
        for (face, normal) in self.faces.iter_mut().zip(normals) {
            face.normal = normal;
        }
    }

    /// Recompute all vertex normals as the normalized sum of the adjacent
    /// face normals. Face normals must be current.
    pub fn compute_vertex_normals(&mut self) {
        for (vi, vertex) in self.vertices.iter_mut().enumerate() {
            let sum = self.adjacency.vertex_faces[vi]
                .iter()
                .fold(Vector3::zeros(), |acc, f| acc + self.faces[f.index()].normal);
            vertex.normal = sum.try_normalize(NORMAL_EPSILON).unwrap_or_else(Vector3::z);
        }
    }
}
