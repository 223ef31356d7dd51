//! Topology construction.
//!
//! This module derives the full topology of a [`PolyMesh`] from its face
//! vertex loops: deduplicated edges, vertex/edge/face adjacency tables and,
//! for manifold input, the half-edge structure. It also provides the
//! face-vertex constructors that run the whole pipeline.

use std::collections::HashMap;

use nalgebra::Point3;

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::polymesh::{Adjacency, Edge, HalfEdge, PolyMesh};
use crate::error::{MeshError, Result};

/// Build a mesh from vertices and polygonal faces.
///
/// Runs the full pipeline: edges, adjacency, normals, global descriptors,
/// classification, half-edges (manifold input only) and CCW ordering of the
/// vertex 1-rings. Non-manifold input is accepted; it simply has no
/// half-edge structure.
///
/// # Example
/// ```
/// use mscomplex::mesh::{build_from_polygons, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh: PolyMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_edges(), 6);
/// assert!(mesh.is_manifold());
/// ```
pub fn build_from_polygons<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[Vec<usize>],
) -> Result<PolyMesh<I>> {
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }

    let mut mesh = PolyMesh::with_capacity(vertices.len(), faces.len());
    for &pos in vertices {
        mesh.add_vertex(pos);
    }
    for face in faces {
        mesh.add_face(face.iter().map(|&vi| VertexId::new(vi)).collect());
    }

    mesh.rebuild()?;
    Ok(mesh)
}

/// Build a mesh from vertices and triangle faces.
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<PolyMesh<I>> {
    let faces: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_from_polygons(vertices, &faces)
}

/// Build a mesh from vertices and quad faces (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<PolyMesh<I>> {
    let faces: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_from_polygons(vertices, &faces)
}

/// Convert a mesh back to a face-vertex representation.
pub fn to_face_vertex<I: MeshIndex>(mesh: &PolyMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face(f).vertices.iter().map(|v| v.index()).collect())
        .collect();
    (vertices, faces)
}

/// Unordered vertex pair used to deduplicate edges.
#[inline]
fn edge_key<I: MeshIndex>(a: VertexId<I>, b: VertexId<I>) -> (VertexId<I>, VertexId<I>) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Recompute every piece of derived data from the face loops.
    ///
    /// Half-edges are only built when the classifier finds the mesh manifold;
    /// otherwise the half-edge arena stays empty and the failure is logged.
    /// Errors are returned only for faces that reference missing vertices.
    ///
    /// Statuses are recomputed from scratch, so vertex positions and faces may
    /// be edited between rebuilds.
    pub fn rebuild(&mut self) -> Result<()> {
        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(v) = face.vertices.iter().find(|v| v.index() >= self.vertices.len()) {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: v.index(),
                });
            }
        }

        self.build_edges();
        self.build_vertex_adjacency();
        self.build_edge_face_adjacency();
        self.build_face_face_adjacency();

        self.compute_face_normals();
        self.compute_vertex_normals();
        self.info.components = self.count_components();
        self.info.average_edge_length = self.average_edge_length();
        self.info.bounding_box = self.bounding_box();
        self.info.bounding_sphere = self.bounding_sphere();

        self.classify();

        if self.is_manifold() {
            if let Err(err) = self.build_half_edges() {
                log::warn!("half-edge construction failed: {}", err);
            }
        } else {
            self.clear_half_edges();
            log::warn!("mesh is non-manifold; half-edge structure not built");
        }

        self.order_adjacency();

        log::debug!(
            "rebuilt mesh topology: {} vertices, {} edges, {} faces, {} half-edges, {} components",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces(),
            self.num_halfedges(),
            self.info.components
        );
        Ok(())
    }

    /// Derive the unique undirected edges from the face loops.
    ///
    /// Each face's edge list is filled so that edge `i` joins vertex `i` and
    /// vertex `i + 1`. Edges shared between faces are created once.
    pub fn build_edges(&mut self) {
        let mut edge_map: HashMap<(VertexId<I>, VertexId<I>), EdgeId<I>> = HashMap::new();
        let mut edges: Vec<Edge<I>> = Vec::new();

        for face in &mut self.faces {
            let n = face.vertices.len();
            face.edges.clear();
            face.edges.reserve(n);
            for i in 0..n {
                let a = face.vertices[i];
                let b = face.vertices[(i + 1) % n];
                let e = *edge_map.entry(edge_key(a, b)).or_insert_with(|| {
                    edges.push(Edge::new(a, b));
                    EdgeId::new(edges.len() - 1)
                });
                face.edges.push(e);
            }
        }

        self.edges = edges;
    }

    /// Fill vertex → vertex/edge/face tables in insertion order.
    pub fn build_vertex_adjacency(&mut self) {
        let n = self.vertices.len();
        let adj = &mut self.adjacency;
        adj.vertex_vertices = vec![Vec::new(); n];
        adj.vertex_edges = vec![Vec::new(); n];
        adj.vertex_faces = vec![Vec::new(); n];

        for (fi, face) in self.faces.iter().enumerate() {
            for v in &face.vertices {
                adj.vertex_faces[v.index()].push(FaceId::new(fi));
            }
        }

        for (ei, edge) in self.edges.iter().enumerate() {
            let [a, b] = edge.vertices;
            adj.vertex_vertices[a.index()].push(b);
            adj.vertex_vertices[b.index()].push(a);
            adj.vertex_edges[a.index()].push(EdgeId::new(ei));
            adj.vertex_edges[b.index()].push(EdgeId::new(ei));
        }
    }

    /// Fill the edge → face table.
    pub fn build_edge_face_adjacency(&mut self) {
        let mut edge_faces = vec![Vec::new(); self.edges.len()];
        for (fi, face) in self.faces.iter().enumerate() {
            for e in &face.edges {
                edge_faces[e.index()].push(FaceId::new(fi));
            }
        }
        self.adjacency.edge_faces = edge_faces;
    }

    /// Fill the face → face table (faces sharing an edge).
    pub fn build_face_face_adjacency(&mut self) {
        let Adjacency {
            edge_faces,
            face_faces,
            ..
        } = &mut self.adjacency;

        *face_faces = self
            .faces
            .iter()
            .enumerate()
            .map(|(fi, face)| {
                let this = FaceId::new(fi);
                face.edges
                    .iter()
                    .flat_map(|e| edge_faces[e.index()].iter().copied())
                    .filter(|&f| f != this)
                    .collect()
            })
            .collect();
    }

    fn clear_half_edges(&mut self) {
        self.halfedges.clear();
        for face in &mut self.faces {
            face.halfedges.clear();
        }
        for edge in &mut self.edges {
            edge.halfedges = [HalfEdgeId::invalid(), HalfEdgeId::invalid()];
        }
    }

    /// Build the half-edge structure.
    ///
    /// Each face gets one half-edge per side, linked into a ring. Half-edges
    /// on shared edges are paired as twins. Every half-edge left without a
    /// twin lies on the boundary and receives an exterior half-edge; the
    /// exterior half-edges are linked into closed loops by walking around the
    /// boundary vertices.
    ///
    /// Refuses non-manifold meshes; the caller is expected to check
    /// [`is_manifold`](Self::is_manifold) first. On failure the mesh is left
    /// without half-edges and is marked non-manifold.
    pub fn build_half_edges(&mut self) -> Result<()> {
        if !self.is_manifold() {
            return Err(MeshError::non_manifold(
                "cannot build half-edges for a non-manifold mesh",
            ));
        }

        self.clear_half_edges();

        let (halfedges, slots) = match self.assemble_half_edges() {
            Ok(built) => built,
            Err(err) => {
                self.info.manifold = false;
                return Err(err);
            }
        };

        for (edge, slot) in self.edges.iter_mut().zip(&slots) {
            edge.halfedges = *slot;
        }

        // Per-face half-edge lists, aligned with the edge lists.
        for (fi, face) in self.faces.iter_mut().enumerate() {
            let this = FaceId::new(fi);
            face.halfedges = face
                .edges
                .iter()
                .filter_map(|e| {
                    slots[e.index()]
                        .iter()
                        .copied()
                        .find(|h| h.is_valid() && halfedges[h.index()].face == this)
                })
                .collect();
        }

        self.halfedges = halfedges;
        Ok(())
    }

    /// Half-edges and per-edge half-edge slots, built without touching the
    /// mesh.
    #[allow(clippy::type_complexity)]
    fn assemble_half_edges(&self) -> Result<(Vec<HalfEdge<I>>, Vec<[HalfEdgeId<I>; 2]>)> {
        let mut halfedges: Vec<HalfEdge<I>> = Vec::new();
        let mut slots = vec![[HalfEdgeId::invalid(), HalfEdgeId::invalid()]; self.edges.len()];
        let mut first_on_edge: HashMap<EdgeId<I>, HalfEdgeId<I>> = HashMap::new();

        // Interior half-edges, one ring per face.
        for (fi, face) in self.faces.iter().enumerate() {
            let base = halfedges.len();
            let n = face.vertices.len();
            for k in 0..n {
                let id = HalfEdgeId::new(base + k);
                let e = face.edges[k];
                let mut he = HalfEdge::new(face.vertices[k], e, FaceId::new(fi));
                he.next = HalfEdgeId::new(base + (k + 1) % n);
                he.prev = HalfEdgeId::new(base + (k + n - 1) % n);

                match first_on_edge.get(&e) {
                    Some(&twin) => {
                        if halfedges[twin.index()].origin == he.origin {
                            return Err(MeshError::non_manifold(format!(
                                "faces on edge {} have inconsistent winding",
                                e.index()
                            )));
                        }
                        he.twin = twin;
                        halfedges[twin.index()].twin = id;
                        slots[e.index()][1] = id;
                    }
                    None => {
                        slots[e.index()][0] = id;
                        first_on_edge.insert(e, id);
                    }
                }
                halfedges.push(he);
            }
        }

        // Exterior half-edges for the unpaired sides.
        let interior_count = halfedges.len();
        let mut exterior: Vec<HalfEdgeId<I>> = Vec::new();
        for k in 0..interior_count {
            if halfedges[k].twin.is_valid() {
                continue;
            }
            let inner = HalfEdgeId::new(k);
            let id = HalfEdgeId::new(halfedges.len());
            let e = halfedges[k].edge;
            let origin = self.edges[e.index()].other(halfedges[k].origin);

            let mut he = HalfEdge::new(origin, e, FaceId::invalid());
            he.twin = inner;
            halfedges[k].twin = id;
            halfedges.push(he);

            slots[e.index()][1] = id;
            exterior.push(id);
        }

        let is_interior = |hes: &[HalfEdge<I>], h: HalfEdgeId<I>| -> bool {
            hes[hes[h.index()].twin.index()].face.is_valid()
        };
        let limit = halfedges.len();

        for &b in &exterior {
            let inner = halfedges[b.index()].twin;

            // Rotate around the origin of `inner` (the end of `b`) until the
            // incoming boundary side is found; its exterior twin follows `b`.
            let mut prev = halfedges[inner.index()].prev;
            let mut steps = 0;
            while is_interior(&halfedges, prev) {
                let across = halfedges[prev.index()].twin;
                prev = halfedges[across.index()].prev;
                steps += 1;
                if steps > limit {
                    return Err(MeshError::non_manifold(format!(
                        "boundary loop through vertex {} does not close",
                        halfedges[inner.index()].origin.index()
                    )));
                }
            }

            // Rotate around the end of `inner` (the start of `b`) until the
            // outgoing boundary side is found; its exterior twin precedes `b`.
            let mut next = halfedges[inner.index()].next;
            steps = 0;
            while is_interior(&halfedges, next) {
                let across = halfedges[next.index()].twin;
                next = halfedges[across.index()].next;
                steps += 1;
                if steps > limit {
                    return Err(MeshError::non_manifold(format!(
                        "boundary loop through vertex {} does not close",
                        halfedges[b.index()].origin.index()
                    )));
                }
            }

            let b_next = halfedges[prev.index()].twin;
            let b_prev = halfedges[next.index()].twin;
            halfedges[b.index()].next = b_next;
            halfedges[b.index()].prev = b_prev;
        }

        log::debug!(
            "built {} half-edges ({} exterior)",
            halfedges.len(),
            exterior.len()
        );
        Ok((halfedges, slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing edge (0, 1)
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        (vertices, faces)
    }

    fn two_quads() -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
        // Two quads sharing edge (1, 2)
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 exterior half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_edges_are_deduplicated() {
        let (vertices, faces) = two_triangles();
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_edges(), 5);
        let shared = mesh.edge_between(VertexId::new(0), VertexId::new(1)).unwrap();
        assert_eq!(mesh.edge_faces(shared).len(), 2);
        assert_eq!(mesh.face(FaceId::new(0)).edges[0], shared);
        assert_eq!(mesh.face(FaceId::new(1)).edges[0], shared);
    }

    #[test]
    fn test_face_edge_alignment() {
        let (vertices, faces) = two_quads();
        let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();

        for f in mesh.face_ids() {
            let face = mesh.face(f);
            for i in 0..face.degree() {
                let edge = mesh.edge(face.edges[i]);
                assert!(edge.contains(face.vertices[i]));
                assert!(edge.contains(face.next_vertex(i)));
            }
        }
    }

    #[test]
    fn test_face_face_adjacency() {
        let (vertices, faces) = two_quads();
        let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();

        assert_eq!(mesh.face_faces(FaceId::new(0)), &[FaceId::new(1)]);
        assert_eq!(mesh.face_faces(FaceId::new(1)), &[FaceId::new(0)]);
    }

    #[test]
    fn test_two_triangles_half_edges() {
        let (vertices, faces) = two_triangles();
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        // 6 interior half-edges + 4 exterior half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());

        let shared = mesh.edge_between(VertexId::new(0), VertexId::new(1)).unwrap();
        let [h1, h2] = mesh.edge(shared).halfedges;
        assert!(mesh.face_of(h1).is_valid());
        assert!(mesh.face_of(h2).is_valid());
        assert_eq!(mesh.twin(h1), h2);
    }

    #[test]
    fn test_exterior_loop_closes() {
        let (vertices, faces) = two_quads();
        let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
        assert!(mesh.is_valid());

        let exterior: Vec<HalfEdgeId> = mesh
            .halfedge_ids()
            .filter(|&h| mesh.halfedge(h).is_boundary())
            .collect();
        assert_eq!(exterior.len(), 6);

        // All six exterior half-edges form a single loop.
        let walked: Vec<HalfEdgeId> = mesh.halfedge_loop(exterior[0]).collect();
        assert_eq!(walked.len(), 6);
        for h in walked {
            assert!(mesh.halfedge(h).is_boundary());
        }
    }

    #[test]
    fn test_closed_mesh_has_no_exterior() {
        let (vertices, faces) = tetrahedron();
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());
        assert!(mesh.halfedge_ids().all(|h| !mesh.halfedge(h).is_boundary()));
    }

    #[test]
    fn test_face_halfedges_follow_face() {
        let (vertices, faces) = tetrahedron();
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        for f in mesh.face_ids() {
            let face = mesh.face(f);
            let ring: Vec<HalfEdgeId> = mesh.halfedge_loop(face.halfedges[0]).collect();
            assert_eq!(ring, face.halfedges);
            for (k, &h) in face.halfedges.iter().enumerate() {
                assert_eq!(mesh.halfedge(h).edge, face.edges[k]);
            }
        }
    }

    #[test]
    fn test_halfedge_between_is_directed() {
        let (vertices, faces) = single_triangle();
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        let forward = mesh
            .halfedge_between(VertexId::new(0), VertexId::new(1))
            .unwrap();
        let backward = mesh
            .halfedge_between(VertexId::new(1), VertexId::new(0))
            .unwrap();
        assert_eq!(mesh.face_of(forward), FaceId::new(0));
        assert!(!mesh.face_of(backward).is_valid());
        assert_eq!(mesh.twin(forward), backward);
        assert_eq!(mesh.halfedge_between(VertexId::new(0), VertexId::new(0)), None);
    }

    #[test]
    fn test_non_manifold_skips_half_edges() {
        // Three triangles on one edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let mut mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert!(!mesh.is_manifold());
        assert!(!mesh.has_halfedges());
        assert!(matches!(
            mesh.build_half_edges(),
            Err(MeshError::NonManifold { .. })
        ));
    }

    #[test]
    fn test_inconsistent_winding_skips_half_edges() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        // Both faces run 0 -> 1 along the shared edge
        let faces = vec![[0, 1, 2], [0, 1, 3]];
        let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert!(!mesh.has_halfedges());
        assert!(!mesh.is_manifold());
        assert_eq!(mesh.num_edges(), 5);
    }

    #[test]
    fn test_failed_half_edge_build_leaves_mesh_consistent() {
        let mut mesh: PolyMesh = PolyMesh::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ] {
            mesh.add_vertex(p);
        }
        mesh.add_face(vec![VertexId::new(0), VertexId::new(1), VertexId::new(2)]);
        mesh.add_face(vec![VertexId::new(0), VertexId::new(1), VertexId::new(3)]);

        mesh.build_edges();
        mesh.build_vertex_adjacency();
        mesh.build_edge_face_adjacency();
        mesh.build_face_face_adjacency();
        mesh.classify();
        assert!(mesh.is_manifold());

        assert!(matches!(
            mesh.build_half_edges(),
            Err(MeshError::NonManifold { .. })
        ));
        assert!(!mesh.is_manifold());
        assert!(!mesh.has_halfedges());
        for e in mesh.edge_ids() {
            assert!(mesh.edge(e).halfedges.iter().all(|h| !h.is_valid()));
        }
        for f in mesh.face_ids() {
            assert!(mesh.face(f).halfedges.is_empty());
        }
        assert_eq!(
            mesh.halfedge_between(VertexId::new(1), VertexId::new(2)),
            None
        );
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_annulus_has_two_exterior_loops() {
        // 3 x 3 quad grid without its center cell
        let mut vertices = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                if (i, j) == (1, 1) {
                    continue;
                }
                let v = j * 4 + i;
                faces.push([v, v + 1, v + 5, v + 4]);
            }
        }
        let mut mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
        assert!(mesh.is_manifold());
        assert!(mesh.is_valid());

        let exterior: Vec<HalfEdgeId> = mesh
            .halfedge_ids()
            .filter(|&h| mesh.halfedge(h).is_boundary())
            .collect();
        assert_eq!(exterior.len(), 16);

        let mut seen = std::collections::HashSet::new();
        let mut loop_sizes = Vec::new();
        for &h in &exterior {
            if seen.contains(&h) {
                continue;
            }
            let walked: Vec<HalfEdgeId> = mesh.halfedge_loop(h).collect();
            assert!(walked.iter().all(|&w| mesh.halfedge(w).is_boundary()));
            seen.extend(walked.iter().copied());
            loop_sizes.push(walked.len());
        }
        loop_sizes.sort_unstable();
        assert_eq!(loop_sizes, vec![4, 12]);

        assert_eq!(mesh.order_adjacency(), 0);
    }

    #[test]
    fn test_rebuild_after_moving_vertex() {
        let (vertices, faces) = single_triangle();
        let mut mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();

        mesh.set_position(VertexId::new(2), Point3::new(0.5, 3.0, 0.0));
        assert_eq!(mesh.info().bounding_box.unwrap().max.y, 1.0);

        mesh.rebuild().unwrap();
        let bb = mesh.info().bounding_box.unwrap();
        assert!((bb.max.y - 3.0).abs() < 1e-10);
        assert_eq!(mesh.num_halfedges(), 6);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let (vertices, faces) = two_quads();
        let first: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
        let mut second = first.clone();
        second.rebuild().unwrap();

        assert_eq!(first.num_halfedges(), second.num_halfedges());
        for h in first.halfedge_ids() {
            let a = first.halfedge(h);
            let b = second.halfedge(h);
            assert_eq!(a.origin, b.origin);
            assert_eq!(a.face, b.face);
            assert_eq!(a.next, b.next);
            assert_eq!(a.twin, b.twin);
        }
        for v in first.vertex_ids() {
            assert_eq!(first.vertex_neighbors(v), second.vertex_neighbors(v));
        }
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_quads();
        let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices.len(), out_verts.len());
        assert_eq!(out_faces, vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]]);
        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]];

        let result: Result<PolyMesh> = build_from_triangles(&vertices, &faces);
        assert_eq!(
            result.unwrap_err(),
            MeshError::InvalidVertexIndex { face: 0, vertex: 1 }
        );
    }
}
