//! Polygon mesh store.
//!
//! [`PolyMesh`] owns flat arenas of vertices, edges, faces and half-edges.
//! All relations between entities are plain handles into those arenas.
//!
//! # Derived data
//!
//! Edges, adjacency tables, normals, status sets, global descriptors and the
//! half-edge structure are all derived from the face vertex loops. They are
//! produced by [`PolyMesh::rebuild`] (or the `build_from_*` constructors) and
//! must be rebuilt after the face list changes.
//!
//! # Half-edges
//!
//! Every face side gets one half-edge whose `face` is that face. A boundary
//! edge additionally gets one exterior half-edge whose `face` is invalid; the
//! exterior half-edges are linked by `next`/`prev` into closed loops, one per
//! boundary component. After construction every half-edge has a valid `twin`.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// Status of a vertex, set by the mesh classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexStatus {
    /// Lies on at least one boundary edge.
    pub boundary: bool,
    /// Its incident faces do not form a single fan or disk.
    pub non_manifold: bool,
    /// Has no adjacent vertex.
    pub isolated: bool,
}

/// Status of an edge, set by the mesh classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeStatus {
    /// Exactly one adjacent face.
    pub boundary: bool,
    /// Zero or more than two adjacent faces.
    pub non_manifold: bool,
}

/// Status of a face, set by the mesh classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceStatus {
    /// Touches a boundary edge.
    pub boundary: bool,
    /// Degenerate, or touches a non-manifold edge.
    pub non_manifold: bool,
}

/// A vertex of the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,
    /// Normalized sum of the adjacent face normals.
    pub normal: Vector3<f64>,
    /// Topological status.
    pub status: VertexStatus,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::z(),
            status: VertexStatus::default(),
        }
    }
}

/// An undirected edge between two vertices.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// End points, in the winding of the first face that produced the edge.
    pub vertices: [VertexId<I>; 2],
    /// The half-edges along this edge. The second one is invalid until it
    /// has been built.
    pub halfedges: [HalfEdgeId<I>; 2],
    /// Topological status.
    pub status: EdgeStatus,
}

impl<I: MeshIndex> Edge<I> {
    /// Create an edge without half-edges.
    pub fn new(v0: VertexId<I>, v1: VertexId<I>) -> Self {
        Self {
            vertices: [v0, v1],
            halfedges: [HalfEdgeId::invalid(), HalfEdgeId::invalid()],
            status: EdgeStatus::default(),
        }
    }

    /// The end point that is not `v`.
    #[inline]
    pub fn other(&self, v: VertexId<I>) -> VertexId<I> {
        if self.vertices[0] == v {
            self.vertices[1]
        } else {
            self.vertices[0]
        }
    }

    /// Check whether `v` is one of the end points.
    #[inline]
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.vertices[0] == v || self.vertices[1] == v
    }
}

/// A polygonal face.
#[derive(Debug, Clone)]
pub struct Face<I: MeshIndex = u32> {
    /// Vertex loop; its order defines the winding.
    pub vertices: Vec<VertexId<I>>,
    /// Edge `i` joins vertex `i` and vertex `i + 1` (cyclically).
    pub edges: Vec<EdgeId<I>>,
    /// Half-edge `i` starts at vertex `i`. Empty until half-edges are built.
    pub halfedges: Vec<HalfEdgeId<I>>,
    /// Unit normal.
    pub normal: Vector3<f64>,
    /// Topological status.
    pub status: FaceStatus,
}

impl<I: MeshIndex> Face<I> {
    /// Create a face from its vertex loop.
    pub fn new(vertices: Vec<VertexId<I>>) -> Self {
        Self {
            vertices,
            edges: Vec::new(),
            halfedges: Vec::new(),
            normal: Vector3::z(),
            status: FaceStatus::default(),
        }
    }

    /// Number of sides.
    #[inline]
    pub fn degree(&self) -> usize {
        self.vertices.len()
    }

    /// Local position of `v` in the vertex loop.
    #[inline]
    pub fn local_index(&self, v: VertexId<I>) -> Option<usize> {
        self.vertices.iter().position(|&u| u == v)
    }

    /// Vertex following local position `i`.
    #[inline]
    pub fn next_vertex(&self, i: usize) -> VertexId<I> {
        self.vertices[(i + 1) % self.vertices.len()]
    }

    /// Vertex preceding local position `i`.
    #[inline]
    pub fn prev_vertex(&self, i: usize) -> VertexId<I> {
        let n = self.vertices.len();
        self.vertices[(i + n - 1) % n]
    }

    /// Edge preceding local position `i` (joins the previous vertex and `i`).
    #[inline]
    pub fn prev_edge(&self, i: usize) -> EdgeId<I> {
        let n = self.edges.len();
        self.edges[(i + n - 1) % n]
    }
}

/// A directed half-edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge starts from.
    pub origin: VertexId<I>,
    /// The undirected edge this half-edge runs along.
    pub edge: EdgeId<I>,
    /// The face on the left. Invalid for exterior half-edges.
    pub face: FaceId<I>,
    /// Next half-edge around the face (or the exterior loop).
    pub next: HalfEdgeId<I>,
    /// Previous half-edge around the face (or the exterior loop).
    pub prev: HalfEdgeId<I>,
    /// The opposite half-edge on the same edge.
    pub twin: HalfEdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new(origin: VertexId<I>, edge: EdgeId<I>, face: FaceId<I>) -> Self {
        Self {
            origin,
            edge,
            face,
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
        }
    }

    /// Check if this is an exterior (boundary) half-edge.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// Adjacency tables derived from the face loops.
///
/// After [`PolyMesh::order_adjacency`] the per-vertex lists of every manifold,
/// non-isolated vertex are in counter-clockwise order.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency<I: MeshIndex = u32> {
    pub(crate) vertex_vertices: Vec<Vec<VertexId<I>>>,
    pub(crate) vertex_edges: Vec<Vec<EdgeId<I>>>,
    pub(crate) vertex_faces: Vec<Vec<FaceId<I>>>,
    pub(crate) edge_faces: Vec<Vec<FaceId<I>>>,
    pub(crate) face_faces: Vec<Vec<FaceId<I>>>,
}

impl<I: MeshIndex> Default for Adjacency<I> {
    fn default() -> Self {
        Self {
            vertex_vertices: Vec::new(),
            vertex_edges: Vec::new(),
            vertex_faces: Vec::new(),
            edge_faces: Vec::new(),
            face_faces: Vec::new(),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Per-axis minimum.
    pub min: Point3<f64>,
    /// Per-axis maximum.
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Extent along each axis.
    pub fn dimensions(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// Approximate bounding sphere: centroid of the vertices and the largest
/// distance from it. Not a minimal enclosing sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Arithmetic mean of the vertex positions.
    pub center: Point3<f64>,
    /// Largest distance from the center to a vertex.
    pub radius: f64,
}

/// Face-degree classification of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshKind {
    /// All faces are triangles.
    #[default]
    Triangle,
    /// All faces are quads.
    Quad,
    /// Triangles and quads only, both present.
    Mixed,
    /// At least one face is neither a triangle nor a quad.
    Polygon,
}

/// Global descriptors of a mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshInfo {
    /// Number of connected components of the vertex graph.
    pub components: usize,
    /// Total edge length over edge count; `None` without edges.
    pub average_edge_length: Option<f64>,
    /// `None` for a mesh without vertices.
    pub bounding_box: Option<BoundingBox>,
    /// `None` for a mesh without vertices.
    pub bounding_sphere: Option<BoundingSphere>,
    /// Face-degree classification.
    pub kind: MeshKind,
    /// No non-manifold edge, vertex or face was found.
    pub manifold: bool,
}

/// A polygon mesh with derived topology.
#[derive(Debug, Clone)]
pub struct PolyMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) adjacency: Adjacency<I>,
    pub(crate) info: MeshInfo,
}

impl<I: MeshIndex> Default for PolyMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            halfedges: Vec::new(),
            adjacency: Adjacency::default(),
            info: MeshInfo::default(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            faces: Vec::with_capacity(num_faces),
            ..Self::new()
        }
    }

    // ==================== Counts ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of half-edges, exterior ones included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Check whether the half-edge structure has been built.
    #[inline]
    pub fn has_halfedges(&self) -> bool {
        !self.halfedges.is_empty()
    }

    // ==================== Accessors ====================

    /// Get a vertex by handle.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get an edge by handle.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face by handle.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a half-edge by handle.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    ///
    /// Normals and descriptors are not refreshed until [`rebuild`](Self::rebuild).
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertices[v.index()].position = pos;
    }

    /// Global descriptors computed by the last rebuild.
    #[inline]
    pub fn info(&self) -> &MeshInfo {
        &self.info
    }

    /// Check whether the last rebuild found the mesh manifold.
    #[inline]
    pub fn is_manifold(&self) -> bool {
        self.info.manifold
    }

    // ==================== Half-edge navigation ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        let h = self.halfedge(he);
        self.edge(h.edge).other(h.origin)
    }

    /// Get the face of a half-edge (invalid for exterior half-edges).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    // ==================== Adjacency ====================

    /// Vertices adjacent to `v` (CCW once ordered).
    #[inline]
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> &[VertexId<I>] {
        &self.adjacency.vertex_vertices[v.index()]
    }

    /// Edges incident to `v` (CCW once ordered).
    #[inline]
    pub fn vertex_edges(&self, v: VertexId<I>) -> &[EdgeId<I>] {
        &self.adjacency.vertex_edges[v.index()]
    }

    /// Faces incident to `v` (CCW once ordered).
    #[inline]
    pub fn vertex_faces(&self, v: VertexId<I>) -> &[FaceId<I>] {
        &self.adjacency.vertex_faces[v.index()]
    }

    /// Faces adjacent to an edge.
    #[inline]
    pub fn edge_faces(&self, e: EdgeId<I>) -> &[FaceId<I>] {
        &self.adjacency.edge_faces[e.index()]
    }

    /// Faces sharing an edge with `f`.
    #[inline]
    pub fn face_faces(&self, f: FaceId<I>) -> &[FaceId<I>] {
        &self.adjacency.face_faces[f.index()]
    }

    /// The edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: VertexId<I>, b: VertexId<I>) -> Option<EdgeId<I>> {
        if a == b {
            return None;
        }
        self.vertex_edges(a)
            .iter()
            .copied()
            .find(|&e| self.edge(e).contains(b))
    }

    /// The half-edge running from `a` to `b`, if any.
    pub fn halfedge_between(&self, a: VertexId<I>, b: VertexId<I>) -> Option<HalfEdgeId<I>> {
        let e = self.edge_between(a, b)?;
        self.edge(e)
            .halfedges
            .iter()
            .copied()
            .filter(|he| he.is_valid())
            .find(|&he| self.origin(he) == a)
    }

    // ==================== Status queries ====================

    /// Check if a vertex lies on the boundary.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex(v).status.boundary
    }

    /// Check if a vertex is non-manifold.
    #[inline]
    pub fn is_non_manifold_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex(v).status.non_manifold
    }

    /// Check if a vertex has a single fan or disk of faces around it.
    #[inline]
    pub fn is_manifold_vertex(&self, v: VertexId<I>) -> bool {
        let status = self.vertex(v).status;
        !status.non_manifold && !status.isolated
    }

    /// Check if a vertex has no neighbors.
    #[inline]
    pub fn is_isolated_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex(v).status.isolated
    }

    /// Check if an edge lies on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        self.edge(e).status.boundary
    }

    /// Check if an edge is non-manifold.
    #[inline]
    pub fn is_non_manifold_edge(&self, e: EdgeId<I>) -> bool {
        self.edge(e).status.non_manifold
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex handles.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all edge handles.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face handles.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all half-edge handles.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over the half-edges of a loop, starting at `start` and
    /// following `next` until it returns to `start`.
    pub fn halfedge_loop(&self, start: HalfEdgeId<I>) -> HalfEdgeLoopIter<'_, I> {
        HalfEdgeLoopIter::new(self, start)
    }

    // ==================== Geometry ====================

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        let [a, b] = self.edge(e).vertices;
        (self.position(b) - self.position(a)).norm()
    }

    // ==================== Construction ====================

    /// Add a vertex and return its handle.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Add a face from its vertex loop and return its handle.
    ///
    /// Derived topology is stale until [`rebuild`](Self::rebuild) runs.
    pub fn add_face(&mut self, vertices: Vec<VertexId<I>>) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(vertices));
        id
    }

    // ==================== Validation ====================

    /// Check the half-edge invariants: `next`/`prev` are mutually inverse,
    /// `twin` is an involution joining the two sides of one edge, and every
    /// face lists half-edges that belong to it.
    pub fn is_valid(&self) -> bool {
        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::<I>::new(i);
            if !he.next.is_valid() || !he.prev.is_valid() || !he.twin.is_valid() {
                return false;
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return false;
            }
            let twin = self.halfedge(he.twin);
            if twin.twin != id || twin.edge != he.edge || twin.origin == he.origin {
                return false;
            }
            if self.origin(he.next) != self.dest(id) {
                return false;
            }
        }

        if self.has_halfedges() {
            for (i, face) in self.faces.iter().enumerate() {
                if face.halfedges.len() != face.vertices.len() {
                    return false;
                }
                for (k, &he) in face.halfedges.iter().enumerate() {
                    let h = self.halfedge(he);
                    if h.face.index() != i || h.origin != face.vertices[k] {
                        return false;
                    }
                }
            }
        }

        true
    }
}

/// Iterator following `next` pointers around a face or an exterior loop.
pub struct HalfEdgeLoopIter<'a, I: MeshIndex = u32> {
    mesh: &'a PolyMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> HalfEdgeLoopIter<'a, I> {
    fn new(mesh: &'a PolyMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for HalfEdgeLoopIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}
