//! Counter-clockwise ordering of vertex 1-rings.
//!
//! After ordering, the adjacent faces, edges and vertices of every manifold,
//! non-isolated vertex run counter-clockwise (with respect to the face
//! winding). For an interior vertex the sequence is cyclic. For a boundary
//! vertex it is linear: it starts at the boundary neighbor from which the fan
//! opens and ends at the other boundary neighbor, so the vertex and edge lists
//! are one longer than the face list.

use super::index::{EdgeId, FaceId, MeshIndex, VertexId};
use super::polymesh::PolyMesh;
use crate::error::{MeshError, Result};

/// The ordered 1-ring of a vertex.
///
/// `vertices[k]` and `edges[k]` are the neighbor and edge on the clockwise
/// side of `faces[k]`; a boundary ring has one extra trailing vertex and edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRing<I: MeshIndex = u32> {
    /// Incident faces.
    pub faces: Vec<FaceId<I>>,
    /// Incident edges.
    pub edges: Vec<EdgeId<I>>,
    /// Adjacent vertices.
    pub vertices: Vec<VertexId<I>>,
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Reorder the adjacency lists of every manifold, non-isolated vertex
    /// into CCW order.
    ///
    /// Vertices whose faces do not form a single fan keep their raw order and
    /// are reported in the log. Returns the number of such vertices.
    pub fn order_adjacency(&mut self) -> usize {
        let mut unordered = 0;

        for vi in 0..self.num_vertices() {
            let v = VertexId::new(vi);
            let status = self.vertex(v).status;
            if status.non_manifold || status.isolated {
                continue;
            }

            match self.ordered_ring(v) {
                Ok(ring) => {
                    let adj = &mut self.adjacency;
                    adj.vertex_faces[vi] = ring.faces;
                    adj.vertex_edges[vi] = ring.edges;
                    adj.vertex_vertices[vi] = ring.vertices;
                }
                Err(err) => {
                    log::warn!("cannot order 1-ring of vertex {}: {}", vi, err);
                    unordered += 1;
                }
            }
        }

        unordered
    }

    /// Compute the CCW 1-ring of `v` from the current adjacency tables
    /// without modifying them.
    pub fn ordered_ring(&self, v: VertexId<I>) -> Result<VertexRing<I>> {
        let raw_faces = self.vertex_faces(v);
        let raw_edges = self.vertex_edges(v);
        let raw_vertices = self.vertex_neighbors(v);
        let m = raw_faces.len();

        if m == 0 {
            return Err(MeshError::InvalidState(format!(
                "vertex {} has no incident face",
                v.index()
            )));
        }
        if let Some(f) = raw_faces.iter().find(|f| self.face(**f).status.non_manifold) {
            return Err(MeshError::non_manifold(format!(
                "incident face {} is non-manifold",
                f.index()
            )));
        }

        let local = |f: FaceId<I>| -> Result<usize> {
            self.face(f).local_index(v).ok_or_else(|| {
                MeshError::InvalidState(format!(
                    "face {} does not contain vertex {}",
                    f.index(),
                    v.index()
                ))
            })
        };

        if m == 1 {
            let face = self.face(raw_faces[0]);
            let idx = local(raw_faces[0])?;
            if raw_vertices.len() != 2 || raw_edges.len() != 2 {
                return Err(MeshError::non_manifold("single face with extra neighbors"));
            }
            return Ok(VertexRing {
                faces: raw_faces.to_vec(),
                edges: vec![face.edges[idx], face.prev_edge(idx)],
                vertices: vec![face.next_vertex(idx), face.prev_vertex(idx)],
            });
        }

        let boundary = self.is_boundary_vertex(v);
        let start = if boundary {
            self.fan_start(v, raw_faces)?
        } else {
            0
        };

        let mut ring = VertexRing {
            faces: Vec::with_capacity(m),
            edges: Vec::with_capacity(raw_edges.len()),
            vertices: Vec::with_capacity(raw_vertices.len()),
        };
        let mut visited = vec![false; m];

        let first = self.face(raw_faces[start]);
        let idx = local(raw_faces[start])?;
        ring.faces.push(raw_faces[start]);
        ring.vertices.push(first.next_vertex(idx));
        ring.edges.push(first.edges[idx]);
        visited[start] = true;

        let mut current = start;
        for _ in 1..m {
            let face = self.face(raw_faces[current]);
            let idx = local(raw_faces[current])?;
            let prev = face.prev_vertex(idx);

            let next = (0..m)
                .find(|&j| !visited[j] && self.face(raw_faces[j]).vertices.contains(&prev))
                .ok_or_else(|| {
                    MeshError::non_manifold(format!(
                        "fan around vertex {} breaks after face {}",
                        v.index(),
                        raw_faces[current].index()
                    ))
                })?;

            ring.faces.push(raw_faces[next]);
            ring.vertices.push(prev);
            ring.edges.push(face.prev_edge(idx));
            visited[next] = true;
            current = next;
        }

        if boundary {
            if let Some(&last) = raw_vertices.iter().find(|u| !ring.vertices.contains(u)) {
                ring.vertices.push(last);
            }
            if let Some(&last) = raw_edges.iter().find(|e| !ring.edges.contains(e)) {
                ring.edges.push(last);
            }
        }

        if ring.vertices.len() != raw_vertices.len() || ring.edges.len() != raw_edges.len() {
            return Err(MeshError::non_manifold(format!(
                "1-ring of vertex {} is not a single fan",
                v.index()
            )));
        }

        Ok(ring)
    }

    /// Index (into `faces`) of the face that opens the fan of boundary
    /// vertex `v`: a boundary face whose outgoing side at `v` lies on the
    /// boundary and whose preceding vertex is shared with another incident
    /// face.
    fn fan_start(&self, v: VertexId<I>, faces: &[FaceId<I>]) -> Result<usize> {
        for (k, &f) in faces.iter().enumerate() {
            let face = self.face(f);
            if !face.status.boundary {
                continue;
            }
            let Some(idx) = face.local_index(v) else {
                continue;
            };
            if !self.is_boundary_edge(face.edges[idx]) {
                continue;
            }

            let prev = face.prev_vertex(idx);
            let continues = faces
                .iter()
                .enumerate()
                .any(|(j, &g)| j != k && self.face(g).vertices.contains(&prev));
            if continues {
                return Ok(k);
            }
        }

        Err(MeshError::non_manifold(format!(
            "no fan start at boundary vertex {}",
            v.index()
        )))
    }
}
