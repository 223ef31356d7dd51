//! Constrained shortest paths along mesh edges.
//!
//! A Dijkstra search that only sees a caller-supplied subset of edges. The
//! search runs backward from the target and stops as soon as the source is
//! settled, so only the touched part of the mesh is recorded.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::mesh::{EdgeId, MeshIndex, PolyMesh, VertexId};

/// A path along mesh edges.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPath<I: MeshIndex = u32> {
    /// Vertices from source to target, both included.
    pub vertices: Vec<VertexId<I>>,
    /// Sum of Euclidean edge lengths.
    pub length: f64,
}

impl<I: MeshIndex> MeshPath<I> {
    /// Number of edges on the path.
    pub fn num_edges(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }
}

/// Entry in the search queue.
#[derive(Debug, Clone)]
struct QueueEntry {
    vertex: usize,
    distance: f64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Shortest path from `source` to `target` using only edges in `allowed`.
///
/// Edge weights are Euclidean lengths. Returns `None` when the source cannot
/// be reached from the target within the allowed edges. A path from a vertex
/// to itself is the single vertex with length zero.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use mscomplex::prelude::*;
/// use mscomplex::algo::shortest_path::shortest_path;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: PolyMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// let all: HashSet<EdgeId> = mesh.edge_ids().collect();
///
/// let path = shortest_path(&mesh, VertexId::new(1), VertexId::new(2), &all).unwrap();
/// assert_eq!(path.vertices, vec![VertexId::new(1), VertexId::new(2)]);
/// ```
pub fn shortest_path<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    source: VertexId<I>,
    target: VertexId<I>,
    allowed: &HashSet<EdgeId<I>>,
) -> Option<MeshPath<I>> {
    let n = mesh.num_vertices();
    if source.index() >= n || target.index() >= n {
        return None;
    }

    let mut distances: HashMap<usize, f64> = HashMap::new();
    let mut predecessors: HashMap<usize, usize> = HashMap::new();
    let mut heap = BinaryHeap::new();

    let (s, t) = (source.index(), target.index());
    distances.insert(t, 0.0);
    heap.push(QueueEntry {
        vertex: t,
        distance: 0.0,
    });

    let mut reached = false;
    while let Some(entry) = heap.pop() {
        let u = entry.vertex;
        let dist_u = entry.distance;

        // Skip stale entries
        if distances.get(&u).is_some_and(|&d| dist_u > d) {
            continue;
        }

        if u == s {
            reached = true;
            break;
        }

        let u_vertex: VertexId<I> = VertexId::new(u);
        let neighbors = mesh.vertex_neighbors(u_vertex);
        let edges = mesh.vertex_edges(u_vertex);
        for (&v_vertex, &e) in neighbors.iter().zip(edges) {
            if !allowed.contains(&e) {
                continue;
            }

            let v = v_vertex.index();
            let new_dist = dist_u + mesh.edge_length(e);
            if distances.get(&v).map_or(true, |&d| new_dist < d) {
                distances.insert(v, new_dist);
                predecessors.insert(v, u);
                heap.push(QueueEntry {
                    vertex: v,
                    distance: new_dist,
                });
            }
        }
    }

    if !reached {
        return None;
    }

    // Predecessors point toward the target, so following them from the
    // source yields the path in source-to-target order.
    let mut vertices = vec![source];
    let mut current = s;
    while current != t {
        current = *predecessors.get(&current)?;
        vertices.push(VertexId::new(current));
    }

    Some(MeshPath {
        vertices,
        length: distances.get(&s).copied().unwrap_or(0.0),
    })
}
