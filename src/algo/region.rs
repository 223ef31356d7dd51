//! Regions of faces enclosed by vertex loops.

use std::collections::{HashSet, VecDeque};

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, MeshIndex, PolyMesh, VertexId};

/// Faces enclosed by a closed loop of vertices.
///
/// `boundary` lists the loop with its first vertex repeated at the end. The
/// region is the side to the left of the loop (the interior of a loop walked
/// counter-clockwise). Faces are grown breadth-first from the faces along the
/// loop without crossing it, and returned sorted by handle.
///
/// A loop edge traversed in both directions does not seed the fill, so a
/// back-and-forth loop such as `[a, b, a]` encloses no face.
///
/// # Errors
///
/// - [`MeshError::OpenLoop`] if the loop has fewer than three entries, is not
///   closed, or two consecutive vertices are not joined by a half-edge.
/// - [`MeshError::NonManifoldLoopVertex`] if a loop vertex is non-manifold.
/// - [`MeshError::MissingFace`] if a seed half-edge lies outside the mesh.
pub fn inner_faces<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    boundary: &[VertexId<I>],
) -> Result<Vec<FaceId<I>>> {
    if boundary.len() < 3 {
        return Err(MeshError::OpenLoop {
            details: format!("loop of {} vertices is not a closed loop", boundary.len()),
        });
    }
    if boundary.first() != boundary.last() {
        return Err(MeshError::OpenLoop {
            details: "first and last loop vertices differ".to_string(),
        });
    }
    if !mesh.has_halfedges() {
        return Err(MeshError::InvalidState(
            "mesh has no half-edge structure".to_string(),
        ));
    }
    if let Some(v) = boundary.iter().find(|v| mesh.is_non_manifold_vertex(**v)) {
        return Err(MeshError::NonManifoldLoopVertex { vertex: v.index() });
    }

    let mut loop_halfedges: Vec<HalfEdgeId<I>> = Vec::with_capacity(boundary.len() - 1);
    for pair in boundary.windows(2) {
        let he = mesh
            .halfedge_between(pair[0], pair[1])
            .ok_or_else(|| MeshError::OpenLoop {
                details: format!(
                    "no half-edge from vertex {} to vertex {}",
                    pair[0].index(),
                    pair[1].index()
                ),
            })?;
        loop_halfedges.push(he);
    }
    let on_loop: HashSet<HalfEdgeId<I>> = loop_halfedges.iter().copied().collect();

    let mut visited = vec![false; mesh.num_faces()];
    let mut faces = Vec::new();
    let mut queue = VecDeque::new();

    for (k, &he) in loop_halfedges.iter().enumerate() {
        if on_loop.contains(&mesh.twin(he)) {
            continue;
        }

        let seed = mesh.face_of(he);
        if !seed.is_valid() {
            return Err(MeshError::MissingFace {
                halfedge: he.index(),
                from: boundary[k].index(),
                to: boundary[k + 1].index(),
            });
        }
        if !visited[seed.index()] {
            visited[seed.index()] = true;
            queue.push_back(seed);
        }
    }

    while let Some(f) = queue.pop_front() {
        faces.push(f);
        for &he in &mesh.face(f).halfedges {
            if on_loop.contains(&he) {
                continue;
            }
            let across = mesh.face_of(mesh.twin(he));
            if across.is_valid() && !visited[across.index()] {
                visited[across.index()] = true;
                queue.push_back(across);
            }
        }
    }

    faces.sort();
    Ok(faces)
}
