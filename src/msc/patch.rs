//! Quad patches of the Morse-Smale complex.
//!
//! Starting from every neighbor record of every saddle, the generator hops
//! from critical point to critical point, each time taking the line just
//! before the arriving one in the CCW neighbor order. Four hops that return
//! to the starting line close a quadrilateral. The same patch is reached from
//! each of its corners, so patches are deduplicated by their sorted line
//! handles.

use std::collections::HashSet;

use crate::algo::region::inner_faces;
use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, MeshIndex, PolyMesh, VertexId};

use super::complex::MorseSmaleComplex;
use super::critical::{CriticalPointNeighbor, PointKind};

/// A region bounded by four integration lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadPatch<I: MeshIndex = u32> {
    /// Boundary lines in walk order.
    pub lines: [usize; 4],
    /// Critical points in walk order; line `k` joins corner `k` and `k + 1`.
    pub corners: [usize; 4],
    /// Faces inside the patch, sorted. Empty if not computed.
    pub faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> QuadPatch<I> {
    /// Line handles in ascending order; equal for every walk of the patch.
    pub fn signature(&self) -> [usize; 4] {
        let mut sig = self.lines;
        sig.sort_unstable();
        sig
    }
}

/// Options for quad patch generation.
#[derive(Debug, Clone)]
pub struct QuadPatchOptions {
    /// Flood-fill the faces inside each patch (default: true).
    pub compute_inner_faces: bool,
}

impl Default for QuadPatchOptions {
    fn default() -> Self {
        Self {
            compute_inner_faces: true,
        }
    }
}

impl QuadPatchOptions {
    /// Set whether inner faces are computed.
    pub fn with_inner_faces(mut self, compute: bool) -> Self {
        self.compute_inner_faces = compute;
        self
    }
}

/// Outcome of a patch generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadPatchReport {
    /// Patches created.
    pub created: usize,
    /// Walks from a saddle that did not return to their first line.
    pub closure_failures: usize,
    /// Patches whose inner faces could not be found.
    pub inner_face_failures: usize,
}

impl<I: MeshIndex> MorseSmaleComplex<I> {
    /// The record reached by following `nb`: at critical point `nb.point`,
    /// the neighbor record preceding the one for line `nb.line`.
    pub fn next_neighbor(&self, nb: CriticalPointNeighbor) -> Result<CriticalPointNeighbor> {
        let records = &self.critical_point(nb.point)?.neighbors;
        let idx = records
            .iter()
            .position(|r| r.line == nb.line)
            .ok_or(MeshError::UnknownIntegrationLine(nb.line))?;
        Ok(records[(idx + records.len() - 1) % records.len()])
    }

    /// Replace the quad patches with those closed by walks from each saddle.
    ///
    /// Neighbor records must already be in CCW order (see
    /// [`sort_neighbors_ccw`](Self::sort_neighbors_ccw)). Walks that do not
    /// close, such as those along an open boundary, are logged and counted
    /// in the report.
    pub fn generate_quad_patches(
        &mut self,
        mesh: &PolyMesh<I>,
        options: &QuadPatchOptions,
    ) -> QuadPatchReport {
        let mut report = QuadPatchReport::default();
        let mut formed: HashSet<[usize; 4]> = HashSet::new();
        let mut patches = Vec::new();

        for (start, cp) in self.points.iter().enumerate() {
            if cp.kind != PointKind::Saddle {
                continue;
            }

            for &first in &cp.neighbors {
                let walk = match self.walk(first) {
                    Ok(walk) => walk,
                    Err(err) => {
                        log::warn!(
                            "patch walk from vertex {} failed: {}",
                            cp.vertex.index(),
                            err
                        );
                        report.closure_failures += 1;
                        continue;
                    }
                };

                if walk[4].line != walk[0].line {
                    let trace: Vec<usize> = walk
                        .iter()
                        .map(|nb| self.points[nb.point].vertex.index())
                        .collect();
                    log::warn!(
                        "quad patch does not close from saddle at vertex {}; visited {:?}",
                        cp.vertex.index(),
                        trace
                    );
                    report.closure_failures += 1;
                    continue;
                }

                let patch = QuadPatch {
                    lines: [walk[0].line, walk[1].line, walk[2].line, walk[3].line],
                    corners: [start, walk[0].point, walk[1].point, walk[2].point],
                    faces: Vec::new(),
                };
                if formed.insert(patch.signature()) {
                    patches.push(patch);
                }
            }
        }

        report.created = patches.len();
        self.patches = patches;

        if options.compute_inner_faces {
            for k in 0..self.patches.len() {
                let faces = self
                    .patch_boundary_loop(&self.patches[k])
                    .and_then(|boundary| inner_faces(mesh, &boundary));
                match faces {
                    Ok(faces) => self.patches[k].faces = faces,
                    Err(err) => {
                        log::warn!("cannot find inner faces for patch {}: {}", k, err);
                        report.inner_face_failures += 1;
                    }
                }
            }
        }

        log::debug!(
            "generated {} quad patches ({} open walks, {} without faces)",
            report.created,
            report.closure_failures,
            report.inner_face_failures
        );
        report
    }

    /// The closed vertex loop around a patch, first vertex repeated at the
    /// end, following the walk order of its lines.
    pub fn patch_boundary_loop(&self, patch: &QuadPatch<I>) -> Result<Vec<VertexId<I>>> {
        let mut boundary: Vec<VertexId<I>> = Vec::new();

        for (k, &l) in patch.lines.iter().enumerate() {
            let line = self.integration_line(l)?;
            let corner = patch.corners[k];
            if line.from != corner && line.to != corner {
                return Err(MeshError::OpenLoop {
                    details: format!(
                        "integration line {} does not touch corner {} of the patch",
                        l, corner
                    ),
                });
            }

            let path = line.path_from(corner);
            match boundary.last() {
                None => boundary.extend(path),
                Some(&last) if last == path[0] => boundary.extend(&path[1..]),
                Some(&last) => {
                    return Err(MeshError::OpenLoop {
                        details: format!(
                            "integration line {} starts at vertex {}, not {}",
                            l,
                            path[0].index(),
                            last.index()
                        ),
                    });
                }
            }
        }

        if boundary.first() != boundary.last() {
            return Err(MeshError::OpenLoop {
                details: "patch boundary does not return to its first corner".to_string(),
            });
        }
        Ok(boundary)
    }

    /// Four hops from `first`, returned with `first` as five records.
    fn walk(&self, first: CriticalPointNeighbor) -> Result<[CriticalPointNeighbor; 5]> {
        let mut walk = [first; 5];
        for k in 1..5 {
            walk[k] = self.next_neighbor(walk[k - 1])?;
        }
        Ok(walk)
    }
}
