//! Per-vertex scalar fields with a strict vertex order.
//!
//! Critical point classification needs every pair of adjacent vertices to
//! compare strictly. Values closer than the field's epsilon are treated as
//! equal and ordered by a priority assigned per flat region.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};

/// Default tolerance below which two scalar values count as equal.
pub const DEFAULT_FLAT_EPSILON: f64 = 1e-8;

/// A scalar value per mesh vertex, with flat regions resolved.
#[derive(Debug, Clone)]
pub struct ScalarField {
    values: Vec<f64>,
    priorities: Vec<i64>,
    epsilon: f64,
}

impl ScalarField {
    /// Wrap per-vertex values and resolve flat regions over the mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values differs from the vertex count,
    /// a value is NaN or infinite, or `epsilon` is negative or not finite.
    pub fn new<I: MeshIndex>(mesh: &PolyMesh<I>, values: Vec<f64>, epsilon: f64) -> Result<Self> {
        if values.len() != mesh.num_vertices() {
            return Err(MeshError::FieldSizeMismatch {
                expected: mesh.num_vertices(),
                actual: values.len(),
            });
        }
        if let Some(bad) = values.iter().find(|x| !x.is_finite()) {
            return Err(MeshError::invalid_param(
                "values",
                bad,
                "every value must be finite",
            ));
        }
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(MeshError::invalid_param(
                "epsilon",
                epsilon,
                "must be finite and non-negative",
            ));
        }

        let priorities = resolve_flat_regions(mesh, &values, epsilon);
        Ok(Self {
            values,
            priorities,
            epsilon,
        })
    }

    /// Evaluate `f` at every vertex position.
    pub fn from_fn<I: MeshIndex, F>(mesh: &PolyMesh<I>, epsilon: f64, f: F) -> Result<Self>
    where
        F: Fn(&nalgebra::Point3<f64>) -> f64,
    {
        let values = mesh.vertex_ids().map(|v| f(mesh.position(v))).collect();
        Self::new(mesh, values, epsilon)
    }

    /// Raw value at `v`.
    #[inline]
    pub fn value<I: MeshIndex>(&self, v: VertexId<I>) -> f64 {
        self.values[v.index()]
    }

    /// Flat-region priority of `v`.
    #[inline]
    pub fn priority<I: MeshIndex>(&self, v: VertexId<I>) -> i64 {
        self.priorities[v.index()]
    }

    /// Tolerance used for flat regions.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of vertices covered.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the field covers no vertex.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Strict order of two vertices.
    ///
    /// Values differing by at least epsilon compare as numbers. Otherwise the
    /// flat-region priority decides, then the vertex handle.
    pub fn compare<I: MeshIndex>(&self, a: VertexId<I>, b: VertexId<I>) -> Ordering {
        let (va, vb) = (self.value(a), self.value(b));
        if (va - vb).abs() < self.epsilon {
            self.priority(a)
                .cmp(&self.priority(b))
                .then_with(|| a.index().cmp(&b.index()))
        } else {
            va.partial_cmp(&vb).unwrap_or(Ordering::Equal)
        }
    }
}

/// Assign priorities inside each maximal connected region of near-equal
/// values.
///
/// Regions are grown breadth-first in vertex order; within a region the
/// priorities follow visitation order starting at -1.
fn resolve_flat_regions<I: MeshIndex>(mesh: &PolyMesh<I>, values: &[f64], epsilon: f64) -> Vec<i64> {
    let n = mesh.num_vertices();
    let mut priorities = vec![0i64; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    let mut flat_regions = 0usize;

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);

        let mut priority = -1i64;
        while let Some(v) = queue.pop_front() {
            priorities[v] = priority;
            priority += 1;

            for u in mesh.vertex_neighbors(VertexId::<I>::new(v)) {
                let ui = u.index();
                if !visited[ui] && (values[v] - values[ui]).abs() < epsilon {
                    visited[ui] = true;
                    queue.push_back(ui);
                }
            }
        }

        if priority > 0 {
            flat_regions += 1;
        }
    }

    log::debug!("resolved {} flat regions over {} vertices", flat_regions, n);
    priorities
}
