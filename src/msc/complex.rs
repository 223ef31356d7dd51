//! The Morse-Smale complex: critical points joined by integration lines.

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};

use super::critical::{
    find_critical_points, CriticalPoint, CriticalPointNeighbor, CriticalPointOptions,
    CriticalPointSet,
};
use super::field::ScalarField;
use super::patch::QuadPatch;

/// A path of mesh vertices joining two critical points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationLine<I: MeshIndex = u32> {
    /// Critical point at `path[0]`.
    pub from: usize,
    /// Critical point at the last vertex of `path`.
    pub to: usize,
    /// Vertices from `from` to `to`.
    pub path: Vec<VertexId<I>>,
}

impl<I: MeshIndex> IntegrationLine<I> {
    /// The critical point at the other end from `point`.
    pub fn other(&self, point: usize) -> usize {
        if self.from == point {
            self.to
        } else {
            self.from
        }
    }

    /// The path walked starting at critical point `point`.
    pub fn path_from(&self, point: usize) -> Vec<VertexId<I>> {
        if self.from == point {
            self.path.clone()
        } else {
            self.path.iter().rev().copied().collect()
        }
    }

    /// The vertex one step away from critical point `point` along the line.
    fn first_step(&self, point: usize) -> VertexId<I> {
        if self.from == point {
            self.path[1]
        } else {
            self.path[self.path.len() - 2]
        }
    }
}

/// Critical points, the integration lines between them and the quad patches
/// they bound.
///
/// Integration lines are traced elsewhere and registered with
/// [`add_integration_line`](Self::add_integration_line). Each registration
/// adds a neighbor record at both ends; [`sort_neighbors_ccw`](Self::sort_neighbors_ccw)
/// then puts every point's records in the CCW order patch generation needs.
#[derive(Debug, Clone)]
pub struct MorseSmaleComplex<I: MeshIndex = u32> {
    pub(crate) points: Vec<CriticalPoint<I>>,
    pub(crate) point_index: Vec<Option<usize>>,
    pub(crate) lines: Vec<IntegrationLine<I>>,
    pub(crate) patches: Vec<QuadPatch<I>>,
}

impl<I: MeshIndex> Default for MorseSmaleComplex<I> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            point_index: Vec::new(),
            lines: Vec::new(),
            patches: Vec::new(),
        }
    }
}

impl<I: MeshIndex> MorseSmaleComplex<I> {
    /// Start a complex from classified critical points.
    pub fn new(set: CriticalPointSet<I>) -> Self {
        Self {
            points: set.points,
            point_index: set.index,
            lines: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Classify `field` over `mesh` and start a complex from the result.
    pub fn from_field(
        mesh: &PolyMesh<I>,
        field: &ScalarField,
        options: &CriticalPointOptions,
    ) -> Result<Self> {
        Ok(Self::new(find_critical_points(mesh, field, options)?))
    }

    /// Build a field from raw per-vertex values, using
    /// `options.flat_epsilon` for flat regions, and classify it.
    pub fn from_values(
        mesh: &PolyMesh<I>,
        values: Vec<f64>,
        options: &CriticalPointOptions,
    ) -> Result<(Self, ScalarField)> {
        let field = ScalarField::new(mesh, values, options.flat_epsilon)?;
        let msc = Self::from_field(mesh, &field, options)?;
        Ok((msc, field))
    }

    /// All critical points.
    pub fn critical_points(&self) -> &[CriticalPoint<I>] {
        &self.points
    }

    /// Critical point by position.
    pub fn critical_point(&self, point: usize) -> Result<&CriticalPoint<I>> {
        self.points
            .get(point)
            .ok_or(MeshError::UnknownCriticalPoint(point))
    }

    /// Position of the critical point at `v`, if `v` is critical.
    pub fn point_at(&self, v: VertexId<I>) -> Option<usize> {
        self.point_index.get(v.index()).copied().flatten()
    }

    /// All integration lines.
    pub fn integration_lines(&self) -> &[IntegrationLine<I>] {
        &self.lines
    }

    /// Integration line by handle.
    pub fn integration_line(&self, line: usize) -> Result<&IntegrationLine<I>> {
        self.lines
            .get(line)
            .ok_or(MeshError::UnknownIntegrationLine(line))
    }

    /// Quad patches found by the last patch generation.
    pub fn quad_patches(&self) -> &[QuadPatch<I>] {
        &self.patches
    }

    /// Number of critical points.
    pub fn num_critical_points(&self) -> usize {
        self.points.len()
    }

    /// Number of integration lines.
    pub fn num_integration_lines(&self) -> usize {
        self.lines.len()
    }

    /// Number of quad patches.
    pub fn num_quad_patches(&self) -> usize {
        self.patches.len()
    }

    /// Register an integration line from critical point `from` to `to`.
    ///
    /// `path` must start at the vertex of `from`, end at the vertex of `to`
    /// and hold at least two vertices. Returns the line handle.
    pub fn add_integration_line(
        &mut self,
        from: usize,
        to: usize,
        path: Vec<VertexId<I>>,
    ) -> Result<usize> {
        let from_vertex = self.critical_point(from)?.vertex;
        let to_vertex = self.critical_point(to)?.vertex;

        if from == to {
            return Err(MeshError::invalid_param(
                "to",
                to,
                "integration line must join two distinct critical points",
            ));
        }
        if path.len() < 2 {
            return Err(MeshError::invalid_param(
                "path",
                path.len(),
                "integration line needs at least two vertices",
            ));
        }

        let (first, last) = (path[0], path[path.len() - 1]);
        if first != from_vertex || last != to_vertex {
            return Err(MeshError::LineEndpointMismatch {
                from: from_vertex.index(),
                to: to_vertex.index(),
                first: first.index(),
                last: last.index(),
            });
        }

        let line = self.lines.len();
        self.lines.push(IntegrationLine { from, to, path });
        self.points[from]
            .neighbors
            .push(CriticalPointNeighbor { point: to, line });
        self.points[to]
            .neighbors
            .push(CriticalPointNeighbor { point: from, line });
        Ok(line)
    }

    /// Sort each critical point's neighbor records by the CCW 1-ring
    /// position of the first step of their line.
    ///
    /// Fails if a line's first step is not adjacent to its critical point.
    pub fn sort_neighbors_ccw(&mut self, mesh: &PolyMesh<I>) -> Result<()> {
        let lines = &self.lines;

        for (pi, cp) in self.points.iter_mut().enumerate() {
            let ring = mesh.vertex_neighbors(cp.vertex);

            let mut keyed = Vec::with_capacity(cp.neighbors.len());
            for nb in &cp.neighbors {
                let step = lines[nb.line].first_step(pi);
                let position = ring.iter().position(|&u| u == step).ok_or_else(|| {
                    MeshError::InvalidState(format!(
                        "integration line {} leaves vertex {} through non-adjacent vertex {}",
                        nb.line,
                        cp.vertex.index(),
                        step.index()
                    ))
                })?;
                keyed.push((position, *nb));
            }

            keyed.sort_by_key(|&(position, _)| position);
            cp.neighbors = keyed.into_iter().map(|(_, nb)| nb).collect();
        }

        Ok(())
    }
}
