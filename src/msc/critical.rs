//! Critical point classification.
//!
//! Each vertex is compared with its ordered 1-ring under the strict order of
//! a [`ScalarField`]. Walking the ring, every change between "higher" and
//! "lower" neighbors is an alternation:
//!
//! | alternations | kind |
//! |---|---|
//! | 0 | minimum (all higher) or maximum (all lower) |
//! | 2 | regular |
//! | 4 | saddle |
//! | 6, 8, ... | multi-saddle, typed as saddle |
//!
//! The ring of a boundary vertex is linear. It is mirrored (the interior
//! neighbors are appended in reverse) before alternations are counted
//! cyclically, so a boundary vertex is classified like the center of the
//! doubled fan.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, VertexId};

use super::field::{ScalarField, DEFAULT_FLAT_EPSILON};

/// Morse type of a vertex.
///
/// Named by the usual Morse convention: a vertex below all its neighbors is a
/// `Minimum`, one above all of them a `Maximum`. Some tools label these the
/// other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    /// Exactly one rise and one fall around the vertex.
    Regular,
    /// Every neighbor is higher.
    Minimum,
    /// Every neighbor is lower.
    Maximum,
    /// Four or more alternations.
    Saddle,
}

impl PointKind {
    /// Check if this kind is a critical point.
    pub fn is_critical(self) -> bool {
        self != PointKind::Regular
    }
}

/// Classification of a single vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointClass {
    /// Resulting kind.
    pub kind: PointKind,
    /// Higher/lower alternations counted around the (mirrored) ring.
    pub alternations: usize,
}

/// One end of an integration line, seen from a critical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CriticalPointNeighbor {
    /// Critical point at the other end of the line.
    pub point: usize,
    /// The integration line.
    pub line: usize,
}

/// A critical vertex and the integration lines leaving it.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPoint<I: MeshIndex = u32> {
    /// Mesh vertex.
    pub vertex: VertexId<I>,
    /// Minimum, maximum or saddle.
    pub kind: PointKind,
    /// Alternation count that produced `kind`.
    pub alternations: usize,
    /// Neighbor records, in CCW order once sorted.
    pub neighbors: Vec<CriticalPointNeighbor>,
}

impl<I: MeshIndex> CriticalPoint<I> {
    /// Create a critical point without neighbors.
    pub fn new(vertex: VertexId<I>, kind: PointKind, alternations: usize) -> Self {
        Self {
            vertex,
            kind,
            alternations,
            neighbors: Vec::new(),
        }
    }

    /// Check if this is a saddle with more than four alternations.
    pub fn is_multi_saddle(&self) -> bool {
        self.kind == PointKind::Saddle && self.alternations > 4
    }
}

/// Options for critical point extraction.
#[derive(Debug, Clone)]
pub struct CriticalPointOptions {
    /// Tolerance for flat regions when the field is built from raw values.
    pub flat_epsilon: f64,

    /// Report saddles on the boundary as regular vertices.
    pub suppress_boundary_saddles: bool,

    /// Whether to classify vertices in parallel (default: false).
    pub parallel: bool,
}

impl Default for CriticalPointOptions {
    fn default() -> Self {
        Self {
            flat_epsilon: DEFAULT_FLAT_EPSILON,
            suppress_boundary_saddles: false,
            parallel: false,
        }
    }
}

impl CriticalPointOptions {
    /// Set the flat-region tolerance.
    pub fn with_flat_epsilon(mut self, epsilon: f64) -> Self {
        self.flat_epsilon = epsilon;
        self
    }

    /// Set whether boundary saddles are suppressed.
    pub fn with_suppress_boundary_saddles(mut self, suppress: bool) -> Self {
        self.suppress_boundary_saddles = suppress;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// All critical points of a field, with a lookup from mesh vertex.
#[derive(Debug, Clone)]
pub struct CriticalPointSet<I: MeshIndex = u32> {
    /// Critical points in vertex order.
    pub points: Vec<CriticalPoint<I>>,
    /// Position in `points` for each mesh vertex; `None` for regular vertices.
    pub index: Vec<Option<usize>>,
    /// Number of minima.
    pub num_minima: usize,
    /// Number of maxima.
    pub num_maxima: usize,
    /// Number of saddles, multi-saddles included.
    pub num_saddles: usize,
    /// Number of saddles with more than four alternations.
    pub num_multi_saddles: usize,
}

impl<I: MeshIndex> Default for CriticalPointSet<I> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            index: Vec::new(),
            num_minima: 0,
            num_maxima: 0,
            num_saddles: 0,
            num_multi_saddles: 0,
        }
    }
}

impl<I: MeshIndex> CriticalPointSet<I> {
    /// Assemble a set from already classified points on a mesh with
    /// `num_vertices` vertices.
    ///
    /// Regular points are dropped. Fails if a point lies outside the mesh.
    pub fn from_points(points: Vec<CriticalPoint<I>>, num_vertices: usize) -> Result<Self> {
        let mut set = Self {
            points: Vec::with_capacity(points.len()),
            index: vec![None; num_vertices],
            ..Self::default()
        };

        for cp in points.into_iter().filter(|cp| cp.kind.is_critical()) {
            let vi = cp.vertex.index();
            if vi >= num_vertices {
                return Err(MeshError::invalid_param(
                    "vertex",
                    vi,
                    "critical point outside the mesh",
                ));
            }

            match cp.kind {
                PointKind::Minimum => set.num_minima += 1,
                PointKind::Maximum => set.num_maxima += 1,
                PointKind::Saddle => {
                    set.num_saddles += 1;
                    if cp.is_multi_saddle() {
                        set.num_multi_saddles += 1;
                    }
                }
                PointKind::Regular => {}
            }

            set.index[vi] = Some(set.points.len());
            set.points.push(cp);
        }

        Ok(set)
    }

    /// Position of the critical point at `v`, if `v` is critical.
    pub fn point_at(&self, v: VertexId<I>) -> Option<usize> {
        self.index.get(v.index()).copied().flatten()
    }

    /// Number of critical points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no critical point was found.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minima plus maxima minus saddles, each saddle weighted by its
    /// multiplicity (`alternations / 2 - 1`).
    ///
    /// Equals the Euler characteristic for a closed surface.
    pub fn euler_characteristic(&self) -> i64 {
        let saddles: i64 = self
            .points
            .iter()
            .filter(|cp| cp.kind == PointKind::Saddle)
            .map(|cp| (cp.alternations / 2) as i64 - 1)
            .sum();
        (self.num_minima + self.num_maxima) as i64 - saddles
    }
}

/// Classify a single vertex against its 1-ring.
///
/// The mesh adjacency must be in CCW order (as left by mesh construction).
pub fn classify_vertex<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    field: &ScalarField,
    v: VertexId<I>,
    options: &CriticalPointOptions,
) -> PointClass {
    let ring = mesh.vertex_neighbors(v);
    if ring.is_empty() {
        return PointClass {
            kind: PointKind::Regular,
            alternations: 0,
        };
    }

    let mut higher: Vec<bool> = ring
        .iter()
        .map(|&u| field.compare(u, v) == Ordering::Greater)
        .collect();

    let boundary = mesh.is_boundary_vertex(v);
    if boundary && higher.len() > 2 {
        let interior: Vec<bool> = higher[1..higher.len() - 1].iter().rev().copied().collect();
        higher.extend(interior);
    }

    let n = higher.len();
    let alternations = (0..n).filter(|&k| higher[k] != higher[(k + 1) % n]).count();

    let kind = match alternations {
        0 if higher[0] => PointKind::Minimum,
        0 => PointKind::Maximum,
        2 => PointKind::Regular,
        _ if boundary && options.suppress_boundary_saddles => PointKind::Regular,
        _ => PointKind::Saddle,
    };

    PointClass { kind, alternations }
}

/// Classify every vertex of the mesh and collect the critical points.
///
/// # Errors
///
/// Returns [`MeshError::FieldSizeMismatch`] if the field does not cover the
/// mesh.
///
/// # Example
///
/// ```
/// use mscomplex::prelude::*;
/// use mscomplex::msc::{find_critical_points, CriticalPointOptions, ScalarField};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(-1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, -1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(0.0, 0.0, -1.0),
/// ];
/// let faces = vec![
///     [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
///     [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
/// ];
/// let mesh: PolyMesh = build_from_triangles(&vertices, &faces).unwrap();
/// let field = ScalarField::from_fn(&mesh, 1e-8, |p| p.z + 0.1 * p.x + 0.01 * p.y).unwrap();
///
/// let set = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();
/// assert_eq!((set.num_minima, set.num_maxima, set.num_saddles), (1, 1, 0));
/// ```
pub fn find_critical_points<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    field: &ScalarField,
    options: &CriticalPointOptions,
) -> Result<CriticalPointSet<I>> {
    let n = mesh.num_vertices();
    if field.len() != n {
        return Err(MeshError::FieldSizeMismatch {
            expected: n,
            actual: field.len(),
        });
    }

    let classes: Vec<PointClass> = if options.parallel {
        (0..n)
            .into_par_iter()
            .map(|i| classify_vertex(mesh, field, VertexId::new(i), options))
            .collect()
    } else {
        (0..n)
            .map(|i| classify_vertex(mesh, field, VertexId::new(i), options))
            .collect()
    };

    let points: Vec<CriticalPoint<I>> = classes
        .iter()
        .enumerate()
        .filter(|(_, class)| class.kind.is_critical())
        .map(|(i, class)| CriticalPoint::new(VertexId::new(i), class.kind, class.alternations))
        .collect();

    let set = CriticalPointSet::from_points(points, n)?;

    for cp in set.points.iter().filter(|cp| cp.is_multi_saddle()) {
        log::warn!(
            "multi-saddle at vertex {} with {} alternations",
            cp.vertex.index(),
            cp.alternations
        );
    }
    log::debug!(
        "found {} critical points: {} minima, {} maxima, {} saddles ({} multi)",
        set.len(),
        set.num_minima,
        set.num_maxima,
        set.num_saddles,
        set.num_multi_saddles
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, build_from_quads, build_from_triangles};
    use nalgebra::Point3;

    fn create_grid_mesh(n: usize) -> PolyMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = j * (n + 1) + i + 1;
                let v01 = (j + 1) * (n + 1) + i;
                let v11 = (j + 1) * (n + 1) + i + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn create_quad_grid(n: usize) -> PolyMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                faces.push([v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
            }
        }

        build_from_quads(&vertices, &faces).unwrap()
    }

    fn create_octahedron() -> PolyMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn height(mesh: &PolyMesh, f: impl Fn(&Point3<f64>) -> f64) -> ScalarField {
        ScalarField::from_fn(mesh, DEFAULT_FLAT_EPSILON, f).unwrap()
    }

    #[test]
    fn test_octahedron_height() {
        let mesh = create_octahedron();
        let field = height(&mesh, |p| p.z + 0.1 * p.x + 0.01 * p.y);
        let set = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();

        assert_eq!(set.num_maxima, 1);
        assert_eq!(set.num_minima, 1);
        assert_eq!(set.num_saddles, 0);
        assert_eq!(set.euler_characteristic(), 2);

        let top = set.point_at(VertexId::new(4)).unwrap();
        assert_eq!(set.points[top].kind, PointKind::Maximum);
        let bottom = set.point_at(VertexId::new(5)).unwrap();
        assert_eq!(set.points[bottom].kind, PointKind::Minimum);
        assert_eq!(set.point_at(VertexId::new(0)), None);
    }

    /// Closed cube surface, `n` x `n` cells per side split into triangles,
    /// wound outward.
    fn create_cube_mesh(n: usize) -> PolyMesh {
        let mut vertices = Vec::new();
        let mut lookup = std::collections::HashMap::new();
        let mut faces = Vec::new();

        for axis in 0..3 {
            let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
            for side in [0, n] {
                let mut id = |i: usize, j: usize| -> usize {
                    let mut key = [0usize; 3];
                    key[axis] = side;
                    key[b] = i;
                    key[c] = j;
                    *lookup.entry(key).or_insert_with(|| {
                        vertices.push(Point3::new(key[0] as f64, key[1] as f64, key[2] as f64));
                        vertices.len() - 1
                    })
                };
                for j in 0..n {
                    for i in 0..n {
                        let (v00, v10, v11, v01) = (id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1));
                        if side == n {
                            faces.push([v00, v10, v11]);
                            faces.push([v00, v11, v01]);
                        } else {
                            faces.push([v00, v11, v10]);
                            faces.push([v00, v01, v11]);
                        }
                    }
                }
            }
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_closed_surface_with_saddles() {
        let mesh = create_cube_mesh(4);
        assert_eq!(mesh.num_vertices(), 98);
        assert!(mesh.is_manifold());
        assert!(mesh.vertex_ids().all(|v| !mesh.is_boundary_vertex(v)));

        // The top face center has higher and lower neighbors on both axes.
        let field = height(&mesh, |p| {
            ((p.x - 2.0).powi(2) - (p.y - 2.0).powi(2)) * (p.z - 1.7)
        });
        let options = CriticalPointOptions::default();
        let set = find_critical_points(&mesh, &field, &options).unwrap();
        let top = mesh
            .vertex_ids()
            .find(|&v| *mesh.position(v) == Point3::new(2.0, 2.0, 4.0))
            .unwrap();
        assert_eq!(classify_vertex(&mesh, &field, top, &options).kind, PointKind::Saddle);
        assert!(set.num_saddles > 0);
        assert!(set.num_minima + set.num_maxima > 2);
        assert_eq!(set.euler_characteristic(), 2);

        let field = height(&mesh, |p| (p.x * 1.3).sin() * (p.y * 0.7).cos() + 0.1 * p.z);
        let set = find_critical_points(&mesh, &field, &options).unwrap();
        assert_eq!(set.euler_characteristic(), 2);
    }

    #[test]
    fn test_saddle_at_center() {
        let mesh = create_quad_grid(4);
        let field = height(&mesh, |p| (p.x - 2.0).powi(2) - (p.y - 2.0).powi(2));

        let center = VertexId::new(12);
        let class = classify_vertex(&mesh, &field, center, &CriticalPointOptions::default());
        assert_eq!(class.kind, PointKind::Saddle);
        assert_eq!(class.alternations, 4);

        let set = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();
        let idx = set.point_at(center).unwrap();
        assert_eq!(set.points[idx].kind, PointKind::Saddle);
        assert!(!set.points[idx].is_multi_saddle());
    }

    #[test]
    fn test_ramp_has_two_extrema() {
        let mesh = create_grid_mesh(4);
        let field = height(&mesh, |p| p.x + 2.0 * p.y);
        let set = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.num_minima, 1);
        assert_eq!(set.num_maxima, 1);
        assert_eq!(set.points[0].vertex, VertexId::new(0));
        assert_eq!(set.points[0].kind, PointKind::Minimum);
        assert_eq!(set.points[1].vertex, VertexId::new(24));
        assert_eq!(set.points[1].kind, PointKind::Maximum);
    }

    #[test]
    fn test_boundary_saddle_suppression() {
        let mesh = create_quad_grid(2);
        let field = height(&mesh, |p| (p.x - 1.0).powi(2) - p.y);
        let v = VertexId::new(1);
        assert!(mesh.is_boundary_vertex(v));

        let class = classify_vertex(&mesh, &field, v, &CriticalPointOptions::default());
        assert_eq!(class.kind, PointKind::Saddle);
        assert_eq!(class.alternations, 4);

        let options = CriticalPointOptions::default().with_suppress_boundary_saddles(true);
        let class = classify_vertex(&mesh, &field, v, &options);
        assert_eq!(class.kind, PointKind::Regular);
    }

    #[test]
    fn test_multi_saddle() {
        let mesh = create_grid_mesh(2);
        let center = VertexId::new(4);
        let ring: Vec<usize> = mesh.vertex_neighbors(center).iter().map(|v| v.index()).collect();
        assert_eq!(ring.len(), 6);

        // Alternate higher and lower around the center
        let mut values: Vec<f64> = (0..9).map(|i| 10.0 + i as f64).collect();
        values[4] = 0.0;
        for (k, &u) in ring.iter().enumerate() {
            values[u] = if k % 2 == 0 { 1.0 + k as f64 } else { -1.0 - k as f64 };
        }
        let field = ScalarField::new(&mesh, values, DEFAULT_FLAT_EPSILON).unwrap();

        let set = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();
        let idx = set.point_at(center).unwrap();
        assert_eq!(set.points[idx].kind, PointKind::Saddle);
        assert_eq!(set.points[idx].alternations, 6);
        assert!(set.points[idx].is_multi_saddle());
        assert!(set.num_multi_saddles >= 1);
    }

    #[test]
    fn test_flat_field_resolves() {
        let mesh = create_grid_mesh(3);
        let field = ScalarField::new(&mesh, vec![1.0; 16], DEFAULT_FLAT_EPSILON).unwrap();
        let set = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();

        // The region seed has the lowest priority
        let first = set.point_at(VertexId::new(0)).unwrap();
        assert_eq!(set.points[first].kind, PointKind::Minimum);
        assert!(set.num_maxima >= 1);
    }

    #[test]
    fn test_isolated_vertex_is_regular() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 0.0),
        ];
        let mesh: PolyMesh = build_from_polygons(&vertices, &[vec![0, 1, 2]]).unwrap();
        let field = ScalarField::new(&mesh, vec![0.0, 1.0, 2.0, -7.0], DEFAULT_FLAT_EPSILON).unwrap();

        let class = classify_vertex(
            &mesh,
            &field,
            VertexId::new(3),
            &CriticalPointOptions::default(),
        );
        assert_eq!(class.kind, PointKind::Regular);
    }

    #[test]
    fn test_field_size_mismatch() {
        let mesh = create_grid_mesh(1);
        let other = create_grid_mesh(2);
        let field = ScalarField::new(&other, vec![0.0; 9], DEFAULT_FLAT_EPSILON).unwrap();

        assert!(matches!(
            find_critical_points(&mesh, &field, &CriticalPointOptions::default()),
            Err(MeshError::FieldSizeMismatch { expected: 4, actual: 9 })
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = create_grid_mesh(6);
        let field = height(&mesh, |p| (p.x * 1.3).sin() * (p.y * 0.7).cos());

        let seq = find_critical_points(&mesh, &field, &CriticalPointOptions::default()).unwrap();
        let par = find_critical_points(
            &mesh,
            &field,
            &CriticalPointOptions::default().with_parallel(true),
        )
        .unwrap();

        assert_eq!(seq.points, par.points);
        assert_eq!(seq.index, par.index);
    }

    #[test]
    fn test_from_points_rejects_outside_vertex() {
        let points = vec![CriticalPoint::<u32>::new(VertexId::new(10), PointKind::Minimum, 0)];
        assert!(CriticalPointSet::from_points(points, 4).is_err());
    }
}
