//! Morse-Smale complex of a scalar field on a mesh.
//!
//! # Pipeline
//!
//! 1. Wrap per-vertex values in a [`ScalarField`], which orders vertices
//!    strictly by resolving flat regions.
//! 2. Classify vertices with [`find_critical_points`] into minima, maxima
//!    and saddles.
//! 3. Start a [`MorseSmaleComplex`] from the critical points and register
//!    the integration lines traced between them.
//! 4. Sort neighbor records counter-clockwise and close quad patches with
//!    [`MorseSmaleComplex::generate_quad_patches`].
//!
//! # Example
//!
//! ```
//! use mscomplex::prelude::*;
//! use mscomplex::msc::{CriticalPointOptions, MorseSmaleComplex, ScalarField};
//! use nalgebra::Point3;
//!
//! let mut vertices = Vec::new();
//! for j in 0..5 {
//!     for i in 0..5 {
//!         vertices.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! let mut faces = Vec::new();
//! for j in 0..4 {
//!     for i in 0..4 {
//!         let v = j * 5 + i;
//!         faces.push([v, v + 1, v + 6, v + 5]);
//!     }
//! }
//! let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! let field = ScalarField::from_fn(&mesh, 1e-8, |p| {
//!     (p.x - 2.0).powi(2) - (p.y - 2.0).powi(2)
//! })
//! .unwrap();
//! let msc = MorseSmaleComplex::from_field(&mesh, &field, &CriticalPointOptions::default())
//!     .unwrap();
//! assert!(msc.point_at(VertexId::new(12)).is_some());
//! ```

mod complex;
mod critical;
mod field;
mod patch;

pub use complex::{IntegrationLine, MorseSmaleComplex};
pub use critical::{
    classify_vertex, find_critical_points, CriticalPoint, CriticalPointNeighbor,
    CriticalPointOptions, CriticalPointSet, PointClass, PointKind,
};
pub use field::{ScalarField, DEFAULT_FLAT_EPSILON};
pub use patch::{QuadPatch, QuadPatchOptions, QuadPatchReport};
