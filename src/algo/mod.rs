//! Mesh algorithms used by the Morse-Smale complex.
//!
//! - [`shortest_path`]: Dijkstra restricted to a subset of edges
//! - [`region`]: faces enclosed by a closed vertex loop

pub mod region;
pub mod shortest_path;

pub use region::inner_faces;
pub use shortest_path::{shortest_path, MeshPath};
