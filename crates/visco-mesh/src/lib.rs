//! # visco-mesh
//!
//! One-dimensional adaptively refined interval mesh.
//!
//! ## Key Types
//!
//! - [`IntervalMesh`]: Cells as `(level, index)` pairs over a uniform base
//!   grid, with cached node coordinates.
//! - [`CellFlag`] / [`CellMap`]: Refinement marks and the old→new cell
//!   correspondence produced by [`adapt`].
//! - Field transfer across a topology change ([`transfer`]).
//! - gmsh 2.2 ASCII persistence ([`msh`]).

pub mod generators;
pub mod marking;
pub mod mesh;
pub mod msh;
pub mod refine;
pub mod transfer;

pub use mesh::{Cell, IntervalMesh, MAX_LEVEL};
pub use refine::{adapt, AdaptOutcome, CellFlag, CellMap, CellSource};
