//! Sparse Cholesky solver backed by `faer`.
//!
//! The velocity system is the 1-D stiffness matrix of the current mesh:
//! symmetric positive definite and fixed for a mesh generation. It is
//! factorized when the velocity solver is built or reinitialized and
//! reused for every solve on that mesh.
//!
//! ## Workflow
//! 1. `factorize(dimension, triplets)`: assembles CSC, computes symbolic + numeric LLᵀ
//! 2. `solve(rhs)`: forward/backward substitution against the cached factor

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use visco_types::{ViscoError, ViscoResult};

/// Sparse Cholesky (LLᵀ) solver.
///
/// A zero-dimensional system (a single-cell mesh has no interior nodes)
/// is accepted and solves to an empty vector.
pub struct CholeskySolver {
    factorization: Option<Llt<usize, f64>>,
    dimension: usize,
}

impl CholeskySolver {
    /// Creates an unfactorized solver.
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    /// Factorizes the `dimension × dimension` matrix given as
    /// `(row, col, value)` triplets. Duplicate entries are summed.
    pub fn factorize(&mut self, dimension: usize, triplets: &[(usize, usize, f64)]) -> ViscoResult<()> {
        self.dimension = dimension;
        self.factorization = None;
        if dimension == 0 {
            return Ok(());
        }

        let triplets: Vec<Triplet<usize, usize, f64>> = triplets
            .iter()
            .map(|&(row, col, val)| Triplet { row, col, val })
            .collect();
        let csc = SparseColMat::try_new_from_triplets(dimension, dimension, &triplets)
            .map_err(|e| failure(format!("Failed to construct CSC matrix: {e:?}")))?;

        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| failure(format!("Symbolic analysis failed: {e:?}")))?;
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| failure(format!("Cholesky factorization failed: {e:?}")))?;

        self.factorization = Some(llt);
        Ok(())
    }

    /// Solves `A x = rhs` with the cached factorization.
    pub fn solve(&self, rhs: &[f64]) -> ViscoResult<Vec<f64>> {
        if rhs.len() != self.dimension {
            return Err(failure(format!(
                "RHS length ({}) != matrix dimension ({})",
                rhs.len(),
                self.dimension
            )));
        }
        if self.dimension == 0 {
            return Ok(Vec::new());
        }
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| failure("Solver not factorized. Call factorize() first.".into()))?;

        let rhs = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);
        let sol = llt.solve(&rhs);

        let x: Vec<f64> = (0..self.dimension).map(|i| sol[(i, 0)]).collect();
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(failure(format!("non-finite solution at unknown {i}")));
        }
        Ok(x)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for CholeskySolver {
    fn default() -> Self {
        Self::new()
    }
}

fn failure(message: String) -> ViscoError {
    ViscoError::SolverFailure(message)
}
