//! Banded implementation of the diffusion reference solver
//!
//! The implicit Crank-Nicolson operator is tridiagonal, so its LU
//! factorization only has two nonzero bands as well. We compute it once with
//! Gaussian elimination (the Thomas algorithm) and then only perform the
//! linear-time forward and back substitutions on every time step. This is the
//! sparse counterpart of `compute_dense` and must produce the same results.
//!
//! No pivoting is performed. This is fine because the implicit operator is
//! diagonally dominant for any nonnegative diffusion coefficient.

use compute::{
    check_field,
    crank_nicolson::{CrankNicolson, Tridiagonal},
    Error, Result, SimulateBase, SimulateStep,
};
use data::{field::Field, parameters::Parameters, Precision};
use ndarray::{Array1, ArrayViewMut1};

/// Diffusion simulation with a pre-factored tridiagonal solver
pub struct Simulation {
    /// Simulation parameters
    params: Parameters,

    /// LU factorization of the implicit operator `A`
    implicit: TridiagonalLu,

    /// Explicit operator `B`
    explicit: Tridiagonal,
}
//
impl SimulateBase for Simulation {
    const NAME: &'static str = "compute_banded";

    fn new(params: Parameters) -> Result<Self> {
        let operators = CrankNicolson::new(&params)?;
        let implicit = TridiagonalLu::new(operators.implicit())?;
        log::debug!("Factorized {}-cell banded implicit operator", params.num_cells);
        Ok(Self {
            params,
            implicit,
            explicit: operators.explicit().clone(),
        })
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }
}
//
impl SimulateStep for Simulation {
    fn perform_step(&self, field: &mut Field) -> Result<()> {
        check_field(&self.params, field)?;

        // Compute the right-hand side B·u, then solve A·u' = B·u in place
        let mut rhs = Field::zeros(field.len());
        self.explicit.mul_into(field.view(), rhs.view_mut());
        self.implicit.solve_in_place(rhs.view_mut());
        *field = rhs;
        Ok(())
    }
}

/// LU factorization of a tridiagonal matrix
///
/// `L` is unit lower bidiagonal with `multipliers` below the diagonal, `U` is
/// upper bidiagonal with `pivots` on the diagonal and the original upper band
/// above it.
#[derive(Clone, Debug, PartialEq)]
struct TridiagonalLu {
    /// Subdiagonal of `L`: `multipliers[i]` sits at `(i + 1, i)`
    multipliers: Array1<Precision>,

    /// Diagonal of `U`
    pivots: Array1<Precision>,

    /// Superdiagonal of `U`, same as that of the factorized matrix
    upper: Array1<Precision>,
}
//
impl TridiagonalLu {
    /// Factorize a tridiagonal matrix, failing if a pivot vanishes
    fn new(matrix: &Tridiagonal) -> Result<Self> {
        let n = matrix.len();
        let mut multipliers = Array1::zeros(n.saturating_sub(1));
        let mut pivots = Array1::zeros(n);
        for row in 0..n {
            let pivot = if row == 0 {
                matrix.diagonal[0]
            } else {
                let multiplier = matrix.lower[row - 1] / pivots[row - 1];
                multipliers[row - 1] = multiplier;
                matrix.diagonal[row] - multiplier * matrix.upper[row - 1]
            };
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(Error::ZeroPivot { row });
            }
            pivots[row] = pivot;
        }
        Ok(Self {
            multipliers,
            pivots,
            upper: matrix.upper.clone(),
        })
    }

    /// Replace `rhs` with the solution `x` of `L·U·x = rhs`
    fn solve_in_place(&self, mut rhs: ArrayViewMut1<Precision>) {
        let n = self.pivots.len();
        debug_assert_eq!(rhs.len(), n);
        if n == 0 {
            return;
        }

        // Forward substitution: L·y = rhs
        for row in 1..n {
            rhs[row] -= self.multipliers[row - 1] * rhs[row - 1];
        }

        // Back substitution: U·x = y
        rhs[n - 1] /= self.pivots[n - 1];
        for row in (0..n - 1).rev() {
            rhs[row] = (rhs[row] - self.upper[row] * rhs[row + 1]) / self.pivots[row];
        }
    }
}
