//! Dense implementation of the diffusion reference solver
//!
//! Both Crank-Nicolson operators are stored as full matrices and the implicit
//! one is LU-factorized up front. This ignores the tridiagonal structure
//! entirely, which makes it slow for large grids, but it is a straightforward
//! general-purpose direct solve that the other backends can be checked against.

use compute::{
    check_field, crank_nicolson::CrankNicolson, Error, Result, SimulateBase, SimulateStep,
};
use data::{field::Field, parameters::Parameters, Precision};
use nalgebra::{DMatrix, DVector, Dyn, LU};

/// Diffusion simulation with dense linear algebra
pub struct Simulation {
    /// Simulation parameters
    params: Parameters,

    /// LU factorization of the implicit operator `A`
    implicit_lu: LU<Precision, Dyn, Dyn>,

    /// Explicit operator `B`
    explicit: DMatrix<Precision>,
}
//
impl SimulateBase for Simulation {
    const NAME: &'static str = "compute_dense";

    fn new(params: Parameters) -> Result<Self> {
        let operators = CrankNicolson::new(&params)?;
        let n = params.num_cells;
        let implicit = DMatrix::from_fn(n, n, |row, col| operators.implicit().get(row, col));
        let explicit = DMatrix::from_fn(n, n, |row, col| operators.explicit().get(row, col));
        let implicit_lu = implicit.lu();
        if !implicit_lu.is_invertible() {
            return Err(Error::SingularMatrix);
        }
        log::debug!("Factorized {n}x{n} dense implicit operator");
        Ok(Self {
            params,
            implicit_lu,
            explicit,
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

        // Compute the right-hand side B·u
        let u = DVector::from_iterator(field.len(), field.iter().copied());
        let rhs = &self.explicit * u;

        // Solve A·u' = B·u
        let next = self.implicit_lu.solve(&rhs).ok_or(Error::SingularMatrix)?;
        for (out, &value) in field.iter_mut().zip(next.iter()) {
            *out = value;
        }
        Ok(())
    }
}
