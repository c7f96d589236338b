//! Crank-Nicolson discretization of 1-D diffusion with no-flux boundaries
//!
//! The scheme advances a field `u` by solving `A·u' = B·u`, where `A` is the
//! implicit half of the diffusion operator and `B` the explicit half. Both are
//! tridiagonal. Each cell exchanges particles with each of its neighbours, so
//! the diagonal coefficient of a cell is `1 ± α·k` where `k` is its neighbour
//! count. Edge cells have a single neighbour, which is the Neumann (zero flux)
//! boundary condition, and a lone cell has none, so it never changes.

use crate::Result;
use data::{field::FieldView, parameters::Parameters, Precision};
use ndarray::{Array1, ArrayViewMut1};

/// Square tridiagonal matrix
#[derive(Clone, Debug, PartialEq)]
pub struct Tridiagonal {
    /// Coefficients below the diagonal: `lower[i]` sits at `(i + 1, i)`
    pub lower: Array1<Precision>,

    /// Diagonal coefficients
    pub diagonal: Array1<Precision>,

    /// Coefficients above the diagonal: `upper[i]` sits at `(i, i + 1)`
    pub upper: Array1<Precision>,
}
//
impl Tridiagonal {
    /// Symmetric diffusion-like matrix with `1 + sign·α·k` on the diagonal and
    /// `-sign·α` between neighbours, `k` being the neighbour count of a cell
    fn diffusion(num_cells: usize, alpha: Precision, sign: Precision) -> Self {
        let coupling = sign * alpha;
        let diagonal = Array1::from_shape_fn(num_cells, |idx| {
            let neighbours = (idx > 0) as usize + (idx + 1 < num_cells) as usize;
            1.0 + coupling * neighbours as Precision
        });
        let off_diagonal = Array1::from_elem(num_cells.saturating_sub(1), -coupling);
        Self {
            lower: off_diagonal.clone(),
            diagonal,
            upper: off_diagonal,
        }
    }

    /// Matrix dimension
    pub fn len(&self) -> usize {
        self.diagonal.len()
    }

    /// Check if this is a 0x0 matrix
    pub fn is_empty(&self) -> bool {
        self.diagonal.is_empty()
    }

    /// Coefficient at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Precision {
        if row == col {
            self.diagonal[row]
        } else if row == col + 1 {
            self.lower[col]
        } else if col == row + 1 {
            self.upper[row]
        } else {
            0.0
        }
    }

    /// Compute `out = self · x`
    pub fn mul_into(&self, x: FieldView, mut out: ArrayViewMut1<Precision>) {
        let n = self.len();
        debug_assert_eq!(x.len(), n);
        debug_assert_eq!(out.len(), n);
        for row in 0..n {
            let mut acc = self.diagonal[row] * x[row];
            if row > 0 {
                acc += self.lower[row - 1] * x[row - 1];
            }
            if row + 1 < n {
                acc += self.upper[row] * x[row + 1];
            }
            out[row] = acc;
        }
    }
}

/// Crank-Nicolson operators for a given set of parameters
///
/// These are assembled once and never modified afterwards, so they can be
/// shared by any number of runs with the same parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CrankNicolson {
    /// Dimensionless coefficient `D·dt / (2·dx²)`
    alpha: Precision,

    /// Implicit side `A`
    implicit: Tridiagonal,

    /// Explicit side `B`
    explicit: Tridiagonal,
}
//
impl CrankNicolson {
    /// Validate the parameters and assemble the operators
    pub fn new(params: &Parameters) -> Result<Self> {
        params.validate()?;
        let alpha = params.alpha();
        log::debug!(
            "Assembling Crank-Nicolson operators for {} cells with alpha = {alpha}",
            params.num_cells
        );
        Ok(Self {
            alpha,
            implicit: Tridiagonal::diffusion(params.num_cells, alpha, 1.0),
            explicit: Tridiagonal::diffusion(params.num_cells, alpha, -1.0),
        })
    }

    /// Dimensionless coefficient `D·dt / (2·dx²)`
    pub fn alpha(&self) -> Precision {
        self.alpha
    }

    /// Implicit side `A`
    pub fn implicit(&self) -> &Tridiagonal {
        &self.implicit
    }

    /// Explicit side `B`
    pub fn explicit(&self) -> &Tridiagonal {
        &self.explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(num_cells: usize) -> Parameters {
        Parameters {
            num_cells,
            length: num_cells as Precision * 0.1,
            stimulus: 0..0,
            ..Parameters::default()
        }
    }

    #[test]
    fn neumann_corners() {
        let cn = CrankNicolson::new(&params(5)).unwrap();
        let alpha = cn.alpha();
        assert!((alpha - 0.5).abs() < 1e-12);

        let a = cn.implicit();
        let b = cn.explicit();
        assert_eq!(a.diagonal[0], 1.0 + alpha);
        assert_eq!(a.diagonal[2], 1.0 + 2.0 * alpha);
        assert_eq!(a.diagonal[4], 1.0 + alpha);
        assert_eq!(b.diagonal[0], 1.0 - alpha);
        assert_eq!(b.diagonal[2], 1.0 - 2.0 * alpha);
        assert_eq!(b.diagonal[4], 1.0 - alpha);
        assert_eq!(a.get(1, 0), -alpha);
        assert_eq!(a.get(0, 1), -alpha);
        assert_eq!(b.get(3, 4), alpha);
        assert_eq!(b.get(0, 2), 0.0);
    }

    #[test]
    fn rows_and_columns_sum_to_one() {
        let cn = CrankNicolson::new(&params(7)).unwrap();
        for matrix in [cn.implicit(), cn.explicit()] {
            for idx in 0..matrix.len() {
                let row: Precision = (0..matrix.len()).map(|col| matrix.get(idx, col)).sum();
                let col: Precision = (0..matrix.len()).map(|row| matrix.get(row, idx)).sum();
                assert!((row - 1.0).abs() < 1e-12, "row {idx} sums to {row}");
                assert!((col - 1.0).abs() < 1e-12, "column {idx} sums to {col}");
            }
        }
    }

    #[test]
    fn single_cell_is_identity() {
        let cn = CrankNicolson::new(&Parameters {
            stimulus: 0..1,
            ..params(1)
        })
        .unwrap();
        assert_eq!(cn.implicit().diagonal, array![1.0]);
        assert_eq!(cn.explicit().diagonal, array![1.0]);
        assert!(cn.implicit().lower.is_empty());
        assert!(cn.explicit().upper.is_empty());
    }

    #[test]
    fn product() {
        let cn = CrankNicolson::new(&params(3)).unwrap();
        let x = array![1.0, 0.0, 0.0];
        let mut out = Array1::zeros(3);
        cn.explicit().mul_into(x.view(), out.view_mut());
        let alpha = cn.alpha();
        assert_eq!(out, array![1.0 - alpha, alpha, 0.0]);
        assert!((out.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let result = CrankNicolson::new(&Parameters {
            time_step: 0.0,
            ..Parameters::default()
        });
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
