// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{ImpuritySolver, ImpuritySolverError};
use crate::bath::{BathParameters, ModelParams};
use crate::spectral::MatsubaraGrid;
use nalgebra::SymmetricEigen;
use ndarray::Array1;
use num_complex::Complex;

/// Diagonalises the single-particle cluster Hamiltonian
///
/// The impurity Green's function is the Lehmann sum over the cluster eigenstates
/// G_00(iω) = Σ_k |U_0k|² / (iω - λ_k).
pub struct ExactDiagonalization {
    grid: MatsubaraGrid,
    gimp: Option<Array1<Complex<f64>>>,
}

impl ExactDiagonalization {
    /// A solver evaluating the impurity Green's function on `grid`
    pub fn new(grid: MatsubaraGrid) -> Self {
        Self { grid, gimp: None }
    }
}

impl ImpuritySolver for ExactDiagonalization {
    #[tracing::instrument(name = "Exact diagonalization", level = "debug", skip_all)]
    fn solve(&mut self, bath: &BathParameters) -> Result<(), ImpuritySolverError> {
        let model = ModelParams::from(bath);
        let eigen = SymmetricEigen::new(model.hamiltonian());
        let weights = eigen
            .eigenvectors
            .row(0)
            .iter()
            .map(|amplitude| amplitude * amplitude)
            .collect::<Vec<_>>();

        let gimp = self
            .grid
            .iter_omegas()
            .map(|omega| {
                let z = Complex::new(0_f64, omega);
                weights
                    .iter()
                    .zip(eigen.eigenvalues.iter())
                    .fold(Complex::new(0_f64, 0_f64), |sum, (&weight, &lambda)| {
                        sum + weight / (z - lambda)
                    })
            })
            .collect::<Array1<_>>();
        self.gimp = Some(gimp);
        Ok(())
    }

    fn gimp(&self) -> &Array1<Complex<f64>> {
        self.gimp
            .as_ref()
            .expect("the impurity Green's function was requested before a successful solve")
    }
}
