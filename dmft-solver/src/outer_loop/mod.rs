// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Outer loop
//!
//! The DMFT self-consistency. Each pass recomputes the lattice hybridization from the current
//! self-energy, fits a bath to it, solves the impurity problem for that bath and extracts a new
//! self-energy. The loop stops when the mean squared change of the self-energy falls below the
//! tolerance, or when the iteration budget is spent. Spending the budget is not an error.
mod convergence;
mod methods;

pub use convergence::Convergence;
pub use methods::{self_consistency_error, updated_self_energy, Outer};

use crate::fit::{BathFitter, FitError};
use crate::greens_functions::LatticeGreensFunction;
use crate::impurity::{ImpuritySolver, ImpuritySolverError};
use crate::spectral::FrequencyFunction;
use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures which abort the self-consistency loop
pub enum OuterLoopError {
    #[error(transparent)]
    #[diagnostic(code(dmft::outer_loop::fit))]
    /// The bath fit failed
    Fit(#[from] FitError),
    #[error(transparent)]
    #[diagnostic(code(dmft::outer_loop::impurity_solver))]
    /// The impurity solver failed
    ImpuritySolver(#[from] ImpuritySolverError),
    #[error("Failed to write progress: {0}")]
    #[diagnostic(code(dmft::outer_loop::progress))]
    /// Progress could not be written
    Progress(#[from] std::io::Error),
}

/// How the loop finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStatus {
    /// The error fell below the tolerance
    Converged,
    /// The iteration budget was spent first
    Exhausted,
}

/// The result of a completed loop
#[derive(Clone, Debug)]
pub struct LoopOutcome {
    /// How the loop finished
    pub status: LoopStatus,
    /// The zero-based index of the last pass performed
    pub iteration: usize,
    /// The error of the last pass
    pub error: f64,
    /// The self-energy after the last pass
    pub sigma: FrequencyFunction,
    /// The number of passes whose bath fit ran out of iterations
    pub unconverged_fits: usize,
}

/// Builder for the `DmftLoop`
pub struct DmftLoopBuilder<Lattice, Fitter, Solver, RefConvergence> {
    lattice: Lattice,
    fitter: Fitter,
    impurity_solver: Solver,
    convergence: RefConvergence,
}

impl DmftLoopBuilder<(), (), (), ()> {
    /// Initialise an empty DmftLoopBuilder
    pub fn new() -> Self {
        Self {
            lattice: (),
            fitter: (),
            impurity_solver: (),
            convergence: (),
        }
    }
}

impl Default for DmftLoopBuilder<(), (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Lattice, Fitter, Solver, RefConvergence>
    DmftLoopBuilder<Lattice, Fitter, Solver, RefConvergence>
{
    /// Attach the lattice Green's function, which the loop takes ownership of
    pub fn with_lattice(
        self,
        lattice: LatticeGreensFunction,
    ) -> DmftLoopBuilder<LatticeGreensFunction, Fitter, Solver, RefConvergence> {
        DmftLoopBuilder {
            lattice,
            fitter: self.fitter,
            impurity_solver: self.impurity_solver,
            convergence: self.convergence,
        }
    }

    /// Attach the bath fitter
    pub fn with_fitter(
        self,
        fitter: BathFitter,
    ) -> DmftLoopBuilder<Lattice, BathFitter, Solver, RefConvergence> {
        DmftLoopBuilder {
            lattice: self.lattice,
            fitter,
            impurity_solver: self.impurity_solver,
            convergence: self.convergence,
        }
    }

    /// Attach the impurity solver
    pub fn with_impurity_solver(
        self,
        impurity_solver: Box<dyn ImpuritySolver>,
    ) -> DmftLoopBuilder<Lattice, Fitter, Box<dyn ImpuritySolver>, RefConvergence> {
        DmftLoopBuilder {
            lattice: self.lattice,
            fitter: self.fitter,
            impurity_solver,
            convergence: self.convergence,
        }
    }

    /// Attach the stopping criteria
    pub fn with_convergence_settings(
        self,
        convergence: &Convergence,
    ) -> DmftLoopBuilder<Lattice, Fitter, Solver, &Convergence> {
        DmftLoopBuilder {
            lattice: self.lattice,
            fitter: self.fitter,
            impurity_solver: self.impurity_solver,
            convergence,
        }
    }
}

impl DmftLoopBuilder<LatticeGreensFunction, BathFitter, Box<dyn ImpuritySolver>, &Convergence> {
    /// Assemble the loop
    pub fn build(self) -> DmftLoop {
        DmftLoop {
            lattice: self.lattice,
            fitter: self.fitter,
            impurity_solver: self.impurity_solver,
            convergence: *self.convergence,
            unconverged_fits: 0,
        }
    }
}

/// The self-consistency loop and the state it carries between passes
pub struct DmftLoop {
    lattice: LatticeGreensFunction,
    fitter: BathFitter,
    impurity_solver: Box<dyn ImpuritySolver>,
    convergence: Convergence,
    unconverged_fits: usize,
}

impl DmftLoop {
    /// The lattice Green's function and hybridization from the last pass
    pub fn lattice(&self) -> &LatticeGreensFunction {
        &self.lattice
    }

    /// The bath fitter, holding the bath of the last pass
    pub fn fitter(&self) -> &BathFitter {
        &self.fitter
    }

    /// The impurity solver, holding the impurity Green's function of the last pass
    pub fn impurity_solver(&self) -> &dyn ImpuritySolver {
        self.impurity_solver.as_ref()
    }

    /// The stopping criteria
    pub fn convergence(&self) -> &Convergence {
        &self.convergence
    }
}

#[cfg(test)]
mod test {
    use super::{Convergence, DmftLoop, DmftLoopBuilder, LoopStatus, Outer, OuterLoopError};
    use crate::bath::BathParameters;
    use crate::density_of_states::DensityOfStates;
    use crate::fit::{initial_guess, BathFitter, FitMethod, MinParams};
    use crate::greens_functions::LatticeGreensFunctionBuilder;
    use crate::impurity::{ExactDiagonalization, ImpuritySolver, ImpuritySolverError};
    use crate::spectral::{FrequencyFunction, MatsubaraGrid};
    use ndarray::Array1;
    use num_complex::Complex;

    // Returns the free propagator 1/(iω) whatever the bath
    struct FreeImpurity {
        grid: MatsubaraGrid,
        gimp: Option<Array1<Complex<f64>>>,
    }

    impl ImpuritySolver for FreeImpurity {
        fn solve(&mut self, _bath: &BathParameters) -> Result<(), ImpuritySolverError> {
            self.gimp = Some(
                self.grid
                    .iter_omegas()
                    .map(|omega| Complex::new(0., omega).inv())
                    .collect(),
            );
            Ok(())
        }

        fn gimp(&self) -> &Array1<Complex<f64>> {
            self.gimp.as_ref().unwrap()
        }
    }

    fn dmft_loop(
        grid: MatsubaraGrid,
        solver: Box<dyn ImpuritySolver>,
        convergence: &Convergence,
    ) -> DmftLoop {
        let dos = DensityOfStates::new("semicircular", 1., 0.).unwrap();
        let lattice = LatticeGreensFunctionBuilder::new()
            .with_density_of_states(&dos)
            .with_matsubara_grid(grid)
            .build()
            .unwrap();
        DmftLoopBuilder::new()
            .with_lattice(lattice)
            .with_fitter(BathFitter::new(
                MinParams::default(),
                FitMethod::Simplex,
                initial_guess(1, 1., 0.5),
            ))
            .with_impurity_solver(solver)
            .with_convergence_settings(convergence)
            .build()
    }

    #[test]
    fn a_single_pass_reports_iteration_zero() {
        let grid = MatsubaraGrid::new(10., 8);
        let convergence = Convergence::new(1e-6, 1);
        let mut dmft = dmft_loop(grid, Box::new(FreeImpurity { grid, gimp: None }), &convergence);
        let mut progress = Vec::new();
        let outcome = dmft
            .run_loop(FrequencyFunction::zeros(grid), &mut progress)
            .unwrap();

        assert_eq!(outcome.iteration, 0);
        assert!(outcome.error.is_finite());
        assert!(outcome.error >= 0.);
        assert!(outcome
            .sigma
            .values()
            .iter()
            .all(|value| value.re.is_finite() && value.im.is_finite()));
        let progress = String::from_utf8(progress).unwrap();
        assert!(progress.starts_with("SelfConsistLoop iter= 0\nSelfConsistLoop error="));
    }

    #[test]
    fn exact_diagonalization_converges_on_the_first_pass() {
        // The cluster Green's function of a bath has no self-energy, so Σ stays at zero
        let grid = MatsubaraGrid::new(10., 8);
        let convergence = Convergence::new(1e-10, 5);
        let mut dmft = dmft_loop(grid, Box::new(ExactDiagonalization::new(grid)), &convergence);
        let outcome = dmft
            .run_loop(FrequencyFunction::zeros(grid), &mut std::io::sink())
            .unwrap();

        assert_eq!(outcome.status, LoopStatus::Converged);
        assert_eq!(outcome.iteration, 0);
        assert!(outcome.error < 1e-10);
    }

    #[test]
    fn another_pass_after_convergence_reproduces_the_error() {
        let grid = MatsubaraGrid::new(10., 8);
        let convergence = Convergence::new(1e-10, 5);
        let mut dmft = dmft_loop(grid, Box::new(ExactDiagonalization::new(grid)), &convergence);
        let outcome = dmft
            .run_loop(FrequencyFunction::zeros(grid), &mut std::io::sink())
            .unwrap();
        assert_eq!(outcome.status, LoopStatus::Converged);

        let (next, error) = dmft.single_iteration(&outcome.sigma).unwrap();
        assert!((error - outcome.error).abs() < 1e-12);
        assert!(dmft.is_loop_converged(error));
        for (a, b) in next.values().iter().zip(outcome.sigma.values().iter()) {
            assert!((a - b).norm() < 1e-6);
        }
    }

    #[test]
    fn spending_the_budget_is_not_an_error() {
        let grid = MatsubaraGrid::new(10., 8);
        let convergence = Convergence::new(0., 3);
        let mut dmft = dmft_loop(grid, Box::new(FreeImpurity { grid, gimp: None }), &convergence);
        let outcome = dmft
            .run_loop(FrequencyFunction::zeros(grid), &mut std::io::sink())
            .unwrap();

        assert_eq!(outcome.status, LoopStatus::Exhausted);
        assert_eq!(outcome.iteration, 2);
    }

    struct FailingImpurity;

    impl ImpuritySolver for FailingImpurity {
        fn solve(&mut self, _bath: &BathParameters) -> Result<(), ImpuritySolverError> {
            Err(ImpuritySolverError::IO(std::io::Error::new(
                std::io::ErrorKind::Other,
                "solver unavailable",
            )))
        }

        fn gimp(&self) -> &Array1<Complex<f64>> {
            unreachable!()
        }
    }

    #[test]
    fn solver_failures_abort_the_loop() {
        let grid = MatsubaraGrid::new(10., 4);
        let convergence = Convergence::new(1e-6, 3);
        let mut dmft = dmft_loop(grid, Box::new(FailingImpurity), &convergence);
        let result = dmft.run_loop(FrequencyFunction::zeros(grid), &mut std::io::sink());
        assert!(matches!(result, Err(OuterLoopError::ImpuritySolver(_))));
    }
}
