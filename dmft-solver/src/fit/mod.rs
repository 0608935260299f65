// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Fit
//!
//! Approximates the continuous hybridization function of the lattice by the Anderson function of
//! a finite bath. The bath parameters minimise the least-squares distance
//!
//! Σ_i |Γ(iω_i) - A(bath, iω_i)|²
//!
//! over the Matsubara grid. Each fit starts from the result of the previous one.
mod problem;

use crate::bath::BathParameters;
use crate::spectral::FrequencyFunction;
use argmin::core::{Executor, State};
use argmin::solver::conjugategradient::{beta::PolakRibiere, NonlinearConjugateGradient};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use miette::Diagnostic;
use ndarray::Array1;
use problem::BathFitProblem;
use serde::Deserialize;

/// Controls for the minimizer
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct MinParams {
    /// Step used to build the initial simplex around the start point
    pub delta: f64,
    /// Curvature constant of the line search used by the gradient method
    pub delta2: f64,
    /// Convergence tolerance of the minimizer
    pub tolerance: f64,
    /// The largest number of minimizer iterations for a single fit
    pub max_iterations: usize,
}

impl Default for MinParams {
    fn default() -> Self {
        Self {
            delta: crate::constants::DEFAULT_DELTA,
            delta2: crate::constants::DEFAULT_DELTA2,
            tolerance: crate::constants::DEFAULT_FIT_TOLERANCE,
            max_iterations: crate::constants::DEFAULT_FIT_ITERATIONS,
        }
    }
}

/// The minimization algorithm used for the bath fit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum FitMethod {
    /// Derivative free Nelder-Mead simplex, converged when the spread of the vertex costs falls
    /// below the tolerance
    #[default]
    Simplex,
    /// Polak-Ribière nonlinear conjugate gradient using the analytic gradient, converged when the
    /// gradient norm falls below the tolerance
    ConjugateGradient,
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures of the minimizer. Running out of iterations is not one of them
pub enum FitError {
    #[error("Bath fit failed: {0}")]
    #[diagnostic(code(dmft::fit::minimizer))]
    /// The minimizer reported an error
    Minimizer(String),
    #[error("The minimizer did not return a best point")]
    #[diagnostic(code(dmft::fit::no_result))]
    /// The minimizer finished without recording a best point
    NoResult,
}

impl From<argmin::core::Error> for FitError {
    fn from(error: argmin::core::Error) -> Self {
        FitError::Minimizer(error.to_string())
    }
}

/// Summary of the most recent fit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitReport {
    /// The distance between Γ and the Anderson function at the returned bath
    pub cost: f64,
    /// The number of minimizer iterations performed
    pub iterations: u64,
    /// Whether the minimizer met its tolerance before running out of iterations
    pub converged: bool,
}

/// The starting guess used when no explicit initial bath is configured: every coupling equal
/// to `coupling` and the bath energies evenly spaced inside the band `(-w/2, w/2)`
pub fn initial_guess(n_bath: usize, w_over_two: f64, coupling: f64) -> BathParameters {
    let spacing = 2. * w_over_two / (n_bath + 1) as f64;
    let couplings = vec![coupling; n_bath];
    let energies = (0..n_bath)
        .map(|alpha| -w_over_two + spacing * (alpha + 1) as f64)
        .collect::<Vec<_>>();
    BathParameters::from_couplings_and_energies(&couplings, &energies)
}

/// Fits bath parameters to a sequence of hybridization functions, warm starting each fit
pub struct BathFitter {
    min_params: MinParams,
    method: FitMethod,
    result: BathParameters,
    report: Option<FitReport>,
}

impl BathFitter {
    /// A fitter whose first fit starts from `initial`
    pub fn new(min_params: MinParams, method: FitMethod, initial: BathParameters) -> Self {
        Self {
            min_params,
            method,
            result: initial,
            report: None,
        }
    }

    /// The number of bath sites being fitted
    pub fn n_bath(&self) -> usize {
        self.result.n_bath()
    }

    /// The bath parameters from the last fit, or the start point before the first fit
    pub fn result(&self) -> &BathParameters {
        &self.result
    }

    /// The summary of the last fit
    pub fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    /// The minimizer controls
    pub fn min_params(&self) -> &MinParams {
        &self.min_params
    }

    /// Fit the bath to `gamma`, starting from the previous result
    #[tracing::instrument(name = "Bath fit", level = "debug", skip_all)]
    pub fn fit(&mut self, gamma: &FrequencyFunction) -> Result<&BathParameters, FitError> {
        let problem = BathFitProblem::new(gamma);

        if self.n_bath() == 0 {
            self.report = Some(FitReport {
                cost: problem.distance(&self.result),
                iterations: 0,
                converged: true,
            });
            return Ok(&self.result);
        }

        let start = self.result.as_array().clone();
        let (best, report) = match self.method {
            FitMethod::Simplex => self.simplex(problem, start)?,
            FitMethod::ConjugateGradient => self.conjugate_gradient(gamma, start)?,
        };

        if !report.converged {
            tracing::warn!(
                "Bath fit did not converge in {} iterations, keeping the best point with cost {}",
                report.iterations,
                report.cost
            );
        } else {
            tracing::debug!(
                "Bath fit converged in {} iterations with cost {}",
                report.iterations,
                report.cost
            );
        }

        self.result = BathParameters::new(best);
        self.report = Some(report);
        Ok(&self.result)
    }

    fn simplex(
        &self,
        problem: BathFitProblem<'_>,
        start: Array1<f64>,
    ) -> Result<(Array1<f64>, FitReport), FitError> {
        let mut vertices = vec![start.clone()];
        for coordinate in 0..start.len() {
            let mut vertex = start.clone();
            vertex[coordinate] += self.min_params.delta;
            vertices.push(vertex);
        }
        let solver = NelderMead::new(vertices).with_sd_tolerance(self.min_params.tolerance)?;
        let max_iterations = self.min_params.max_iterations as u64;
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(max_iterations))
            .run()?;

        let state = result.state();
        let best = state.get_best_param().ok_or(FitError::NoResult)?.clone();
        let iterations = state.get_iter();
        Ok((
            best,
            FitReport {
                cost: state.get_best_cost(),
                iterations,
                converged: iterations < max_iterations,
            },
        ))
    }

    fn conjugate_gradient(
        &self,
        gamma: &FrequencyFunction,
        start: Array1<f64>,
    ) -> Result<(Array1<f64>, FitReport), FitError> {
        let delta2 = self.min_params.delta2;
        let linesearch = MoreThuenteLineSearch::new().with_c(f64::min(1e-4, delta2 / 10.), delta2)?;
        let solver = NonlinearConjugateGradient::new(linesearch, PolakRibiere::new())
            .restart_iters(10)
            .restart_orthogonality(0.1);
        let max_iterations = self.min_params.max_iterations as u64;
        let result = Executor::new(BathFitProblem::new(gamma), solver)
            .configure(|state| state.param(start).max_iters(max_iterations))
            .run()?;

        let state = result.state();
        let best = state.get_best_param().ok_or(FitError::NoResult)?.clone();
        let gradient_norm = BathFitProblem::new(gamma)
            .distance_gradient(&BathParameters::new(best.clone()))
            .iter()
            .map(|g| g * g)
            .sum::<f64>()
            .sqrt();
        Ok((
            best,
            FitReport {
                cost: state.get_best_cost(),
                iterations: state.get_iter(),
                converged: gradient_norm < self.min_params.tolerance,
            },
        ))
    }
}

#[cfg(test)]
mod test {
    use super::{initial_guess, BathFitter, FitMethod, MinParams};
    use crate::bath::{anderson, BathParameters};
    use crate::spectral::{FrequencyFunction, MatsubaraGrid};
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use num_complex::Complex;

    fn hybridization_of(bath: &BathParameters, grid: MatsubaraGrid) -> FrequencyFunction {
        FrequencyFunction::from_fn(grid, |index, _| {
            anderson(bath, grid.imaginary_frequency(index))
        })
    }

    #[test]
    fn default_guess_spreads_the_energies_across_the_band() {
        let guess = initial_guess(3, 1., 0.5);
        assert_eq!(guess.couplings().to_vec(), vec![0.5; 3]);
        let energies = guess.energies().to_vec();
        assert_relative_eq!(energies[0], -0.5);
        assert_relative_eq!(energies[1], 0.);
        assert_relative_eq!(energies[2], 0.5);
    }

    #[test]
    fn simplex_recovers_a_single_site_bath() {
        let target = BathParameters::from_couplings_and_energies(&[0.4], &[0.3]);
        let grid = MatsubaraGrid::new(20., 32);
        let gamma = hybridization_of(&target, grid);
        let min_params = MinParams {
            delta: 0.1,
            tolerance: 1e-14,
            max_iterations: 2000,
            ..MinParams::default()
        };
        let mut fitter = BathFitter::new(min_params, FitMethod::Simplex, initial_guess(1, 1., 0.5));
        let bath = fitter.fit(&gamma).unwrap().clone();
        let report = *fitter.report().unwrap();

        assert!(report.converged);
        assert!(report.cost < 1e-8);
        assert_relative_eq!(bath.couplings()[0].powi(2), 0.16, epsilon = 1e-3);
        assert_relative_eq!(bath.energies()[0], 0.3, epsilon = 1e-3);
    }

    #[test]
    fn running_out_of_iterations_keeps_the_best_point() {
        let target = BathParameters::from_couplings_and_energies(&[0.4, 0.2], &[0.3, -0.6]);
        let grid = MatsubaraGrid::new(20., 32);
        let gamma = hybridization_of(&target, grid);
        let start = initial_guess(2, 1., 0.5);
        let min_params = MinParams {
            tolerance: 1e-14,
            max_iterations: 3,
            ..MinParams::default()
        };
        let mut fitter = BathFitter::new(min_params, FitMethod::Simplex, start.clone());
        let initial_cost = gamma
            .iter()
            .map(|(omega, value)| (value - anderson(&start, Complex::new(0., omega))).norm_sqr())
            .sum::<f64>();
        fitter.fit(&gamma).unwrap();
        let report = fitter.report().unwrap();

        assert!(!report.converged);
        assert_eq!(report.iterations, 3);
        assert!(report.cost <= initial_cost);
    }

    #[test]
    fn conjugate_gradient_lowers_the_cost() {
        let target = BathParameters::from_couplings_and_energies(&[0.4], &[0.3]);
        let grid = MatsubaraGrid::new(20., 32);
        let gamma = hybridization_of(&target, grid);
        let start = initial_guess(1, 1., 0.8);
        let initial_cost = gamma
            .iter()
            .map(|(omega, value)| (value - anderson(&start, Complex::new(0., omega))).norm_sqr())
            .sum::<f64>();
        let min_params = MinParams {
            max_iterations: 5,
            ..MinParams::default()
        };
        let mut fitter = BathFitter::new(min_params, FitMethod::ConjugateGradient, start);
        fitter.fit(&gamma).unwrap();

        assert!(fitter.report().unwrap().cost < initial_cost);
    }

    #[test]
    fn an_empty_bath_is_not_fitted() {
        let grid = MatsubaraGrid::new(10., 4);
        let gamma = FrequencyFunction::from_fn(grid, |_, omega| Complex::new(0., -1. / omega));
        let mut fitter = BathFitter::new(
            MinParams::default(),
            FitMethod::Simplex,
            BathParameters::new(Array1::zeros(0)),
        );
        assert_eq!(fitter.fit(&gamma).unwrap().n_bath(), 0);
        let report = fitter.report().unwrap();
        assert!(report.converged);
        let expected = gamma.values().iter().map(|g| g.norm_sqr()).sum::<f64>();
        assert_relative_eq!(report.cost, expected);
    }
}
