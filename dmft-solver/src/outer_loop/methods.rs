// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{DmftLoop, LoopOutcome, LoopStatus, OuterLoopError};
use crate::bath::{anderson, BathParameters};
use crate::spectral::FrequencyFunction;
use ndarray::Array1;
use num_complex::Complex;
use std::io::Write;

/// The mean squared change between two self-energies, (1/N) Σ_i |a_i - b_i|²
pub fn self_consistency_error(previous: &FrequencyFunction, next: &FrequencyFunction) -> f64 {
    assert_eq!(
        previous.total_matsubaras(),
        next.total_matsubaras(),
        "self-energies must share a grid to be compared"
    );
    let sum = previous
        .values()
        .iter()
        .zip(next.values().iter())
        .map(|(a, b)| (a - b).norm_sqr())
        .sum::<f64>();
    sum / previous.total_matsubaras() as f64
}

/// The self-energy implied by the impurity Green's function of a bath,
/// Σ(iω) = iω - A(bath, iω) - 1 / gimp(iω), sampled on the grid of `like`
pub fn updated_self_energy(
    like: &FrequencyFunction,
    bath: &BathParameters,
    gimp: &Array1<Complex<f64>>,
) -> FrequencyFunction {
    assert_eq!(
        gimp.len(),
        like.total_matsubaras(),
        "the impurity Green's function must be sampled on the self-energy grid"
    );
    let grid = *like.grid();
    FrequencyFunction::from_fn(grid, |index, _| {
        let z = grid.imaginary_frequency(index);
        z - anderson(bath, z) - gimp[index].inv()
    })
}

/// The self-consistency iteration
pub trait Outer {
    /// Whether `error` meets the tolerance
    fn is_loop_converged(&self, error: f64) -> bool;
    /// Carry out a single pass, returning the new self-energy and its distance from `sigma`
    fn single_iteration(
        &mut self,
        sigma: &FrequencyFunction,
    ) -> Result<(FrequencyFunction, f64), OuterLoopError>;
    /// Iterate from `sigma` until converged or out of iterations, reporting progress to
    /// `progress`
    fn run_loop(
        &mut self,
        sigma: FrequencyFunction,
        progress: &mut dyn Write,
    ) -> Result<LoopOutcome, OuterLoopError>;
}

impl Outer for DmftLoop {
    fn is_loop_converged(&self, error: f64) -> bool {
        error < self.convergence.tolerance()
    }

    fn single_iteration(
        &mut self,
        sigma: &FrequencyFunction,
    ) -> Result<(FrequencyFunction, f64), OuterLoopError> {
        self.lattice.update(sigma);
        self.fitter.fit(self.lattice.gamma())?;
        if self.fitter.report().map_or(false, |report| !report.converged) {
            self.unconverged_fits += 1;
        }
        let bath = self.fitter.result();
        self.impurity_solver.solve(bath)?;

        let next = updated_self_energy(sigma, bath, self.impurity_solver.gimp());
        let error = self_consistency_error(sigma, &next);
        Ok((next, error))
    }

    #[tracing::instrument(name = "Self-consistency loop", skip_all)]
    fn run_loop(
        &mut self,
        mut sigma: FrequencyFunction,
        progress: &mut dyn Write,
    ) -> Result<LoopOutcome, OuterLoopError> {
        let mut iteration = 0;
        let mut error = f64::INFINITY;
        let mut status = LoopStatus::Exhausted;
        self.unconverged_fits = 0;

        while iteration < self.convergence.maximum_iterations() {
            writeln!(progress, "SelfConsistLoop iter= {}", iteration)?;
            tracing::info!("SelfConsistLoop iter= {}", iteration);

            let (next, next_error) = self.single_iteration(&sigma)?;
            sigma = next;
            error = next_error;

            writeln!(progress, "SelfConsistLoop error={}", error)?;
            tracing::info!("SelfConsistLoop error={}", error);

            if self.is_loop_converged(error) {
                status = LoopStatus::Converged;
                break;
            }
            iteration += 1;
        }

        match status {
            LoopStatus::Converged => {
                writeln!(progress, "Converged after {} iterations; error={}", iteration, error)?;
                tracing::info!("Converged after {} iterations; error={}", iteration, error);
            }
            LoopStatus::Exhausted => {
                // The counter has run one past the last pass
                iteration -= 1;
                writeln!(
                    progress,
                    "I did {} iterations; but error={} is greater than the tolerance={} that was requested",
                    iteration + 1,
                    error,
                    self.convergence.tolerance()
                )?;
                tracing::warn!(
                    "Self-consistency not reached after {} iterations: error={}, tolerance={}",
                    iteration + 1,
                    error,
                    self.convergence.tolerance()
                );
            }
        }
        if self.unconverged_fits > 0 {
            tracing::warn!(
                "{} bath fits stopped at the iteration limit",
                self.unconverged_fits
            );
        }

        Ok(LoopOutcome {
            status,
            iteration,
            error,
            sigma,
            unconverged_fits: self.unconverged_fits,
        })
    }
}
