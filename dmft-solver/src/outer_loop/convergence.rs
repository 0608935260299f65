// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::params::ParamsDmftSolver;

/// Stopping criteria for the self-consistency loop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    pub(crate) tolerance: f64,
    pub(crate) maximum_iterations: usize,
}

impl Convergence {
    /// The loop stops once the error drops below `tolerance`, or after `maximum_iterations`
    /// passes, which must be at least one
    pub fn new(tolerance: f64, maximum_iterations: usize) -> Self {
        assert!(
            maximum_iterations >= 1,
            "the self-consistency loop needs at least one iteration"
        );
        Self {
            tolerance,
            maximum_iterations,
        }
    }

    /// The error below which the loop has converged
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The largest number of passes
    pub fn maximum_iterations(&self) -> usize {
        self.maximum_iterations
    }
}

impl From<&ParamsDmftSolver> for Convergence {
    fn from(params: &ParamsDmftSolver) -> Self {
        Self::new(params.dmft_tolerance, params.dmft_iterations)
    }
}
