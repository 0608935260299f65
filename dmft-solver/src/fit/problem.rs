// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::bath::{anderson, anderson_gradient, BathParameters};
use crate::spectral::FrequencyFunction;
use argmin::core::{CostFunction, Error, Gradient};
use ndarray::Array1;

/// The least-squares distance between a hybridization function and the Anderson function of a
/// bath, as a function of the flat bath parameter vector
pub(crate) struct BathFitProblem<'a> {
    gamma: &'a FrequencyFunction,
}

impl<'a> BathFitProblem<'a> {
    pub(crate) fn new(gamma: &'a FrequencyFunction) -> Self {
        Self { gamma }
    }

    pub(crate) fn distance(&self, bath: &BathParameters) -> f64 {
        (0..self.gamma.total_matsubaras())
            .map(|index| {
                let z = self.gamma.grid().imaginary_frequency(index);
                (self.gamma[index] - anderson(bath, z)).norm_sqr()
            })
            .sum()
    }

    // d/dp |Γ - A|² = -2 Re(conj(Γ - A) ∂A/∂p)
    pub(crate) fn distance_gradient(&self, bath: &BathParameters) -> Array1<f64> {
        let mut gradient = Array1::zeros(bath.as_array().len());
        for index in 0..self.gamma.total_matsubaras() {
            let z = self.gamma.grid().imaginary_frequency(index);
            let residual = (self.gamma[index] - anderson(bath, z)).conj();
            for (total, derivative) in gradient
                .iter_mut()
                .zip(anderson_gradient(bath, z).into_iter())
            {
                *total -= 2. * (residual * derivative).re;
            }
        }
        gradient
    }
}

impl CostFunction for BathFitProblem<'_> {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.distance(&BathParameters::new(param.clone())))
    }
}

impl Gradient for BathFitProblem<'_> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.distance_gradient(&BathParameters::new(param.clone())))
    }
}

#[cfg(test)]
mod test {
    use super::BathFitProblem;
    use crate::bath::{anderson, BathParameters};
    use crate::spectral::{FrequencyFunction, MatsubaraGrid};
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn distance_vanishes_at_the_generating_bath() {
        let bath = BathParameters::new(array![0.6, -0.2, 0.4, 0.9]);
        let grid = MatsubaraGrid::new(20., 16);
        let gamma = FrequencyFunction::from_fn(grid, |index, _| {
            anderson(&bath, grid.imaginary_frequency(index))
        });
        let problem = BathFitProblem::new(&gamma);
        assert_relative_eq!(problem.distance(&bath), 0.);
        assert!(problem.distance_gradient(&bath).iter().all(|g| g.abs() < 1e-14));
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let grid = MatsubaraGrid::new(10., 8);
        let target = BathParameters::new(array![0.5, 0.3]);
        let gamma = FrequencyFunction::from_fn(grid, |index, _| {
            anderson(&target, grid.imaginary_frequency(index))
        });
        let problem = BathFitProblem::new(&gamma);
        let point = array![0.2, -0.4];
        let gradient = problem.distance_gradient(&BathParameters::new(point.clone()));
        let step = 1e-6;
        for index in 0..point.len() {
            let mut forward = point.clone();
            forward[index] += step;
            let mut backward = point.clone();
            backward[index] -= step;
            let difference = (problem.distance(&BathParameters::new(forward))
                - problem.distance(&BathParameters::new(backward)))
                / (2. * step);
            assert_relative_eq!(gradient[index], difference, epsilon = 1e-6);
        }
    }
}
