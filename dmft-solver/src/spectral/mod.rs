// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! This module provides the discrete frequency and energy spaces necessary to
//! scaffold the Green's functions and the density of states integrals
mod energy;
mod gauss;
mod matsubara;

pub use energy::{EnergySpace, EnergySpaceBuilder};
pub use matsubara::{FrequencyFunction, MatsubaraGrid};

/// A discretised real axis carrying an integration rule
pub trait SpectralDiscretisation: Send + Sync {
    /// The number of points in the discretisation
    fn number_of_points(&self) -> usize;
    /// The abscissa at `index`
    fn point_at(&self, index: usize) -> f64;
    /// The integration weight at `index`
    fn weight_at(&self, index: usize) -> f64;
    /// Iterate over the pairs of abscissa and weight
    fn iter_points_and_weights(&self) -> Box<dyn Iterator<Item = (f64, f64)> + '_> {
        Box::new((0..self.number_of_points()).map(|idx| (self.point_at(idx), self.weight_at(idx))))
    }
    /// Integrate a function sampled at every point of the discretisation
    fn integrate(&self, integrand: &[f64]) -> f64 {
        assert_eq!(
            integrand.len(),
            self.number_of_points(),
            "We can only integrate if the integrand is evaluated on-grid"
        );
        integrand
            .iter()
            .enumerate()
            .fold(0_f64, |sum, (idx, &point)| sum + point * self.weight_at(idx))
    }
}

/// Enum for discrete integration methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
pub enum IntegrationRule {
    /// Trapezium rule on a uniform grid
    Trapezium,
    /// Romberg (composite Simpson) integration on a uniform grid
    Romberg,
    /// Gauss-Legendre quadrature
    GaussLegendre,
}

impl IntegrationRule {
    /// Nodes and weights of the rule with `num_points` points on `[start, end]`
    pub(crate) fn generate_points_and_weights(
        &self,
        start: f64,
        end: f64,
        num_points: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        match self {
            IntegrationRule::GaussLegendre => {
                let (nodes, weights) = gauss::legendre(num_points);
                gauss::reseat(&nodes, &weights, start, end)
            }
            IntegrationRule::Trapezium | IntegrationRule::Romberg => {
                // Simpson weights need an even number of cells
                let num_points = match (self, num_points % 2) {
                    (IntegrationRule::Romberg, 0) => num_points + 1,
                    _ => num_points,
                };
                let step = (end - start) / (num_points - 1) as f64;
                let points = (0..num_points)
                    .map(|idx| start + step * idx as f64)
                    .collect();
                let weights = (0..num_points)
                    .map(|idx| step * self.uniform_weight(idx, num_points))
                    .collect();
                (points, weights)
            }
        }
    }

    // A closure generating the weight for a given point index on a uniform grid of unit spacing
    fn uniform_weight(&self, idx: usize, num_points: usize) -> f64 {
        match self {
            IntegrationRule::Trapezium => {
                if (idx == 0) | (idx == num_points - 1) {
                    0.5
                } else {
                    1.
                }
            }
            IntegrationRule::Romberg => {
                if (idx == 0) | (idx == num_points - 1) {
                    1. / 3.
                } else if idx % 2 == 0 {
                    2. / 3.
                } else {
                    4. / 3.
                }
            }
            IntegrationRule::GaussLegendre => unreachable!(),
        }
    }
}
