// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{IntegrationRule, SpectralDiscretisation};
use std::ops::Range;

/// Builder for an `EnergySpace`, the range and rule must be attached before building
pub struct EnergySpaceBuilder<EnergyRange, IntegrationMethod> {
    number_of_points: usize,
    energy_range: EnergyRange,
    integration_rule: IntegrationMethod,
}

impl EnergySpaceBuilder<(), ()> {
    /// Initialise an empty EnergySpaceBuilder
    pub fn new() -> Self {
        Self {
            number_of_points: crate::constants::DEFAULT_QUADRATURE_POINTS,
            energy_range: (),
            integration_rule: (),
        }
    }
}

impl Default for EnergySpaceBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<EnergyRange, IntegrationMethod> EnergySpaceBuilder<EnergyRange, IntegrationMethod> {
    /// Attach the rule used to generate the quadrature weights
    pub fn with_integration_rule(
        self,
        integration_rule: IntegrationRule,
    ) -> EnergySpaceBuilder<EnergyRange, IntegrationRule> {
        EnergySpaceBuilder {
            number_of_points: self.number_of_points,
            energy_range: self.energy_range,
            integration_rule,
        }
    }

    /// Set the number of quadrature points
    pub fn with_number_of_points(self, number_of_points: usize) -> Self {
        EnergySpaceBuilder {
            number_of_points,
            energy_range: self.energy_range,
            integration_rule: self.integration_rule,
        }
    }

    /// Attach the energy interval to integrate over
    pub fn with_energy_range(
        self,
        energy_range: Range<f64>,
    ) -> EnergySpaceBuilder<Range<f64>, IntegrationMethod> {
        EnergySpaceBuilder {
            number_of_points: self.number_of_points,
            energy_range,
            integration_rule: self.integration_rule,
        }
    }
}

impl EnergySpaceBuilder<Range<f64>, IntegrationRule> {
    /// Generate the quadrature points and weights
    pub fn build(self) -> EnergySpace {
        // Need an ordered range, or something upstream went wrong
        assert!(
            self.energy_range.end > self.energy_range.start,
            "the energy range must be ordered"
        );
        assert!(
            self.number_of_points >= 2,
            "at least two quadrature points are needed"
        );
        let (points, weights) = self.integration_rule.generate_points_and_weights(
            self.energy_range.start,
            self.energy_range.end,
            self.number_of_points,
        );
        EnergySpace {
            points,
            weights,
            integration_rule: self.integration_rule,
        }
    }
}

/// A discretised energy interval with its integration weights
#[derive(Clone, Debug)]
pub struct EnergySpace {
    points: Vec<f64>,
    weights: Vec<f64>,
    integration_rule: IntegrationRule,
}

impl EnergySpace {
    /// The rule which generated the weights
    pub fn integration_rule(&self) -> IntegrationRule {
        self.integration_rule
    }

    /// The quadrature abscissae
    pub fn points(&self) -> impl Iterator<Item = &f64> {
        self.points.iter()
    }

    /// The quadrature weights
    pub fn weights(&self) -> impl Iterator<Item = &f64> {
        self.weights.iter()
    }
}

impl SpectralDiscretisation for EnergySpace {
    fn number_of_points(&self) -> usize {
        self.points.len()
    }

    fn point_at(&self, index: usize) -> f64 {
        self.points[index]
    }

    fn weight_at(&self, index: usize) -> f64 {
        self.weights[index]
    }
}
