// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Density of states
//!
//! The non-interacting lattice enters the self-consistency only through its density of states.

use crate::error::ConfigurationError;
use std::f64::consts::PI;
use std::str::FromStr;

/// Lattice models with a known density of states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatticeModel {
    /// The Bethe lattice in infinite dimensions
    Semicircular,
}

impl FromStr for LatticeModel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semicircular" => Ok(LatticeModel::Semicircular),
            _ => Err(ConfigurationError::UnsupportedDensityOfStates(s.to_string())),
        }
    }
}

/// A density of states with its integration bounds
#[derive(Clone, Copy, Debug)]
pub struct DensityOfStates {
    model: LatticeModel,
    w_over_two: f64,
    mu: f64,
}

impl DensityOfStates {
    /// Construct the density of states named `option`, failing for unsupported models
    pub fn new(option: &str, w_over_two: f64, mu: f64) -> Result<Self, ConfigurationError> {
        let model = option.parse()?;
        Ok(Self {
            model,
            w_over_two,
            mu,
        })
    }

    /// The model this density of states describes
    pub fn model(&self) -> LatticeModel {
        self.model
    }

    /// The lower band edge -w/2
    pub fn lower_bound(&self) -> f64 {
        -self.w_over_two
    }

    /// The upper limit of the lattice integrals, which is the chemical potential
    pub fn upper_bound(&self) -> f64 {
        self.mu
    }

    /// The support of the density of states `[-w/2, w/2]`
    pub fn support(&self) -> std::ops::Range<f64> {
        -self.w_over_two..self.w_over_two
    }

    /// The density of states at `energy`, zero outside of the band
    pub fn evaluate(&self, energy: f64) -> f64 {
        match self.model {
            LatticeModel::Semicircular => {
                let w_over_two_squared = self.w_over_two * self.w_over_two;
                let radicand = w_over_two_squared - energy * energy;
                if radicand <= 0_f64 {
                    return 0_f64;
                }
                2. * radicand.sqrt() / (w_over_two_squared * PI)
            }
        }
    }
}
