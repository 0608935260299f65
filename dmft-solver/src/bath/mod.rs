// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Bath
//!
//! The discrete bath approximating the lattice seen by the impurity. A bath of `n` sites is
//! described by `2n` real numbers: the first `n` are the couplings V_α between the impurity
//! and bath site α, the last `n` the on-site energies e_α of the bath sites.
mod anderson;
mod model;

pub use anderson::{anderson, anderson_gradient};
pub use model::ModelParams;

use ndarray::{s, Array1, ArrayView1};
use std::fmt;

/// Couplings and energies of a discrete bath
#[derive(Clone, Debug, PartialEq)]
pub struct BathParameters(Array1<f64>);

impl BathParameters {
    /// Wrap a parameter vector, which must have an even length
    pub fn new(parameters: Array1<f64>) -> Self {
        assert!(
            parameters.len() % 2 == 0,
            "bath parameters hold a coupling and an energy per site, found an odd length {}",
            parameters.len()
        );
        Self(parameters)
    }

    /// Build from separate coupling and energy vectors of equal length
    pub fn from_couplings_and_energies(couplings: &[f64], energies: &[f64]) -> Self {
        assert_eq!(
            couplings.len(),
            energies.len(),
            "every bath site needs a coupling and an energy"
        );
        Self(couplings.iter().chain(energies.iter()).copied().collect())
    }

    /// The number of bath sites
    pub fn n_bath(&self) -> usize {
        self.0.len() / 2
    }

    /// The impurity to bath couplings V_α
    pub fn couplings(&self) -> ArrayView1<'_, f64> {
        self.0.slice(s![..self.n_bath()])
    }

    /// The bath on-site energies e_α
    pub fn energies(&self) -> ArrayView1<'_, f64> {
        self.0.slice(s![self.n_bath()..])
    }

    /// The flat parameter vector
    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    /// Consume into the flat parameter vector
    pub fn into_array(self) -> Array1<f64> {
        self.0
    }
}

/// Writes the couplings and then the energies, each group labelled and preceded by its length
impl fmt::Display for BathParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, group) in [("Couplings", self.couplings()), ("BathEnergies", self.energies())] {
            writeln!(f, "{}", label)?;
            writeln!(f, "{}", group.len())?;
            for value in group.iter() {
                match f.precision() {
                    Some(precision) => writeln!(f, "{:.*}", precision, value)?,
                    None => writeln!(f, "{}", value)?,
                }
            }
        }
        Ok(())
    }
}
