// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::BathParameters;
use nalgebra::{DMatrix, DVector};

/// The finite cluster described by a set of bath parameters
///
/// Site 0 is the impurity, site α + 1 is bath site α. The impurity sits at zero energy and
/// couples to every bath site, the bath sites are not coupled to one another.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelParams {
    sites: usize,
    potential_v: DVector<f64>,
    hoppings: DMatrix<f64>,
}

impl From<&BathParameters> for ModelParams {
    fn from(bath: &BathParameters) -> Self {
        let sites = bath.n_bath() + 1;
        let mut potential_v = DVector::zeros(sites);
        let mut hoppings = DMatrix::zeros(sites, sites);
        for (alpha, (&v, &e)) in bath
            .couplings()
            .iter()
            .zip(bath.energies().iter())
            .enumerate()
        {
            potential_v[alpha + 1] = e;
            hoppings[(0, alpha + 1)] = v;
            hoppings[(alpha + 1, 0)] = v;
        }
        Self {
            sites,
            potential_v,
            hoppings,
        }
    }
}

impl ModelParams {
    /// The number of sites in the cluster, the impurity included
    pub fn sites(&self) -> usize {
        self.sites
    }

    /// The on-site energies
    pub fn potential_v(&self) -> &DVector<f64> {
        &self.potential_v
    }

    /// The symmetric hopping matrix
    pub fn hoppings(&self) -> &DMatrix<f64> {
        &self.hoppings
    }

    /// The single-particle Hamiltonian of the cluster, diag(potential_v) + hoppings
    pub fn hamiltonian(&self) -> DMatrix<f64> {
        DMatrix::from_diagonal(&self.potential_v) + &self.hoppings
    }
}

#[cfg(test)]
mod test {
    use super::ModelParams;
    use crate::bath::BathParameters;
    use ndarray::Array1;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cluster_follows_the_bath_layout(
            couplings in proptest::collection::vec(-5_f64..5., 0..8),
            shift in -5_f64..5.,
        ) {
            let energies = couplings.iter().enumerate().map(|(idx, _)| shift + idx as f64).collect::<Vec<_>>();
            let bath = BathParameters::from_couplings_and_energies(&couplings, &energies);
            let model = ModelParams::from(&bath);
            let n_bath = couplings.len();

            prop_assert_eq!(model.sites(), n_bath + 1);
            prop_assert_eq!(model.potential_v()[0], 0.);
            prop_assert_eq!(model.hoppings(), &model.hoppings().transpose());
            for alpha in 0..n_bath {
                prop_assert_eq!(model.potential_v()[alpha + 1], energies[alpha]);
                prop_assert_eq!(model.hoppings()[(0, alpha + 1)], couplings[alpha]);
            }
            for row in 1..model.sites() {
                for column in 1..model.sites() {
                    prop_assert_eq!(model.hoppings()[(row, column)], 0.);
                }
            }
        }
    }

    #[test]
    fn an_empty_bath_leaves_only_the_impurity() {
        let model = ModelParams::from(&BathParameters::new(Array1::zeros(0)));
        assert_eq!(model.sites(), 1);
        assert_eq!(model.potential_v().len(), 1);
        assert_eq!(model.hoppings()[(0, 0)], 0.);
    }

    #[test]
    fn hamiltonian_adds_the_potential_to_the_diagonal() {
        let bath = BathParameters::from_couplings_and_energies(&[0.3], &[-0.7]);
        let hamiltonian = ModelParams::from(&bath).hamiltonian();
        assert_eq!(hamiltonian[(0, 0)], 0.);
        assert_eq!(hamiltonian[(1, 1)], -0.7);
        assert_eq!(hamiltonian[(0, 1)], 0.3);
        assert_eq!(hamiltonian[(1, 0)], 0.3);
    }
}
