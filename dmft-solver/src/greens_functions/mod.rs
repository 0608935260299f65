// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Green's functions
//!
//! The local lattice Green's function is the density of states weighted resolvent
//!
//! G(iω) = ∫ de ρ(e) / (iω + μ - Σ(iω) - e)
//!
//! evaluated by quadrature on the interval between the band bottom and the chemical potential,
//! or the band top when the chemical potential lies above the band.
//! The hybridization function seen by the impurity follows from the lattice Green's function
//! through the Dyson equation, Γ(iω) = iω + μ - Σ(iω) - 1 / G(iω).

use crate::density_of_states::DensityOfStates;
use crate::error::ConfigurationError;
use crate::spectral::{
    EnergySpaceBuilder, FrequencyFunction, IntegrationRule, MatsubaraGrid, SpectralDiscretisation,
};
use ndarray::Array1;
use num_complex::Complex;
use rayon::prelude::*;

/// Builder for a `LatticeGreensFunction`
pub struct LatticeGreensFunctionBuilder<RefDensityOfStates, Grid> {
    density_of_states: RefDensityOfStates,
    matsubara_grid: Grid,
    integration_rule: IntegrationRule,
    number_of_points: usize,
}

impl LatticeGreensFunctionBuilder<(), ()> {
    /// Initialise an empty builder using Gauss-Legendre quadrature
    pub fn new() -> Self {
        Self {
            density_of_states: (),
            matsubara_grid: (),
            integration_rule: IntegrationRule::GaussLegendre,
            number_of_points: crate::constants::DEFAULT_QUADRATURE_POINTS,
        }
    }
}

impl Default for LatticeGreensFunctionBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<RefDensityOfStates, Grid> LatticeGreensFunctionBuilder<RefDensityOfStates, Grid> {
    /// Attach the density of states, which also fixes the chemical potential
    pub fn with_density_of_states(
        self,
        density_of_states: &DensityOfStates,
    ) -> LatticeGreensFunctionBuilder<&DensityOfStates, Grid> {
        LatticeGreensFunctionBuilder {
            density_of_states,
            matsubara_grid: self.matsubara_grid,
            integration_rule: self.integration_rule,
            number_of_points: self.number_of_points,
        }
    }

    /// Attach the frequency grid the functions are sampled on
    pub fn with_matsubara_grid(
        self,
        matsubara_grid: MatsubaraGrid,
    ) -> LatticeGreensFunctionBuilder<RefDensityOfStates, MatsubaraGrid> {
        LatticeGreensFunctionBuilder {
            density_of_states: self.density_of_states,
            matsubara_grid,
            integration_rule: self.integration_rule,
            number_of_points: self.number_of_points,
        }
    }

    /// Set the quadrature used for the energy integral
    pub fn with_quadrature(self, integration_rule: IntegrationRule, number_of_points: usize) -> Self {
        Self {
            integration_rule,
            number_of_points,
            ..self
        }
    }
}

impl<'a> LatticeGreensFunctionBuilder<&'a DensityOfStates, MatsubaraGrid> {
    /// Discretise the energy integral and allocate the lattice Green's function and hybridization
    pub fn build(self) -> Result<LatticeGreensFunction, ConfigurationError> {
        let lower = self.density_of_states.lower_bound();
        let upper = self.density_of_states.upper_bound();
        if upper <= lower {
            return Err(ConfigurationError::InvalidValue {
                key: "ChemicalPotential",
                reason: format!(
                    "the chemical potential {} must lie above the band bottom {}",
                    upper, lower
                ),
            });
        }
        // The density vanishes above the band top, so the integral stops there
        let top = upper.min(self.density_of_states.support().end);
        let energy_space = EnergySpaceBuilder::new()
            .with_integration_rule(self.integration_rule)
            .with_number_of_points(self.number_of_points)
            .with_energy_range(lower..top)
            .build();
        // The weighted density of states does not change between iterations
        let (energies, weighted_dos): (Vec<f64>, Vec<f64>) = energy_space
            .iter_points_and_weights()
            .map(|(energy, weight)| (energy, weight * self.density_of_states.evaluate(energy)))
            .unzip();

        tracing::debug!(
            "Lattice integral over [{}, {}] with {} points",
            lower,
            top,
            energies.len()
        );

        Ok(LatticeGreensFunction {
            chemical_potential: upper,
            energies: Array1::from(energies),
            weighted_dos: Array1::from(weighted_dos),
            lattice: FrequencyFunction::zeros(self.matsubara_grid),
            gamma: FrequencyFunction::zeros(self.matsubara_grid),
        })
    }
}

/// The local lattice Green's function and the hybridization function derived from it
#[derive(Clone, Debug)]
pub struct LatticeGreensFunction {
    chemical_potential: f64,
    energies: Array1<f64>,
    weighted_dos: Array1<f64>,
    lattice: FrequencyFunction,
    gamma: FrequencyFunction,
}

impl LatticeGreensFunction {
    /// Recompute G and Γ for the self-energy `sigma`, which must share the grid of the lattice
    #[tracing::instrument(name = "Lattice update", level = "debug", skip_all)]
    pub fn update(&mut self, sigma: &FrequencyFunction) {
        assert_eq!(
            sigma.total_matsubaras(),
            self.lattice.total_matsubaras(),
            "the self-energy must be sampled on the lattice grid"
        );
        let grid = *self.lattice.grid();
        let (lattice, gamma): (Vec<_>, Vec<_>) = (0..grid.total_matsubaras())
            .into_par_iter()
            .map(|index| {
                let shifted = grid.imaginary_frequency(index) + self.chemical_potential - sigma[index];
                let lattice = self.resolvent(shifted);
                (lattice, shifted - lattice.inv())
            })
            .unzip();
        self.lattice = FrequencyFunction::from_values(grid, Array1::from(lattice));
        self.gamma = FrequencyFunction::from_values(grid, Array1::from(gamma));
    }

    // ∫ de ρ(e) / (z - e)
    fn resolvent(&self, z: Complex<f64>) -> Complex<f64> {
        self.energies
            .iter()
            .zip(self.weighted_dos.iter())
            .fold(Complex::new(0_f64, 0_f64), |sum, (&energy, &weight)| {
                sum + weight / (z - energy)
            })
    }

    /// The lattice Green's function from the last update
    pub fn lattice(&self) -> &FrequencyFunction {
        &self.lattice
    }

    /// The hybridization function from the last update
    pub fn gamma(&self) -> &FrequencyFunction {
        &self.gamma
    }

    /// The grid the functions are sampled on
    pub fn grid(&self) -> &MatsubaraGrid {
        self.lattice.grid()
    }
}
