// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Postprocessor
//!
//! Derived quantities of a finished loop and the textual report which presents them.
//!
//! The report is a sequence of labelled blocks in a fixed order: the self-energy, the bath
//! parameters, the impurity Green's function, the lattice Green's function, the hybridization,
//! the site-excluded Green's function and the Anderson function of the final bath.

use crate::bath::{anderson, BathParameters};
use crate::error::IOError;
use crate::outer_loop::{DmftLoop, LoopOutcome};
use crate::spectral::{FrequencyFunction, MatsubaraGrid};
use std::fmt::Display;
use std::io::Write;

/// The site-excluded Green's function 1/(iω - A(bath, iω)) sampled on `grid`
pub fn site_excluded_green_function(bath: &BathParameters, grid: MatsubaraGrid) -> FrequencyFunction {
    FrequencyFunction::from_fn(grid, |index, _| {
        let z = grid.imaginary_frequency(index);
        (z - anderson(bath, z)).inv()
    })
}

/// The Anderson function of `bath` sampled on `grid`
pub fn anderson_function(bath: &BathParameters, grid: MatsubaraGrid) -> FrequencyFunction {
    FrequencyFunction::from_fn(grid, |index, _| {
        anderson(bath, grid.imaginary_frequency(index))
    })
}

/// The quantities written at the end of a run
#[derive(Clone, Debug)]
pub struct Report {
    sigma: FrequencyFunction,
    bath: BathParameters,
    gimp: FrequencyFunction,
    lattice: FrequencyFunction,
    gamma: FrequencyFunction,
    site_excluded: FrequencyFunction,
    anderson: FrequencyFunction,
}

impl Report {
    /// Collect the report from a loop which has run to completion
    pub fn new(dmft: &DmftLoop, outcome: &LoopOutcome) -> Self {
        let grid = *outcome.sigma.grid();
        let bath = dmft.fitter().result().clone();
        Self {
            sigma: outcome.sigma.clone(),
            gimp: FrequencyFunction::from_values(
                grid,
                dmft.impurity_solver().gimp().clone(),
            ),
            lattice: dmft.lattice().lattice().clone(),
            gamma: dmft.lattice().gamma().clone(),
            site_excluded: site_excluded_green_function(&bath, grid.halved()),
            anderson: anderson_function(&bath, grid),
            bath,
        }
    }

    /// The final self-energy
    pub fn sigma(&self) -> &FrequencyFunction {
        &self.sigma
    }

    /// The final bath
    pub fn bath(&self) -> &BathParameters {
        &self.bath
    }

    /// The impurity Green's function of the final bath
    pub fn gimp(&self) -> &FrequencyFunction {
        &self.gimp
    }

    /// The site-excluded Green's function, on the lower half of the grid
    pub fn site_excluded(&self) -> &FrequencyFunction {
        &self.site_excluded
    }

    /// The Anderson function of the final bath
    pub fn anderson(&self) -> &FrequencyFunction {
        &self.anderson
    }

    /// Write the report, with `precision` decimals when given
    pub fn write(&self, writer: &mut dyn Write, precision: Option<usize>) -> Result<(), IOError> {
        write_block(writer, "Sigma", &self.sigma, precision)?;
        write_block(writer, "BathParameters", &self.bath, precision)?;
        writeln!(writer, "Gimp")?;
        write_split(writer, &self.gimp, precision)?;
        write_block(writer, "LatticeG", &self.lattice, precision)?;
        write_block(writer, "Gamma", &self.gamma, precision)?;
        write_block(writer, "SiteExcludedG", &self.site_excluded, precision)?;
        write_block(writer, "AndersonFunction", &self.anderson, precision)?;
        Ok(())
    }
}

fn write_block(
    writer: &mut dyn Write,
    label: &str,
    value: &dyn Display,
    precision: Option<usize>,
) -> Result<(), IOError> {
    writeln!(writer, "{}", label)?;
    match precision {
        Some(precision) => write!(writer, "{:.*}", precision, value)?,
        None => write!(writer, "{}", value)?,
    }
    Ok(())
}

// One `ω re im` line per frequency
fn write_split(
    writer: &mut dyn Write,
    function: &FrequencyFunction,
    precision: Option<usize>,
) -> Result<(), IOError> {
    writeln!(writer, "{}", function.total_matsubaras())?;
    for (omega, value) in function.iter() {
        match precision {
            Some(p) => writeln!(writer, "{:.*} {:.*} {:.*}", p, omega, p, value.re, p, value.im)?,
            None => writeln!(writer, "{} {} {}", omega, value.re, value.im)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{anderson_function, site_excluded_green_function};
    use crate::bath::BathParameters;
    use crate::spectral::MatsubaraGrid;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn site_excluded_function_of_an_empty_bath_is_free() {
        let grid = MatsubaraGrid::new(10., 8).halved();
        let function = site_excluded_green_function(&BathParameters::new(Array1::zeros(0)), grid);
        assert_eq!(function.total_matsubaras(), 4);
        for (omega, value) in function.iter() {
            assert_relative_eq!(value.im, -1. / omega);
        }
    }

    #[test]
    fn anderson_function_is_sampled_on_every_frequency() {
        let bath = BathParameters::from_couplings_and_energies(&[0.5], &[0.]);
        let function = anderson_function(&bath, MatsubaraGrid::new(10., 8));
        assert_eq!(function.total_matsubaras(), 8);
        for (omega, value) in function.iter() {
            assert_relative_eq!(value.im, -0.25 / omega);
        }
    }
}
