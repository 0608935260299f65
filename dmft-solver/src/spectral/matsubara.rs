// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use ndarray::Array1;
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Index, IndexMut};

/// The first `N` positive fermionic Matsubara frequencies ω_i = (2i + 1)π / β
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatsubaraGrid {
    fictitious_beta: f64,
    number_of_frequencies: usize,
}

impl MatsubaraGrid {
    /// Build the grid for inverse temperature `fictitious_beta`
    pub fn new(fictitious_beta: f64, number_of_frequencies: usize) -> Self {
        assert!(
            fictitious_beta > 0_f64,
            "the fictitious inverse temperature must be positive"
        );
        Self {
            fictitious_beta,
            number_of_frequencies,
        }
    }

    /// The frequency ω_i
    pub fn omega(&self, index: usize) -> f64 {
        assert!(
            index < self.number_of_frequencies,
            "Matsubara index {} out of range for a grid of {} frequencies",
            index,
            self.number_of_frequencies
        );
        (2 * index + 1) as f64 * PI / self.fictitious_beta
    }

    /// The point iω_i on the imaginary axis
    pub fn imaginary_frequency(&self, index: usize) -> Complex<f64> {
        Complex::new(0_f64, self.omega(index))
    }

    /// Iterate over ω_i in increasing order
    pub fn iter_omegas(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.number_of_frequencies).map(|index| self.omega(index))
    }

    /// The number of frequencies in the grid
    pub fn total_matsubaras(&self) -> usize {
        self.number_of_frequencies
    }

    /// The inverse temperature setting the frequency spacing
    pub fn fictitious_beta(&self) -> f64 {
        self.fictitious_beta
    }

    /// A grid at the same temperature holding the lowest half of the frequencies
    pub fn halved(&self) -> Self {
        Self {
            fictitious_beta: self.fictitious_beta,
            number_of_frequencies: self.number_of_frequencies / 2,
        }
    }
}

/// A function sampled on a `MatsubaraGrid`
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyFunction<T = Complex<f64>> {
    grid: MatsubaraGrid,
    values: Array1<T>,
}

impl<T: Clone + Zero> FrequencyFunction<T> {
    /// A zero valued function on the grid defined by `(fictitious_beta, number_of_frequencies)`
    pub fn new(fictitious_beta: f64, number_of_frequencies: usize) -> Self {
        Self::zeros(MatsubaraGrid::new(fictitious_beta, number_of_frequencies))
    }

    /// A zero valued function on `grid`
    pub fn zeros(grid: MatsubaraGrid) -> Self {
        Self {
            values: Array1::zeros(grid.total_matsubaras()),
            grid,
        }
    }
}

impl<T> FrequencyFunction<T> {
    /// Wrap precomputed values, one per frequency of `grid`
    pub fn from_values(grid: MatsubaraGrid, values: Array1<T>) -> Self {
        assert_eq!(
            values.len(),
            grid.total_matsubaras(),
            "a function of frequency needs one value per Matsubara frequency"
        );
        Self { grid, values }
    }

    /// Sample `f(i, ω_i)` at every frequency of `grid`
    pub fn from_fn(grid: MatsubaraGrid, f: impl Fn(usize, f64) -> T) -> Self {
        let values = (0..grid.total_matsubaras())
            .map(|index| f(index, grid.omega(index)))
            .collect::<Array1<_>>();
        Self { grid, values }
    }

    /// The frequency ω_i
    pub fn omega(&self, index: usize) -> f64 {
        self.grid.omega(index)
    }

    /// The number of sampled frequencies
    pub fn total_matsubaras(&self) -> usize {
        self.grid.total_matsubaras()
    }

    /// The inverse temperature of the underlying grid
    pub fn fictitious_beta(&self) -> f64 {
        self.grid.fictitious_beta()
    }

    /// The underlying grid
    pub fn grid(&self) -> &MatsubaraGrid {
        &self.grid
    }

    /// The sampled values
    pub fn values(&self) -> &Array1<T> {
        &self.values
    }

    /// Iterate over the pairs `(ω_i, value_i)`
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.grid.iter_omegas().zip(self.values.iter())
    }
}

impl<T> Index<usize> for FrequencyFunction<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T> IndexMut<usize> for FrequencyFunction<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.values[index]
    }
}

/// Writes the number of frequencies, followed by one `ω_i value_i` line per frequency.
/// A precision passed to the formatter is applied to both columns.
impl<T: fmt::Display> fmt::Display for FrequencyFunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.total_matsubaras())?;
        for (omega, value) in self.iter() {
            match f.precision() {
                Some(precision) => {
                    writeln!(f, "{:.*} {:.*}", precision, omega, precision, value)?
                }
                None => writeln!(f, "{} {}", omega, value)?,
            }
        }
        Ok(())
    }
}
