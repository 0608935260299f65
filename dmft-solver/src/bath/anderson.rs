// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::BathParameters;
use ndarray::Array1;
use num_complex::Complex;

/// The hybridization of a discrete bath, A(z) = Σ_α V_α² / (z - e_α)
pub fn anderson(bath: &BathParameters, z: Complex<f64>) -> Complex<f64> {
    bath.couplings()
        .iter()
        .zip(bath.energies().iter())
        .fold(Complex::new(0_f64, 0_f64), |sum, (&v, &e)| {
            sum + v * v / (z - e)
        })
}

/// Derivatives of `anderson` with respect to each bath parameter, in the parameter layout:
/// ∂A/∂V_α = 2V_α / (z - e_α) followed by ∂A/∂e_α = V_α² / (z - e_α)²
pub fn anderson_gradient(bath: &BathParameters, z: Complex<f64>) -> Array1<Complex<f64>> {
    let n_bath = bath.n_bath();
    let mut gradient = Array1::zeros(2 * n_bath);
    for (alpha, (&v, &e)) in bath
        .couplings()
        .iter()
        .zip(bath.energies().iter())
        .enumerate()
    {
        let propagator = (z - e).inv();
        gradient[alpha] = 2. * v * propagator;
        gradient[alpha + n_bath] = v * v * propagator * propagator;
    }
    gradient
}
