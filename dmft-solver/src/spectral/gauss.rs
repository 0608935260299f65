// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Gauss-Legendre quadrature rules

use std::f64::consts::PI;

const MAXIMUM_NEWTON_ITERATIONS: usize = 100;

/// Nodes and weights of the `n` point Gauss-Legendre rule on `[-1, 1]`, nodes in ascending order
pub(crate) fn legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut nodes = vec![0_f64; n];
    let mut weights = vec![0_f64; n];
    // The roots are symmetric about the origin, so only half need to be found
    let m = (n + 1) / 2;
    for i in 0..m {
        // Chebyshev estimate of the i-th largest root
        let mut z = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..MAXIMUM_NEWTON_ITERATIONS {
            let (p, dp) = legendre_polynomial_and_derivative(n, z);
            let dz = p / dp;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre_polynomial_and_derivative(n, z);
        let weight = 2. / ((1. - z * z) * dp * dp);

        nodes[i] = -z;
        nodes[n - 1 - i] = z;
        weights[i] = weight;
        weights[n - 1 - i] = weight;
    }
    (nodes, weights)
}

/// Map a rule on `[-1, 1]` onto `[a, b]`
pub(crate) fn reseat(nodes: &[f64], weights: &[f64], a: f64, b: f64) -> (Vec<f64>, Vec<f64>) {
    let half_width = (b - a) / 2.;
    let midpoint = (b + a) / 2.;
    (
        nodes.iter().map(|x| midpoint + half_width * x).collect(),
        weights.iter().map(|w| half_width * w).collect(),
    )
}

/// P_n(x) and its derivative from the three term recurrence
fn legendre_polynomial_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p_previous = 1_f64;
    let mut p = x;
    if n == 0 {
        return (1., 0.);
    }
    for k in 2..=n {
        let k = k as f64;
        let p_next = ((2. * k - 1.) * x * p - (k - 1.) * p_previous) / k;
        p_previous = p;
        p = p_next;
    }
    let derivative = n as f64 * (x * p - p_previous) / (x * x - 1.);
    (p, derivative)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    #[test]
    fn weights_sum_to_the_interval_length() {
        for n in [1, 2, 5, 64, 513] {
            let (_, weights) = super::legendre(n);
            assert_relative_eq!(weights.iter().sum::<f64>(), 2_f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn rule_is_exact_for_polynomials_up_to_degree_2n_minus_1() {
        let n = 6;
        let (nodes, weights) = super::legendre(n);
        for degree in 0..(2 * n) {
            let numerical: f64 = nodes
                .iter()
                .zip(weights.iter())
                .map(|(x, w)| w * x.powi(degree as i32))
                .sum();
            let exact = if degree % 2 == 1 {
                0.
            } else {
                2. / (degree as f64 + 1.)
            };
            assert_relative_eq!(numerical, exact, epsilon = 1e-13);
        }
    }

    #[test]
    fn reseated_rule_integrates_on_the_new_interval() {
        let (nodes, weights) = super::legendre(8);
        let (nodes, weights) = super::reseat(&nodes, &weights, 1., 3.);
        let numerical: f64 = nodes.iter().zip(weights.iter()).map(|(x, w)| w * x).sum();
        assert_relative_eq!(numerical, 4_f64, epsilon = 1e-13);
        assert!(nodes.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
