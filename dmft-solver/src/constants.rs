// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defaults used when neither the input file nor the configuration overrides them

pub(crate) const DEFAULT_DELTA: f64 = 1e-3; // Initial simplex step of the bath fit
pub(crate) const DEFAULT_DELTA2: f64 = 1e-3; // Line search curvature constant of the gradient fit
pub(crate) const DEFAULT_FIT_TOLERANCE: f64 = 1e-3;
pub(crate) const DEFAULT_FIT_ITERATIONS: usize = 100;
pub(crate) const DEFAULT_HALF_BANDWIDTH: f64 = 1.0;
pub(crate) const DEFAULT_QUADRATURE_POINTS: usize = 512;
pub(crate) const DEFAULT_INITIAL_COUPLING: f64 = 0.5;
