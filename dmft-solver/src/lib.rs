// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! dmft-solver computes the single-site Dynamical Mean-Field Theory solution of a lattice model
//!
//! # Overview
//! In DMFT the lattice problem is mapped onto an impurity coupled to a self-consistently determined
//! bath ([Georges 1996](https://doi.org/10.1103/RevModPhys.68.13)). Every quantity lives on the
//! fermionic Matsubara axis of a fictitious inverse temperature. Each pass of the loop
//! - computes the lattice Green's function from the current self-energy and the density of states,
//!   and from it the hybridization function,
//! - fits a finite set of bath parameters so the Anderson hybridization matches it,
//! - solves the finite impurity cluster for the impurity Green's function,
//! - updates the self-energy and measures the change.
//!
//! # Usage
//! dmft-solver is intended to be run from the command line with a `key=value` input file:
//!
//! ```text
//! FicticiousBeta=10
//! ChemicalPotential=0
//! Matsubaras=8
//! LatticeGf=semicircular
//! NumberOfBathPoints=1
//! DmftNumberOfIterations=10
//! DmftTolerance=1e-6
//! DmrgGsTemplate=gs.ain
//! DmrgOmegaTemplate=omega.ain
//! ImpuritySolver=exactdiag
//! ```
//!
//! Numerical settings which are not part of the physical problem (quadrature, minimizer,
//! logging) are read from `.config/default.toml`.

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

/// The command line global application, tracing and display primitives
pub mod app;

/// Bath parameters, the finite cluster they describe and the Anderson hybridization
pub mod bath;

/// Numerical defaults
mod constants;

/// Lattice densities of states
pub mod density_of_states;

/// Error handling
pub mod error;

/// Least-squares fit of the bath parameters to the lattice hybridization
pub mod fit;

/// The lattice Green's function and the hybridization function
pub mod greens_functions;

/// Impurity solvers which turn bath parameters into an impurity Green's function
pub mod impurity;

/// The outer loop, which iterates the self-consistency condition for the self-energy
pub mod outer_loop;

/// Parameters of a run, read from the input file
pub mod params;

/// Computes quantities of interest once the loop has finished and writes the report
pub mod postprocessor;

/// Matsubara grids, functions of frequency and energy quadrature
pub mod spectral;
