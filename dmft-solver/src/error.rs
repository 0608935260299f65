// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! Errors raised while turning user input into a runnable calculation

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// A configuration problem. These are fatal and are raised before any frequency is computed
pub enum ConfigurationError {
    #[error("DensityOfStates {0} not yet supported; only semicircular supported")]
    #[diagnostic(
        code(dmft::configuration::density_of_states),
        help("set `LatticeGf=semicircular` in the input file")
    )]
    /// The lattice density of states named in the input is not implemented
    UnsupportedDensityOfStates(String),
    #[error("Unknown impurity solver {0}")]
    #[diagnostic(
        code(dmft::configuration::impurity_solver),
        help("`ImpuritySolver` must be one of `exactdiag` or `dmrg`")
    )]
    /// The impurity solver named in the input is not implemented
    UnknownImpuritySolver(String),
    #[error("Invalid value for {key}: {reason}")]
    #[diagnostic(code(dmft::configuration::invalid_value))]
    /// A value was read but is outside of its allowed range
    InvalidValue {
        /// The key which holds the offending value
        key: &'static str,
        /// Why the value was rejected
        reason: String,
    },
    #[error(transparent)]
    #[diagnostic(code(dmft::configuration::read))]
    /// The input or configuration file could not be read or deserialized
    Read(#[from] config::ConfigError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Error for IO events
pub enum IOError {
    #[error("IO Failure: {0}")]
    #[diagnostic(code(dmft::io))]
    /// A failure writing the report or the log
    IO(#[from] std::io::Error),
}
