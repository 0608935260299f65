// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Impurity
//!
//! Impurity solvers turn the fitted bath into the impurity Green's function on the Matsubara
//! grid of the run. The solver is chosen by name when the calculation is set up and is fixed
//! for the lifetime of the loop.
mod dmrg;
mod exact_diag;

pub use dmrg::DensityMatrixRenormalizationGroup;
pub use exact_diag::ExactDiagonalization;

use crate::bath::BathParameters;
use crate::error::ConfigurationError;
use crate::params::ParamsDmftSolver;
use crate::spectral::MatsubaraGrid;
use miette::Diagnostic;
use ndarray::Array1;
use num_complex::Complex;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Computes the impurity Green's function of the cluster described by a set of bath parameters
pub trait ImpuritySolver {
    /// Solve the cluster for `bath`, replacing the stored impurity Green's function
    fn solve(&mut self, bath: &BathParameters) -> Result<(), ImpuritySolverError>;
    /// The impurity Green's function from the last successful solve, one value per frequency.
    /// Calling this before `solve` has succeeded is a contract violation
    fn gimp(&self) -> &Array1<Complex<f64>>;
}

/// The available impurity solvers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImpuritySolverKind {
    /// Single-particle diagonalisation of the cluster
    ExactDiagonalization,
    /// An external DMRG code driven through input templates
    DensityMatrixRenormalizationGroup,
}

impl FromStr for ImpuritySolverKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exactdiag" => Ok(ImpuritySolverKind::ExactDiagonalization),
            "dmrg" => Ok(ImpuritySolverKind::DensityMatrixRenormalizationGroup),
            _ => Err(ConfigurationError::UnknownImpuritySolver(s.to_string())),
        }
    }
}

/// The runtime environment handed to the impurity solver
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SolverContext {
    /// The DMRG executable, looked up on the `PATH` when not a path
    pub executable: String,
    /// The directory rendered inputs and solver outputs are written to
    pub working_directory: PathBuf,
    /// The name of the file, relative to the working directory, the DMRG code writes the impurity
    /// Green's function to
    pub output_file: String,
}

impl Default for SolverContext {
    fn default() -> Self {
        Self {
            executable: "dmrg".into(),
            working_directory: std::env::temp_dir(),
            output_file: "gimp.dat".into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures while solving the impurity problem
pub enum ImpuritySolverError {
    #[error("Failed to read template {path}")]
    #[diagnostic(code(dmft::impurity::template))]
    /// An input template could not be read
    Template {
        /// The template path
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: std::io::Error,
    },
    #[error("IO failure in the solver working directory: {0}")]
    #[diagnostic(code(dmft::impurity::io))]
    /// Rendered inputs or outputs could not be written or read
    IO(#[from] std::io::Error),
    #[error("{executable} exited with {status} on input {input}")]
    #[diagnostic(
        code(dmft::impurity::process),
        help("check the solver context in the configuration points at a working DMRG code")
    )]
    /// The external solver did not exit successfully
    Process {
        /// The executable which was run
        executable: String,
        /// The rendered input it was run on
        input: PathBuf,
        /// The exit status
        status: std::process::ExitStatus,
    },
    #[error("Malformed line {line} in solver output {path}: {reason}")]
    #[diagnostic(code(dmft::impurity::output))]
    /// The solver output could not be parsed
    MalformedOutput {
        /// The output file
        path: PathBuf,
        /// The line number, counting from one
        line: usize,
        /// What was wrong with the line
        reason: String,
    },
    #[error("Solver output {path} holds {found} frequencies, expected {expected}")]
    #[diagnostic(code(dmft::impurity::short_output))]
    /// The solver output holds fewer frequencies than the grid
    ShortOutput {
        /// The output file
        path: PathBuf,
        /// The number of frequencies in the grid
        expected: usize,
        /// The number of frequencies read
        found: usize,
    },
}

/// Construct the impurity solver named in `params`
pub fn build_impurity_solver(
    params: &ParamsDmftSolver,
    context: &SolverContext,
) -> Result<Box<dyn ImpuritySolver>, ConfigurationError> {
    let grid = MatsubaraGrid::new(params.fictitious_beta, params.n_matsubaras);
    let kind: ImpuritySolverKind = params.impurity_solver.parse()?;
    tracing::info!("Using the {:?} impurity solver", kind);
    Ok(match kind {
        ImpuritySolverKind::ExactDiagonalization => Box::new(ExactDiagonalization::new(grid)),
        ImpuritySolverKind::DensityMatrixRenormalizationGroup => {
            Box::new(DensityMatrixRenormalizationGroup::new(
                grid,
                PathBuf::from(&params.gs_template),
                PathBuf::from(&params.omega_template),
                context.clone(),
            ))
        }
    })
}
