// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Params
//!
//! The physical description of a run, read once from a `key=value` input file.
//!
//! Keys are matched case-insensitively. The optional keys fall back to the values of the
//! numerical defaults.

use crate::error::ConfigurationError;
use crate::fit::MinParams;
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

/// The parameters of a DMFT run
#[derive(Clone, Debug, PartialEq)]
pub struct ParamsDmftSolver {
    /// The fictitious inverse temperature which sets the Matsubara grid
    pub fictitious_beta: f64,
    /// The chemical potential
    pub mu: f64,
    /// The number of Matsubara frequencies
    pub n_matsubaras: usize,
    /// The name of the lattice density of states
    pub lattice_gf: String,
    /// The number of discrete bath sites
    pub n_bath: usize,
    /// The largest number of self-consistency iterations
    pub dmft_iterations: usize,
    /// The self-consistency error below which the loop has converged
    pub dmft_tolerance: f64,
    /// Template for the ground-state input of the DMRG solver
    pub gs_template: String,
    /// Template for the frequency input of the DMRG solver
    pub omega_template: String,
    /// The name of the impurity solver
    pub impurity_solver: String,
    /// The number of decimals written in the report
    pub precision: Option<usize>,
    /// Half of the bandwidth of the lattice density of states
    pub half_bandwidth: f64,
    /// Controls for the bath fit
    pub min_params: MinParams,
}

// The layout of the input file
#[derive(Debug, Deserialize)]
struct InputFile {
    #[serde(rename = "FicticiousBeta", alias = "ficticiousbeta")]
    fictitious_beta: f64,
    #[serde(rename = "ChemicalPotential", alias = "chemicalpotential")]
    mu: f64,
    #[serde(rename = "Matsubaras", alias = "matsubaras")]
    n_matsubaras: usize,
    #[serde(rename = "LatticeGf", alias = "latticegf")]
    lattice_gf: String,
    #[serde(rename = "NumberOfBathPoints", alias = "numberofbathpoints")]
    n_bath: usize,
    #[serde(rename = "DmftNumberOfIterations", alias = "dmftnumberofiterations")]
    dmft_iterations: usize,
    #[serde(rename = "DmftTolerance", alias = "dmfttolerance")]
    dmft_tolerance: f64,
    #[serde(rename = "DmrgGsTemplate", alias = "dmrggstemplate")]
    gs_template: String,
    #[serde(rename = "DmrgOmegaTemplate", alias = "dmrgomegatemplate")]
    omega_template: String,
    #[serde(rename = "ImpuritySolver", alias = "impuritysolver")]
    impurity_solver: String,
    #[serde(default, rename = "Precision", alias = "precision")]
    precision: Option<usize>,
    #[serde(default, rename = "HalfBandwidth", alias = "halfbandwidth")]
    half_bandwidth: Option<f64>,
    #[serde(default, rename = "MinParamsDelta", alias = "minparamsdelta")]
    delta: Option<f64>,
    #[serde(default, rename = "MinParamsDelta2", alias = "minparamsdelta2")]
    delta2: Option<f64>,
    #[serde(default, rename = "MinParamsTolerance", alias = "minparamstolerance")]
    tolerance: Option<f64>,
    #[serde(default, rename = "MinParamsMaxIter", alias = "minparamsmaxiter")]
    max_iterations: Option<usize>,
}

impl ParamsDmftSolver {
    /// Read and validate the input file at `path`
    pub fn build(path: &Path) -> Result<Self, ConfigurationError> {
        let source = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini))
            .build()?;
        let input: InputFile = source.try_deserialize()?;
        let params = Self::from(input);
        params.validate()?;
        tracing::info!(
            "Read run parameters from {}: β={}, μ={}, N={}, nBath={}",
            path.display(),
            params.fictitious_beta,
            params.mu,
            params.n_matsubaras,
            params.n_bath
        );
        Ok(params)
    }

    /// Check every value lies in its allowed range
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |key, reason: &str| {
            Err(ConfigurationError::InvalidValue {
                key,
                reason: reason.to_string(),
            })
        };
        if !(self.fictitious_beta > 0.) {
            return invalid("FicticiousBeta", "the inverse temperature must be positive");
        }
        if self.n_matsubaras == 0 {
            return invalid("Matsubaras", "at least one Matsubara frequency is needed");
        }
        if self.dmft_iterations == 0 {
            return invalid(
                "DmftNumberOfIterations",
                "at least one self-consistency iteration is needed",
            );
        }
        if !(self.dmft_tolerance >= 0.) {
            return invalid("DmftTolerance", "the tolerance cannot be negative");
        }
        if !(self.half_bandwidth > 0.) {
            return invalid("HalfBandwidth", "the half bandwidth must be positive");
        }
        if !(self.min_params.delta > 0.) {
            return invalid("MinParamsDelta", "the simplex step must be positive");
        }
        if !(self.min_params.delta2 > 0. && self.min_params.delta2 < 1.) {
            return invalid("MinParamsDelta2", "the line search constant must lie in (0, 1)");
        }
        if !(self.min_params.tolerance > 0.) {
            return invalid("MinParamsTolerance", "the fit tolerance must be positive");
        }
        if self.min_params.max_iterations == 0 {
            return invalid("MinParamsMaxIter", "the fit needs at least one iteration");
        }
        Ok(())
    }
}

impl From<InputFile> for ParamsDmftSolver {
    fn from(input: InputFile) -> Self {
        let defaults = MinParams::default();
        Self {
            fictitious_beta: input.fictitious_beta,
            mu: input.mu,
            n_matsubaras: input.n_matsubaras,
            lattice_gf: input.lattice_gf,
            n_bath: input.n_bath,
            dmft_iterations: input.dmft_iterations,
            dmft_tolerance: input.dmft_tolerance,
            gs_template: input.gs_template,
            omega_template: input.omega_template,
            impurity_solver: input.impurity_solver,
            precision: input.precision,
            half_bandwidth: input
                .half_bandwidth
                .unwrap_or(crate::constants::DEFAULT_HALF_BANDWIDTH),
            min_params: MinParams {
                delta: input.delta.unwrap_or(defaults.delta),
                delta2: input.delta2.unwrap_or(defaults.delta2),
                tolerance: input.tolerance.unwrap_or(defaults.tolerance),
                max_iterations: input.max_iterations.unwrap_or(defaults.max_iterations),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::ParamsDmftSolver;
    use crate::error::ConfigurationError;
    use crate::fit::MinParams;
    use std::path::PathBuf;

    const COMPLETE: &str = "FicticiousBeta=10
ChemicalPotential=0
Matsubaras=8
LatticeGf=semicircular
NumberOfBathPoints=1
DmftNumberOfIterations=10
DmftTolerance=1e-6
DmrgGsTemplate=gs.ain
DmrgOmegaTemplate=omega.ain
ImpuritySolver=exactdiag
";

    fn write_input(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dmft-solver-params-{}-{}.inp",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn complete_input_is_read_with_defaults() {
        let path = write_input("complete", COMPLETE);
        let params = ParamsDmftSolver::build(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(params.fictitious_beta, 10.);
        assert_eq!(params.mu, 0.);
        assert_eq!(params.n_matsubaras, 8);
        assert_eq!(params.lattice_gf, "semicircular");
        assert_eq!(params.n_bath, 1);
        assert_eq!(params.dmft_iterations, 10);
        assert_eq!(params.dmft_tolerance, 1e-6);
        assert_eq!(params.gs_template, "gs.ain");
        assert_eq!(params.omega_template, "omega.ain");
        assert_eq!(params.impurity_solver, "exactdiag");
        assert_eq!(params.precision, None);
        assert_eq!(params.half_bandwidth, 1.);
        assert_eq!(params.min_params, MinParams::default());
    }

    #[test]
    fn optional_keys_override_the_defaults() {
        let contents = format!(
            "{}Precision=6\nHalfBandwidth=2\nMinParamsMaxIter=250\n",
            COMPLETE
        );
        let path = write_input("optional", &contents);
        let params = ParamsDmftSolver::build(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(params.precision, Some(6));
        assert_eq!(params.half_bandwidth, 2.);
        assert_eq!(params.min_params.max_iterations, 250);
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let contents = COMPLETE.replace("DmftNumberOfIterations=10", "DmftNumberOfIterations=0");
        let path = write_input("zero-iterations", &contents);
        let result = ParamsDmftSolver::build(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue {
                key: "DmftNumberOfIterations",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_half_bandwidth_is_rejected() {
        let contents = format!("{}HalfBandwidth=0\n", COMPLETE);
        let path = write_input("half-bandwidth", &contents);
        let result = ParamsDmftSolver::build(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue {
                key: "HalfBandwidth",
                ..
            })
        ));
    }

    #[test]
    fn missing_keys_fail_to_read() {
        let contents = COMPLETE.replace("ImpuritySolver=exactdiag\n", "");
        let path = write_input("missing", &contents);
        let result = ParamsDmftSolver::build(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigurationError::Read(_))));
    }
}
