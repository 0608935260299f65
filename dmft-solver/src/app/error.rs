// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! The error type for the binary

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Every failure which ends a run
pub enum DmftError {
    #[error(transparent)]
    #[diagnostic(code(dmft::configuration))]
    /// The input or the configuration was rejected
    Configuration(#[from] crate::error::ConfigurationError),
    #[error(transparent)]
    #[diagnostic(code(dmft::outer_loop))]
    /// The self-consistency loop was aborted
    OuterLoop(#[from] crate::outer_loop::OuterLoopError),
    #[error(transparent)]
    #[diagnostic(code(dmft::io))]
    /// The report could not be written
    IO(#[from] crate::error::IOError),
    #[error("Failed to initialise logging: {0}")]
    #[diagnostic(code(dmft::telemetry))]
    /// The tracing subscriber could not be installed
    Telemetry(String),
}
