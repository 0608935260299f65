// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{configuration::LogConfiguration, DmftError};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Creates a subscriber which writes to `console::Term::stderr` and to a JSON log file in the
/// configured log directory. `RUST_LOG` takes precedence over the command line level.
pub(crate) fn get_subscriber(
    env_filter: super::LogLevel,
    log: &LogConfiguration,
) -> (
    impl Subscriber + Send + Sync,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env_filter.to_string()));

    let fmt_layer = tracing_subscriber::fmt::Layer::new()
        .with_writer(console::Term::stderr)
        .without_time();

    let appender = tracing_appender::rolling::never(&log.directory, &log.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    (
        Registry::default().with(env_filter).with(fmt_layer).with(
            tracing_subscriber::fmt::Layer::new()
                .with_writer(non_blocking)
                .json(),
        ),
        guard,
    )
}

pub(crate) fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), DmftError> {
    LogTracer::init().map_err(|e| DmftError::Telemetry(e.to_string()))?;
    set_global_default(subscriber).map_err(|e| DmftError::Telemetry(e.to_string()))?;
    Ok(())
}
