// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Installs the `tracing` subscriber of the binary.

use is_terminal::IsTerminal as _;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
    Layer as _,
};

/// Initializes tracing, writing to standard error.
///
/// `RUST_LOG` controls the verbosity and `RUST_LOG_FORMAT=compact` selects the compact
/// output. Colors are only used on a terminal, unless `NO_COLOR` is set.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let color_output =
        !std::env::var("NO_COLOR").is_ok_and(|x| !x.is_empty()) && std::io::stderr().is_terminal();

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color_output)
        .with_target(false);
    let layer = match std::env::var("RUST_LOG_FORMAT").ok().as_deref() {
        Some("compact") => layer.compact().boxed(),
        _ => layer.boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}
