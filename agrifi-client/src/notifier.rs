// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transient user-facing notifications.

/// Receives the transient notifications shown to the user while operations run.
///
/// A `loading` notification stays up until it is dismissed or replaced by a
/// `success` or `error` notification.
pub trait Notifier: Send + Sync {
    fn loading(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn dismiss(&self);
}

/// A [`Notifier`] that turns notifications into `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn loading(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn dismiss(&self) {}
}
