// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::Persist;

pub type Error = std::convert::Infallible;

/// Keeps the value in memory only; `persist` always succeeds. Used by tests and by
/// sessions that should not outlive the process.
#[derive(Default, derive_more::Deref)]
pub struct Memory<T> {
    #[deref]
    value: T,
}

impl<T> Memory<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Persist for Memory<T> {
    type Error = Error;

    fn as_mut(&mut self) -> &mut T {
        &mut self.value
    }

    async fn persist(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn into_value(self) -> T {
        self.value
    }
}
