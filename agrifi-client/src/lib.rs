// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A client of the AgriFi crop-tokenization marketplace: farmers tokenize future
//! harvests, investors buy the crop tokens.

#![allow(async_fn_in_trait)]

pub mod client;
pub mod config;
pub mod contract;
pub mod data_types;
pub mod decode;
mod error;
pub mod logging;
pub mod metadata;
pub mod notifier;
pub mod persistent;
pub mod session;
pub mod tokenize;
pub mod units;
pub mod util;
pub mod views;

#[cfg(with_testing)]
pub mod test_utils;

#[cfg(test)]
mod unit_tests;

pub use client::{AgriFi, TokenizedCrop};
pub use error::Error;
