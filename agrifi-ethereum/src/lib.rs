// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides functionalities for accessing a contract deployed on an
//! Ethereum node, on behalf of an account exposed by that node.

pub mod client;
pub mod common;
pub mod provider;
pub mod value;
