// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

mod decode;
mod metadata;
mod session;
mod tokenize;
mod units;
