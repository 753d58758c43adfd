// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/// Shortens an address for display, e.g. `0x5FbD...0aa3`.
pub fn shorten_address(address: &str) -> String {
    let tail = address
        .len()
        .checked_sub(4)
        .and_then(|start| address.get(start..));
    match (address.get(..6), tail) {
        (Some(head), Some(tail)) if address.len() > 10 => format!("{head}...{tail}"),
        _ => address.to_string(),
    }
}
