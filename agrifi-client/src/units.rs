// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversions between wei, the contract's 18-decimal fixed-point unit, and the
//! human-decimal amounts shown to users.

use alloy::primitives::{utils, U256};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid amount {amount:?}: {source}")]
    InvalidAmount {
        amount: String,
        #[source]
        source: utils::UnitsError,
    },
    #[error("amount {0:?} is negative")]
    NegativeAmount(String),
    #[error("amount {0:?} has more than 18 decimals")]
    TooManyDecimals(String),
    #[error("the cost of {token_amount} tokens at {price_per_token} wei overflows")]
    Overflow {
        token_amount: U256,
        price_per_token: U256,
    },
}

/// Renders an amount of wei as a decimal amount of ether, without trailing zeros.
pub fn format_ether(wei: U256) -> String {
    let formatted = utils::format_ether(wei);
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{integer}.{fraction}")
            }
        }
        None => formatted,
    }
}

/// Parses a decimal amount of ether into wei. At most 18 decimals are accepted.
pub fn parse_ether(amount: &str) -> Result<U256, Error> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(Error::NegativeAmount(amount.to_string()));
    }
    if amount
        .split_once('.')
        .is_some_and(|(_, fraction)| fraction.len() > 18)
    {
        return Err(Error::TooManyDecimals(amount.to_string()));
    }
    utils::parse_ether(amount).map_err(|source| Error::InvalidAmount {
        amount: amount.to_string(),
        source,
    })
}

/// The payment attached to an investment: `token_amount` tokens at
/// `price_per_token` wei each.
pub fn total_cost(token_amount: U256, price_per_token: U256) -> Result<U256, Error> {
    token_amount
        .checked_mul(price_per_token)
        .ok_or(Error::Overflow {
            token_amount,
            price_per_token,
        })
}
