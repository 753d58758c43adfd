// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The marketplace entities, as observed by the client. All of them are owned and
//! mutated by the contract.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units;

/// A registered farmer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    /// The ENS name of the farmer; may be empty.
    pub ens_name: String,
    pub name: String,
    pub location: String,
    pub reputation_score: U256,
    pub is_registered: bool,
    /// The crops tokenized by this farmer, oldest first.
    pub crop_ids: Vec<U256>,
}

/// A tokenized crop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropToken {
    pub id: U256,
    pub farmer: Address,
    pub crop_type: String,
    pub variety: String,
    pub total_supply: U256,
    /// The price of one token, in wei.
    pub price_per_token: U256,
    /// Unix timestamp, in seconds.
    pub harvest_date: u64,
    pub carbon_credits: U256,
    pub is_active: bool,
    pub total_invested: U256,
    /// Points to an off-chain JSON document with an image and attributes.
    #[serde(rename = "metadataURI")]
    pub metadata_uri: String,
}

impl CropToken {
    /// The price of one token as a decimal amount of ether.
    pub fn price_in_ether(&self) -> String {
        units::format_ether(self.price_per_token)
    }

    pub fn harvest_date_display(&self) -> String {
        format_date(self.harvest_date)
    }
}

/// The tokens held by an investor in one crop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub crop_id: U256,
    /// Number of tokens bought.
    pub amount: U256,
    /// Unix timestamp, in seconds.
    pub timestamp: u64,
    pub claimed: bool,
}

/// Renders a unix timestamp as a `YYYY-MM-DD` UTC date, or `-` when unset.
pub fn format_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .filter(|timestamp| *timestamp > 0)
        .and_then(|timestamp| DateTime::<Utc>::from_timestamp(timestamp, 0))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
