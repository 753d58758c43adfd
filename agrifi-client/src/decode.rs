// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Normalization of the values returned by the contract.
//!
//! A struct may come back with named fields or as a positional tuple. Every field is
//! read the same way: the named field if present, else the positional entry, else
//! the zero value of its type. Each entity has exactly one decoder, below.

use std::str::FromStr as _;

use alloy::primitives::{Address, U256};
use serde_json::Value;

use crate::data_types::{CropToken, Farmer, Investment};

/// Entities that can be read from a remote struct value.
pub trait FromRemote: Sized {
    fn from_remote(value: &Value) -> Self;
}

/// Reads the fields of a remote struct value.
#[derive(Clone, Copy, Debug)]
pub struct FieldReader<'a> {
    value: &'a Value,
}

impl<'a> FieldReader<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Returns the named field, falling back to the positional entry.
    pub fn field(&self, name: &str, index: usize) -> Option<&'a Value> {
        self.value
            .get(name)
            .filter(|value| !value.is_null())
            .or_else(|| self.value.get(index).filter(|value| !value.is_null()))
    }

    pub fn uint(&self, name: &str, index: usize) -> U256 {
        self.field(name, index).map(parse_uint).unwrap_or_default()
    }

    /// Reads a timestamp or another small integer, saturating at `u64::MAX`.
    pub fn u64(&self, name: &str, index: usize) -> u64 {
        u64::try_from(self.uint(name, index)).unwrap_or(u64::MAX)
    }

    pub fn string(&self, name: &str, index: usize) -> String {
        match self.field(name, index) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    pub fn bool(&self, name: &str, index: usize) -> bool {
        match self.field(name, index) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => value == "true",
            _ => false,
        }
    }

    pub fn address(&self, name: &str, index: usize) -> Address {
        self.field(name, index)
            .and_then(Value::as_str)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn uint_list(&self, name: &str, index: usize) -> Vec<U256> {
        self.field(name, index)
            .map(parse_uint_list)
            .unwrap_or_default()
    }
}

/// Parses an integer given as a JSON number, a decimal string or a `0x` hex string.
/// Anything else reads as zero.
pub fn parse_uint(value: &Value) -> U256 {
    match value {
        Value::Number(number) => number.as_u64().map(U256::from).unwrap_or_default(),
        Value::String(text) => U256::from_str(text.trim()).unwrap_or_default(),
        _ => U256::ZERO,
    }
}

/// Parses a list of integers; anything but a list reads as an empty list.
pub fn parse_uint_list(value: &Value) -> Vec<U256> {
    match value {
        Value::Array(values) => values.iter().map(parse_uint).collect(),
        _ => Vec::new(),
    }
}

/// Parses a list of addresses, skipping the entries that are not addresses.
pub fn parse_address_list(value: &Value) -> Vec<Address> {
    match value {
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|address| address.parse().ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Decodes a list of entities; anything but a list reads as an empty list.
pub fn decode_list<T: FromRemote>(value: &Value) -> Vec<T> {
    match value {
        Value::Array(values) => values.iter().map(T::from_remote).collect(),
        _ => Vec::new(),
    }
}

impl FromRemote for Farmer {
    fn from_remote(value: &Value) -> Self {
        let fields = FieldReader::new(value);
        Farmer {
            ens_name: fields.string("ensName", 0),
            name: fields.string("name", 1),
            location: fields.string("location", 2),
            reputation_score: fields.uint("reputationScore", 3),
            is_registered: fields.bool("isRegistered", 4),
            crop_ids: fields.uint_list("cropIds", 5),
        }
    }
}

/// The crop id is not part of the remote value; it is left at zero.
impl FromRemote for CropToken {
    fn from_remote(value: &Value) -> Self {
        let fields = FieldReader::new(value);
        CropToken {
            id: U256::ZERO,
            farmer: fields.address("farmer", 0),
            crop_type: fields.string("cropType", 1),
            variety: fields.string("variety", 2),
            total_supply: fields.uint("totalSupply", 3),
            price_per_token: fields.uint("pricePerToken", 4),
            harvest_date: fields.u64("harvestDate", 5),
            carbon_credits: fields.uint("carbonCredits", 6),
            is_active: fields.bool("isActive", 7),
            total_invested: fields.uint("totalInvested", 8),
            metadata_uri: fields.string("metadataURI", 9),
        }
    }
}

impl FromRemote for Investment {
    fn from_remote(value: &Value) -> Self {
        let fields = FieldReader::new(value);
        Investment {
            crop_id: fields.uint("cropId", 0),
            amount: fields.uint("amount", 1),
            timestamp: fields.u64("timestamp", 2),
            claimed: fields.bool("claimed", 3),
        }
    }
}
