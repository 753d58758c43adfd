// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::{address, U256};
use serde_json::{json, Value};
use test_case::test_case;

use crate::{
    data_types::{CropToken, Farmer, Investment},
    decode::{decode_list, parse_address_list, parse_uint, FromRemote as _},
};

fn named_crop() -> Value {
    json!({
        "farmer": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        "cropType": "Maize",
        "variety": "Hybrid H614",
        "totalSupply": "1000",
        "pricePerToken": "2000000000000000000",
        "harvestDate": "1798761600",
        "carbonCredits": "50",
        "isActive": true,
        "totalInvested": "25",
        "metadataURI": "ipfs://QmMaize",
    })
}

fn positional_crop() -> Value {
    json!([
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        "Maize",
        "Hybrid H614",
        "1000",
        "2000000000000000000",
        "1798761600",
        "50",
        true,
        "25",
        "ipfs://QmMaize",
    ])
}

#[test_case(named_crop() ; "named fields")]
#[test_case(positional_crop() ; "positional tuple")]
fn test_crop_token_decoding(value: Value) {
    let crop = CropToken::from_remote(&value);
    assert_eq!(
        crop,
        CropToken {
            id: U256::ZERO,
            farmer: address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            crop_type: "Maize".to_string(),
            variety: "Hybrid H614".to_string(),
            total_supply: U256::from(1000),
            price_per_token: U256::from(2_000_000_000_000_000_000u128),
            harvest_date: 1_798_761_600,
            carbon_credits: U256::from(50),
            is_active: true,
            total_invested: U256::from(25),
            metadata_uri: "ipfs://QmMaize".to_string(),
        }
    );
}

#[test]
fn test_named_and_positional_farmers_are_identical() {
    let named = json!({
        "ensName": "wanjiru.eth",
        "name": "Wanjiru",
        "location": "Nakuru",
        "reputationScore": "87",
        "isRegistered": true,
        "cropIds": ["1", "4"],
    });
    let positional = json!(["wanjiru.eth", "Wanjiru", "Nakuru", "87", true, ["1", "4"]]);
    let farmer = Farmer::from_remote(&named);
    assert_eq!(farmer, Farmer::from_remote(&positional));
    assert_eq!(farmer.crop_ids, vec![U256::from(1), U256::from(4)]);
    assert_eq!(farmer.reputation_score, U256::from(87));
}

#[test]
fn test_numbers_and_strings_mix() {
    let value = json!({
        "cropId": "3",
        "amount": "10",
        "timestamp": 1_700_000_000u64,
        "claimed": false,
    });
    let investment = Investment::from_remote(&value);
    assert_eq!(investment.crop_id, U256::from(3));
    assert_eq!(investment.amount, U256::from(10));
    assert_eq!(investment.timestamp, 1_700_000_000);
}

#[test_case(json!(null) ; "null")]
#[test_case(json!({}) ; "empty object")]
#[test_case(json!([]) ; "empty tuple")]
#[test_case(json!(0) ; "zero")]
fn test_missing_fields_read_as_zero(value: Value) {
    assert_eq!(Farmer::from_remote(&value), Farmer::default());
    assert_eq!(CropToken::from_remote(&value), CropToken::default());
    assert_eq!(Investment::from_remote(&value), Investment::default());
}

#[test]
fn test_partial_tuple_falls_back_to_defaults() {
    let value = json!(["0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "Rice"]);
    let crop = CropToken::from_remote(&value);
    assert_eq!(crop.crop_type, "Rice");
    assert_eq!(crop.variety, "");
    assert_eq!(crop.total_supply, U256::ZERO);
    assert!(!crop.is_active);
    assert_eq!(crop.metadata_uri, "");
}

#[test_case(json!(42), 42 ; "json number")]
#[test_case(json!("42"), 42 ; "decimal string")]
#[test_case(json!("0x2a"), 42 ; "hex string")]
#[test_case(json!(" 42 "), 42 ; "padded string")]
#[test_case(json!("forty-two"), 0 ; "garbage")]
#[test_case(json!(-1), 0 ; "negative number")]
#[test_case(json!(true), 0 ; "boolean")]
fn test_parse_uint(value: Value, expected: u64) {
    assert_eq!(parse_uint(&value), U256::from(expected));
}

#[test]
fn test_investor_history_decoding() {
    let history = json!([
        {"cropId": "1", "amount": "5", "timestamp": "1700000000", "claimed": false},
        ["2", "7", "1700000100", true],
    ]);
    let investments: Vec<Investment> = decode_list(&history);
    assert_eq!(investments.len(), 2);
    assert_eq!(investments[0].crop_id, U256::from(1));
    assert_eq!(investments[1].amount, U256::from(7));
    assert!(investments[1].claimed);
    assert!(decode_list::<Investment>(&json!("not a list")).is_empty());
}

#[test]
fn test_address_list_skips_garbage() {
    let addresses = parse_address_list(&json!([
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        "not an address",
        7,
    ]));
    assert_eq!(
        addresses,
        vec![address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")]
    );
}
