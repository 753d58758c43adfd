// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::U256;
use assert_matches::assert_matches;
use test_case::test_case;

use crate::units::{format_ether, parse_ether, total_cost, Error};

const ETHER: u128 = 1_000_000_000_000_000_000;

#[test_case(0, "0")]
#[test_case(ETHER, "1")]
#[test_case(2 * ETHER, "2")]
#[test_case(ETHER + ETHER / 2, "1.5")]
#[test_case(1, "0.000000000000000001")]
#[test_case(123_450_000_000_000_000, "0.12345")]
fn test_format_ether(wei: u128, expected: &str) {
    assert_eq!(format_ether(U256::from(wei)), expected);
}

#[test_case("2", 2 * ETHER)]
#[test_case("0.5", ETHER / 2)]
#[test_case(" 1.5 ", ETHER + ETHER / 2)]
#[test_case("0.000000000000000001", 1)]
fn test_parse_ether(amount: &str, expected: u128) {
    assert_eq!(parse_ether(amount).unwrap(), U256::from(expected));
}

#[test]
fn test_parse_ether_rejects_bad_amounts() {
    assert_matches!(parse_ether("-1"), Err(Error::NegativeAmount(_)));
    assert_matches!(parse_ether("two"), Err(Error::InvalidAmount { .. }));
    assert_matches!(
        parse_ether("0.0000000000000000001"),
        Err(Error::TooManyDecimals(_))
    );
}

#[test]
fn test_ether_round_trip() {
    for wei in [1u128, 999, ETHER, 7 * ETHER / 4, 1_234_567 * ETHER] {
        let wei = U256::from(wei);
        assert_eq!(parse_ether(&format_ether(wei)).unwrap(), wei);
    }
}

#[test]
fn test_total_cost() {
    let price = parse_ether("0.25").unwrap();
    assert_eq!(
        total_cost(U256::from(10), price).unwrap(),
        parse_ether("2.5").unwrap()
    );
    assert_eq!(total_cost(U256::ZERO, price).unwrap(), U256::ZERO);
    assert_matches!(
        total_cost(U256::MAX, U256::from(2)),
        Err(Error::Overflow { .. })
    );
}
