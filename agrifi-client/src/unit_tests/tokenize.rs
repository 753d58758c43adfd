// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::U256;
use chrono::{DateTime, Duration, TimeZone as _, Utc};
use test_case::test_case;

use crate::tokenize::{parse_token_amount, ImageFile, TokenizeForm, ValidationError};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn valid_form() -> TokenizeForm {
    TokenizeForm {
        crop_type: "Maize".to_string(),
        variety: "Hybrid H614".to_string(),
        total_supply: "100".to_string(),
        price_per_token: "2".to_string(),
        harvest_date: "2027-10-16".to_string(),
        carbon_credits: "50".to_string(),
        image: Some(ImageFile::new("maize.png", vec![0x89, b'P', b'N', b'G'])),
    }
}

#[test]
fn test_valid_form() {
    let request = valid_form().validate(now()).unwrap();
    assert_eq!(request.crop_type, "Maize");
    assert_eq!(request.total_supply, U256::from(100));
    assert_eq!(
        request.price_per_token,
        U256::from(2_000_000_000_000_000_000u128)
    );
    assert_eq!(request.harvest_date, 1_823_644_800);
    assert_eq!(request.harvest_date_text, "2027-10-16");
    assert_eq!(request.carbon_credits, U256::from(50));
    assert_eq!(request.image.content_type, "image/png");
}

#[test_case(|form| form.crop_type = "  ".to_string(), ValidationError::EmptyCropType ; "blank crop type")]
#[test_case(|form| form.variety = String::new(), ValidationError::EmptyVariety ; "empty variety")]
#[test_case(|form| form.total_supply = String::new(), ValidationError::NonPositiveSupply ; "missing supply")]
#[test_case(|form| form.total_supply = "0".to_string(), ValidationError::NonPositiveSupply ; "zero supply")]
#[test_case(|form| form.total_supply = "-5".to_string(), ValidationError::NonPositiveSupply ; "negative supply")]
#[test_case(|form| form.total_supply = "2.5".to_string(), ValidationError::InvalidSupply ; "fractional supply")]
#[test_case(|form| form.price_per_token = "0".to_string(), ValidationError::NonPositivePrice ; "zero price")]
#[test_case(|form| form.price_per_token = "0.0".to_string(), ValidationError::NonPositivePrice ; "zero decimal price")]
#[test_case(|form| form.price_per_token = "-1".to_string(), ValidationError::NonPositivePrice ; "negative price")]
#[test_case(|form| form.price_per_token = "cheap".to_string(), ValidationError::InvalidPrice ; "malformed price")]
#[test_case(|form| form.harvest_date = String::new(), ValidationError::MissingHarvestDate ; "missing date")]
#[test_case(|form| form.harvest_date = "next summer".to_string(), ValidationError::InvalidHarvestDate ; "malformed date")]
#[test_case(|form| form.harvest_date = "2025-01-01".to_string(), ValidationError::HarvestDateNotInFuture ; "past date")]
#[test_case(|form| form.carbon_credits = String::new(), ValidationError::MissingCarbonCredits ; "missing credits")]
#[test_case(|form| form.carbon_credits = "-1".to_string(), ValidationError::NegativeCarbonCredits ; "negative credits")]
#[test_case(|form| form.carbon_credits = "lots".to_string(), ValidationError::InvalidCarbonCredits ; "malformed credits")]
#[test_case(|form| form.image = None, ValidationError::MissingImage ; "missing image")]
fn test_invalid_form(change: fn(&mut TokenizeForm), expected: ValidationError) {
    let mut form = valid_form();
    change(&mut form);
    assert_eq!(form.validate(now()), Err(expected));
}

#[test]
fn test_zero_carbon_credits_are_accepted() {
    let mut form = valid_form();
    form.carbon_credits = "0".to_string();
    assert_eq!(form.validate(now()).unwrap().carbon_credits, U256::ZERO);
}

#[test]
fn test_first_violation_is_reported() {
    let form = TokenizeForm {
        variety: "Hybrid".to_string(),
        total_supply: "0".to_string(),
        ..TokenizeForm::default()
    };
    assert_eq!(form.validate(now()), Err(ValidationError::EmptyCropType));
}

#[test]
fn test_harvest_date_must_be_strictly_in_the_future() {
    let mut form = valid_form();

    form.harvest_date = now().to_rfc3339();
    assert_eq!(
        form.validate(now()),
        Err(ValidationError::HarvestDateNotInFuture)
    );

    form.harvest_date = (now() + Duration::milliseconds(1)).to_rfc3339();
    let request = form.validate(now()).unwrap();
    assert_eq!(request.harvest_date, now().timestamp() as u64);

    form.harvest_date = (now() - Duration::milliseconds(1)).to_rfc3339();
    assert_eq!(
        form.validate(now()),
        Err(ValidationError::HarvestDateNotInFuture)
    );
}

#[test]
fn test_today_is_not_in_the_future() {
    let mut form = valid_form();
    form.harvest_date = "2026-10-16".to_string();
    assert_eq!(
        form.validate(now()),
        Err(ValidationError::HarvestDateNotInFuture)
    );
    form.harvest_date = "2026-10-17".to_string();
    assert!(form.validate(now()).is_ok());
}

#[test]
fn test_validation_messages() {
    assert_eq!(
        ValidationError::EmptyCropType.to_string(),
        "Please select or enter a crop type"
    );
    assert_eq!(
        ValidationError::NonPositiveSupply.to_string(),
        "Total supply must be greater than 0"
    );
    assert_eq!(
        ValidationError::HarvestDateNotInFuture.to_string(),
        "Harvest date must be in the future"
    );
    assert_eq!(
        ValidationError::NegativeCarbonCredits.to_string(),
        "Carbon credits cannot be negative"
    );
    assert_eq!(
        ValidationError::MissingImage.to_string(),
        "Please upload a crop image"
    );
}

#[test_case("3", Ok(U256::from(3)) ; "whole number")]
#[test_case(" 10 ", Ok(U256::from(10)) ; "padded")]
#[test_case("0", Err(ValidationError::NonPositiveTokenAmount) ; "zero")]
#[test_case("-2", Err(ValidationError::NonPositiveTokenAmount) ; "negative")]
#[test_case("", Err(ValidationError::NonPositiveTokenAmount) ; "empty")]
#[test_case("1.5", Err(ValidationError::InvalidTokenAmount) ; "fraction")]
fn test_parse_token_amount(text: &str, expected: Result<U256, ValidationError>) {
    assert_eq!(parse_token_amount(text), expected);
}
