// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The crop tokenization form and its validation. Validation happens before any
//! network access: a rejected form never reaches the metadata store or the contract.

use std::str::FromStr as _;

use alloy::primitives::U256;
use chrono::{DateTime, NaiveDate, Utc};
use num_bigint::BigInt;
use num_traits::Signed as _;

use crate::units;

/// A user-facing validation failure. The message names the violated constraint.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select or enter a crop type")]
    EmptyCropType,
    #[error("Please select or enter a crop variety")]
    EmptyVariety,
    #[error("Total supply must be greater than 0")]
    NonPositiveSupply,
    #[error("Total supply must be a whole number")]
    InvalidSupply,
    #[error("Price per token must be greater than 0")]
    NonPositivePrice,
    #[error("Price per token must be an amount of ether with at most 18 decimals")]
    InvalidPrice,
    #[error("Please select a harvest date")]
    MissingHarvestDate,
    #[error("Harvest date must be a date (YYYY-MM-DD) or an RFC 3339 timestamp")]
    InvalidHarvestDate,
    #[error("Harvest date must be in the future")]
    HarvestDateNotInFuture,
    #[error("Please enter the carbon credits")]
    MissingCarbonCredits,
    #[error("Carbon credits cannot be negative")]
    NegativeCarbonCredits,
    #[error("Carbon credits must be a whole number")]
    InvalidCarbonCredits,
    #[error("Please upload a crop image")]
    MissingImage,
    #[error("Token amount must be greater than 0")]
    NonPositiveTokenAmount,
    #[error("Token amount must be a whole number")]
    InvalidTokenAmount,
    #[error("Please enter your name")]
    EmptyFarmerName,
    #[error("Please enter your location")]
    EmptyFarmerLocation,
}

/// An image to attach to a crop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads an image from disk.
    #[cfg(with_persist)]
    pub fn read(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = fs_err::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// The raw content of the tokenization form, as typed by the farmer.
#[derive(Clone, Debug, Default)]
pub struct TokenizeForm {
    pub crop_type: String,
    pub variety: String,
    /// Number of tokens to mint.
    pub total_supply: String,
    /// Price of one token, in ether.
    pub price_per_token: String,
    /// Expected harvest date, `YYYY-MM-DD` or RFC 3339.
    pub harvest_date: String,
    pub carbon_credits: String,
    pub image: Option<ImageFile>,
}

/// A validated tokenization request, in contract units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizeRequest {
    pub crop_type: String,
    pub variety: String,
    pub total_supply: U256,
    /// In wei.
    pub price_per_token: U256,
    /// Unix timestamp, in seconds.
    pub harvest_date: u64,
    /// The harvest date as entered, for the metadata document.
    pub harvest_date_text: String,
    pub carbon_credits: U256,
    pub image: ImageFile,
}

impl TokenizeForm {
    /// Checks every constraint in order and returns the first one violated.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<TokenizeRequest, ValidationError> {
        let crop_type = self.crop_type.trim();
        if crop_type.is_empty() {
            return Err(ValidationError::EmptyCropType);
        }
        let variety = self.variety.trim();
        if variety.is_empty() {
            return Err(ValidationError::EmptyVariety);
        }

        let total_supply = match parse_integer(&self.total_supply) {
            Integer::Missing | Integer::NonPositive(_) => {
                return Err(ValidationError::NonPositiveSupply)
            }
            Integer::Invalid => return Err(ValidationError::InvalidSupply),
            Integer::Positive(value) => value,
        };

        let price = self.price_per_token.trim();
        if price.is_empty() {
            return Err(ValidationError::NonPositivePrice);
        }
        let price_per_token = match units::parse_ether(price) {
            Ok(value) if value.is_zero() => return Err(ValidationError::NonPositivePrice),
            Ok(value) => value,
            Err(units::Error::NegativeAmount(_)) => return Err(ValidationError::NonPositivePrice),
            Err(_) => return Err(ValidationError::InvalidPrice),
        };

        let harvest_date_text = self.harvest_date.trim();
        if harvest_date_text.is_empty() {
            return Err(ValidationError::MissingHarvestDate);
        }
        let harvest = parse_date(harvest_date_text).ok_or(ValidationError::InvalidHarvestDate)?;
        if harvest <= now {
            return Err(ValidationError::HarvestDateNotInFuture);
        }
        let harvest_date =
            u64::try_from(harvest.timestamp()).map_err(|_| ValidationError::InvalidHarvestDate)?;

        let carbon_credits = match parse_integer(&self.carbon_credits) {
            Integer::Missing => return Err(ValidationError::MissingCarbonCredits),
            Integer::NonPositive(true) => return Err(ValidationError::NegativeCarbonCredits),
            Integer::NonPositive(false) => U256::ZERO,
            Integer::Invalid => return Err(ValidationError::InvalidCarbonCredits),
            Integer::Positive(value) => value,
        };

        let image = self.image.clone().ok_or(ValidationError::MissingImage)?;

        Ok(TokenizeRequest {
            crop_type: crop_type.to_string(),
            variety: variety.to_string(),
            total_supply,
            price_per_token,
            harvest_date,
            harvest_date_text: harvest_date_text.to_string(),
            carbon_credits,
            image,
        })
    }
}

/// Parses the number of tokens to buy.
pub fn parse_token_amount(text: &str) -> Result<U256, ValidationError> {
    match parse_integer(text) {
        Integer::Positive(value) => Ok(value),
        Integer::Invalid => Err(ValidationError::InvalidTokenAmount),
        Integer::Missing | Integer::NonPositive(_) => Err(ValidationError::NonPositiveTokenAmount),
    }
}

enum Integer {
    Missing,
    Invalid,
    /// Zero, or negative when `true`.
    NonPositive(bool),
    Positive(U256),
}

fn parse_integer(text: &str) -> Integer {
    let text = text.trim();
    if text.is_empty() {
        return Integer::Missing;
    }
    let Ok(value) = BigInt::from_str(text) else {
        return Integer::Invalid;
    };
    if !value.is_positive() {
        return Integer::NonPositive(value.is_negative());
    }
    let (_, bytes) = value.to_bytes_be();
    match U256::try_from_be_slice(&bytes) {
        Some(value) => Integer::Positive(value),
        None => Integer::Invalid,
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|date| date.and_utc())
}
