// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::U256;
use serde_json::json;

use crate::{
    metadata::{resolve_uri, CropMetadata},
    tokenize::{ImageFile, TokenizeRequest},
};

fn request() -> TokenizeRequest {
    TokenizeRequest {
        crop_type: "Coffee".to_string(),
        variety: "Arabica SL28".to_string(),
        total_supply: U256::from(500),
        price_per_token: U256::from(10).pow(U256::from(16)),
        harvest_date: 1_823_644_800,
        harvest_date_text: "2027-10-16".to_string(),
        carbon_credits: U256::from(12),
        image: ImageFile::new("coffee.jpg", vec![0xff, 0xd8]),
    }
}

#[test]
fn test_metadata_document() -> anyhow::Result<()> {
    let metadata = CropMetadata::for_crop(&request(), "https://store.test/coffee.jpg".to_string());
    let file = metadata.to_file()?;
    assert_eq!(file.file_name, "metadata.json");
    assert_eq!(file.content_type, "application/json");

    let document: serde_json::Value = serde_json::from_slice(&file.bytes)?;
    assert_eq!(
        document,
        json!({
            "name": "Coffee - Arabica SL28",
            "description": "Token representing Coffee (Arabica SL28)",
            "image": "https://store.test/coffee.jpg",
            "attributes": [
                {"trait_type": "Harvest Date", "value": "2027-10-16"},
                {"trait_type": "Carbon Credits", "value": "12"},
            ],
        })
    );
    Ok(())
}

#[test]
fn test_foreign_metadata_documents() -> anyhow::Result<()> {
    let metadata: CropMetadata = serde_json::from_value(json!({
        "name": "Tea",
        "imageUrl": "ipfs://QmTea",
        "attributes": [{"trait_type": "Carbon Credits", "value": 7}],
    }))?;
    assert_eq!(metadata.description, "");
    assert_eq!(
        metadata.image_url().as_deref(),
        Some("https://ipfs.io/ipfs/QmTea")
    );
    assert_eq!(metadata.attribute("Carbon Credits"), Some(&json!(7)));
    assert_eq!(metadata.attribute("Harvest Date"), None);

    let empty: CropMetadata = serde_json::from_value(json!({}))?;
    assert_eq!(empty.image_url(), None);
    Ok(())
}

#[test]
fn test_resolve_uri() {
    assert_eq!(resolve_uri("ipfs://QmX/1.json"), "https://ipfs.io/ipfs/QmX/1.json");
    assert_eq!(
        resolve_uri("https://store.test/1.json"),
        "https://store.test/1.json"
    );
}
