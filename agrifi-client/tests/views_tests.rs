// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use agrifi_client::{
    data_types::Investment,
    test_utils::{
        make_client, sample_crop, sample_farmer, FakeMarketplace, RecordingNotifier, FARMER,
        INVESTOR,
    },
    units,
    views::{FarmerProfile, InvestQuote, InvestmentDetails, Marketplace, Portfolio},
};
use alloy::primitives::U256;
use assert_matches::assert_matches;

fn ether(amount: &str) -> U256 {
    units::parse_ether(amount).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_empty_marketplace() {
    let market = FakeMarketplace::default();
    let client = make_client(&market, Arc::new(RecordingNotifier::default()), None);

    let marketplace = Marketplace::load(&client).await;

    assert!(marketplace.is_empty());
    assert_eq!(market.call_count("getActiveCrops"), 1);
    assert_eq!(market.call_count("getCropToken"), 0);
    assert_eq!(
        marketplace.to_string(),
        "No tokenized crops available in the marketplace right now."
    );
}

#[test_log::test(tokio::test)]
async fn test_marketplace_lists_active_crops() {
    let market = FakeMarketplace::default();
    market.add_farmer(FARMER, sample_farmer("Wanjiru"));
    let maize = market.add_crop(sample_crop(FARMER, "Maize", ether("0.25")));
    let beans = market.add_crop(sample_crop(FARMER, "Beans", ether("1")));
    let client = make_client(&market, Arc::new(RecordingNotifier::default()), Some(FARMER));
    client.complete_harvest(beans, U256::from(10)).await.unwrap();

    let marketplace = Marketplace::load(&client).await;

    assert_eq!(marketplace.listings.len(), 1);
    let listing = &marketplace.listings[0];
    assert_eq!(listing.id, maize);
    assert_eq!(listing.price_per_token, "0.25");
    assert_eq!(listing.harvest_date, "2027-01-01");
    let text = marketplace.to_string();
    assert!(text.starts_with("#1 Maize (Heirloom) [active]"));
    assert!(text.contains("0x7099...79C8"));
    assert!(text.contains("0.25 ETH per token"));
}

#[test_log::test(tokio::test)]
async fn test_unreadable_crops_are_left_out() {
    let market = FakeMarketplace::default();
    market.add_crop(sample_crop(FARMER, "Maize", ether("1")));
    market.fail_method("getCropToken");
    let notifier = Arc::new(RecordingNotifier::default());
    let client = make_client(&market, notifier.clone(), None);

    assert!(Marketplace::load(&client).await.is_empty());
    assert_eq!(notifier.errors(), vec!["Failed to load crop"]);
}

#[test_log::test(tokio::test)]
async fn test_portfolio() {
    let market = FakeMarketplace::default();
    let crop_id = market.add_crop(sample_crop(FARMER, "Sorghum", ether("1")));
    market.add_investment(
        INVESTOR,
        Investment {
            crop_id,
            amount: U256::from(12),
            timestamp: 1_700_000_000,
            claimed: false,
        },
    );
    market.add_investment(
        INVESTOR,
        Investment {
            crop_id: U256::from(99),
            amount: U256::from(3),
            timestamp: 0,
            claimed: true,
        },
    );
    let client = make_client(&market, Arc::new(RecordingNotifier::default()), None);

    let portfolio = Portfolio::load(&client, INVESTOR).await;

    assert_eq!(portfolio.entries.len(), 2);
    assert_eq!(portfolio.entries[0].crop_type, "Sorghum");
    assert_eq!(portfolio.entries[0].date, "2023-11-14");
    assert_eq!(portfolio.entries[1].crop_type, "Unknown");
    assert_eq!(portfolio.entries[1].date, "-");
    assert_eq!(
        portfolio.to_string(),
        "#1 Sorghum (Heirloom): 12 tokens on 2023-11-14 [pending]\n\
         #99 Unknown (): 3 tokens on - [claimed]\n"
    );

    let empty = Portfolio::load(&client, FARMER).await;
    assert!(empty.is_empty());
    assert_eq!(empty.to_string(), "No investments yet.");
}

#[test_log::test(tokio::test)]
async fn test_investment_details() {
    let market = FakeMarketplace::default();
    let crop_id = market.add_crop(sample_crop(FARMER, "Cassava", ether("0.1")));
    market.set_accounts(vec![INVESTOR]);
    let client = make_client(&market, Arc::new(RecordingNotifier::default()), Some(INVESTOR));
    client
        .invest_in_crop(crop_id, U256::from(5), ether("0.1"))
        .await
        .unwrap();

    let details = InvestmentDetails::load(&client, crop_id, INVESTOR).await;

    assert_eq!(details.crop_type, "Cassava");
    assert_eq!(details.amount, U256::from(5));
    assert_eq!(details.total_supply, U256::from(1000));
    assert_eq!(details.price_per_token, "0.1");
    assert!(!details.claimed);
    assert!(details.to_string().contains("tokens held:  5 of 1000"));
}

#[test_log::test(tokio::test)]
async fn test_farmer_profile() {
    let market = FakeMarketplace::default();
    market.add_farmer(FARMER, sample_farmer("Wanjiru"));
    market.add_crop(sample_crop(FARMER, "Maize", ether("1")));
    let client = make_client(&market, Arc::new(RecordingNotifier::default()), None);

    let profile = FarmerProfile::load(&client, FARMER).await.unwrap();
    assert!(profile.is_registered());
    assert_eq!(profile.crops.len(), 1);
    let text = profile.to_string();
    assert!(text.starts_with("Wanjiru (0x7099...79C8)"));
    assert!(text.contains("ENS:        wanjiru.eth"));
    assert!(text.contains("#1 Maize (Heirloom) [active]"));

    let stranger = FarmerProfile::load(&client, INVESTOR).await.unwrap();
    assert!(!stranger.is_registered());
    assert_eq!(stranger.to_string(), "0x3C44...93BC is not a registered farmer.");

    market.fail_method("getFarmer");
    assert_eq!(FarmerProfile::load(&client, FARMER).await, None);
}

#[test]
fn test_invest_quote() {
    let mut crop = sample_crop(FARMER, "Maize", ether("0.02"));
    crop.id = U256::from(4);

    let quote = InvestQuote::new(&crop, U256::from(150)).unwrap();
    assert_eq!(quote.total_cost, ether("3"));
    assert_eq!(quote.to_string(), "150 tokens of crop #4 at 0.02 ETH = 3 ETH");

    crop.price_per_token = U256::MAX;
    assert_matches!(
        InvestQuote::new(&crop, U256::from(2)),
        Err(units::Error::Overflow { .. })
    );
}
