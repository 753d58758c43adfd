// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! View models of the marketplace pages. Entities are fetched one after the other.

use std::fmt;

use alloy::primitives::{Address, U256};

use crate::{
    client::AgriFi,
    data_types::{format_date, CropToken, Farmer, Investment},
    persistent::Persist,
    session::SessionState,
    units,
    util::shorten_address,
};

/// A crop as listed on the marketplace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropListing {
    pub id: U256,
    pub farmer: Address,
    pub crop_type: String,
    pub variety: String,
    pub total_supply: U256,
    /// In ether.
    pub price_per_token: String,
    pub harvest_date: String,
    pub carbon_credits: U256,
    pub total_invested: U256,
    pub is_active: bool,
    pub metadata_uri: String,
}

impl From<&CropToken> for CropListing {
    fn from(crop: &CropToken) -> Self {
        CropListing {
            id: crop.id,
            farmer: crop.farmer,
            crop_type: crop.crop_type.clone(),
            variety: crop.variety.clone(),
            total_supply: crop.total_supply,
            price_per_token: crop.price_in_ether(),
            harvest_date: crop.harvest_date_display(),
            carbon_credits: crop.carbon_credits,
            total_invested: crop.total_invested,
            is_active: crop.is_active,
            metadata_uri: crop.metadata_uri.clone(),
        }
    }
}

impl fmt::Display for CropListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_active { "active" } else { "harvested" };
        writeln!(f, "#{} {} ({}) [{status}]", self.id, self.crop_type, self.variety)?;
        writeln!(f, "  farmer:         {}", shorten_address(&self.farmer.to_string()))?;
        writeln!(f, "  supply:         {} tokens", self.total_supply)?;
        writeln!(f, "  price:          {} ETH per token", self.price_per_token)?;
        writeln!(f, "  harvest:        {}", self.harvest_date)?;
        writeln!(f, "  carbon credits: {}", self.carbon_credits)?;
        write!(f, "  invested:       {}", self.total_invested)?;
        if !self.metadata_uri.is_empty() {
            write!(f, "\n  metadata:       {}", self.metadata_uri)?;
        }
        Ok(())
    }
}

/// The active crops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Marketplace {
    pub listings: Vec<CropListing>,
}

impl Marketplace {
    /// Loads every active crop. Crops that can't be read are left out.
    pub async fn load<P>(client: &AgriFi<P>) -> Self
    where
        P: Persist<Target = SessionState>,
    {
        let mut listings = Vec::new();
        for id in client.get_active_crops().await {
            if let Some(crop) = client.get_crop_token(id).await {
                listings.push(CropListing::from(&crop));
            }
        }
        Marketplace { listings }
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(
                f,
                "No tokenized crops available in the marketplace right now."
            );
        }
        for (i, listing) in self.listings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{listing}")?;
        }
        Ok(())
    }
}

/// One entry of an investor's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortfolioEntry {
    pub crop_id: U256,
    pub crop_type: String,
    pub variety: String,
    pub amount: U256,
    pub date: String,
    pub claimed: bool,
}

/// The investments of one investor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Portfolio {
    pub entries: Vec<PortfolioEntry>,
}

impl Portfolio {
    /// Loads the history of `investor`, with the name of every crop.
    pub async fn load<P>(client: &AgriFi<P>, investor: Address) -> Self
    where
        P: Persist<Target = SessionState>,
    {
        let mut entries = Vec::new();
        for investment in client.get_investor_history(investor).await {
            let crop = client.get_crop_token(investment.crop_id).await;
            let (crop_type, variety) = match crop {
                Some(crop) => (crop.crop_type, crop.variety),
                None => ("Unknown".to_string(), String::new()),
            };
            entries.push(PortfolioEntry {
                crop_id: investment.crop_id,
                crop_type,
                variety,
                amount: investment.amount,
                date: format_date(investment.timestamp),
                claimed: investment.claimed,
            });
        }
        Portfolio { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No investments yet.");
        }
        for entry in &self.entries {
            let claimed = if entry.claimed { "claimed" } else { "pending" };
            writeln!(
                f,
                "#{} {} ({}): {} tokens on {} [{claimed}]",
                entry.crop_id, entry.crop_type, entry.variety, entry.amount, entry.date
            )?;
        }
        Ok(())
    }
}

/// The investment of one investor in one crop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvestmentDetails {
    pub crop_id: U256,
    pub crop_type: String,
    pub variety: String,
    pub total_supply: U256,
    /// In ether.
    pub price_per_token: String,
    pub amount: U256,
    pub date: String,
    pub claimed: bool,
}

impl InvestmentDetails {
    pub async fn load<P>(client: &AgriFi<P>, crop_id: U256, investor: Address) -> Self
    where
        P: Persist<Target = SessionState>,
    {
        let investment = client.get_investment(crop_id, investor).await;
        let crop = client.get_crop_token(crop_id).await.unwrap_or_default();
        Self::new(crop_id, &investment, &crop)
    }

    pub fn new(crop_id: U256, investment: &Investment, crop: &CropToken) -> Self {
        InvestmentDetails {
            crop_id,
            crop_type: crop.crop_type.clone(),
            variety: crop.variety.clone(),
            total_supply: crop.total_supply,
            price_per_token: crop.price_in_ether(),
            amount: investment.amount,
            date: format_date(investment.timestamp),
            claimed: investment.claimed,
        }
    }
}

impl fmt::Display for InvestmentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {} ({})", self.crop_id, self.crop_type, self.variety)?;
        writeln!(f, "  tokens held:  {} of {}", self.amount, self.total_supply)?;
        writeln!(f, "  price:        {} ETH per token", self.price_per_token)?;
        writeln!(f, "  invested on:  {}", self.date)?;
        write!(f, "  claimed:      {}", if self.claimed { "yes" } else { "no" })
    }
}

/// A farmer and their crops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FarmerProfile {
    pub address: Address,
    pub farmer: Farmer,
    pub crops: Vec<CropListing>,
}

impl FarmerProfile {
    /// Loads the farmer at `address`, or `None` if it can't be read.
    pub async fn load<P>(client: &AgriFi<P>, address: Address) -> Option<Self>
    where
        P: Persist<Target = SessionState>,
    {
        let farmer = client.get_farmer(address).await?;
        let mut crops = Vec::new();
        for id in &farmer.crop_ids {
            if let Some(crop) = client.get_crop_token(*id).await {
                crops.push(CropListing::from(&crop));
            }
        }
        Some(FarmerProfile {
            address,
            farmer,
            crops,
        })
    }

    pub fn is_registered(&self) -> bool {
        self.farmer.is_registered
    }
}

impl fmt::Display for FarmerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = shorten_address(&self.address.to_string());
        if !self.is_registered() {
            return write!(f, "{address} is not a registered farmer.");
        }
        writeln!(f, "{} ({address})", self.farmer.name)?;
        if !self.farmer.ens_name.is_empty() {
            writeln!(f, "  ENS:        {}", self.farmer.ens_name)?;
        }
        writeln!(f, "  location:   {}", self.farmer.location)?;
        write!(f, "  reputation: {}", self.farmer.reputation_score)?;
        if self.crops.is_empty() {
            write!(f, "\nNo crops tokenized yet.")?;
        }
        for crop in &self.crops {
            write!(f, "\n{crop}")?;
        }
        Ok(())
    }
}

/// The cost of buying tokens of a crop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvestQuote {
    pub crop_id: U256,
    pub token_amount: U256,
    /// In wei.
    pub price_per_token: U256,
    /// In wei.
    pub total_cost: U256,
}

impl InvestQuote {
    pub fn new(crop: &CropToken, token_amount: U256) -> Result<Self, units::Error> {
        Ok(InvestQuote {
            crop_id: crop.id,
            token_amount,
            price_per_token: crop.price_per_token,
            total_cost: units::total_cost(token_amount, crop.price_per_token)?,
        })
    }
}

impl fmt::Display for InvestQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tokens of crop #{} at {} ETH = {} ETH",
            self.token_amount,
            self.crop_id,
            units::format_ether(self.price_per_token),
            units::format_ether(self.total_cost)
        )
    }
}
