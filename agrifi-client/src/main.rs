// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end of the AgriFi marketplace.

use std::sync::Arc;

use agrifi_client::{
    config::{ClientCommand, ClientOptions},
    contract::ContractAdapter,
    metadata,
    notifier::{Notifier as _, TracingNotifier},
    persistent::{self, Persist},
    session::{SessionState, WalletSession},
    tokenize::{self, ImageFile, TokenizeForm},
    views::{CropListing, FarmerProfile, InvestQuote, InvestmentDetails, Marketplace, Portfolio},
    AgriFi, Error,
};
use alloy::primitives::Address;
use anyhow::{anyhow, Context as _, Result};
use clap::Parser as _;

fn main() -> Result<()> {
    let options = ClientOptions::parse();
    agrifi_client::logging::init();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(options))
}

async fn run(options: ClientOptions) -> Result<()> {
    let session_path = options.session_path()?;
    let state = persistent::File::read_or_create(&session_path, SessionState::default)
        .with_context(|| format!("cannot open the session at {}", session_path.display()))?;
    let session = WalletSession::restore(state);
    let contract = ContractAdapter::new(options.provider()?, options.contract_address)?;
    let mut client = AgriFi::new(session, contract, Arc::new(TracingNotifier));
    if let Some(store) = options.metadata_store()? {
        client = client.with_metadata_store(store);
    }

    match options.command {
        ClientCommand::Connect => {
            let address = client.connect().await?;
            println!("{address}");
        }

        ClientCommand::Disconnect => {
            client.disconnect().await?;
            println!("Disconnected");
        }

        ClientCommand::Status => {
            match client.active_account() {
                Some(address) => println!("Connected as {address}"),
                None => println!("Not connected"),
            }
            println!("Contract: {}", client.contract().address());
            if client.contract().provider().is_none() {
                println!("No wallet configured (set AGRIFI_RPC_URL)");
            }
        }

        ClientCommand::Marketplace => {
            println!("{}", Marketplace::load(&client).await);
        }

        ClientCommand::Crop { crop_id } => {
            let crop = client
                .get_crop_token(crop_id)
                .await
                .ok_or_else(|| anyhow!("crop {crop_id} could not be read"))?;
            println!("{}", CropListing::from(&crop));
        }

        ClientCommand::Farmer { address } => {
            let address = address_or_account(&client, address)?;
            let profile = FarmerProfile::load(&client, address)
                .await
                .ok_or_else(|| anyhow!("farmer {address} could not be read"))?;
            println!("{profile}");
        }

        ClientCommand::Farmers => {
            let farmers = client.get_registered_farmers().await;
            if farmers.is_empty() {
                println!("No registered farmers yet.");
            }
            for farmer in farmers {
                println!("{farmer}");
            }
        }

        ClientCommand::Register {
            name,
            location,
            ens_name,
        } => {
            account(&client)?;
            let outcome = client.register_farmer(&ens_name, &name, &location).await?;
            println!("{}", outcome.transaction_hash);
        }

        ClientCommand::Tokenize {
            crop_type,
            variety,
            total_supply,
            price_per_token,
            harvest_date,
            carbon_credits,
            image,
        } => {
            account(&client)?;
            let image = image
                .map(|path| {
                    ImageFile::read(&path)
                        .with_context(|| format!("cannot read {}", path.display()))
                })
                .transpose()?;
            let form = TokenizeForm {
                crop_type,
                variety,
                total_supply,
                price_per_token,
                harvest_date,
                carbon_credits,
                image,
            };
            let tokenized = client
                .tokenize_crop_from_form(&form, chrono::Utc::now())
                .await?;
            match tokenized.crop_id {
                Some(crop_id) => println!("Crop #{crop_id}"),
                None => println!("{}", tokenized.outcome.transaction_hash),
            }
        }

        ClientCommand::Invest { crop_id, amount } => {
            account(&client)?;
            let token_amount = tokenize::parse_token_amount(&amount).map_err(|error| {
                client.notifier().error(&error.to_string());
                Error::from(error)
            })?;
            let crop = client
                .get_crop_token(crop_id)
                .await
                .ok_or_else(|| anyhow!("crop {crop_id} could not be read"))?;
            let quote = InvestQuote::new(&crop, token_amount)?;
            println!("{quote}");
            let outcome = client
                .invest_in_crop(crop_id, token_amount, crop.price_per_token)
                .await?;
            println!("{}", outcome.transaction_hash);
        }

        ClientCommand::Harvest {
            crop_id,
            actual_yield,
        } => {
            account(&client)?;
            let outcome = client.complete_harvest(crop_id, actual_yield).await?;
            println!("{}", outcome.transaction_hash);
        }

        ClientCommand::Investments { investor } => {
            let investor = address_or_account(&client, investor)?;
            println!("{}", Portfolio::load(&client, investor).await);
        }

        ClientCommand::Investment { crop_id } => {
            let investor = account(&client)?;
            println!(
                "{}",
                InvestmentDetails::load(&client, crop_id, investor).await
            );
        }

        ClientCommand::WithdrawFees => {
            account(&client)?;
            let outcome = client.withdraw_fees().await?;
            println!("{}", outcome.transaction_hash);
        }

        ClientCommand::SetFee { pct } => {
            account(&client)?;
            let outcome = client.set_platform_fee_pct(pct).await?;
            println!("{}", outcome.transaction_hash);
        }

        ClientCommand::SetTokenUri { token_id, uri } => {
            account(&client)?;
            let outcome = client.set_token_uri(token_id, &uri).await?;
            println!("{}", outcome.transaction_hash);
        }

        ClientCommand::Metadata { uri } => {
            let document = metadata::fetch(&uri).await?;
            println!("{}", document.name);
            if !document.description.is_empty() {
                println!("{}", document.description);
            }
            if let Some(image) = document.image_url() {
                println!("image: {image}");
            }
            for attribute in &document.attributes {
                let value = match &attribute.value {
                    serde_json::Value::String(value) => value.clone(),
                    value => value.to_string(),
                };
                println!("{}: {value}", attribute.trait_type);
            }
        }
    }
    Ok(())
}

/// The connected account; commands that act on behalf of the user require one.
fn account<P>(client: &AgriFi<P>) -> Result<Address>
where
    P: Persist<Target = SessionState>,
{
    client
        .active_account()
        .ok_or(Error::NotConnected)
        .context("run `agrifi connect` first")
}

fn address_or_account<P>(client: &AgriFi<P>, address: Option<Address>) -> Result<Address>
where
    P: Persist<Target = SessionState>,
{
    match address {
        Some(address) => Ok(address),
        None => account(client),
    }
}
