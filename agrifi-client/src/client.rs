// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The operations of the AgriFi marketplace.
//!
//! Every operation binds a fresh contract handle and performs a single contract call.
//! Failed reads are logged, notified and replaced by a default value. Failed writes
//! are logged and notified, then returned to the caller.

use std::sync::Arc;

use agrifi_ethereum::common::TransactionOutcome;
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    contract::ContractAdapter,
    data_types::{CropToken, Farmer, Investment},
    decode::{self, FromRemote as _},
    metadata::{CropMetadata, MetadataStore},
    notifier::Notifier,
    persistent::Persist,
    session::{SessionState, WalletSession},
    tokenize::{TokenizeForm, TokenizeRequest, ValidationError},
    units, Error,
};

/// The result of tokenizing a crop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizedCrop {
    /// The id assigned by the contract, if it could be determined.
    pub crop_id: Option<U256>,
    pub outcome: TransactionOutcome,
}

/// A client of the AgriFi contract.
pub struct AgriFi<P> {
    session: WalletSession<P>,
    contract: ContractAdapter,
    notifier: Arc<dyn Notifier>,
    metadata_store: Option<Arc<dyn MetadataStore>>,
}

fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

impl<P> AgriFi<P>
where
    P: Persist<Target = SessionState>,
{
    pub fn new(
        session: WalletSession<P>,
        contract: ContractAdapter,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            contract,
            notifier,
            metadata_store: None,
        }
    }

    pub fn with_metadata_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata_store = Some(store);
        self
    }

    pub fn session(&self) -> &WalletSession<P> {
        &self.session
    }

    pub fn contract(&self) -> &ContractAdapter {
        &self.contract
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn active_account(&self) -> Option<Address> {
        self.session.active_account()
    }

    /// Connects the wallet of the injected provider.
    pub async fn connect(&mut self) -> Result<Address, Error> {
        self.session
            .connect(self.contract.provider(), self.notifier.as_ref())
            .await
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.session.disconnect().await
    }

    async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<Value, Error> {
        let contract = self.contract.get_contract(self.notifier.as_ref()).await?;
        Ok(contract.call(method, args).await?)
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<TransactionOutcome, Error> {
        let contract = self.contract.get_contract(self.notifier.as_ref()).await?;
        let outcome = contract.send(method, args, value).await?;
        tracing::info!(
            %method,
            transaction = %outcome.transaction_hash,
            "transaction confirmed"
        );
        Ok(outcome)
    }

    /// Performs a read-only call; failures are reported and turned into `None`.
    async fn query(&self, method: &str, args: &[DynSolValue], failure: &str) -> Option<Value> {
        match self.call(method, args).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!("{method} failed: {error}");
                self.notifier.error(failure);
                None
            }
        }
    }

    /// Submits a transaction and reports its outcome.
    async fn submit(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: U256,
        success: &str,
        failure: &str,
    ) -> Result<TransactionOutcome, Error> {
        match self.send(method, args, value).await {
            Ok(outcome) => {
                self.notifier.success(success);
                Ok(outcome)
            }
            Err(error) => {
                tracing::error!("{method} failed: {error}");
                self.notifier.error(failure);
                Err(error)
            }
        }
    }

    fn reject(&self, error: ValidationError) -> Error {
        self.notifier.error(&error.to_string());
        error.into()
    }

    pub async fn get_crop_token(&self, crop_id: U256) -> Option<CropToken> {
        let value = self
            .query("getCropToken", &[uint(crop_id)], "Failed to load crop")
            .await?;
        let mut crop = CropToken::from_remote(&value);
        crop.id = crop_id;
        Some(crop)
    }

    pub async fn get_active_crops(&self) -> Vec<U256> {
        self.query("getActiveCrops", &[], "Failed to load active crops")
            .await
            .map(|value| decode::parse_uint_list(&value))
            .unwrap_or_default()
    }

    pub async fn get_registered_farmers(&self) -> Vec<Address> {
        self.query("getRegisteredFarmers", &[], "Failed to load farmers")
            .await
            .map(|value| decode::parse_address_list(&value))
            .unwrap_or_default()
    }

    pub async fn get_farmer(&self, address: Address) -> Option<Farmer> {
        let value = self
            .query(
                "getFarmer",
                &[DynSolValue::Address(address)],
                "Failed to load farmer",
            )
            .await?;
        Some(Farmer::from_remote(&value))
    }

    /// The investment of `investor` in a crop; all zero if it can't be read.
    pub async fn get_investment(&self, crop_id: U256, investor: Address) -> Investment {
        self.query(
            "getInvestment",
            &[uint(crop_id), DynSolValue::Address(investor)],
            "Failed to load investment",
        )
        .await
        .map(|value| Investment::from_remote(&value))
        .unwrap_or_default()
    }

    pub async fn get_investor_history(&self, investor: Address) -> Vec<Investment> {
        self.query(
            "getInvestorHistory",
            &[DynSolValue::Address(investor)],
            "Failed to load investments",
        )
        .await
        .map(|value| decode::decode_list(&value))
        .unwrap_or_default()
    }

    /// Registers the signing account as a farmer. `ens_name` may be empty.
    pub async fn register_farmer(
        &self,
        ens_name: &str,
        name: &str,
        location: &str,
    ) -> Result<TransactionOutcome, Error> {
        if name.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyFarmerName));
        }
        if location.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyFarmerLocation));
        }
        let args = [
            DynSolValue::String(ens_name.trim().to_string()),
            DynSolValue::String(name.trim().to_string()),
            DynSolValue::String(location.trim().to_string()),
        ];
        self.submit(
            "registerFarmer",
            &args,
            U256::ZERO,
            "Farmer registered successfully!",
            "Farmer registration failed",
        )
        .await
    }

    /// Tokenizes a validated crop whose metadata document is at `metadata_uri`.
    pub async fn tokenize_crop(
        &self,
        request: &TokenizeRequest,
        metadata_uri: &str,
    ) -> Result<TokenizedCrop, Error> {
        let outcome = self
            .submit(
                "tokenizeCrop",
                &tokenize_args(request, metadata_uri),
                U256::ZERO,
                "Crop tokenized successfully!",
                "Crop tokenization failed",
            )
            .await?;
        let crop_id = self.assigned_crop_id(&outcome).await;
        Ok(TokenizedCrop { crop_id, outcome })
    }

    /// Validates the form, uploads the image and the metadata document, then tokenizes
    /// the crop. Nothing is sent anywhere if the form is invalid.
    pub async fn tokenize_crop_from_form(
        &self,
        form: &TokenizeForm,
        now: DateTime<Utc>,
    ) -> Result<TokenizedCrop, Error> {
        let request = form.validate(now).map_err(|error| self.reject(error))?;
        let Some(store) = &self.metadata_store else {
            self.notifier.error("No metadata store configured");
            return Err(Error::NoMetadataStore);
        };

        self.notifier.loading("Uploading crop data...");
        let result: Result<TransactionOutcome, Error> = async {
            let image_url = store.upload(request.image.clone()).await?;
            tracing::debug!(%image_url, "crop image uploaded");
            let metadata = CropMetadata::for_crop(&request, image_url);
            let metadata_url = store.upload(metadata.to_file()?).await?;
            tracing::debug!(%metadata_url, "crop metadata uploaded");
            self.notifier.loading("Submitting to blockchain...");
            self.send(
                "tokenizeCrop",
                &tokenize_args(&request, &metadata_url),
                U256::ZERO,
            )
            .await
        }
        .await;

        self.notifier.dismiss();
        match result {
            Ok(outcome) => {
                self.notifier.success("Crop tokenized successfully!");
                let crop_id = self.assigned_crop_id(&outcome).await;
                Ok(TokenizedCrop { crop_id, outcome })
            }
            Err(error) => {
                tracing::error!("tokenizing the crop failed: {error}");
                let message = error
                    .reason()
                    .unwrap_or_else(|| "Failed to tokenize crop".to_string());
                self.notifier.error(&message);
                Err(error)
            }
        }
    }

    /// Reads the id of a new crop from the `CropTokenized` event of the transaction,
    /// falling back to the latest crop of the signing farmer. The session account may
    /// differ from the signer if the wallet switched accounts.
    async fn assigned_crop_id(&self, outcome: &TransactionOutcome) -> Option<U256> {
        match self.contract.event_selector("CropTokenized") {
            Ok(selector) => {
                let from_event = outcome
                    .logs_matching(self.contract.address(), selector)
                    .last()
                    .and_then(|log| log.topics.get(1))
                    .map(|topic| U256::from_be_bytes(topic.0));
                if from_event.is_some() {
                    return from_event;
                }
            }
            Err(error) => tracing::warn!("{error}"),
        }
        let signer = match self.contract.provider() {
            Some(provider) => provider
                .signer()
                .await
                .map_err(|error| tracing::warn!("cannot read the signing account: {error}"))
                .ok(),
            None => None,
        };
        let farmer = signer.or_else(|| self.session.active_account())?;
        let value = self
            .call("getFarmer", &[DynSolValue::Address(farmer)])
            .await
            .map_err(|error| tracing::warn!("cannot read the crops of {farmer}: {error}"))
            .ok()?;
        Farmer::from_remote(&value).crop_ids.last().copied()
    }

    /// Buys `token_amount` tokens of a crop at `price_per_token` wei each. The payment
    /// attached to the transaction is the product of the two.
    pub async fn invest_in_crop(
        &self,
        crop_id: U256,
        token_amount: U256,
        price_per_token: U256,
    ) -> Result<TransactionOutcome, Error> {
        if token_amount.is_zero() {
            return Err(self.reject(ValidationError::NonPositiveTokenAmount));
        }
        let cost = match units::total_cost(token_amount, price_per_token) {
            Ok(cost) => cost,
            Err(error) => {
                tracing::error!("{error}");
                self.notifier.error("Investment failed");
                return Err(error.into());
            }
        };
        self.submit(
            "investInCrop",
            &[uint(crop_id), uint(token_amount)],
            cost,
            "Investment successful!",
            "Investment failed",
        )
        .await
    }

    pub async fn complete_harvest(
        &self,
        crop_id: U256,
        actual_yield: U256,
    ) -> Result<TransactionOutcome, Error> {
        self.submit(
            "completeHarvest",
            &[uint(crop_id), uint(actual_yield)],
            U256::ZERO,
            "Harvest completed!",
            "Failed to complete harvest",
        )
        .await
    }

    /// Only the contract owner may withdraw; the contract enforces it.
    pub async fn withdraw_fees(&self) -> Result<TransactionOutcome, Error> {
        self.submit(
            "withdrawFees",
            &[],
            U256::ZERO,
            "Platform fees withdrawn!",
            "Withdraw failed",
        )
        .await
    }

    pub async fn set_platform_fee_pct(&self, new_pct: U256) -> Result<TransactionOutcome, Error> {
        self.submit(
            "setPlatformFeePct",
            &[uint(new_pct)],
            U256::ZERO,
            "Platform fee updated!",
            "Failed to update fee",
        )
        .await
    }

    pub async fn set_token_uri(
        &self,
        token_id: U256,
        uri: &str,
    ) -> Result<TransactionOutcome, Error> {
        self.submit(
            "setTokenURI",
            &[uint(token_id), DynSolValue::String(uri.to_string())],
            U256::ZERO,
            "Token URI updated!",
            "Failed to update token URI",
        )
        .await
    }
}

fn tokenize_args(request: &TokenizeRequest, metadata_uri: &str) -> Vec<DynSolValue> {
    vec![
        DynSolValue::String(request.crop_type.clone()),
        DynSolValue::String(request.variety.clone()),
        uint(request.total_supply),
        uint(request.price_per_token),
        uint(U256::from(request.harvest_date)),
        uint(request.carbon_credits),
        DynSolValue::String(metadata_uri.to_string()),
    ]
}
