// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Access to the deployed AgriFi contract.

use std::sync::Arc;

use agrifi_ethereum::{
    client::{ContractBackend, InjectedProvider},
    common::EthereumServiceError,
};
use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, B256},
};

use crate::{notifier::Notifier, Error};

/// The interface description of the AgriFi contract.
pub const AGRIFI_ABI: &str = include_str!("../abi/AgriFi.json");

/// Parses the bundled interface description.
pub fn agrifi_abi() -> Result<JsonAbi, Error> {
    serde_json::from_str(AGRIFI_ABI).map_err(Error::InvalidAbi)
}

/// Binds contract handles to the deployed contract through the injected provider,
/// if there is one.
#[derive(Clone)]
pub struct ContractAdapter {
    provider: Option<Arc<dyn InjectedProvider>>,
    address: Address,
    abi: Arc<JsonAbi>,
}

impl ContractAdapter {
    /// Creates an adapter for the AgriFi contract deployed at `address`.
    pub fn new(
        provider: Option<Arc<dyn InjectedProvider>>,
        address: Address,
    ) -> Result<Self, Error> {
        Ok(Self::with_abi(provider, address, agrifi_abi()?))
    }

    pub fn with_abi(
        provider: Option<Arc<dyn InjectedProvider>>,
        address: Address,
        abi: JsonAbi,
    ) -> Self {
        Self {
            provider,
            address,
            abi: Arc::new(abi),
        }
    }

    pub fn provider(&self) -> Option<&dyn InjectedProvider> {
        self.provider.as_deref()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// The first topic of the logs of the event `name`.
    pub fn event_selector(&self, name: &str) -> Result<B256, EthereumServiceError> {
        self.abi
            .event(name)
            .and_then(|overloads| overloads.first())
            .map(|event| event.selector())
            .ok_or_else(|| EthereumServiceError::UnknownEvent(name.to_string()))
    }

    /// Returns a handle on the contract, signing for the provider's current account.
    ///
    /// A new handle is bound on every call, so that a change of account is picked up
    /// by the next operation.
    pub async fn get_contract(
        &self,
        notifier: &dyn Notifier,
    ) -> Result<Box<dyn ContractBackend>, Error> {
        let Some(provider) = &self.provider else {
            notifier.error("No wallet detected");
            return Err(Error::ProviderAbsent);
        };
        let signer = provider.signer().await?;
        Ok(provider.bind_contract(self.address, self.abi.clone(), signer))
    }
}
