// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt as _, JsonAbiExt as _},
    json_abi::{Function, JsonAbi},
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::eth::request::{TransactionInput, TransactionRequest},
};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::{
    client::{ContractBackend, InjectedProvider},
    common::{EthereumServiceError, EventLog, TransactionOutcome},
    value::outputs_to_json,
};

/// The Ethereum endpoint and the provider used for accessing the node.
///
/// Without a local key, transactions are signed by the node itself through
/// `eth_sendTransaction`, the way a browser wallet signs for the page.
pub struct EthereumClient {
    provider: Arc<dyn Provider>,
    local_signer: Option<Address>,
}

impl EthereumClient {
    /// Connects to an existing Ethereum node whose accounts sign transactions.
    pub fn new(url: &str) -> Result<Self, EthereumServiceError> {
        let rpc_url = Url::parse(url)?;
        let provider = ProviderBuilder::new().connect_http(rpc_url);
        Ok(Self {
            provider: Arc::new(provider),
            local_signer: None,
        })
    }

    /// Connects to an existing Ethereum node, signing transactions with `signer`.
    pub fn with_signer(url: &str, signer: PrivateKeySigner) -> Result<Self, EthereumServiceError> {
        let rpc_url = Url::parse(url)?;
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url);
        Ok(Self {
            provider: Arc::new(provider),
            local_signer: Some(address),
        })
    }
}

#[async_trait]
impl InjectedProvider for EthereumClient {
    async fn request_accounts(&self) -> Result<Vec<Address>, EthereumServiceError> {
        if let Some(address) = self.local_signer {
            return Ok(vec![address]);
        }
        let params: Vec<Value> = Vec::new();
        let accounts: Vec<Address> = self
            .provider
            .client()
            .request("eth_requestAccounts", params)
            .await?;
        Ok(accounts)
    }

    async fn signer(&self) -> Result<Address, EthereumServiceError> {
        if let Some(address) = self.local_signer {
            return Ok(address);
        }
        self.provider
            .get_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(EthereumServiceError::NoAccounts)
    }

    fn bind_contract(
        &self,
        address: Address,
        abi: Arc<JsonAbi>,
        signer: Address,
    ) -> Box<dyn ContractBackend> {
        Box::new(ContractHandle {
            provider: self.provider.clone(),
            address,
            abi,
            signer,
        })
    }
}

/// A contract deployed at `address`, called on behalf of `signer`.
pub struct ContractHandle {
    provider: Arc<dyn Provider>,
    address: Address,
    abi: Arc<JsonAbi>,
    signer: Address,
}

impl ContractHandle {
    fn function(&self, method: &str) -> Result<&Function, EthereumServiceError> {
        self.abi
            .function(method)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| EthereumServiceError::UnknownMethod(method.to_string()))
    }

    fn request(
        &self,
        function: &Function,
        args: &[DynSolValue],
    ) -> Result<TransactionRequest, EthereumServiceError> {
        let data = function.abi_encode_input(args)?;
        let input = TransactionInput::new(Bytes::from(data));
        Ok(TransactionRequest::default()
            .from(self.signer)
            .to(self.address)
            .input(input))
    }
}

#[async_trait]
impl ContractBackend for ContractHandle {
    fn address(&self) -> Address {
        self.address
    }

    async fn call(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Value, EthereumServiceError> {
        let function = self.function(method)?;
        let request = self.request(function, args)?;
        tracing::debug!(%method, contract = %self.address, "eth_call");
        let output = self.provider.call(request).await?;
        let values = function.abi_decode_output(&output)?;
        Ok(outputs_to_json(&function.outputs, values))
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<TransactionOutcome, EthereumServiceError> {
        let function = self.function(method)?;
        let request = self.request(function, args)?.value(value);
        tracing::debug!(%method, contract = %self.address, %value, "sending transaction");
        let receipt = self
            .provider
            .send_transaction(request)
            .await?
            .get_receipt()
            .await?;
        let outcome = TransactionOutcome {
            transaction_hash: receipt.transaction_hash,
            status: ReceiptResponse::status(&receipt),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| EventLog {
                    address: log.address(),
                    topics: log.topics().to_vec(),
                    data: log.data().data.clone(),
                })
                .collect(),
        };
        if !outcome.status {
            return Err(EthereumServiceError::TransactionReverted(
                outcome.transaction_hash,
            ));
        }
        Ok(outcome)
    }
}
