// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{Address, U256},
};
use async_trait::async_trait;
use serde_json::Value;

use crate::common::{EthereumServiceError, TransactionOutcome};

/// The wallet side of an Ethereum node: the accounts it exposes and the contract
/// handles it can sign for.
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    /// Asks the provider for access to its accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, EthereumServiceError>;

    /// Returns the account that signs the next transaction.
    async fn signer(&self) -> Result<Address, EthereumServiceError>;

    /// Binds a contract handle for `address`, described by `abi`, to `signer`.
    fn bind_contract(
        &self,
        address: Address,
        abi: Arc<JsonAbi>,
        signer: Address,
    ) -> Box<dyn ContractBackend>;
}

/// A deployed contract whose results are opaque JSON values.
///
/// Depending on the interface description, a struct result may come back with
/// named fields or as a positional array.
#[async_trait]
pub trait ContractBackend: Send + Sync {
    /// The address of the contract.
    fn address(&self) -> Address;

    /// Performs a read-only call of `method`.
    async fn call(&self, method: &str, args: &[DynSolValue])
        -> Result<Value, EthereumServiceError>;

    /// Submits a transaction calling `method`, attaching `value` wei, and waits for it
    /// to be mined. A reverted transaction is an error.
    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<TransactionOutcome, EthereumServiceError>;
}
