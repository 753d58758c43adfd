// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    primitives::{Address, Bytes, B256},
    rpc::json_rpc,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The EIP-1193 error code used by wallets when the user declines a request.
pub const USER_REJECTED_REQUEST: i64 = 4001;

#[derive(Debug, Error)]
pub enum EthereumServiceError {
    /// The contract interface has no function with this name
    #[error("unknown contract method: {0}")]
    UnknownMethod(String),

    /// The contract interface has no event with this name
    #[error("unknown contract event: {0}")]
    UnknownEvent(String),

    /// The node returned no account to sign with
    #[error("the provider exposes no account")]
    NoAccounts,

    /// The request was declined by the account holder
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The transaction was mined but reverted
    #[error("transaction {0} reverted")]
    TransactionReverted(B256),

    /// The call reverted or failed on the remote side
    #[error("contract call failed: {0}")]
    CallFailed(String),

    /// ABI encoding or decoding error
    #[error(transparent)]
    AbiError(#[from] alloy::dyn_abi::Error),

    /// Hex parsing error
    #[error(transparent)]
    FromHexError(#[from] alloy::primitives::hex::FromHexError),

    /// `serde_json` error
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// RPC error
    #[error(transparent)]
    RpcError(#[from] json_rpc::RpcError<alloy::transports::TransportErrorKind>),

    /// Error while waiting for a transaction receipt
    #[error(transparent)]
    PendingTransactionError(#[from] alloy::providers::PendingTransactionError),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}

impl EthereumServiceError {
    /// Whether the account holder declined the request, either through the
    /// EIP-1193 error code or an explicit rejection.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            Self::Rejected(_) => true,
            Self::RpcError(json_rpc::RpcError::ErrorResp(payload)) => {
                payload.code == USER_REJECTED_REQUEST
            }
            _ => false,
        }
    }

    /// The revert reason or error message reported by the node, if any.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::CallFailed(reason) | Self::Rejected(reason) => Some(reason.clone()),
            Self::RpcError(json_rpc::RpcError::ErrorResp(payload)) => {
                Some(payload.message.to_string())
            }
            _ => None,
        }
    }
}

/// A log entry emitted while executing a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The mined result of a state-changing contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub transaction_hash: B256,
    pub status: bool,
    pub logs: Vec<EventLog>,
}

impl TransactionOutcome {
    /// Returns the logs emitted by `address` whose first topic is `selector`.
    pub fn logs_matching(
        &self,
        address: Address,
        selector: B256,
    ) -> impl Iterator<Item = &EventLog> + '_ {
        self.logs.iter().filter(move |log| {
            log.address == address && log.topics.first() == Some(&selector)
        })
    }
}
