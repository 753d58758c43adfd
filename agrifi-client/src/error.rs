// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use agrifi_ethereum::common::EthereumServiceError;

use crate::{metadata, tokenize::ValidationError, units};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("no wallet detected")]
    ProviderAbsent,
    #[error("request rejected: {0}")]
    UserRejected(#[source] EthereumServiceError),
    #[error("remote call failed: {0}")]
    Remote(#[source] EthereumServiceError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("units error: {0}")]
    Units(#[from] units::Error),
    #[error("metadata store error: {0}")]
    Metadata(#[from] metadata::Error),
    #[error("no metadata store configured")]
    NoMetadataStore,
    #[error("no connected account")]
    NotConnected,
    #[error("invalid contract interface: {0}")]
    InvalidAbi(#[source] serde_json::Error),
    #[error("persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<EthereumServiceError> for Error {
    fn from(error: EthereumServiceError) -> Self {
        if error.is_user_rejection() {
            Error::UserRejected(error)
        } else {
            Error::Remote(error)
        }
    }
}

impl Error {
    /// The reason reported by the remote side, e.g. a revert message.
    pub fn reason(&self) -> Option<String> {
        match self {
            Error::UserRejected(error) | Error::Remote(error) => error.reason(),
            _ => None,
        }
    }
}
