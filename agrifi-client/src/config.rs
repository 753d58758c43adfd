// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{path::PathBuf, str::FromStr as _, sync::Arc};

use agrifi_ethereum::{
    client::InjectedProvider, common::EthereumServiceError, provider::EthereumClient,
};
use alloy::primitives::{Address, U256};
use alloy_signer_local::{LocalSignerError, PrivateKeySigner};
use url::Url;

use crate::metadata::{self, HttpMetadataStore, MetadataStore};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("default configuration directory not supported: please specify a path")]
    NoDefaultConfigurationDirectory,
    #[error("a private key requires an RPC URL")]
    PrivateKeyWithoutRpcUrl,
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(#[from] LocalSignerError),
    #[error("Ethereum error: {0}")]
    Ethereum(#[from] EthereumServiceError),
    #[error("metadata store error: {0}")]
    Metadata(#[from] metadata::Error),
}

#[derive(Clone, Debug, clap::Parser)]
#[command(
    name = "agrifi",
    version,
    about = "Invest in tokenized crops and tokenize your own harvests on the AgriFi marketplace"
)]
pub struct ClientOptions {
    /// Address of the deployed AgriFi contract
    #[arg(long = "contract", env = "AGRIFI_CONTRACT_ADDRESS")]
    pub contract_address: Address,

    /// JSON-RPC endpoint of the node holding the wallet. Without it, no wallet is
    /// available
    #[arg(long = "rpc-url", env = "AGRIFI_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Signs transactions with this key instead of the node's accounts
    #[arg(long = "private-key", env = "AGRIFI_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Upload endpoint of the metadata store
    #[arg(long = "metadata-url", env = "AGRIFI_METADATA_URL")]
    pub metadata_url: Option<Url>,

    /// Sets the file storing the wallet session (an empty one will be created if missing)
    #[arg(long = "session", env = "AGRIFI_SESSION")]
    pub session_path: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    pub command: ClientCommand,
}

impl ClientOptions {
    /// The file storing the wallet session, by default under the configuration directory.
    #[cfg(with_persist)]
    pub fn session_path(&self) -> Result<PathBuf, Error> {
        match &self.session_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_path()?.join("session.json")),
        }
    }

    #[cfg(with_persist)]
    fn config_path() -> Result<PathBuf, Error> {
        let mut config_dir = dirs::config_dir().ok_or(Error::NoDefaultConfigurationDirectory)?;
        config_dir.push("agrifi");
        Ok(config_dir)
    }

    /// The wallet, if an RPC endpoint is configured.
    pub fn provider(&self) -> Result<Option<Arc<dyn InjectedProvider>>, Error> {
        let Some(url) = &self.rpc_url else {
            if self.private_key.is_some() {
                return Err(Error::PrivateKeyWithoutRpcUrl);
            }
            return Ok(None);
        };
        let client = match &self.private_key {
            Some(key) => EthereumClient::with_signer(url, PrivateKeySigner::from_str(key)?)?,
            None => EthereumClient::new(url)?,
        };
        Ok(Some(Arc::new(client)))
    }

    pub fn metadata_store(&self) -> Result<Option<Arc<dyn MetadataStore>>, Error> {
        let Some(url) = &self.metadata_url else {
            return Ok(None);
        };
        Ok(Some(Arc::new(HttpMetadataStore::new(url.clone())?)))
    }
}

#[derive(Clone, Debug, clap::Subcommand)]
pub enum ClientCommand {
    /// Connect the wallet and remember its first account
    Connect,

    /// Forget the connected account
    Disconnect,

    /// Show the connected account and the configuration
    Status,

    /// List the active crops
    Marketplace,

    /// Show one crop
    Crop {
        /// Crop ID
        crop_id: U256,
    },

    /// Show a farmer and their crops
    Farmer {
        /// Address of the farmer (the connected account by default)
        address: Option<Address>,
    },

    /// List the addresses of the registered farmers
    Farmers,

    /// Register the connected account as a farmer
    Register {
        /// Name of the farmer
        #[arg(long)]
        name: String,

        /// Location of the farm
        #[arg(long)]
        location: String,

        /// ENS name of the farmer
        #[arg(long = "ens-name", default_value = "")]
        ens_name: String,
    },

    /// Upload a crop's image and metadata, then tokenize it
    Tokenize {
        #[arg(long = "crop-type", default_value = "")]
        crop_type: String,

        #[arg(long, default_value = "")]
        variety: String,

        /// Number of tokens to mint
        #[arg(long = "supply", default_value = "")]
        total_supply: String,

        /// Price of one token, in ether
        #[arg(long = "price", default_value = "")]
        price_per_token: String,

        /// Expected harvest date, `YYYY-MM-DD` or RFC 3339
        #[arg(long = "harvest-date", default_value = "")]
        harvest_date: String,

        #[arg(long = "carbon-credits", default_value = "")]
        carbon_credits: String,

        /// Image of the crop
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Buy tokens of a crop, paying their price in ether
    Invest {
        /// Crop ID
        crop_id: U256,

        /// Number of tokens to buy
        amount: String,
    },

    /// Mark a crop as harvested
    Harvest {
        /// Crop ID
        crop_id: U256,

        /// The actual yield of the harvest
        actual_yield: U256,
    },

    /// List the investments of an investor
    Investments {
        /// Address of the investor (the connected account by default)
        investor: Option<Address>,
    },

    /// Show the investment of the connected account in a crop
    Investment {
        /// Crop ID
        crop_id: U256,
    },

    /// Withdraw the platform fees (contract owner only)
    WithdrawFees,

    /// Set the platform fee percentage (contract owner only)
    SetFee {
        /// New fee, in percent
        pct: U256,
    },

    /// Update the metadata URI of a crop token (contract owner only)
    SetTokenUri {
        /// Crop ID
        token_id: U256,

        uri: String,
    },

    /// Download and show a crop metadata document
    Metadata {
        /// The metadata URI, `ipfs://` or `https://`
        uri: String,
    },
}
