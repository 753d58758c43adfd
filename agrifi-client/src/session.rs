// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The wallet session: the active account, shared with the rest of the client.

use agrifi_ethereum::{client::InjectedProvider, common::EthereumServiceError};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{notifier::Notifier, persistent::Persist, Error};

/// The durable part of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub account: Option<String>,
}

/// The single owner of the active account.
///
/// Other components read the account through [`WalletSession::active_account`] or
/// follow its changes through [`WalletSession::subscribe`]; only `connect` and
/// `disconnect` change it.
pub struct WalletSession<P> {
    state: P,
    account: watch::Sender<Option<Address>>,
}

impl<P> WalletSession<P>
where
    P: Persist<Target = SessionState>,
{
    /// Restores the session from the persisted state, without contacting any provider.
    pub fn restore(state: P) -> Self {
        let account = state
            .account
            .as_deref()
            .and_then(|account| match account.parse::<Address>() {
                Ok(address) => Some(address),
                Err(error) => {
                    tracing::warn!("ignoring invalid persisted account {account:?}: {error}");
                    None
                }
            });
        let (account, _) = watch::channel(account);
        Self { state, account }
    }

    pub fn active_account(&self) -> Option<Address> {
        *self.account.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.active_account().is_some()
    }

    /// Returns a receiver notified of every change of the active account.
    pub fn subscribe(&self) -> watch::Receiver<Option<Address>> {
        self.account.subscribe()
    }

    pub fn state(&self) -> &P {
        &self.state
    }

    pub fn into_state(self) -> P {
        self.state
    }

    /// Requests account access from `provider` and makes its first account the
    /// active one. On failure the session is left disconnected.
    pub async fn connect(
        &mut self,
        provider: Option<&dyn InjectedProvider>,
        notifier: &dyn Notifier,
    ) -> Result<Address, Error> {
        let Some(provider) = provider else {
            notifier.error("No wallet detected");
            self.forget_account().await;
            return Err(Error::ProviderAbsent);
        };
        notifier.loading("Connecting Wallet ......");
        let result = provider
            .request_accounts()
            .await
            .and_then(|accounts| {
                accounts
                    .first()
                    .copied()
                    .ok_or(EthereumServiceError::NoAccounts)
            });
        match result {
            Ok(address) => {
                self.set_account(Some(address)).await?;
                notifier.dismiss();
                notifier.success("Wallet Connected");
                tracing::info!(%address, "wallet connected");
                Ok(address)
            }
            Err(error) => {
                tracing::error!("wallet connection failed: {error}");
                notifier.dismiss();
                notifier.error("Wallet connection failed");
                self.forget_account().await;
                Err(error.into())
            }
        }
    }

    /// Forgets the active account, in memory and in storage. The provider is not
    /// contacted.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.set_account(None).await
    }

    /// Clears the account after a failed connection. A storage failure is only logged,
    /// so that the caller sees the connection error.
    async fn forget_account(&mut self) {
        if let Err(error) = self.set_account(None).await {
            tracing::warn!("cannot forget the previous account: {error}");
            self.account.send_replace(None);
        }
    }

    async fn set_account(&mut self, account: Option<Address>) -> Result<(), Error> {
        self.state.as_mut().account = account.map(|address| address.to_string());
        self.state
            .persist()
            .await
            .map_err(|error| Error::Persistence(Box::new(error)))?;
        self.account.send_replace(account);
        Ok(())
    }
}
