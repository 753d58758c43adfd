// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use agrifi_ethereum::client::InjectedProvider;
use assert_matches::assert_matches;

use crate::{
    persistent::{self, Memory, Persist as _},
    session::{SessionState, WalletSession},
    test_utils::{FakeMarketplace, Notification, RecordingNotifier, FARMER, INVESTOR},
    Error,
};

/// A session store whose writes always fail.
#[derive(derive_more::Deref)]
struct ReadOnly(SessionState);

#[derive(Debug, thiserror::Error)]
#[error("read-only session store")]
struct ReadOnlyError;

impl persistent::Persist for ReadOnly {
    type Error = ReadOnlyError;

    fn as_mut(&mut self) -> &mut SessionState {
        &mut self.0
    }

    async fn persist(&mut self) -> Result<(), ReadOnlyError> {
        Err(ReadOnlyError)
    }

    fn into_value(self) -> SessionState {
        self.0
    }
}

fn memory_session(account: Option<&str>) -> WalletSession<Memory<SessionState>> {
    WalletSession::restore(Memory::new(SessionState {
        account: account.map(str::to_string),
    }))
}

#[test_log::test(tokio::test)]
async fn test_connect_uses_first_account() -> anyhow::Result<()> {
    let market = FakeMarketplace::default();
    market.set_accounts(vec![INVESTOR, FARMER]);
    let notifier = RecordingNotifier::default();
    let mut session = memory_session(None);

    let address = session.connect(Some(&market), &notifier).await?;

    assert_eq!(address, INVESTOR);
    assert_eq!(session.active_account(), Some(INVESTOR));
    assert_eq!(
        session.state().account.as_deref(),
        Some(INVESTOR.to_string().as_str())
    );
    assert_eq!(
        notifier.notifications(),
        vec![
            Notification::Loading("Connecting Wallet ......".to_string()),
            Notification::Dismiss,
            Notification::Success("Wallet Connected".to_string()),
        ]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_rejected_connect_leaves_account_unset() {
    let market = FakeMarketplace::default();
    market.reject_accounts();
    let notifier = RecordingNotifier::default();
    let mut session = memory_session(Some(&FARMER.to_string()));

    let result = session.connect(Some(&market), &notifier).await;

    assert_matches!(result, Err(Error::UserRejected(_)));
    assert!(!session.is_connected());
    assert_eq!(session.state().account, None);
    assert_eq!(notifier.errors(), vec!["Wallet connection failed"]);
}

#[test_log::test(tokio::test)]
async fn test_connect_without_accounts_fails() {
    let market = FakeMarketplace::default();
    market.set_accounts(Vec::new());
    let notifier = RecordingNotifier::default();
    let mut session = memory_session(None);

    let result = session.connect(Some(&market), &notifier).await;

    assert_matches!(result, Err(Error::Remote(_)));
    assert!(!session.is_connected());
    assert_eq!(notifier.errors(), vec!["Wallet connection failed"]);
}

#[test_log::test(tokio::test)]
async fn test_connect_without_provider() {
    let notifier = RecordingNotifier::default();
    let mut session = memory_session(None);

    let result = session.connect(None, &notifier).await;

    assert_matches!(result, Err(Error::ProviderAbsent));
    assert!(!session.is_connected());
    assert_eq!(
        notifier.notifications(),
        vec![Notification::Error("No wallet detected".to_string())]
    );
}

#[test_log::test(tokio::test)]
async fn test_subscribers_follow_the_account() -> anyhow::Result<()> {
    let market = FakeMarketplace::default();
    let notifier = RecordingNotifier::default();
    let mut session = memory_session(None);
    let mut receiver = session.subscribe();
    assert_eq!(*receiver.borrow_and_update(), None);

    session.connect(Some(&market), &notifier).await?;
    assert!(receiver.has_changed()?);
    assert_eq!(*receiver.borrow_and_update(), Some(FARMER));

    session.disconnect().await?;
    assert!(receiver.has_changed()?);
    assert_eq!(*receiver.borrow_and_update(), None);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_failed_connect_reports_the_wallet_error_when_storage_fails() {
    let market = FakeMarketplace::default();
    market.reject_accounts();
    let notifier = RecordingNotifier::default();
    let mut session = WalletSession::restore(ReadOnly(SessionState {
        account: Some(FARMER.to_string()),
    }));

    let result = session.connect(Some(&market), &notifier).await;
    assert_matches!(result, Err(Error::UserRejected(_)));
    assert!(!session.is_connected());

    let result = session.connect(None, &notifier).await;
    assert_matches!(result, Err(Error::ProviderAbsent));

    assert_matches!(session.disconnect().await, Err(Error::Persistence(_)));
}

#[test]
fn test_invalid_persisted_account_is_dropped() {
    let session = memory_session(Some("not an address"));
    assert_eq!(session.active_account(), None);
}

#[cfg(with_persist)]
#[test_log::test(tokio::test)]
async fn test_disconnect_survives_reload() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let path = directory.path().join("agrifi").join("session.json");
    let market = FakeMarketplace::default();
    let provider: Arc<dyn InjectedProvider> = Arc::new(market);
    let notifier = RecordingNotifier::default();

    let state = persistent::File::read_or_create(&path, SessionState::default)?;
    let mut session = WalletSession::restore(state);
    session.connect(Some(provider.as_ref()), &notifier).await?;

    let contents: serde_json::Value = serde_json::from_slice(&fs_err::read(&path)?)?;
    assert_eq!(contents["account"], FARMER.to_string());

    // A reload restores the connection without prompting.
    let session = WalletSession::restore(persistent::File::<SessionState>::read(&path)?);
    assert_eq!(session.active_account(), Some(FARMER));

    let mut session = session;
    session.disconnect().await?;
    assert_eq!(session.active_account(), None);

    let session = WalletSession::restore(persistent::File::<SessionState>::read(&path)?);
    assert!(!session.is_connected());
    assert_eq!(session.into_state().into_value(), SessionState::default());
    Ok(())
}
