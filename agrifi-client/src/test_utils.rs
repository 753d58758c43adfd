// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-ins for the wallet, the contract, the notifications and the
//! metadata store.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use agrifi_ethereum::{
    client::{ContractBackend, InjectedProvider},
    common::{EthereumServiceError, EventLog, TransactionOutcome},
};
use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{address, keccak256, Address, B256, U256},
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    client::AgriFi,
    contract::ContractAdapter,
    data_types::{CropToken, Farmer, Investment},
    metadata::{self, MetadataStore},
    notifier::Notifier,
    persistent::Memory,
    session::{SessionState, WalletSession},
    tokenize::ImageFile,
};

pub const CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const FARMER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const INVESTOR: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

/// The first topic of `CropTokenized` logs.
pub fn crop_tokenized_selector() -> B256 {
    keccak256("CropTokenized(uint256,address,string,uint256)")
}

/// How the fake contract shapes its struct results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Objects with named fields.
    #[default]
    Named,
    /// Positional arrays.
    Positional,
}

/// A transaction received by the fake contract.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedSend {
    pub method: String,
    pub args: Vec<DynSolValue>,
    pub value: U256,
    pub signer: Address,
}

#[derive(Default)]
struct MarketState {
    accounts: Vec<Address>,
    reject_accounts: bool,
    reject_transactions: bool,
    emit_events: bool,
    failing_methods: BTreeSet<String>,
    farmers: BTreeMap<Address, Farmer>,
    registered: Vec<Address>,
    crops: Vec<CropToken>,
    investments: BTreeMap<(U256, Address), Investment>,
    history: BTreeMap<Address, Vec<Investment>>,
    platform_fee_pct: U256,
    calls: Vec<String>,
    sends: Vec<RecordedSend>,
    binds: usize,
}

/// An in-memory AgriFi contract, together with the wallet that signs for it.
#[derive(Clone)]
pub struct FakeMarketplace {
    state: Arc<Mutex<MarketState>>,
    encoding: Encoding,
}

impl Default for FakeMarketplace {
    fn default() -> Self {
        Self::new(Encoding::Named)
    }
}

impl FakeMarketplace {
    /// A marketplace whose wallet exposes the [`FARMER`] account.
    pub fn new(encoding: Encoding) -> Self {
        let state = MarketState {
            accounts: vec![FARMER],
            emit_events: true,
            platform_fee_pct: U256::from(2),
            ..MarketState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            encoding,
        }
    }

    fn state(&self) -> MutexGuard<'_, MarketState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state().accounts = accounts;
    }

    /// Makes the wallet decline account requests.
    pub fn reject_accounts(&self) {
        self.state().reject_accounts = true;
    }

    /// Makes the wallet decline transactions.
    pub fn reject_transactions(&self) {
        self.state().reject_transactions = true;
    }

    /// Stops emitting `CropTokenized` events.
    pub fn without_events(&self) {
        self.state().emit_events = false;
    }

    /// Makes every call of `method` fail.
    pub fn fail_method(&self, method: &str) {
        self.state().failing_methods.insert(method.to_string());
    }

    pub fn add_farmer(&self, address: Address, mut farmer: Farmer) {
        farmer.is_registered = true;
        let mut state = self.state();
        state.registered.push(address);
        state.farmers.insert(address, farmer);
    }

    /// Adds a crop, assigning the next id, and returns that id.
    pub fn add_crop(&self, mut crop: CropToken) -> U256 {
        let mut state = self.state();
        let id = U256::from(state.crops.len() + 1);
        crop.id = id;
        if let Some(farmer) = state.farmers.get_mut(&crop.farmer) {
            farmer.crop_ids.push(id);
        }
        state.crops.push(crop);
        id
    }

    pub fn add_investment(&self, investor: Address, investment: Investment) {
        let mut state = self.state();
        state
            .history
            .entry(investor)
            .or_default()
            .push(investment.clone());
        state
            .investments
            .insert((investment.crop_id, investor), investment);
    }

    pub fn crop(&self, id: U256) -> Option<CropToken> {
        self.state().crops.iter().find(|crop| crop.id == id).cloned()
    }

    pub fn farmer(&self, address: Address) -> Option<Farmer> {
        self.state().farmers.get(&address).cloned()
    }

    pub fn platform_fee_pct(&self) -> U256 {
        self.state().platform_fee_pct
    }

    /// The methods called read-only, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| *call == method)
            .count()
    }

    /// The transactions received, in order.
    pub fn sends(&self) -> Vec<RecordedSend> {
        self.state().sends.clone()
    }

    /// The number of contract handles bound so far.
    pub fn binds(&self) -> usize {
        self.state().binds
    }

    /// The number of contract interactions of any kind.
    pub fn interactions(&self) -> usize {
        let state = self.state();
        state.calls.len() + state.sends.len()
    }

    fn encode(&self, named: Value, positional: Value) -> Value {
        match self.encoding {
            Encoding::Named => named,
            Encoding::Positional => positional,
        }
    }

    fn encode_farmer(&self, farmer: &Farmer) -> Value {
        let crop_ids: Vec<String> = farmer.crop_ids.iter().map(U256::to_string).collect();
        self.encode(
            json!({
                "ensName": farmer.ens_name,
                "name": farmer.name,
                "location": farmer.location,
                "reputationScore": farmer.reputation_score.to_string(),
                "isRegistered": farmer.is_registered,
                "cropIds": crop_ids,
            }),
            json!([
                farmer.ens_name,
                farmer.name,
                farmer.location,
                farmer.reputation_score.to_string(),
                farmer.is_registered,
                crop_ids,
            ]),
        )
    }

    fn encode_crop(&self, crop: &CropToken) -> Value {
        self.encode(
            json!({
                "farmer": crop.farmer.to_checksum(None),
                "cropType": crop.crop_type,
                "variety": crop.variety,
                "totalSupply": crop.total_supply.to_string(),
                "pricePerToken": crop.price_per_token.to_string(),
                "harvestDate": crop.harvest_date.to_string(),
                "carbonCredits": crop.carbon_credits.to_string(),
                "isActive": crop.is_active,
                "totalInvested": crop.total_invested.to_string(),
                "metadataURI": crop.metadata_uri,
            }),
            json!([
                crop.farmer.to_checksum(None),
                crop.crop_type,
                crop.variety,
                crop.total_supply.to_string(),
                crop.price_per_token.to_string(),
                crop.harvest_date.to_string(),
                crop.carbon_credits.to_string(),
                crop.is_active,
                crop.total_invested.to_string(),
                crop.metadata_uri,
            ]),
        )
    }

    fn encode_investment(&self, investment: &Investment) -> Value {
        self.encode(
            json!({
                "cropId": investment.crop_id.to_string(),
                "amount": investment.amount.to_string(),
                "timestamp": investment.timestamp.to_string(),
                "claimed": investment.claimed,
            }),
            json!([
                investment.crop_id.to_string(),
                investment.amount.to_string(),
                investment.timestamp.to_string(),
                investment.claimed,
            ]),
        )
    }
}

fn revert(reason: &str) -> EthereumServiceError {
    EthereumServiceError::CallFailed(reason.to_string())
}

fn uint_arg(args: &[DynSolValue], index: usize) -> Result<U256, EthereumServiceError> {
    args.get(index)
        .and_then(DynSolValue::as_uint)
        .map(|(value, _)| value)
        .ok_or_else(|| revert("expected an integer argument"))
}

fn address_arg(args: &[DynSolValue], index: usize) -> Result<Address, EthereumServiceError> {
    args.get(index)
        .and_then(DynSolValue::as_address)
        .ok_or_else(|| revert("expected an address argument"))
}

fn string_arg(args: &[DynSolValue], index: usize) -> Result<String, EthereumServiceError> {
    args.get(index)
        .and_then(DynSolValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| revert("expected a string argument"))
}

#[async_trait]
impl InjectedProvider for FakeMarketplace {
    async fn request_accounts(&self) -> Result<Vec<Address>, EthereumServiceError> {
        let state = self.state();
        if state.reject_accounts {
            return Err(EthereumServiceError::Rejected(
                "User rejected the request.".to_string(),
            ));
        }
        Ok(state.accounts.clone())
    }

    async fn signer(&self) -> Result<Address, EthereumServiceError> {
        self.state()
            .accounts
            .first()
            .copied()
            .ok_or(EthereumServiceError::NoAccounts)
    }

    fn bind_contract(
        &self,
        address: Address,
        _abi: Arc<JsonAbi>,
        signer: Address,
    ) -> Box<dyn ContractBackend> {
        self.state().binds += 1;
        Box::new(FakeContract {
            market: self.clone(),
            address,
            signer,
        })
    }
}

/// A handle on the [`FakeMarketplace`] contract, bound to a signer.
pub struct FakeContract {
    market: FakeMarketplace,
    address: Address,
    signer: Address,
}

impl FakeContract {
    fn execute(
        &self,
        state: &mut MarketState,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<Vec<EventLog>, EthereumServiceError> {
        let signer = self.signer;
        match method {
            "registerFarmer" => {
                if state.farmers.get(&signer).is_some_and(|farmer| farmer.is_registered) {
                    return Err(revert("Farmer already registered"));
                }
                let farmer = Farmer {
                    ens_name: string_arg(args, 0)?,
                    name: string_arg(args, 1)?,
                    location: string_arg(args, 2)?,
                    reputation_score: U256::from(100),
                    is_registered: true,
                    crop_ids: Vec::new(),
                };
                state.registered.push(signer);
                state.farmers.insert(signer, farmer);
                Ok(Vec::new())
            }
            "tokenizeCrop" => {
                let Some(farmer) = state.farmers.get_mut(&signer) else {
                    return Err(revert("Not a registered farmer"));
                };
                let id = U256::from(state.crops.len() + 1);
                let crop = CropToken {
                    id,
                    farmer: signer,
                    crop_type: string_arg(args, 0)?,
                    variety: string_arg(args, 1)?,
                    total_supply: uint_arg(args, 2)?,
                    price_per_token: uint_arg(args, 3)?,
                    harvest_date: u64::try_from(uint_arg(args, 4)?).unwrap_or(u64::MAX),
                    carbon_credits: uint_arg(args, 5)?,
                    is_active: true,
                    total_invested: U256::ZERO,
                    metadata_uri: string_arg(args, 6)?,
                };
                farmer.crop_ids.push(id);
                let data = DynSolValue::Tuple(vec![
                    DynSolValue::String(crop.crop_type.clone()),
                    DynSolValue::Uint(crop.total_supply, 256),
                ])
                .abi_encode_params();
                state.crops.push(crop);
                if !state.emit_events {
                    return Ok(Vec::new());
                }
                Ok(vec![EventLog {
                    address: self.address,
                    topics: vec![
                        crop_tokenized_selector(),
                        B256::from(id.to_be_bytes::<32>()),
                        signer.into_word(),
                    ],
                    data: data.into(),
                }])
            }
            "investInCrop" => {
                let crop_id = uint_arg(args, 0)?;
                let amount = uint_arg(args, 1)?;
                let Some(crop) = state.crops.iter_mut().find(|crop| crop.id == crop_id) else {
                    return Err(revert("Crop does not exist"));
                };
                if !crop.is_active {
                    return Err(revert("Crop not active"));
                }
                if amount.is_zero() || Some(value) != amount.checked_mul(crop.price_per_token) {
                    return Err(revert("Incorrect payment"));
                }
                crop.total_invested += amount;
                let investment = state
                    .investments
                    .entry((crop_id, signer))
                    .or_insert_with(|| Investment {
                        crop_id,
                        ..Investment::default()
                    });
                investment.amount += amount;
                investment.timestamp = 1_700_000_000;
                let investment = investment.clone();
                state.history.entry(signer).or_default().push(investment);
                Ok(Vec::new())
            }
            "completeHarvest" => {
                let crop_id = uint_arg(args, 0)?;
                let Some(crop) = state.crops.iter_mut().find(|crop| crop.id == crop_id) else {
                    return Err(revert("Crop does not exist"));
                };
                if crop.farmer != signer {
                    return Err(revert("Not the crop farmer"));
                }
                crop.is_active = false;
                Ok(Vec::new())
            }
            "withdrawFees" => {
                if signer != OWNER {
                    return Err(revert("Ownable: caller is not the owner"));
                }
                Ok(Vec::new())
            }
            "setPlatformFeePct" => {
                if signer != OWNER {
                    return Err(revert("Ownable: caller is not the owner"));
                }
                let pct = uint_arg(args, 0)?;
                if pct > U256::from(100) {
                    return Err(revert("Fee too high"));
                }
                state.platform_fee_pct = pct;
                Ok(Vec::new())
            }
            "setTokenURI" => {
                if signer != OWNER {
                    return Err(revert("Ownable: caller is not the owner"));
                }
                let token_id = uint_arg(args, 0)?;
                let uri = string_arg(args, 1)?;
                let Some(crop) = state.crops.iter_mut().find(|crop| crop.id == token_id) else {
                    return Err(revert("Crop does not exist"));
                };
                crop.metadata_uri = uri;
                Ok(Vec::new())
            }
            _ => Err(EthereumServiceError::UnknownMethod(method.to_string())),
        }
    }
}

#[async_trait]
impl ContractBackend for FakeContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn call(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Value, EthereumServiceError> {
        let market = &self.market;
        let mut state = market.state();
        state.calls.push(method.to_string());
        if state.failing_methods.contains(method) {
            return Err(revert("injected failure"));
        }
        match method {
            "getCropToken" => {
                let id = uint_arg(args, 0)?;
                let crop = state.crops.iter().find(|crop| crop.id == id);
                crop.map(|crop| market.encode_crop(crop))
                    .ok_or_else(|| revert("Crop does not exist"))
            }
            "getActiveCrops" => Ok(Value::Array(
                state
                    .crops
                    .iter()
                    .filter(|crop| crop.is_active)
                    .map(|crop| Value::String(crop.id.to_string()))
                    .collect(),
            )),
            "getRegisteredFarmers" => Ok(Value::Array(
                state
                    .registered
                    .iter()
                    .map(|address| Value::String(address.to_checksum(None)))
                    .collect(),
            )),
            "getFarmer" => {
                let address = address_arg(args, 0)?;
                let farmer = state.farmers.get(&address).cloned().unwrap_or_default();
                Ok(market.encode_farmer(&farmer))
            }
            "getInvestment" => {
                let crop_id = uint_arg(args, 0)?;
                let investor = address_arg(args, 1)?;
                let investment = state
                    .investments
                    .get(&(crop_id, investor))
                    .cloned()
                    .unwrap_or_default();
                Ok(market.encode_investment(&investment))
            }
            "getInvestorHistory" => {
                let investor = address_arg(args, 0)?;
                let history = state.history.get(&investor).cloned().unwrap_or_default();
                Ok(Value::Array(
                    history
                        .iter()
                        .map(|investment| market.encode_investment(investment))
                        .collect(),
                ))
            }
            _ => Err(EthereumServiceError::UnknownMethod(method.to_string())),
        }
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<TransactionOutcome, EthereumServiceError> {
        let mut state = self.market.state();
        if state.reject_transactions {
            return Err(EthereumServiceError::Rejected(
                "User denied transaction signature.".to_string(),
            ));
        }
        state.sends.push(RecordedSend {
            method: method.to_string(),
            args: args.to_vec(),
            value,
            signer: self.signer,
        });
        if state.failing_methods.contains(method) {
            return Err(revert("injected failure"));
        }
        let logs = self.execute(&mut state, method, args, value)?;
        let transaction_hash = B256::left_padding_from(&state.sends.len().to_be_bytes());
        Ok(TransactionOutcome {
            transaction_hash,
            status: true,
            logs,
        })
    }
}

/// A notification, as recorded by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Loading(String),
    Success(String),
    Error(String),
    Dismiss,
}

/// A [`Notifier`] that remembers every notification.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn push(&self, notification: Notification) {
        match self.notifications.lock() {
            Ok(mut notifications) => notifications.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(notifications) => notifications.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn successes(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::Success(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn loading(&self, message: &str) {
        self.push(Notification::Loading(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }

    fn dismiss(&self) {
        self.push(Notification::Dismiss);
    }
}

/// A [`MetadataStore`] that keeps the uploaded files.
#[derive(Debug, Default)]
pub struct RecordingMetadataStore {
    uploads: Mutex<Vec<ImageFile>>,
    failing: bool,
}

impl RecordingMetadataStore {
    /// A store that fails every upload.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<ImageFile> {
        match self.uploads.lock() {
            Ok(uploads) => uploads.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl MetadataStore for RecordingMetadataStore {
    async fn upload(&self, file: ImageFile) -> Result<String, metadata::Error> {
        if self.failing {
            return Err(metadata::Error::MissingUrl(Value::Null));
        }
        let mut uploads = match self.uploads.lock() {
            Ok(uploads) => uploads,
            Err(poisoned) => poisoned.into_inner(),
        };
        let url = format!("https://store.test/{}/{}", uploads.len(), file.file_name);
        uploads.push(file);
        Ok(url)
    }
}

/// A client of `market`, with an in-memory session holding `account`.
pub fn make_client(
    market: &FakeMarketplace,
    notifier: Arc<RecordingNotifier>,
    account: Option<Address>,
) -> AgriFi<Memory<SessionState>> {
    let provider: Arc<dyn InjectedProvider> = Arc::new(market.clone());
    make_client_with_provider(Some(provider), notifier, account)
}

/// A client whose wallet is `provider`, or that has no wallet at all.
pub fn make_client_with_provider(
    provider: Option<Arc<dyn InjectedProvider>>,
    notifier: Arc<RecordingNotifier>,
    account: Option<Address>,
) -> AgriFi<Memory<SessionState>> {
    let state = Memory::new(SessionState {
        account: account.map(|address| address.to_string()),
    });
    let session = WalletSession::restore(state);
    let abi = crate::contract::agrifi_abi().expect("the bundled ABI is valid");
    let contract = ContractAdapter::with_abi(provider, CONTRACT_ADDRESS, abi);
    AgriFi::new(session, contract, notifier)
}

/// A crop of `farmer`, ready to be added to a [`FakeMarketplace`].
pub fn sample_crop(farmer: Address, crop_type: &str, price_in_wei: U256) -> CropToken {
    CropToken {
        id: U256::ZERO,
        farmer,
        crop_type: crop_type.to_string(),
        variety: "Heirloom".to_string(),
        total_supply: U256::from(1000),
        price_per_token: price_in_wei,
        harvest_date: 1_798_761_600,
        carbon_credits: U256::from(50),
        is_active: true,
        total_invested: U256::ZERO,
        metadata_uri: "ipfs://metadata".to_string(),
    }
}

/// A registered farmer.
pub fn sample_farmer(name: &str) -> Farmer {
    Farmer {
        ens_name: format!("{}.eth", name.to_lowercase()),
        name: name.to_string(),
        location: "Nakuru, Kenya".to_string(),
        reputation_score: U256::from(100),
        is_registered: true,
        crop_ids: Vec::new(),
    }
}
