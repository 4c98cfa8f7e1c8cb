//! Wire types - options, payloads and replies exchanged with the native library
//!
//! All shapes serialize as camelCase JSON. Optional fields are omitted when unset so
//! the native side applies its own defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// `0x`-prefixed lowercase hex.
pub type HexEncodedString = String;

/// Purpose constant of the derivation path (BIP44).
pub const HD_WALLET_TYPE: u32 = 44;

/// SLIP-44 coin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinType(pub u32);

impl CoinType {
    pub const IOTA: CoinType = CoinType(4218);
    pub const SHIMMER: CoinType = CoinType(4219);
    pub const ETHER: CoinType = CoinType(60);
}

impl From<CoinType> for u32 {
    fn from(coin: CoinType) -> Self {
        coin.0
    }
}

/// Key derivation path `(purpose, coinType, account, change, addressIndex)`.
///
/// Serializes as a five element array in exactly that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip32Chain(pub [u32; 5]);

impl Bip32Chain {
    pub fn purpose(&self) -> u32 { self.0[0] }
    pub fn coin_type(&self) -> u32 { self.0[1] }
    pub fn account(&self) -> u32 { self.0[2] }
    /// 0 external, 1 internal.
    pub fn change(&self) -> u32 { self.0[3] }
    pub fn address_index(&self) -> u32 { self.0[4] }
}

impl From<[u32; 5]> for Bip32Chain {
    fn from(segments: [u32; 5]) -> Self {
        Self(segments)
    }
}

// =============================================================================
// Options
// =============================================================================

/// Native logger level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelFilter {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl FromStr for LevelFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LevelFilter::Off),
            "error" => Ok(LevelFilter::Error),
            "warn" | "warning" => Ok(LevelFilter::Warn),
            "info" => Ok(LevelFilter::Info),
            "debug" => Ok(LevelFilter::Debug),
            "trace" => Ok(LevelFilter::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Configuration for the native library's own logger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub level_filter: LevelFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_exclusions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_enabled: Option<bool>,
}

impl LoggerConfig {
    pub fn new(level_filter: LevelFilter) -> Self {
        Self { level_filter, ..Default::default() }
    }
    pub fn with_name(mut self, name: impl Into<String>) -> Self { self.name = Some(name.into()); self }
}

/// Node client options. Fields the bridge does not model pass through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_node_health: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_pow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientOptions {
    pub fn with_primary_node(url: impl Into<String>) -> Self {
        Self { primary_node: Some(url.into()), ..Default::default() }
    }
    pub fn with_nodes(mut self, nodes: Vec<String>) -> Self { self.nodes = Some(nodes); self }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongholdDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    pub snapshot_path: String,
}

/// Key-holding backend selector, e.g. `{"mnemonic": "..."}` or `{"ledgerNano": true}`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecretManagerDto {
    Mnemonic(String),
    HexSeed(String),
    /// `true` targets the device simulator.
    LedgerNano(bool),
    Stronghold(StrongholdDto),
    Placeholder,
}

// Manual Debug so secrets never reach logs
impl fmt::Debug for SecretManagerDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretManagerDto::Mnemonic(_) => f.write_str("Mnemonic([REDACTED])"),
            SecretManagerDto::HexSeed(_) => f.write_str("HexSeed([REDACTED])"),
            SecretManagerDto::LedgerNano(simulator) => f.debug_tuple("LedgerNano").field(simulator).finish(),
            SecretManagerDto::Stronghold(dto) => f
                .debug_struct("Stronghold")
                .field("snapshot_path", &dto.snapshot_path)
                .field("password", &dto.password.as_ref().map(|_| "[REDACTED]"))
                .finish(),
            SecretManagerDto::Placeholder => f.write_str("Placeholder"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_options: Option<ClientOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_manager: Option<SecretManagerDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_type: Option<CoinType>,
}

impl WalletOptions {
    pub fn new() -> Self { Self::default() }
    pub fn with_client_options(mut self, c: ClientOptions) -> Self { self.client_options = Some(c); self }
    pub fn with_secret_manager(mut self, s: SecretManagerDto) -> Self { self.secret_manager = Some(s); self }
    pub fn with_storage_path(mut self, p: impl Into<String>) -> Self { self.storage_path = Some(p.into()); self }
    pub fn with_coin_type(mut self, c: CoinType) -> Self { self.coin_type = Some(c); self }
}

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAddressOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<bool>,
    /// Ask a hardware device to display the address for confirmation.
    pub ledger_nano_prompt: bool,
}

/// Account selector: alias or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountIdentifier {
    Alias(String),
    Index(u32),
}

impl From<&str> for AccountIdentifier {
    fn from(alias: &str) -> Self { AccountIdentifier::Alias(alias.to_string()) }
}

impl From<u32> for AccountIdentifier {
    fn from(index: u32) -> Self { AccountIdentifier::Index(index) }
}

/// Wallet event selector, sent as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletEventType(pub u8);

impl WalletEventType {
    pub const CONSOLIDATION_REQUIRED: WalletEventType = WalletEventType(0);
    pub const LEDGER_ADDRESS_GENERATION: WalletEventType = WalletEventType(1);
    pub const NEW_OUTPUT: WalletEventType = WalletEventType(2);
    pub const SPENT_OUTPUT: WalletEventType = WalletEventType(3);
    pub const TRANSACTION_INCLUSION: WalletEventType = WalletEventType(4);
    pub const TRANSACTION_PROGRESS: WalletEventType = WalletEventType(5);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth_name_pwd: Option<(String, String)>,
}

// =============================================================================
// Prepared transactions
// =============================================================================

/// Generic output representation. Whatever JSON the source output encodes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Output(pub Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSigningData {
    pub output: Output,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Bip32Chain>,
}

impl InputSigningData {
    pub fn new(output: Output) -> Self {
        Self { output, output_metadata: None, chain: None }
    }
}

pub const REGULAR_TRANSACTION_ESSENCE_TYPE: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEssence {
    #[serde(rename = "type")]
    pub kind: u8,
    pub network_id: String,
    pub essence_bytes: HexEncodedString,
}

impl TransactionEssence {
    pub fn regular(network_id: impl Into<String>, essence_bytes: HexEncodedString) -> Self {
        Self { kind: REGULAR_TRANSACTION_ESSENCE_TYPE, network_id: network_id.into(), essence_bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTransactionData {
    pub essence: TransactionEssence,
    pub inputs_data: Vec<InputSigningData>,
}

// =============================================================================
// Replies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerApp {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerNanoStatus {
    pub connected: bool,
    #[serde(default)]
    pub locked: Option<bool>,
    pub blind_signing_enabled: bool,
    #[serde(default)]
    pub app: Option<LedgerApp>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub buffer_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ed25519Signature {
    #[serde(rename = "type")]
    pub kind: u8,
    pub public_key: HexEncodedString,
    pub signature: HexEncodedString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secp256k1EcdsaSignature {
    pub public_key: HexEncodedString,
    pub signature: HexEncodedString,
}
