//! Methods - Operation table for the forwarders
//!
//! One variant per operation id. The wire name is the variant tag, the payload is the
//! variant's fields (omitted for unit variants):
//!
//! ```text
//! SecretManagerMethod::StoreMnemonic { mnemonic }  → {"name":"storeMnemonic","data":{"mnemonic":"..."}}
//! WalletMethod::GetAccounts                        → {"name":"getAccounts"}
//! ```
//!
//! Client calls take any [`Method`], typically a generic [`Request`](crate::protocol::Request).

use crate::protocol::Method;
use crate::types::{
    AccountIdentifier, Bip32Chain, ClientOptions, GenerateAddressOptions, HexEncodedString, NodeAuth,
    PreparedTransactionData, SecretManagerDto, WalletEventType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Operations accepted by `call_secret_manager_method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum SecretManagerMethod {
    #[serde(rename_all = "camelCase")]
    SignEd25519 { message: HexEncodedString, chain: Bip32Chain },
    #[serde(rename_all = "camelCase")]
    SignSecp256k1Ecdsa { message: HexEncodedString, chain: Bip32Chain },
    #[serde(rename_all = "camelCase")]
    StoreMnemonic { mnemonic: String },
    #[serde(rename_all = "camelCase")]
    SignatureUnlock { transaction_essence_hash: HexEncodedString, chain: Bip32Chain },
    #[serde(rename_all = "camelCase")]
    SignTransaction {
        secret_manager: SecretManagerDto,
        prepared_transaction_data: PreparedTransactionData,
    },
    GetLedgerNanoStatus,
    #[serde(rename_all = "camelCase")]
    GenerateEd25519Address {
        account_index: u32,
        address_index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<GenerateAddressOptions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bech32_hrp: Option<String>,
    },
}

impl Method for SecretManagerMethod {
    fn name(&self) -> &str {
        match self {
            SecretManagerMethod::SignEd25519 { .. } => "signEd25519",
            SecretManagerMethod::SignSecp256k1Ecdsa { .. } => "signSecp256k1Ecdsa",
            SecretManagerMethod::StoreMnemonic { .. } => "storeMnemonic",
            SecretManagerMethod::SignatureUnlock { .. } => "signatureUnlock",
            SecretManagerMethod::SignTransaction { .. } => "signTransaction",
            SecretManagerMethod::GetLedgerNanoStatus => "getLedgerNanoStatus",
            SecretManagerMethod::GenerateEd25519Address { .. } => "generateEd25519Address",
        }
    }
}

/// Operations accepted by `call_wallet_method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum WalletMethod {
    #[serde(rename_all = "camelCase")]
    Backup { destination: PathBuf, password: String },
    #[serde(rename_all = "camelCase")]
    ChangeStrongholdPassword { current_password: String, new_password: String },
    ClearStrongholdPassword,
    #[serde(rename_all = "camelCase")]
    ClearListeners { event_types: Vec<WalletEventType> },
    #[serde(rename_all = "camelCase")]
    CreateAccount {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bech32_hrp: Option<String>,
    },
    GenerateMnemonic,
    GetAccountIndexes,
    GetAccounts,
    #[serde(rename_all = "camelCase")]
    GetAccount { account_id: AccountIdentifier },
    IsStrongholdPasswordAvailable,
    #[serde(rename_all = "camelCase")]
    RecoverAccounts {
        account_start_index: u32,
        account_gap_limit: u32,
        address_gap_limit: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        sync_options: Option<Value>,
    },
    RemoveLatestAccount,
    #[serde(rename_all = "camelCase")]
    RestoreBackup {
        source: PathBuf,
        password: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        ignore_if_coin_type_mismatch: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ignore_if_bech32_mismatch: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SetClientOptions { client_options: Box<ClientOptions> },
    #[serde(rename_all = "camelCase")]
    SetStrongholdPassword { password: String },
    #[serde(rename_all = "camelCase")]
    SetStrongholdPasswordClearInterval {
        #[serde(skip_serializing_if = "Option::is_none")]
        interval_in_milliseconds: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    StartBackgroundSync {
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        interval_in_milliseconds: Option<u64>,
    },
    StopBackgroundSync,
    #[serde(rename_all = "camelCase")]
    UpdateNodeAuth {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        auth: Option<NodeAuth>,
    },
    GetLedgerNanoStatus,
    #[serde(rename_all = "camelCase")]
    GenerateEd25519Address {
        account_index: u32,
        address_index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<GenerateAddressOptions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bech32_hrp: Option<String>,
    },
}

impl Method for WalletMethod {
    fn name(&self) -> &str {
        match self {
            WalletMethod::Backup { .. } => "backup",
            WalletMethod::ChangeStrongholdPassword { .. } => "changeStrongholdPassword",
            WalletMethod::ClearStrongholdPassword => "clearStrongholdPassword",
            WalletMethod::ClearListeners { .. } => "clearListeners",
            WalletMethod::CreateAccount { .. } => "createAccount",
            WalletMethod::GenerateMnemonic => "generateMnemonic",
            WalletMethod::GetAccountIndexes => "getAccountIndexes",
            WalletMethod::GetAccounts => "getAccounts",
            WalletMethod::GetAccount { .. } => "getAccount",
            WalletMethod::IsStrongholdPasswordAvailable => "isStrongholdPasswordAvailable",
            WalletMethod::RecoverAccounts { .. } => "recoverAccounts",
            WalletMethod::RemoveLatestAccount => "removeLatestAccount",
            WalletMethod::RestoreBackup { .. } => "restoreBackup",
            WalletMethod::SetClientOptions { .. } => "setClientOptions",
            WalletMethod::SetStrongholdPassword { .. } => "setStrongholdPassword",
            WalletMethod::SetStrongholdPasswordClearInterval { .. } => "setStrongholdPasswordClearInterval",
            WalletMethod::StartBackgroundSync { .. } => "startBackgroundSync",
            WalletMethod::StopBackgroundSync => "stopBackgroundSync",
            WalletMethod::UpdateNodeAuth { .. } => "updateNodeAuth",
            WalletMethod::GetLedgerNanoStatus => "getLedgerNanoStatus",
            WalletMethod::GenerateEd25519Address { .. } => "generateEd25519Address",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CoinType, InputSigningData, Output, TransactionEssence, HD_WALLET_TYPE};
    use serde_json::json;

    fn wire_name(value: &impl Serialize) -> String {
        serde_json::to_value(value).unwrap()["name"].as_str().unwrap().to_string()
    }

    #[test]
    fn unit_variants_omit_data() {
        assert_eq!(
            serde_json::to_value(WalletMethod::GetAccounts).unwrap(),
            json!({"name": "getAccounts"})
        );
        assert_eq!(
            serde_json::to_value(SecretManagerMethod::GetLedgerNanoStatus).unwrap(),
            json!({"name": "getLedgerNanoStatus"})
        );
    }

    #[test]
    fn sign_ed25519_shape() {
        let method = SecretManagerMethod::SignEd25519 {
            message: "0xcf30".into(),
            chain: Bip32Chain([HD_WALLET_TYPE, CoinType::SHIMMER.0, 0, 0, 0]),
        };
        assert_eq!(
            serde_json::to_value(&method).unwrap(),
            json!({"name": "signEd25519", "data": {"message": "0xcf30", "chain": [44, 4219, 0, 0, 0]}})
        );
    }

    #[test]
    fn generate_address_shape() {
        let method = WalletMethod::GenerateEd25519Address {
            account_index: 0,
            address_index: 3,
            options: Some(GenerateAddressOptions { internal: None, ledger_nano_prompt: true }),
            bech32_hrp: Some("smr".into()),
        };
        assert_eq!(
            serde_json::to_value(&method).unwrap(),
            json!({"name": "generateEd25519Address", "data": {
                "accountIndex": 0,
                "addressIndex": 3,
                "options": {"ledgerNanoPrompt": true},
                "bech32Hrp": "smr"
            }})
        );
    }

    #[test]
    fn get_account_accepts_alias_or_index() {
        let by_alias = WalletMethod::GetAccount { account_id: "savings".into() };
        let by_index = WalletMethod::GetAccount { account_id: 2.into() };
        assert_eq!(serde_json::to_value(by_alias).unwrap()["data"], json!({"accountId": "savings"}));
        assert_eq!(serde_json::to_value(by_index).unwrap()["data"], json!({"accountId": 2}));
    }

    fn every_wallet_method() -> Vec<WalletMethod> {
        vec![
            WalletMethod::Backup { destination: "backup.stronghold".into(), password: "pw".into() },
            WalletMethod::ChangeStrongholdPassword { current_password: "a".into(), new_password: "b".into() },
            WalletMethod::ClearStrongholdPassword,
            WalletMethod::ClearListeners { event_types: vec![WalletEventType::NEW_OUTPUT] },
            WalletMethod::CreateAccount { alias: Some("main".into()), bech32_hrp: None },
            WalletMethod::GenerateMnemonic,
            WalletMethod::GetAccountIndexes,
            WalletMethod::GetAccounts,
            WalletMethod::GetAccount { account_id: 0.into() },
            WalletMethod::GetAccount { account_id: "savings".into() },
            WalletMethod::IsStrongholdPasswordAvailable,
            WalletMethod::RecoverAccounts {
                account_start_index: 0,
                account_gap_limit: 2,
                address_gap_limit: 10,
                sync_options: Some(json!({"forceSyncing": true})),
            },
            WalletMethod::RemoveLatestAccount,
            WalletMethod::RestoreBackup {
                source: "in.stronghold".into(),
                password: "pw".into(),
                ignore_if_coin_type_mismatch: Some(true),
                ignore_if_bech32_mismatch: Some("smr".into()),
            },
            WalletMethod::SetClientOptions {
                client_options: Box::new(ClientOptions::with_primary_node("https://node")),
            },
            WalletMethod::SetStrongholdPassword { password: "pw".into() },
            WalletMethod::SetStrongholdPasswordClearInterval { interval_in_milliseconds: Some(1000) },
            WalletMethod::StartBackgroundSync { options: None, interval_in_milliseconds: None },
            WalletMethod::StopBackgroundSync,
            WalletMethod::UpdateNodeAuth {
                url: "https://node".into(),
                auth: Some(NodeAuth { jwt: Some("token".into()), basic_auth_name_pwd: None }),
            },
            WalletMethod::GetLedgerNanoStatus,
            WalletMethod::GenerateEd25519Address {
                account_index: 1,
                address_index: 2,
                options: Some(GenerateAddressOptions { internal: Some(true), ledger_nano_prompt: false }),
                bech32_hrp: Some("rms".into()),
            },
        ]
    }

    fn every_secret_manager_method() -> Vec<SecretManagerMethod> {
        let chain = Bip32Chain([44, 4219, 0, 0, 0]);
        vec![
            SecretManagerMethod::SignEd25519 { message: "0xcf30".into(), chain },
            SecretManagerMethod::SignSecp256k1Ecdsa { message: "0x00".into(), chain },
            SecretManagerMethod::StoreMnemonic { mnemonic: "m".into() },
            SecretManagerMethod::SignatureUnlock { transaction_essence_hash: "0x00".into(), chain },
            SecretManagerMethod::SignTransaction {
                secret_manager: SecretManagerDto::LedgerNano(false),
                prepared_transaction_data: PreparedTransactionData {
                    essence: TransactionEssence::regular("", "0xdead".into()),
                    inputs_data: vec![InputSigningData::new(Output(json!({"amount": "1"})))],
                },
            },
            SecretManagerMethod::GetLedgerNanoStatus,
            SecretManagerMethod::GenerateEd25519Address {
                account_index: 0,
                address_index: 0,
                options: None,
                bech32_hrp: None,
            },
        ]
    }

    #[test]
    fn names_match_serialized_tags() {
        for method in &every_wallet_method() {
            assert_eq!(method.name(), wire_name(method));
        }
        for method in &every_secret_manager_method() {
            assert_eq!(method.name(), wire_name(method));
        }
    }

    #[test]
    fn every_method_round_trips_through_json() {
        for method in every_wallet_method() {
            let encoded = serde_json::to_string(&method).unwrap();
            let decoded: WalletMethod = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, method, "{encoded}");
        }
        for method in every_secret_manager_method() {
            let encoded = serde_json::to_string(&method).unwrap();
            let decoded: SecretManagerMethod = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, method, "{encoded}");
        }
    }
}
