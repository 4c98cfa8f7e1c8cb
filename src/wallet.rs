//! Wallet - Domain facade over one wallet handle
//!
//! A `Wallet` owns its wallet handle and caches the client and secret manager the
//! native wallet was built with. Those two are lookups, not ownership; destroying the
//! wallet leaves them to the native library.
//!
//! ```ignore
//! let bridge = Bridge::open(&BridgeConfig::from_env()?)?;
//! let wallet = Wallet::create(&bridge, &options)?;
//! let address = wallet.generate_address(0, 0, "smr", None)?;
//! wallet.destroy()?;
//! ```

use crate::bridge::Bridge;
use crate::error::Result;
use crate::handle::{ClientRef, SecretManagerRef, WalletHandle, WalletRef};
use crate::methods::{SecretManagerMethod, WalletMethod};
use crate::protocol::decode;
use crate::symbols::{DynamicLibrary, NativeApi};
use crate::types::{
    Bip32Chain, Ed25519Signature, GenerateAddressOptions, LedgerNanoStatus, PreparedTransactionData,
    SecretManagerDto, WalletOptions,
};
use serde::de::DeserializeOwned;

pub struct Wallet<'b, N: NativeApi = DynamicLibrary> {
    bridge: &'b Bridge<N>,
    handle: WalletHandle,
    client: ClientRef,
    secret_manager: SecretManagerRef,
}

impl<'b, N: NativeApi> Wallet<'b, N> {
    pub fn create(bridge: &'b Bridge<N>, options: &WalletOptions) -> Result<Self> {
        let handle = bridge.create_wallet(options)?;
        Self::from_handle(bridge, handle)
    }

    /// Takes ownership of `handle` and resolves its associations. On failure the wallet
    /// is destroyed before the lookup error is returned.
    pub fn from_handle(bridge: &'b Bridge<N>, handle: WalletHandle) -> Result<Self> {
        let associations = bridge
            .get_client_from_wallet(&handle)
            .and_then(|client| Ok((client, bridge.get_secret_manager_from_wallet(&handle)?)));

        match associations {
            Ok((client, secret_manager)) => Ok(Self { bridge, handle, client, secret_manager }),
            Err(err) => {
                if let Err(cleanup) = bridge.destroy_wallet(handle) {
                    tracing::warn!(error = %cleanup, "failed to destroy wallet after lookup error");
                }
                Err(err)
            }
        }
    }

    pub fn handle(&self) -> WalletRef {
        self.handle.handle_ref()
    }

    pub fn client(&self) -> ClientRef {
        self.client
    }

    pub fn secret_manager(&self) -> SecretManagerRef {
        self.secret_manager
    }

    /// Destroys the wallet handle only.
    pub fn destroy(self) -> Result<()> {
        self.bridge.destroy_wallet(self.handle)
    }

    /// Forwards any wallet operation and decodes its payload.
    pub fn call<T: DeserializeOwned>(&self, method: &WalletMethod) -> Result<T> {
        decode(self.bridge.call_wallet_method(&self.handle, method))
    }

    /// Forwards a wallet operation and returns the raw response.
    pub fn call_raw(&self, method: &WalletMethod) -> Result<String> {
        self.bridge.call_wallet_method(&self.handle, method)
    }

    pub fn get_ledger_status(&self) -> Result<LedgerNanoStatus> {
        self.call(&WalletMethod::GetLedgerNanoStatus)
    }

    /// Bech32 address for the given indices.
    pub fn generate_address(
        &self,
        address_index: u32,
        account_index: u32,
        bech32_hrp: &str,
        options: Option<GenerateAddressOptions>,
    ) -> Result<String> {
        self.call(&WalletMethod::GenerateEd25519Address {
            account_index,
            address_index,
            options,
            bech32_hrp: Some(bech32_hrp.to_string()),
        })
    }

    /// Signs a hex-encoded essence with the key at `chain`.
    pub fn sign_transaction_essence(&self, essence_hex: &str, chain: Bip32Chain) -> Result<Ed25519Signature> {
        let method = SecretManagerMethod::SignEd25519 { message: essence_hex.to_string(), chain };
        decode(self.bridge.call_secret_manager_method(self.secret_manager, &method))
    }

    /// Submits a prepared transaction for device signing. The reply carries no payload
    /// contract and is dropped.
    pub fn sign_transaction(&self, prepared_transaction_data: PreparedTransactionData) -> Result<()> {
        let method = SecretManagerMethod::SignTransaction {
            secret_manager: SecretManagerDto::LedgerNano(false),
            prepared_transaction_data,
        };
        self.bridge.call_secret_manager_method(self.secret_manager, &method)?;
        Ok(())
    }
}
