//! SDK Bridge: typed JSON requests over a dynamically loaded wallet SDK library.
//!
//! # Architecture
//!
//! ```text
//! Wallet (domain facade)
//!   │
//!   ├── Bridge (call gate + typed create / call / destroy)
//!   │     ├── protocol: {name, data} ──► native ──► {type, payload}
//!   │     └── NativeApi
//!   │           └── DynamicLibrary (libloading, symbols bound once)
//!   │
//!   └── Handles: WalletHandle (owned) + ClientRef, SecretManagerRef (lookups)
//!
//! translate: ExternalTransaction ──► PreparedTransactionData
//! ```
//!
//! # Handle lifecycle
//!
//! | Step | Call | Result |
//! |------|------|--------|
//! | create | `bridge.create_client(&options)` | `ClientHandle` (owned) |
//! | use | `bridge.call_client_method(&handle, &request)` | raw response |
//! | decode | `protocol::decode::<T>(response)` | `T` |
//! | destroy | `bridge.destroy_client(handle)` | consumes the handle |
//!
//! # Features
//!
//! - `bitcoin` - `ExternalTransaction` for `bitcoin::Transaction` (default)
//!
//! # Usage
//!
//! ```ignore
//! use sdk_bridge::{Bridge, BridgeConfig, Wallet, WalletOptions, ClientOptions, SecretManagerDto};
//!
//! let bridge = Bridge::open(&BridgeConfig::from_env()?)?;
//! let wallet = Wallet::create(
//!     &bridge,
//!     &WalletOptions::new()
//!         .with_client_options(ClientOptions::with_primary_node("https://api.testnet.shimmer.network"))
//!         .with_secret_manager(SecretManagerDto::Mnemonic(mnemonic)),
//! )?;
//! let address = wallet.generate_address(0, 0, "rms", None)?;
//! wallet.destroy()?;
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod methods;
pub mod protocol;
pub mod symbols;
pub mod translate;
pub mod types;
pub mod wallet;

// =============================================================================
// Re-exports
// =============================================================================
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use handle::{
    ClientHandle, ClientRef, Handle, HandleRef, SecretManagerHandle, SecretManagerRef, WalletHandle, WalletRef,
};
pub use methods::{SecretManagerMethod, WalletMethod};
pub use protocol::{decode, encode, Method, Request, Response};
pub use symbols::{DynamicLibrary, NativeApi, NativeReply};
pub use translate::{build_derivation_path, translate, try_translate, ExternalTransaction};
pub use types::*;
pub use wallet::Wallet;
