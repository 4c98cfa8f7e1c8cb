//! Bridge - Typed facade over the native symbol table
//!
//! Every operation follows the same shape:
//!
//! ```text
//! serialize ──► gate.lock ──► native call ──► sentinel? ──► last_error ──► unlock
//!                                                 │
//!                                                 └── ok ──► typed result
//! ```
//!
//! The native last-error register is one slot for the whole process. The gate is a
//! single process-wide mutex held across the call and the error read, shared by every
//! `Bridge`, so a concurrent failure can never overwrite the message before it is
//! taken.

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::handle::kind::HandleKind;
use crate::handle::{
    ClientHandle, ClientRef, Handle, HandleRef, SecretManagerHandle, SecretManagerRef, WalletHandle, WalletRef,
};
use crate::protocol::{to_c_json, Method};
use crate::symbols::{DynamicLibrary, NativeApi, NativeReply};
use crate::types::{ClientOptions, LoggerConfig, SecretManagerDto, WalletOptions};
use serde::Serialize;
use std::ffi::CStr;
use std::sync::{Mutex, MutexGuard};

// Serializes every native call in the process with its last-error read.
static NATIVE_GATE: Mutex<()> = Mutex::new(());

pub struct Bridge<N: NativeApi = DynamicLibrary> {
    native: N,
}

impl Bridge<DynamicLibrary> {
    /// Resolves the library path, binds the symbols, then initialises the native
    /// logger when one is configured.
    pub fn open(config: &BridgeConfig) -> Result<Self> {
        let path = config.resolve_library_path()?;
        let bridge = Self::new(DynamicLibrary::open(&path)?);
        if let Some(logger) = &config.logger {
            bridge.init_logger(logger)?;
        }
        Ok(bridge)
    }
}

impl<N: NativeApi> Bridge<N> {
    pub fn new(native: N) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    fn lock(&self) -> MutexGuard<'static, ()> {
        // The guarded state is (); a panic elsewhere leaves nothing inconsistent.
        NATIVE_GATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `call` under the gate. When `failed` holds for its result the last error
    /// is read before the gate opens.
    fn gated<T>(&self, symbol: &str, call: impl FnOnce(&N) -> T, failed: impl FnOnce(&T) -> bool) -> Result<T> {
        let _gate = self.lock();
        let result = call(&self.native);
        if failed(&result) {
            let err = Error::native(symbol, self.native.last_error());
            tracing::warn!(symbol, error = %err, "native call failed");
            return Err(err);
        }
        Ok(result)
    }

    fn create<K: HandleKind, O: Serialize + ?Sized>(
        &self,
        symbol: &str,
        options: &O,
        create: impl FnOnce(&N, &CStr) -> usize,
    ) -> Result<Handle<K>> {
        let options = to_c_json(options)?;
        tracing::debug!(symbol, "native call");
        let raw = self.gated(symbol, |native| create(native, options.as_c_str()), |raw| *raw == 0)?;
        let handle = Handle::from_raw(raw).ok_or_else(|| Error::native(symbol, String::new()))?;
        tracing::debug!(symbol, handle = raw, "native object created");
        Ok(handle)
    }

    fn lookup<K: HandleKind>(
        &self,
        symbol: &str,
        wallet: WalletRef,
        lookup: impl FnOnce(&N, usize) -> usize,
    ) -> Result<HandleRef<K>> {
        tracing::debug!(symbol, handle = wallet.raw(), "native call");
        let raw = self.gated(symbol, |native| lookup(native, wallet.raw()), |raw| *raw == 0)?;
        HandleRef::from_raw(raw).ok_or_else(|| Error::native(symbol, String::new()))
    }

    fn forward<M: Method + ?Sized>(
        &self,
        symbol: &str,
        handle: usize,
        method: &M,
        call: impl FnOnce(&N, usize, &CStr) -> NativeReply,
    ) -> Result<String> {
        let request = to_c_json(method)?;
        tracing::debug!(symbol, handle, method = method.name(), "native call");
        let reply = self.gated(symbol, |native| call(native, handle, request.as_c_str()), is_empty_reply)?;
        text(symbol, reply)
    }

    fn destroy<K: HandleKind>(&self, symbol: &str, handle: Handle<K>, destroy: impl FnOnce(&N, usize) -> bool) -> Result<()> {
        let raw = handle.into_raw();
        tracing::debug!(symbol, handle = raw, "native call");
        self.gated(symbol, |native| destroy(native, raw), |ok| !*ok)?;
        Ok(())
    }

    // =========================================================================
    // Logger
    // =========================================================================

    /// Configures the native library's own logger.
    pub fn init_logger(&self, config: &LoggerConfig) -> Result<()> {
        let config = to_c_json(config)?;
        tracing::debug!(symbol = "init_logger", "native call");
        self.gated("init_logger", |native| native.init_logger(config.as_c_str()), |ok| !*ok)?;
        Ok(())
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn create_client(&self, options: &ClientOptions) -> Result<ClientHandle> {
        self.create("create_client", options, N::create_client)
    }

    pub fn create_wallet(&self, options: &WalletOptions) -> Result<WalletHandle> {
        self.create("create_wallet", options, N::create_wallet)
    }

    pub fn create_secret_manager(&self, options: &SecretManagerDto) -> Result<SecretManagerHandle> {
        self.create("create_secret_manager", options, N::create_secret_manager)
    }

    // =========================================================================
    // Wallet associations
    // =========================================================================

    /// The client a wallet was built with. Not owned: destroying the wallet does not
    /// destroy it.
    pub fn get_client_from_wallet(&self, wallet: impl Into<WalletRef>) -> Result<ClientRef> {
        self.lookup("get_client_from_wallet", wallet.into(), N::get_client_from_wallet)
    }

    pub fn get_secret_manager_from_wallet(&self, wallet: impl Into<WalletRef>) -> Result<SecretManagerRef> {
        self.lookup("get_secret_manager_from_wallet", wallet.into(), N::get_secret_manager_from_wallet)
    }

    // =========================================================================
    // Forwarders
    // =========================================================================

    /// Sends one request; the raw response is decoded by the caller with
    /// [`protocol::decode`](crate::protocol::decode).
    pub fn call_client_method<M: Method + ?Sized>(&self, client: impl Into<ClientRef>, method: &M) -> Result<String> {
        self.forward("call_client_method", client.into().raw(), method, N::call_client_method)
    }

    pub fn call_wallet_method<M: Method + ?Sized>(&self, wallet: impl Into<WalletRef>, method: &M) -> Result<String> {
        self.forward("call_wallet_method", wallet.into().raw(), method, N::call_wallet_method)
    }

    pub fn call_secret_manager_method<M: Method + ?Sized>(
        &self,
        secret_manager: impl Into<SecretManagerRef>,
        method: &M,
    ) -> Result<String> {
        self.forward(
            "call_secret_manager_method",
            secret_manager.into().raw(),
            method,
            N::call_secret_manager_method,
        )
    }

    /// Handle-free utility request. [`Error::Unsupported`] when the library does not
    /// export `call_utils_method`.
    pub fn call_utils_method<M: Method + ?Sized>(&self, method: &M) -> Result<String> {
        const SYMBOL: &str = "call_utils_method";
        let request = to_c_json(method)?;
        tracing::debug!(symbol = SYMBOL, method = method.name(), "native call");
        let reply = self.gated(SYMBOL, |native| native.call_utils_method(request.as_c_str()), |reply| {
            reply.as_ref().is_some_and(is_empty_reply)
        })?;
        text(SYMBOL, reply.ok_or(Error::Unsupported(SYMBOL))?)
    }

    // =========================================================================
    // Destructors
    // =========================================================================

    pub fn destroy_client(&self, client: ClientHandle) -> Result<()> {
        self.destroy("destroy_client", client, N::destroy_client)
    }

    pub fn destroy_wallet(&self, wallet: WalletHandle) -> Result<()> {
        self.destroy("destroy_wallet", wallet, N::destroy_wallet)
    }

    pub fn destroy_secret_manager(&self, secret_manager: SecretManagerHandle) -> Result<()> {
        self.destroy("destroy_secret_manager", secret_manager, N::destroy_secret_manager)
    }
}

fn is_empty_reply(reply: &NativeReply) -> bool {
    matches!(reply, Ok(raw) if raw.is_empty())
}

fn text(symbol: &str, reply: NativeReply) -> Result<String> {
    reply.map_err(|source| {
        tracing::warn!(symbol, error = %source, "native reply is not UTF-8");
        Error::InvalidUtf8 { symbol: symbol.to_string(), source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Request;
    use std::cell::RefCell;

    /// Minimal table: every constructor fails, the utils forwarder echoes.
    #[derive(Default)]
    struct Refusing {
        last_error: RefCell<String>,
        utils: bool,
    }

    impl Refusing {
        fn fail<T>(&self, message: &str, sentinel: T) -> T {
            *self.last_error.borrow_mut() = message.to_string();
            sentinel
        }
    }

    impl NativeApi for Refusing {
        fn init_logger(&self, _: &CStr) -> bool { self.fail("logger already set", false) }
        fn create_client(&self, _: &CStr) -> usize { self.fail("no nodes", 0) }
        fn create_wallet(&self, _: &CStr) -> usize { self.fail("", 0) }
        fn create_secret_manager(&self, _: &CStr) -> usize { self.fail("bad mnemonic", 0) }
        fn get_client_from_wallet(&self, _: usize) -> usize { 0 }
        fn get_secret_manager_from_wallet(&self, _: usize) -> usize { 0 }
        fn destroy_client(&self, _: usize) -> bool { false }
        fn destroy_wallet(&self, _: usize) -> bool { false }
        fn destroy_secret_manager(&self, _: usize) -> bool { false }
        fn call_client_method(&self, _: usize, _: &CStr) -> NativeReply { Ok(String::new()) }
        fn call_wallet_method(&self, _: usize, _: &CStr) -> NativeReply { Ok(String::new()) }
        fn call_secret_manager_method(&self, _: usize, _: &CStr) -> NativeReply {
            std::str::from_utf8(&[0xc3, 0x28]).map(str::to_owned)
        }
        fn call_utils_method(&self, method: &CStr) -> Option<NativeReply> {
            self.utils.then(|| Ok(method.to_string_lossy().into_owned()))
        }
        fn last_error(&self) -> String { self.last_error.borrow().clone() }
    }

    #[test]
    fn failed_constructor_returns_native_text() {
        let bridge = Bridge::new(Refusing::default());
        let err = bridge.create_client(&ClientOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "no nodes");
    }

    #[test]
    fn empty_last_error_is_substituted() {
        let bridge = Bridge::new(Refusing::default());
        let err = bridge.create_wallet(&WalletOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "create_wallet failed without reporting an error");
    }

    #[test]
    fn init_logger_failure_is_reported() {
        let bridge = Bridge::new(Refusing::default());
        let err = bridge.init_logger(&LoggerConfig::default()).unwrap_err();
        assert!(err.is_native());
        assert_eq!(err.to_string(), "logger already set");
    }

    #[test]
    fn non_utf8_reply_is_its_own_error() {
        let bridge = Bridge::new(Refusing::default());
        let secret_manager = SecretManagerRef::from_raw(0x10).unwrap();
        let err = bridge
            .call_secret_manager_method(secret_manager, &Request::without_data("signEd25519"))
            .unwrap_err();
        match err {
            Error::InvalidUtf8 { symbol, .. } => assert_eq!(symbol, "call_secret_manager_method"),
            other => panic!("expected invalid UTF-8, got {other:?}"),
        }
    }

    #[test]
    fn empty_reply_reads_the_last_error() {
        let bridge = Bridge::new(Refusing::default());
        let client = ClientRef::from_raw(0x10).unwrap();
        let err = bridge.call_client_method(client, &Request::without_data("getInfo")).unwrap_err();
        assert_eq!(err.to_string(), "call_client_method failed without reporting an error");
    }

    #[test]
    fn utils_forwarder_is_optional() {
        let request = Request::without_data("generateMnemonic");
        let without = Bridge::new(Refusing::default());
        assert!(matches!(without.call_utils_method(&request), Err(Error::Unsupported("call_utils_method"))));

        let with = Bridge::new(Refusing { utils: true, ..Default::default() });
        assert_eq!(with.call_utils_method(&request).unwrap(), r#"{"name":"generateMnemonic"}"#);
    }
}
