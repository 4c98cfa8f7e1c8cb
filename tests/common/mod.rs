//! In-process stand-in for the native SDK library.
//!
//! Keeps the same contract as the real exports: sentinel results on failure and one
//! shared last-error slot, written before the failing call returns.

#![allow(dead_code)]

use sdk_bridge::{NativeApi, NativeReply};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::ffi::CStr;
use std::sync::Mutex;
use std::time::Duration;

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub symbol: &'static str,
    pub handle: usize,
    pub body: Value,
}

#[derive(Default)]
struct State {
    next: usize,
    clients: HashSet<usize>,
    secret_managers: HashSet<usize>,
    wallets: HashMap<usize, (usize, usize)>,
    logger: bool,
    last_error: String,
    recorded: Vec<Recorded>,
}

impl State {
    fn allocate(&mut self) -> usize {
        self.next += 0x10;
        0x1000 + self.next
    }

    fn fail<T>(&mut self, message: impl Into<String>, sentinel: T) -> T {
        self.last_error = message.into();
        sentinel
    }
}

#[derive(Default)]
pub struct FakeNative {
    state: Mutex<State>,
    /// Export `call_utils_method`.
    pub utils: bool,
    /// `get_secret_manager_from_wallet` always fails.
    pub broken_lookup: bool,
    /// Pause after writing the last error, widening any race on the register.
    pub error_delay: Option<Duration>,
}

impl FakeNative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_utils(mut self) -> Self { self.utils = true; self }
    pub fn with_broken_lookup(mut self) -> Self { self.broken_lookup = true; self }
    pub fn with_error_delay(mut self, delay: Duration) -> Self { self.error_delay = Some(delay); self }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake state poisoned")
    }

    fn record(&self, symbol: &'static str, handle: usize, body: &CStr) -> Value {
        let body: Value = serde_json::from_str(body.to_str().expect("utf-8 request")).expect("request is JSON");
        self.state().recorded.push(Recorded { symbol, handle, body: body.clone() });
        body
    }

    fn fail<T>(&self, message: impl Into<String>, sentinel: T) -> T {
        let result = self.state().fail(message, sentinel);
        if let Some(delay) = self.error_delay {
            std::thread::sleep(delay);
        }
        result
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.state().recorded.clone()
    }

    pub fn last_request(&self, symbol: &str) -> Option<Recorded> {
        self.state().recorded.iter().rev().find(|r| r.symbol == symbol).cloned()
    }

    pub fn live_clients(&self) -> usize {
        self.state().clients.len()
    }

    pub fn live_secret_managers(&self) -> usize {
        self.state().secret_managers.len()
    }

    pub fn live_wallets(&self) -> usize {
        self.state().wallets.len()
    }

    pub fn wallet_associations(&self, wallet: usize) -> Option<(usize, usize)> {
        self.state().wallets.get(&wallet).copied()
    }
}

fn envelope(kind: &str, payload: Value) -> String {
    json!({"type": kind, "payload": payload}).to_string()
}

impl NativeApi for FakeNative {
    fn init_logger(&self, config: &CStr) -> bool {
        self.record("init_logger", 0, config);
        let mut state = self.state();
        if state.logger {
            return state.fail("logger already initialised", false);
        }
        state.logger = true;
        true
    }

    fn create_client(&self, options: &CStr) -> usize {
        let options = self.record("create_client", 0, options);
        match options.get("primaryNode").and_then(Value::as_str) {
            Some(url) if url.starts_with("https://") => {
                let mut state = self.state();
                let handle = state.allocate();
                state.clients.insert(handle);
                handle
            }
            Some(url) => self.fail(format!("node unreachable: {url}"), 0),
            None => self.fail("no nodes provided", 0),
        }
    }

    fn create_wallet(&self, options: &CStr) -> usize {
        let options = self.record("create_wallet", 0, options);
        if options.get("secretManager").is_none() {
            return self.fail("wallet requires a secret manager", 0);
        }
        let mut state = self.state();
        let wallet = state.allocate();
        let client = state.allocate();
        let secret_manager = state.allocate();
        state.clients.insert(client);
        state.secret_managers.insert(secret_manager);
        state.wallets.insert(wallet, (client, secret_manager));
        wallet
    }

    fn create_secret_manager(&self, options: &CStr) -> usize {
        let options = self.record("create_secret_manager", 0, options);
        if options.get("mnemonic").and_then(Value::as_str).is_some_and(|m| m.split_whitespace().count() < 12) {
            return self.fail("invalid mnemonic", 0);
        }
        let mut state = self.state();
        let handle = state.allocate();
        state.secret_managers.insert(handle);
        handle
    }

    fn get_client_from_wallet(&self, wallet: usize) -> usize {
        let mut state = self.state();
        match state.wallets.get(&wallet) {
            Some((client, _)) => *client,
            None => state.fail("unknown wallet", 0),
        }
    }

    fn get_secret_manager_from_wallet(&self, wallet: usize) -> usize {
        if self.broken_lookup {
            return self.fail("wallet has no secret manager", 0);
        }
        let mut state = self.state();
        match state.wallets.get(&wallet) {
            Some((_, secret_manager)) => *secret_manager,
            None => state.fail("unknown wallet", 0),
        }
    }

    fn destroy_client(&self, client: usize) -> bool {
        let mut state = self.state();
        state.clients.remove(&client) || state.fail("unknown client", false)
    }

    fn destroy_wallet(&self, wallet: usize) -> bool {
        let mut state = self.state();
        state.wallets.remove(&wallet).is_some() || state.fail("unknown wallet", false)
    }

    fn destroy_secret_manager(&self, secret_manager: usize) -> bool {
        let mut state = self.state();
        state.secret_managers.remove(&secret_manager) || state.fail("unknown secret manager", false)
    }

    fn call_client_method(&self, client: usize, method: &CStr) -> NativeReply {
        let body = self.record("call_client_method", client, method);
        if !self.state().clients.contains(&client) {
            return Ok(self.fail("unknown client", String::new()));
        }
        Ok(match body["name"].as_str() {
            Some("getInfo") => envelope("info", json!({"nodeInfo": {"name": "fake", "version": "1.0.0"}})),
            Some(other) => self.fail(format!("unrecognized method: {other}"), String::new()),
            None => self.fail("request has no name", String::new()),
        })
    }

    fn call_wallet_method(&self, wallet: usize, method: &CStr) -> NativeReply {
        let body = self.record("call_wallet_method", wallet, method);
        if !self.state().wallets.contains_key(&wallet) {
            return Ok(self.fail("unknown wallet", String::new()));
        }
        let data = &body["data"];
        Ok(match body["name"].as_str() {
            Some("getLedgerNanoStatus") => envelope(
                "ledgerNanoStatus",
                json!({"connected": false, "locked": null, "blindSigningEnabled": false, "app": null, "device": null, "bufferSize": null}),
            ),
            Some("generateEd25519Address") => {
                let hrp = data["bech32Hrp"].as_str().unwrap_or("smr");
                let account = data["accountIndex"].as_u64().unwrap_or_default();
                let address = data["addressIndex"].as_u64().unwrap_or_default();
                envelope("bech32Address", json!(format!("{hrp}1qfake{account:02x}{address:04x}")))
            }
            Some("getAccounts") => envelope("accounts", json!([])),
            Some(other) => self.fail(format!("unrecognized method: {other}"), String::new()),
            None => self.fail("request has no name", String::new()),
        })
    }

    fn call_secret_manager_method(&self, secret_manager: usize, method: &CStr) -> NativeReply {
        let body = self.record("call_secret_manager_method", secret_manager, method);
        if !self.state().secret_managers.contains(&secret_manager) {
            return Ok(self.fail("unknown secret manager", String::new()));
        }
        Ok(match body["name"].as_str() {
            Some("signEd25519") => envelope(
                "ed25519Signature",
                json!({"type": 0, "publicKey": "0x1111", "signature": "0x2222"}),
            ),
            Some("signTransaction") => envelope("signedTransactionData", json!({"transaction": {}})),
            Some("storeMnemonic") => envelope("ok", Value::Null),
            Some("getLedgerNanoStatus") => self.fail("no ledger device connected", String::new()),
            Some(other) => self.fail(format!("unrecognized method: {other}"), String::new()),
            None => self.fail("request has no name", String::new()),
        })
    }

    fn call_utils_method(&self, method: &CStr) -> Option<NativeReply> {
        if !self.utils {
            return None;
        }
        let body = self.record("call_utils_method", 0, method);
        Some(Ok(match body["name"].as_str() {
            Some("generateMnemonic") => envelope("generatedMnemonic", json!(TEST_MNEMONIC)),
            _ => self.fail("unrecognized utils method", String::new()),
        }))
    }

    fn last_error(&self) -> String {
        self.state().last_error.clone()
    }
}
