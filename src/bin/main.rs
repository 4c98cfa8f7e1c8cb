//! sdk-bridge CLI - One request per invocation
//!
//!   sdk-bridge check                                   → bound symbols, library path
//!   sdk-bridge client <options-json> <request-json>    → create, call, destroy
//!   sdk-bridge secret-manager <options-json> <request-json>
//!   sdk-bridge wallet <options-json> <request-json>
//!   sdk-bridge utils <request-json>
//!   sdk-bridge address <wallet-options-json> --hrp smr --account 0 --index 0
//!
//! Library location:
//!   --library, -l <path>     (env: SDK_BRIDGE_LIBRARY, default ./target/debug/<platform file>)
//!   --native-log <level>     (env: SDK_BRIDGE_NATIVE_LOG)

use anyhow::{anyhow, bail, Context};
use sdk_bridge::logging::init_logging;
use sdk_bridge::symbols::{OPTIONAL_SYMBOLS, REQUIRED_SYMBOLS};
use sdk_bridge::{
    Bridge, BridgeConfig, ClientOptions, GenerateAddressOptions, LevelFilter, LoggerConfig, Request,
    SecretManagerDto, SecretManagerMethod, Wallet, WalletMethod, WalletOptions,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tracing::debug;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("sdk-bridge {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("check") => cmd_check(&opts),
        Some("client") => cmd_client(&opts),
        Some("secret-manager") | Some("sm") => cmd_secret_manager(&opts),
        Some("wallet") => cmd_wallet(&opts),
        Some("utils") => cmd_utils(&opts),
        Some("address") => cmd_address(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || std::io::stdout().is_terminal();
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{:#}", e)}), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    library: Option<String>,
    native_log: Option<String>,
    // Address options
    hrp: Option<String>,
    account: Option<u32>,
    index: Option<u32>,
    internal: bool,
    ledger_prompt: bool,
    // Output options
    pretty: bool,
    raw: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        // Load .env file if present
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let value = value.trim().trim_matches('"');
                    if !value.is_empty() && env::var(key.trim()).is_err() {
                        env::set_var(key.trim(), value);
                    }
                }
            }
        }

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--pretty" => opts.pretty = true,
                "--raw" => opts.raw = true,
                "--internal" => opts.internal = true,
                "--ledger-prompt" => opts.ledger_prompt = true,
                "--library" | "-l" => {
                    if i + 1 < args.len() {
                        opts.library = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--native-log" => {
                    if i + 1 < args.len() {
                        opts.native_log = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--hrp" => {
                    if i + 1 < args.len() {
                        opts.hrp = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--account" | "-a" => {
                    if i + 1 < args.len() {
                        opts.account = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--index" | "-i" => {
                    if i + 1 < args.len() {
                        opts.index = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        // First positional is command, the rest are JSON documents
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.positional = positional;

        opts
    }

    fn json_arg<T: DeserializeOwned>(&self, position: usize, what: &str) -> anyhow::Result<T> {
        let raw = self
            .positional
            .get(position)
            .ok_or_else(|| anyhow!("missing {} argument", what))?;
        serde_json::from_str(raw).with_context(|| format!("invalid {} JSON", what))
    }

    /// CLI flags take priority over the environment.
    fn bridge_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = BridgeConfig::from_env()?;
        if let Some(path) = &self.library {
            config = config.with_library_path(path);
        }
        if let Some(level) = &self.native_log {
            let level: LevelFilter = level.parse().map_err(|e: String| anyhow!(e))?;
            config = config.with_logger(LoggerConfig::new(level));
        }
        Ok(config)
    }

    fn open_bridge(&self) -> anyhow::Result<Bridge> {
        let config = self.bridge_config()?;
        debug!(library = ?config.library_path, "opening bridge");
        Ok(Bridge::open(&config)?)
    }

    /// Decoded response, or the raw text with `--raw`.
    fn response(&self, raw: String) -> anyhow::Result<Value> {
        if self.raw {
            return Ok(Value::String(raw));
        }
        serde_json::from_str(&raw).context("native response is not JSON")
    }
}

fn print_usage() {
    println!(
        r#"sdk-bridge - Typed JSON bridge to the native wallet SDK

USAGE:
    sdk-bridge <command> [json...] [options]

COMMANDS:
    check                                   Load the library and list bound symbols
    client <options> <request>              Create a client, send one request, destroy it
    secret-manager <options> <request>      Same for a secret manager (alias: sm)
    wallet <options> <request>              Same for a wallet
    utils <request>                         Handle-free utility request
    address <wallet-options>                Generate an address through a wallet

LIBRARY OPTIONS:
    --library, -l <path>    Native library (env: SDK_BRIDGE_LIBRARY)
    --native-log <level>    off|error|warn|info|debug|trace (env: SDK_BRIDGE_NATIVE_LOG)

ADDRESS OPTIONS:
    --hrp <hrp>             Bech32 human-readable part (default: smr)
    --account, -a <n>       Account index (default: 0)
    --index, -i <n>         Address index (default: 0)
    --internal              Internal (change) address
    --ledger-prompt         Show the address on a ledger device

OUTPUT OPTIONS:
    --pretty                Pretty-print JSON
    --raw                   Print the response text undecoded
    --version, -V           Print version

EXAMPLES:
    sdk-bridge check -l ./target/debug/libiota_sdk_native.so
    sdk-bridge sm '{{"mnemonic":"..."}}' '{{"name":"getLedgerNanoStatus"}}'
    sdk-bridge wallet "$(cat wallet.json)" '{{"name":"getAccounts"}}'
    sdk-bridge address "$(cat wallet.json)" --hrp rms --index 3
"#
    );
}

fn cmd_check(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let bridge = opts.open_bridge()?;
    let native = bridge.native();
    let optional = native.optional_symbols();
    let missing_optional: Vec<&str> = OPTIONAL_SYMBOLS.iter().copied().filter(|name| !optional.contains(name)).collect();
    Ok(json!({
        "library": native.path().display().to_string(),
        "required": REQUIRED_SYMBOLS,
        "optional": optional,
        "unavailable": missing_optional,
    }))
}

fn cmd_client(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let options: ClientOptions = opts.json_arg(0, "client options")?;
    let request: Request<Value> = opts.json_arg(1, "request")?;
    let bridge = opts.open_bridge()?;

    let client = bridge.create_client(&options)?;
    let response = bridge.call_client_method(&client, &request);
    bridge.destroy_client(client)?;
    opts.response(response?)
}

fn cmd_secret_manager(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let options: SecretManagerDto = opts.json_arg(0, "secret manager options")?;
    let method: SecretManagerMethod = opts.json_arg(1, "secret manager request")?;
    let bridge = opts.open_bridge()?;

    let secret_manager = bridge.create_secret_manager(&options)?;
    let response = bridge.call_secret_manager_method(&secret_manager, &method);
    bridge.destroy_secret_manager(secret_manager)?;
    opts.response(response?)
}

fn cmd_wallet(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let options: WalletOptions = opts.json_arg(0, "wallet options")?;
    let method: WalletMethod = opts.json_arg(1, "wallet request")?;
    let bridge = opts.open_bridge()?;

    let wallet = Wallet::create(&bridge, &options)?;
    let response = wallet.call_raw(&method);
    wallet.destroy()?;
    opts.response(response?)
}

fn cmd_utils(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let request: Request<Value> = opts.json_arg(0, "request")?;
    let bridge = opts.open_bridge()?;
    opts.response(bridge.call_utils_method(&request)?)
}

fn cmd_address(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let options: WalletOptions = opts.json_arg(0, "wallet options")?;
    let hrp = opts.hrp.as_deref().unwrap_or("smr");
    if hrp.is_empty() {
        bail!("--hrp must not be empty");
    }
    let account = opts.account.unwrap_or(0);
    let index = opts.index.unwrap_or(0);
    let address_options = (opts.internal || opts.ledger_prompt).then(|| GenerateAddressOptions {
        internal: opts.internal.then_some(true),
        ledger_nano_prompt: opts.ledger_prompt,
    });

    let bridge = opts.open_bridge()?;
    let wallet = Wallet::create(&bridge, &options)?;
    let address = wallet.generate_address(index, account, hrp, address_options);
    wallet.destroy()?;

    Ok(json!({
        "address": address?,
        "account": account,
        "index": index,
        "internal": opts.internal,
    }))
}
