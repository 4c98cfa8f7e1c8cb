//! Symbols - Native capability table
//!
//! [`NativeApi`] has one method per exported symbol. [`DynamicLibrary`] implements it
//! over a shared library opened with `libloading`:
//!
//! ```text
//! open(path) ──► Library::new ──► resolve REQUIRED_SYMBOLS ──► DynamicLibrary
//!                     │                   │
//!                     ▼                   ▼
//!               LibraryLoad       MissingSymbols([...all absent names])
//! ```
//!
//! The library stays mapped for the rest of the process, and each path is mapped at
//! most once. Only symbol presence can be checked; a symbol exported with a different
//! signature is undefined behavior.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::ffi::{c_char, c_void, CStr};
use std::path::{Path, PathBuf};
use std::str::Utf8Error;
use std::sync::{Arc, Mutex};

/// Exports that must be present for the bridge to work.
pub const REQUIRED_SYMBOLS: &[&str] = &[
    "init_logger",
    "create_client",
    "create_wallet",
    "create_secret_manager",
    "get_client_from_wallet",
    "get_secret_manager_from_wallet",
    "destroy_client",
    "destroy_wallet",
    "destroy_secret_manager",
    "call_client_method",
    "call_wallet_method",
    "call_secret_manager_method",
    "binding_get_last_error",
];

/// Exports bound when present.
pub const OPTIONAL_SYMBOLS: &[&str] = &["call_utils_method"];

/// Forwarder reply. `Err` when the native text is not valid UTF-8.
pub type NativeReply = std::result::Result<String, Utf8Error>;

/// Native boundary. Handles cross as raw integers, 0 meaning "no object".
///
/// Sentinels signal failure: `0` from constructors and lookups, `false` from
/// `init_logger` and destructors, an empty string from forwarders. After a failure
/// [`last_error`](NativeApi::last_error) describes the most recent failing call.
pub trait NativeApi {
    fn init_logger(&self, config: &CStr) -> bool;

    fn create_client(&self, options: &CStr) -> usize;
    fn create_wallet(&self, options: &CStr) -> usize;
    fn create_secret_manager(&self, options: &CStr) -> usize;

    fn get_client_from_wallet(&self, wallet: usize) -> usize;
    fn get_secret_manager_from_wallet(&self, wallet: usize) -> usize;

    fn destroy_client(&self, client: usize) -> bool;
    fn destroy_wallet(&self, wallet: usize) -> bool;
    fn destroy_secret_manager(&self, secret_manager: usize) -> bool;

    fn call_client_method(&self, client: usize, method: &CStr) -> NativeReply;
    fn call_wallet_method(&self, wallet: usize, method: &CStr) -> NativeReply;
    fn call_secret_manager_method(&self, secret_manager: usize, method: &CStr) -> NativeReply;

    /// `None` when the library does not export the utils forwarder.
    fn call_utils_method(&self, method: &CStr) -> Option<NativeReply> {
        let _ = method;
        None
    }

    /// Reads the shared last-error register. Invalid UTF-8 is replaced, the text is
    /// only ever shown to people.
    fn last_error(&self) -> String;
}

/// One native table shared by several bridges.
impl<T: NativeApi + ?Sized> NativeApi for Arc<T> {
    fn init_logger(&self, config: &CStr) -> bool {
        (**self).init_logger(config)
    }

    fn create_client(&self, options: &CStr) -> usize {
        (**self).create_client(options)
    }

    fn create_wallet(&self, options: &CStr) -> usize {
        (**self).create_wallet(options)
    }

    fn create_secret_manager(&self, options: &CStr) -> usize {
        (**self).create_secret_manager(options)
    }

    fn get_client_from_wallet(&self, wallet: usize) -> usize {
        (**self).get_client_from_wallet(wallet)
    }

    fn get_secret_manager_from_wallet(&self, wallet: usize) -> usize {
        (**self).get_secret_manager_from_wallet(wallet)
    }

    fn destroy_client(&self, client: usize) -> bool {
        (**self).destroy_client(client)
    }

    fn destroy_wallet(&self, wallet: usize) -> bool {
        (**self).destroy_wallet(wallet)
    }

    fn destroy_secret_manager(&self, secret_manager: usize) -> bool {
        (**self).destroy_secret_manager(secret_manager)
    }

    fn call_client_method(&self, client: usize, method: &CStr) -> NativeReply {
        (**self).call_client_method(client, method)
    }

    fn call_wallet_method(&self, wallet: usize, method: &CStr) -> NativeReply {
        (**self).call_wallet_method(wallet, method)
    }

    fn call_secret_manager_method(&self, secret_manager: usize, method: &CStr) -> NativeReply {
        (**self).call_secret_manager_method(secret_manager, method)
    }

    fn call_utils_method(&self, method: &CStr) -> Option<NativeReply> {
        (**self).call_utils_method(method)
    }

    fn last_error(&self) -> String {
        (**self).last_error()
    }
}

type InitLoggerFn = unsafe extern "C" fn(*const c_char) -> bool;
type CreateFn = unsafe extern "C" fn(*const c_char) -> *const c_void;
type LookupFn = unsafe extern "C" fn(*mut c_void) -> *const c_void;
type DestroyFn = unsafe extern "C" fn(*mut c_void) -> bool;
type CallFn = unsafe extern "C" fn(*const c_void, *const c_char) -> *const c_char;
type UtilsFn = unsafe extern "C" fn(*const c_char) -> *const c_char;
type LastErrorFn = unsafe extern "C" fn() -> *const c_char;

/// Symbol table bound from a shared library. Clones share one mapping.
#[derive(Debug, Clone)]
pub struct DynamicLibrary {
    path: PathBuf,
    init_logger: InitLoggerFn,
    create_client: CreateFn,
    create_wallet: CreateFn,
    create_secret_manager: CreateFn,
    get_client_from_wallet: LookupFn,
    get_secret_manager_from_wallet: LookupFn,
    destroy_client: DestroyFn,
    destroy_wallet: DestroyFn,
    destroy_secret_manager: DestroyFn,
    call_client_method: CallFn,
    call_wallet_method: CallFn,
    call_secret_manager_method: CallFn,
    call_utils_method: Option<UtilsFn>,
    get_last_error: LastErrorFn,
}

/// Collects every missing required name instead of stopping at the first.
struct Resolver<'l> {
    library: &'l libloading::Library,
    missing: Vec<String>,
}

impl<'l> Resolver<'l> {
    /// `T` must be the exported function's pointer type.
    fn optional<T: Copy>(&self, name: &str) -> Option<T> {
        // SAFETY: the symbol is only read as a function pointer of the declared shape.
        unsafe { self.library.get::<T>(name.as_bytes()).ok().map(|symbol| *symbol) }
    }

    fn required<T: Copy>(&mut self, name: &str) -> Option<T> {
        let symbol = self.optional(name);
        if symbol.is_none() {
            self.missing.push(name.to_string());
        }
        symbol
    }
}

// Tables already bound in this process, by canonical path.
static LOADED: Mutex<BTreeMap<PathBuf, DynamicLibrary>> = Mutex::new(BTreeMap::new());

impl DynamicLibrary {
    /// Maps the library and binds every symbol. A path opened before returns the
    /// table bound the first time.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let mut loaded = LOADED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(library) = loaded.get(&key) {
            tracing::debug!(path = %path.display(), "native library already bound");
            return Ok(library.clone());
        }
        let library = Self::bind(path)?;
        loaded.insert(key, library.clone());
        Ok(library)
    }

    fn bind(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading native library");

        // SAFETY: running the library's initialisers is the point of loading it.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| Error::LibraryLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        // Never unloaded: bound pointers must outlive every caller.
        let library: &'static libloading::Library = Box::leak(Box::new(library));

        let mut resolver = Resolver { library, missing: Vec::new() };
        let bound = (
            resolver.required::<InitLoggerFn>("init_logger"),
            resolver.required::<CreateFn>("create_client"),
            resolver.required::<CreateFn>("create_wallet"),
            resolver.required::<CreateFn>("create_secret_manager"),
            resolver.required::<LookupFn>("get_client_from_wallet"),
            resolver.required::<LookupFn>("get_secret_manager_from_wallet"),
            resolver.required::<DestroyFn>("destroy_client"),
            resolver.required::<DestroyFn>("destroy_wallet"),
            resolver.required::<DestroyFn>("destroy_secret_manager"),
            resolver.required::<CallFn>("call_client_method"),
            resolver.required::<CallFn>("call_wallet_method"),
            resolver.required::<CallFn>("call_secret_manager_method"),
            resolver.required::<LastErrorFn>("binding_get_last_error"),
        );
        let call_utils_method = resolver.optional::<UtilsFn>("call_utils_method");

        let (
            Some(init_logger),
            Some(create_client),
            Some(create_wallet),
            Some(create_secret_manager),
            Some(get_client_from_wallet),
            Some(get_secret_manager_from_wallet),
            Some(destroy_client),
            Some(destroy_wallet),
            Some(destroy_secret_manager),
            Some(call_client_method),
            Some(call_wallet_method),
            Some(call_secret_manager_method),
            Some(get_last_error),
        ) = bound
        else {
            tracing::warn!(missing = ?resolver.missing, "native library is incomplete");
            return Err(Error::MissingSymbols(resolver.missing));
        };

        tracing::info!(
            required = REQUIRED_SYMBOLS.len(),
            utils = call_utils_method.is_some(),
            "native symbols bound"
        );

        Ok(Self {
            path: path.to_path_buf(),
            init_logger,
            create_client,
            create_wallet,
            create_secret_manager,
            get_client_from_wallet,
            get_secret_manager_from_wallet,
            destroy_client,
            destroy_wallet,
            destroy_secret_manager,
            call_client_method,
            call_wallet_method,
            call_secret_manager_method,
            call_utils_method,
            get_last_error,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Optional symbols this library exports.
    pub fn optional_symbols(&self) -> Vec<&'static str> {
        let mut present = Vec::new();
        if self.call_utils_method.is_some() {
            present.push("call_utils_method");
        }
        present
    }
}

/// Copies a native string. Null reads as empty. The native side exposes no matching
/// free for these strings, so they are left alone.
///
/// # Safety
/// `ptr` must be null or point at a NUL-terminated string.
unsafe fn read_native_string(ptr: *const c_char) -> NativeReply {
    if ptr.is_null() {
        Ok(String::new())
    } else {
        CStr::from_ptr(ptr).to_str().map(str::to_owned)
    }
}

/// # Safety
/// As [`read_native_string`].
unsafe fn read_native_text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

// SAFETY for every call below: the pointers were bound from the symbols named in
// REQUIRED_SYMBOLS, string arguments are live `CStr`s, and handle values come from the
// library's own constructors.
impl NativeApi for DynamicLibrary {
    fn init_logger(&self, config: &CStr) -> bool {
        unsafe { (self.init_logger)(config.as_ptr()) }
    }

    fn create_client(&self, options: &CStr) -> usize {
        unsafe { (self.create_client)(options.as_ptr()) as usize }
    }

    fn create_wallet(&self, options: &CStr) -> usize {
        unsafe { (self.create_wallet)(options.as_ptr()) as usize }
    }

    fn create_secret_manager(&self, options: &CStr) -> usize {
        unsafe { (self.create_secret_manager)(options.as_ptr()) as usize }
    }

    fn get_client_from_wallet(&self, wallet: usize) -> usize {
        unsafe { (self.get_client_from_wallet)(wallet as *mut c_void) as usize }
    }

    fn get_secret_manager_from_wallet(&self, wallet: usize) -> usize {
        unsafe { (self.get_secret_manager_from_wallet)(wallet as *mut c_void) as usize }
    }

    fn destroy_client(&self, client: usize) -> bool {
        unsafe { (self.destroy_client)(client as *mut c_void) }
    }

    fn destroy_wallet(&self, wallet: usize) -> bool {
        unsafe { (self.destroy_wallet)(wallet as *mut c_void) }
    }

    fn destroy_secret_manager(&self, secret_manager: usize) -> bool {
        unsafe { (self.destroy_secret_manager)(secret_manager as *mut c_void) }
    }

    fn call_client_method(&self, client: usize, method: &CStr) -> NativeReply {
        unsafe { read_native_string((self.call_client_method)(client as *const c_void, method.as_ptr())) }
    }

    fn call_wallet_method(&self, wallet: usize, method: &CStr) -> NativeReply {
        unsafe { read_native_string((self.call_wallet_method)(wallet as *const c_void, method.as_ptr())) }
    }

    fn call_secret_manager_method(&self, secret_manager: usize, method: &CStr) -> NativeReply {
        unsafe {
            read_native_string((self.call_secret_manager_method)(secret_manager as *const c_void, method.as_ptr()))
        }
    }

    fn call_utils_method(&self, method: &CStr) -> Option<NativeReply> {
        self.call_utils_method
            .map(|call| unsafe { read_native_string(call(method.as_ptr())) })
    }

    fn last_error(&self) -> String {
        unsafe { read_native_text((self.get_last_error)()) }
    }
}
