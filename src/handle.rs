//! Handles - Opaque native object tokens
//!
//! The native library hands out non-zero integers for clients, wallets and secret
//! managers. The bridge never interprets their bits. Two wrappers carry them:
//!
//! | Type | Copy | Destroyable | Produced by |
//! |------|------|-------------|-------------|
//! | [`Handle<K>`] | no | yes, consumed | `create_*` |
//! | [`HandleRef<K>`] | yes | no | `Handle::handle_ref`, `get_*_from_wallet` |
//!
//! `destroy_*` takes a `Handle<K>` by value, so destroying twice does not compile.
//! A `Handle` dropped without being destroyed leaks its native object and logs a warning.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::NonZeroUsize;

pub mod kind {
    mod sealed {
        pub trait Sealed {}
    }

    /// Marker for the three native object kinds.
    pub trait HandleKind: sealed::Sealed {
        const NAME: &'static str;
    }

    #[derive(Debug)]
    pub enum Client {}
    #[derive(Debug)]
    pub enum Wallet {}
    #[derive(Debug)]
    pub enum SecretManager {}

    impl sealed::Sealed for Client {}
    impl sealed::Sealed for Wallet {}
    impl sealed::Sealed for SecretManager {}

    impl HandleKind for Client {
        const NAME: &'static str = "client";
    }
    impl HandleKind for Wallet {
        const NAME: &'static str = "wallet";
    }
    impl HandleKind for SecretManager {
        const NAME: &'static str = "secret_manager";
    }
}

use kind::HandleKind;

/// Owned native handle. Must be passed to exactly one matching destroy call.
#[must_use = "native handles must be passed to the matching destroy call"]
pub struct Handle<K: HandleKind> {
    raw: NonZeroUsize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind> Handle<K> {
    /// Zero is the native "no object" sentinel and never becomes a handle.
    pub(crate) fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(|raw| Self { raw, _kind: PhantomData })
    }

    /// Gives up ownership without the leak warning. Only destroy paths call this.
    pub(crate) fn into_raw(self) -> usize {
        let raw = self.raw.get();
        std::mem::forget(self);
        raw
    }

    pub fn raw(&self) -> usize {
        self.raw.get()
    }

    /// Non-owning copy for method calls.
    pub fn handle_ref(&self) -> HandleRef<K> {
        HandleRef { raw: self.raw, _kind: PhantomData }
    }
}

impl<K: HandleKind> Drop for Handle<K> {
    fn drop(&mut self) {
        tracing::warn!(
            kind = K::NAME,
            handle = self.raw.get(),
            "native handle dropped without destroy, native object leaked"
        );
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({:#x})", K::NAME, self.raw.get())
    }
}

/// Non-owning handle value. Used for calls and for the wallet's associated objects.
pub struct HandleRef<K: HandleKind> {
    raw: NonZeroUsize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind> HandleRef<K> {
    pub(crate) fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(|raw| Self { raw, _kind: PhantomData })
    }

    pub fn raw(self) -> usize {
        self.raw.get()
    }
}

// Manual impls: derives would put bounds on the uninhabited marker types.
impl<K: HandleKind> Clone for HandleRef<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: HandleKind> Copy for HandleRef<K> {}

impl<K: HandleKind> PartialEq for HandleRef<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: HandleKind> Eq for HandleRef<K> {}

impl<K: HandleKind> Hash for HandleRef<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: HandleKind> fmt::Debug for HandleRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleRef<{}>({:#x})", K::NAME, self.raw.get())
    }
}

impl<K: HandleKind> From<&Handle<K>> for HandleRef<K> {
    fn from(handle: &Handle<K>) -> Self {
        handle.handle_ref()
    }
}

pub type ClientHandle = Handle<kind::Client>;
pub type WalletHandle = Handle<kind::Wallet>;
pub type SecretManagerHandle = Handle<kind::SecretManager>;

pub type ClientRef = HandleRef<kind::Client>;
pub type WalletRef = HandleRef<kind::Wallet>;
pub type SecretManagerRef = HandleRef<kind::SecretManager>;
