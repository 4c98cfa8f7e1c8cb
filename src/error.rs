//! Error types for the bridge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The shared library could not be mapped.
    #[error("Failed to load native library {path}: {reason}")]
    LibraryLoad { path: String, reason: String },

    /// One or more required exports are absent. All missing names are reported at once.
    #[error("Native library is missing required symbols: {}", .0.join(", "))]
    MissingSymbols(Vec<String>),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to encode request: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Encoded request contains an interior NUL byte")]
    InteriorNul,

    /// Native-reported failure. The text is the library's last error, verbatim.
    #[error("{0}")]
    Native(String),

    /// A forwarder reply that is not valid UTF-8. Nothing is decoded from it.
    #[error("{symbol} returned a reply that is not valid UTF-8: {source}")]
    InvalidUtf8 {
        symbol: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Malformed response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Response payload of type '{response_type}' does not match the expected shape: {source}")]
    Payload {
        response_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// An optional export the library does not provide.
    #[error("Native library does not export {0}")]
    Unsupported(&'static str),

    #[error("Transaction essence cannot be encoded: {0}")]
    EssenceEncoding(String),

    #[error("Transaction output {index} cannot be encoded: {source}")]
    OutputEncoding {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Builds a native failure from the last-error register. An empty register still
    /// yields an error so a sentinel result is never mistaken for success.
    pub(crate) fn native(symbol: &str, message: String) -> Self {
        if message.is_empty() {
            Error::Native(format!("{symbol} failed without reporting an error"))
        } else {
            Error::Native(message)
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Error::Native(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
