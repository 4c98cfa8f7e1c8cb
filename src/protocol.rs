//! Protocol - Request and response envelopes
//!
//! ```text
//! request  = {"name": <operation-id>, "data": <payload, omitted when absent>}
//! response = {"type": <string>, "payload": <operation-specific>}
//! ```
//!
//! Decoding is strict: unknown payload fields are ignored, missing required fields are
//! an error. The response `type` is informational and reported in decode errors only.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::CString;

/// Anything that can be sent through a `call_*_method` forwarder.
pub trait Method: Serialize {
    /// Operation id, as it appears in the `name` field.
    fn name(&self) -> &str;
}

/// Generic request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<T> {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Request<T> {
    pub fn new(name: impl Into<String>, data: T) -> Self {
        Self { name: name.into(), data: Some(data) }
    }
}

impl Request<()> {
    pub fn without_data(name: impl Into<String>) -> Self {
        Self { name: name.into(), data: None }
    }
}

impl<T: Serialize> Method for Request<T> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Serializes `{name, data}`.
pub fn encode<T: Serialize + ?Sized>(name: &str, data: &T) -> Result<String> {
    #[derive(Serialize)]
    struct Borrowed<'a, T: ?Sized> {
        name: &'a str,
        data: &'a T,
    }
    serde_json::to_string(&Borrowed { name, data }).map_err(Error::Serialization)
}

/// Serializes any value to the NUL-terminated form the native boundary takes.
pub(crate) fn to_c_json<T: Serialize + ?Sized>(value: &T) -> Result<CString> {
    let json = serde_json::to_string(value).map_err(Error::Serialization)?;
    CString::new(json).map_err(|_| Error::InteriorNul)
}

/// Outer reply envelope. The payload stays untyped until its shape is known.
#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl Response {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(Error::Envelope)
    }

    /// Parses the payload into `T`. A missing payload parses as JSON `null`.
    pub fn payload<T: DeserializeOwned>(self) -> Result<T> {
        let Response { kind, payload } = self;
        serde_json::from_value(payload.unwrap_or(Value::Null))
            .map_err(|source| Error::Payload { response_type: kind, source })
    }
}

/// Decodes a forwarder result. A prior error passes through untouched.
pub fn decode<T: DeserializeOwned>(response: Result<String>) -> Result<T> {
    let raw = response?;
    Response::parse(&raw)?.payload()
}
