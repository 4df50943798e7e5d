//! Response envelopes.

use crate::request::RequestConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A completed response together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Response payload.
    pub data: Value,
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    pub status_text: String,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// The request this response answers.
    pub config: RequestConfig,
}

impl Response {
    /// Creates a `200 OK` response with no headers.
    pub fn ok(data: impl Into<Value>, config: RequestConfig) -> Self {
        Self::new(200, "OK", data, config)
    }

    /// Creates a response with the given status line.
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        data: impl Into<Value>,
        config: RequestConfig,
    ) -> Self {
        Self {
            data: data.into(),
            status,
            status_text: status_text.into(),
            headers: BTreeMap::new(),
            config,
        }
    }

    /// Sets a response header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Returns `true` for statuses in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the payload.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.data)
    }

    /// Projects the response onto its storable parts, dropping the request.
    pub fn to_plain(&self) -> PlainResponse {
        PlainResponse {
            data: self.data.clone(),
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
        }
    }

    /// Rebuilds a response from a stored projection.
    pub fn from_plain(plain: PlainResponse, config: RequestConfig) -> Self {
        Self {
            data: plain.data,
            status: plain.status,
            status_text: plain.status_text,
            headers: plain.headers,
            config,
        }
    }
}

/// The serializable projection of a [`Response`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainResponse {
    /// Response payload.
    pub data: Value,
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    pub status_text: String,
    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}
