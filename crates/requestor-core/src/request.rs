//! Request descriptions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// HTTP method tag carried by every [`RequestConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
}

impl Method {
    /// Returns the uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of a single request as it travels through a decorator stack.
///
/// Decorators receive a config by value. Anything that needs to forward a
/// modified request clones it first, so queued siblings never observe each
/// other's changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Absolute or origin-relative URL.
    pub url: String,
    /// Method tag.
    pub method: Method,
    /// Request headers. Keys are unique.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Query parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Request body.
    #[serde(default)]
    pub body: Option<Value>,
    /// Advisory timeout, enforced by the transport only.
    #[serde(default)]
    pub timeout: Option<Duration>,
    /// Transport-specific extension fields.
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

impl RequestConfig {
    /// Creates a config with no headers, params, body or timeout.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            params: Map::new(),
            body: None,
            timeout: None,
            extensions: Map::new(),
        }
    }

    /// Shorthand for `RequestConfig::new(Method::Get, url)`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Shorthand for `RequestConfig::new(Method::Post, url)`.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Sets a header, replacing any previous value for the same key.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the request body.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the advisory timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets an extension field.
    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}

/// The optional parts of a request, used by the verb helpers on
/// [`RequestorExt`](crate::RequestorExt).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Query parameters.
    pub params: Map<String, Value>,
    /// Advisory timeout.
    pub timeout: Option<Duration>,
    /// Transport-specific extension fields.
    pub extensions: Map<String, Value>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the advisory timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets an extension field.
    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Combines these options with a method, URL and optional body.
    pub fn into_config(
        self,
        method: Method,
        url: impl Into<String>,
        body: Option<Value>,
    ) -> RequestConfig {
        RequestConfig {
            url: url.into(),
            method,
            headers: self.headers,
            params: self.params,
            body,
            timeout: self.timeout,
            extensions: self.extensions,
        }
    }
}
