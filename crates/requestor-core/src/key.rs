//! Deterministic keys derived from a [`RequestConfig`].
//!
//! Two derivations are provided:
//!
//! - [`fingerprint`] hashes every identity-defining field (URL, method,
//!   headers, body, query params) and is the default idempotency key.
//! - [`path_key`] is the default cache key: `"{METHOD}:{path}{query}"` taken
//!   from the URL alone. Headers and body are not part of it, so header- or
//!   body-sensitive endpoints need a custom key function.
//!
//! Both are pure functions of the config. Neither ever fails: an unparsable
//! URL or an unserializable value degrades to a coarser string.
//!
//! The fingerprint lives in a 32-bit space. Two different requests can collide;
//! this is accepted and not corrected.

use crate::request::RequestConfig;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use url::Url;

/// Origin used to resolve relative URLs in [`path_key`].
pub const DEFAULT_ORIGIN: &str = "http://localhost";

const PART_DELIMITER: &str = "|";

/// Rolling 31-multiplier hash over UTF-16 code units, rendered in base 36.
///
/// `h = h * 31 + unit`, wrapped to 32 bits; the absolute value is rendered.
pub fn simple_hash(input: &str) -> String {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    to_base36(i64::from(hash).unsigned_abs())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn serialize_or_coerce<T: Serialize + Display>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "falling back to string coercion for key part");
        value.to_string()
    })
}

/// Whether a body contributes to the fingerprint. `null`, `false`, zero and
/// the empty string carry no identity; arrays and objects always do.
fn body_counts(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The string that [`fingerprint`] hashes.
///
/// A body of `null`, `false`, `0` or `""` is left out, so it fingerprints
/// the same as no body at all.
pub fn fingerprint_source(config: &RequestConfig) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4 + config.headers.len());
    parts.push(config.url.clone());
    parts.push(config.method.as_str().to_string());

    // BTreeMap iteration is already sorted by key.
    for (key, value) in &config.headers {
        parts.push(format!("{key}:{value}"));
    }

    if let Some(body) = config.body.as_ref().filter(|body| body_counts(body)) {
        parts.push(serialize_or_coerce(body));
    }

    if !config.params.is_empty() {
        let params = Value::Object(config.params.clone());
        parts.push(serialize_or_coerce(&params));
    }

    parts.join(PART_DELIMITER)
}

/// Hash of the request identity, used for idempotency.
pub fn fingerprint(config: &RequestConfig) -> String {
    simple_hash(&fingerprint_source(config))
}

/// Path-based cache key using [`DEFAULT_ORIGIN`].
pub fn path_key(config: &RequestConfig) -> String {
    PathKey::default().derive(config)
}

/// Path-based key derivation against a configurable origin.
#[derive(Debug, Clone)]
pub struct PathKey {
    origin: Option<Url>,
}

impl PathKey {
    /// Creates a derivation resolving relative URLs against `origin`.
    ///
    /// An unparsable origin is ignored; only absolute URLs then resolve.
    pub fn new(origin: &str) -> Self {
        let origin = match Url::parse(origin) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(origin, error = %err, "invalid origin for path keys");
                None
            }
        };
        Self { origin }
    }

    /// Derives `"{METHOD}:{path}{query}"`.
    pub fn derive(&self, config: &RequestConfig) -> String {
        let method = config.method.as_str();
        match self.resolve(&config.url) {
            Some(url) => match url.query().filter(|query| !query.is_empty()) {
                Some(query) => format!("{method}:{}?{query}", url.path()),
                None => format!("{method}:{}", url.path()),
            },
            None => format!("{method}:{}", config.url),
        }
    }

    fn resolve(&self, raw: &str) -> Option<Url> {
        match &self.origin {
            Some(origin) => origin.join(raw).ok(),
            None => Url::parse(raw).ok(),
        }
    }
}

impl Default for PathKey {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}
