//! Cache decorator tests.
//!
//! Test organization:
//! - cache_layer.rs: short-circuit, expiry and Tower composition
//! - cache_keys.rs: path keys, custom keys and the validity predicate
//! - cache_durable.rs: persistent storage across restarts
