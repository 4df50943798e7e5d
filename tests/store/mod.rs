//! Store tests.
//!
//! Test organization:
//! - contract.rs: behavior every CacheStore shares
//! - file_storage.rs: the file-backed KeyValueStorage

mod contract;
