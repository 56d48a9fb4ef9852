//! This module provides the key/value storage engine used by the server.
//! The only engine implemented is the in-memory [`KvStore`], which applies `Put` and `Append`
//! exactly once per logical client call even when the call is delivered several times.

/// A trait for the basic functionality of a deduplicating key/value storage engine.
///
/// Every operation is identified by the `client_id` that issued it and the `op_id` of the
/// logical call. A call whose `op_id` equals the last one processed for the same client is a
/// retransmission and must not be applied a second time.
///
/// None of these operations can fail. A key that was never written reads as the empty string.
pub trait KvsEngine: Clone + Send + 'static {
    /// Gets the value associated with the given `key`
    ///
    /// Returns an empty string if the given `key` was never written.
    fn get(&self, client_id: &str, op_id: u64, key: &str) -> String;

    /// Sets `key` to `value`, overwriting any previous value.
    ///
    /// Returns the value stored at `key` before this call. A duplicate call does not write.
    fn put(&self, client_id: &str, op_id: u64, key: &str, value: &str) -> String;

    /// Concatenates `value` onto the value stored at `key`, creating the key if needed.
    ///
    /// Returns the value stored at `key` before this call. A duplicate call does not append.
    fn append(&self, client_id: &str, op_id: u64, key: &str, value: &str) -> String;
}

mod kvs;

pub use self::kvs::KvStore;
