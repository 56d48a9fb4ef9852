use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::KvsEngine;
use tracing::{debug, instrument};

/// The primary struct for working with a [`KvStore`].
///
/// It keeps all key/value data in memory together with a "dedup" table that records, for every
/// client, the id of the last operation processed from that client. Both tables sit behind a
/// single lock, so every operation is atomic with respect to every other operation.
///
/// Cloning a `KvStore` is cheap and yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct KvStore {
    state: Arc<Mutex<StoreState>>,
}

/// the data guarded by the store's lock
#[derive(Debug, Default)]
struct StoreState {
    // maps keys to their current value
    data: HashMap<String, String>,

    // maps a client id to the id of the last operation processed for that client
    last_ops: HashMap<String, u64>,
}

impl StoreState {
    /// returns true if `op_id` is a retransmission of the last call processed for `client_id`
    fn is_duplicate(&self, client_id: &str, op_id: u64) -> bool {
        self.last_ops.get(client_id) == Some(&op_id)
    }

    /// records `op_id` as the last processed operation of `client_id`
    fn record(&mut self, client_id: &str, op_id: u64) {
        match self.last_ops.get_mut(client_id) {
            Some(last) => *last = op_id,
            None => {
                self.last_ops.insert(client_id.to_owned(), op_id);
            }
        }
    }

    fn value(&self, key: &str) -> String {
        self.data.get(key).cloned().unwrap_or_default()
    }
}

impl KvStore {
    /// creates an empty [`KvStore`]
    pub fn new() -> KvStore {
        KvStore::default()
    }

    /// acquires the store lock.
    ///
    /// Every mutation under the lock is a single map write, so a panic in another thread can
    /// never leave the state half updated and a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvsEngine for KvStore {
    /// returns the current value of `key`, or an empty string if it was never written.
    /// A duplicate `get` returns the current value as well, it only differs in what gets logged
    #[instrument(level = "debug", skip(self))]
    fn get(&self, client_id: &str, op_id: u64, key: &str) -> String {
        let mut state = self.lock();
        let value = state.value(key);
        if state.is_duplicate(client_id, op_id) {
            debug!("get skipped (duplicate)");
        } else {
            debug!("get applied");
        }
        state.record(client_id, op_id);
        value
    }

    /// stores `value` at `key` unless this call is a duplicate, and returns the previous value
    #[instrument(level = "debug", skip(self))]
    fn put(&self, client_id: &str, op_id: u64, key: &str, value: &str) -> String {
        let mut state = self.lock();
        let prior = state.value(key);
        if state.is_duplicate(client_id, op_id) {
            debug!("put skipped (duplicate)");
        } else {
            state.data.insert(key.to_owned(), value.to_owned());
            debug!("put applied");
        }
        state.record(client_id, op_id);
        prior
    }

    /// appends `value` to `key` unless this call is a duplicate, and returns the previous value
    #[instrument(level = "debug", skip(self))]
    fn append(&self, client_id: &str, op_id: u64, key: &str, value: &str) -> String {
        let mut state = self.lock();
        let prior = state.value(key);
        if state.is_duplicate(client_id, op_id) {
            debug!("append skipped (duplicate)");
        } else {
            state.data.entry(key.to_owned()).or_default().push_str(value);
            debug!("append applied");
        }
        state.record(client_id, op_id);
        prior
    }
}
