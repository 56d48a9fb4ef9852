use crossbeam_utils::sync::WaitGroup;
use kvsrv::{KvStore, KvsEngine};
use std::thread;

// A key that was never written reads as an empty string
#[test]
fn get_missing_key() {
    let store = KvStore::new();
    assert_eq!(store.get("c", 1, "never-written"), "");
}

#[test]
fn put_returns_prior_value() {
    let store = KvStore::new();
    assert_eq!(store.put("c", 1, "key1", "value1"), "");
    assert_eq!(store.put("c", 2, "key1", "value2"), "value1");
    assert_eq!(store.get("c", 3, "key1"), "value2");
}

#[test]
fn append_creates_missing_key() {
    let store = KvStore::new();
    assert_eq!(store.append("c", 1, "x", "a"), "");
    assert_eq!(store.get("c", 2, "x"), "a");
}

// A retransmitted append must only be applied once
#[test]
fn duplicate_append_applied_once() {
    let store = KvStore::new();
    assert_eq!(store.append("c", 1, "x", "a"), "");
    assert_eq!(store.append("c", 1, "x", "a"), "a");
    assert_eq!(store.get("c", 2, "x"), "a");
}

#[test]
fn fresh_appends_all_apply() {
    let store = KvStore::new();
    store.append("c", 1, "x", "a");
    store.append("c", 2, "x", "b");
    assert_eq!(store.get("c", 3, "x"), "ab");
}

// The duplicate put replies with the value already in place
#[test]
fn duplicate_put_skipped() {
    let store = KvStore::new();
    assert_eq!(store.put("c", 1, "y", "v1"), "");
    assert_eq!(store.put("c", 1, "y", "v1"), "v1");
    assert_eq!(store.get("c", 2, "y"), "v1");
}

// A duplicate put must not overwrite a value written by another client in between
#[test]
fn duplicate_put_does_not_clobber_other_client() {
    let store = KvStore::new();
    store.put("c1", 1, "y", "from-c1");
    store.put("c2", 1, "y", "from-c2");
    assert_eq!(store.put("c1", 1, "y", "from-c1"), "from-c2");
    assert_eq!(store.get("c3", 1, "y"), "from-c2");
}

#[test]
fn get_sees_latest_put() {
    let store = KvStore::new();
    store.put("c", 1, "z", "v1");
    assert_eq!(store.get("c", 2, "z"), "v1");
}

// A duplicate get still returns the current value, including writes made by other clients
#[test]
fn duplicate_get_returns_current_value() {
    let store = KvStore::new();
    assert_eq!(store.get("c", 1, "z"), "");
    store.put("other", 1, "z", "v1");
    assert_eq!(store.get("c", 1, "z"), "v1");
}

#[test]
fn op_ids_are_scoped_per_client() {
    let store = KvStore::new();
    store.append("c1", 1, "k", "a");
    store.append("c2", 1, "k", "b");
    assert_eq!(store.get("c3", 1, "k"), "ab");
}

// Only the immediately preceding call of a client is remembered
#[test]
fn only_last_op_is_remembered() {
    let store = KvStore::new();
    store.append("c", 1, "k", "a");
    store.append("c", 2, "k", "b");
    // op 1 is no longer the last op of "c", so it is applied again
    store.append("c", 1, "k", "a");
    assert_eq!(store.get("c", 3, "k"), "aba");
}

// A get consumes the op id slot like any other call
#[test]
fn get_records_op_id() {
    let store = KvStore::new();
    store.get("c", 7, "k");
    store.append("c", 7, "k", "a");
    assert_eq!(store.get("c", 8, "k"), "");
}

#[test]
fn clones_share_data() {
    let store = KvStore::new();
    let handle = store.clone();
    handle.put("c", 1, "k", "v");
    assert_eq!(store.get("c", 2, "k"), "v");
    // the dedup table is shared as well
    store.append("c", 2, "k", "w");
    assert_eq!(handle.get("d", 1, "k"), "v");
}

// Concurrent appends from distinct clients all apply, each exactly once
#[test]
fn concurrent_appends_serialize() {
    let store = KvStore::new();
    let chars: Vec<char> = ('a'..='z').chain('A'..='Z').collect();
    let wg = WaitGroup::new();

    for (i, c) in chars.iter().copied().enumerate() {
        let store = store.clone();
        let wg = wg.clone();
        thread::spawn(move || {
            let client_id = format!("client-{}", i);
            let value = c.to_string();
            store.append(&client_id, 1, "shared", &value);
            // retransmission of the same call
            store.append(&client_id, 1, "shared", &value);
            drop(wg);
        });
    }
    wg.wait();

    let mut got: Vec<char> = store.get("reader", 1, "shared").chars().collect();
    got.sort_unstable();
    let mut expected = chars.clone();
    expected.sort_unstable();
    assert_eq!(got, expected);
}

// Each client appends its own sequence of fresh ops, interleaved with the other clients
#[test]
fn concurrent_clients_keep_their_own_order() {
    let store = KvStore::new();
    crossbeam_utils::thread::scope(|s| {
        for i in 0..8 {
            let store = store.clone();
            s.spawn(move |_| {
                let client_id = format!("client-{}", i);
                let key = format!("key-{}", i);
                for op_id in 1..=100_u64 {
                    store.append(&client_id, op_id, &key, &format!("{},", op_id));
                    store.append(&client_id, op_id, &key, &format!("{},", op_id));
                }
            });
        }
    })
    .unwrap();

    let expected: String = (1..=100).map(|n| format!("{},", n)).collect();
    for i in 0..8 {
        assert_eq!(store.get("reader", 1, &format!("key-{}", i)), expected);
    }
}
