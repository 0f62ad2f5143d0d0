use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use stash_cache::{BackendKind, Cache, CacheError, ConnectionOptions};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Object {
    key: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    id: u64,
    score: i32,
    label: String,
    tags: Vec<String>,
    inner: Object,
    attrs: BTreeMap<String, bool>,
}

fn local_cache() -> Cache {
    stash_common_log::init_for_tests();
    Cache::open("local", &ConnectionOptions::default()).unwrap()
}

#[test]
fn test_store_then_load_scenario() {
    let cache = local_cache();

    cache
        .store(
            "example",
            &Object {
                key: "case1".to_string(),
                value: "any string".to_string(),
            },
        )
        .unwrap();

    let mut result = Object::default();
    cache.load("example", &mut result).unwrap();

    assert_eq!(result.key, "case1");
    assert_eq!(result.value, "any string");
}

#[test]
fn test_load_missing_key_is_silent() {
    let cache = local_cache();
    let mut result = Object {
        key: "preset".to_string(),
        value: "kept".to_string(),
    };

    cache.load("never-written", &mut result).unwrap();

    assert_eq!(result.key, "preset");
    assert_eq!(result.value, "kept");
    assert_eq!(cache.get::<Object>("never-written").unwrap(), None);
}

#[test]
fn test_unknown_kind_is_rejected() {
    let result = Cache::open("bogus", &ConnectionOptions::default());
    match result {
        Err(CacheError::UnsupportedBackendKind(kind)) => assert_eq!(kind, "bogus"),
        other => panic!("expected UnsupportedBackendKind, got {other:?}"),
    }
}

#[test]
fn test_load_into_wrong_shape_fails() {
    let cache = local_cache();
    cache.store("n", &vec![1u8, 2, 3]).unwrap();

    let mut result = Object::default();
    let err = cache.load("n", &mut result).unwrap_err();

    assert!(matches!(err, CacheError::Decoding(_)));
    assert_eq!(result, Object::default());
}

#[test]
fn test_concurrent_stores_to_distinct_keys() {
    const WRITERS: usize = 16;
    const KEYS_PER_WRITER: usize = 64;

    let cache = local_cache();

    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..KEYS_PER_WRITER {
                    let key = format!("writer-{writer}-key-{i}");
                    let value = Object {
                        key: key.clone(),
                        value: format!("{}", writer * KEYS_PER_WRITER + i),
                    };
                    cache.store(&key, &value).unwrap();
                }
            });
        }
    });

    for writer in 0..WRITERS {
        for i in 0..KEYS_PER_WRITER {
            let key = format!("writer-{writer}-key-{i}");
            let mut result = Object::default();
            cache.load(&key, &mut result).unwrap();
            assert_eq!(result.key, key);
            assert_eq!(result.value, format!("{}", writer * KEYS_PER_WRITER + i));
        }
    }
}

#[test]
fn test_concurrent_stores_to_same_key_leave_one_writer() {
    let cache = local_cache();

    std::thread::scope(|scope| {
        for writer in 0..8u32 {
            let cache = &cache;
            scope.spawn(move || cache.store("contended", &writer).unwrap());
        }
    });

    let winner: u32 = cache.get("contended").unwrap().unwrap();
    assert!(winner < 8);
}

#[test]
fn test_from_config_builds_local() {
    let cache = Cache::from_config(&stash_cache::CacheConfig::default()).unwrap();
    assert_eq!(cache.kind(), BackendKind::Local);
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        any::<i32>(),
        ".*",
        prop::collection::vec("[a-z]{0,8}", 0..6),
        ("[a-z0-9]{0,12}", ".*"),
        prop::collection::btree_map("[a-z]{1,6}", any::<bool>(), 0..4),
    )
        .prop_map(|(id, score, label, tags, (key, value), attrs)| Record {
            id,
            score,
            label,
            tags,
            inner: Object { key, value },
            attrs,
        })
}

proptest! {
    #[test]
    fn prop_local_store_load_roundtrip(record in record_strategy()) {
        let cache = Cache::new(BackendKind::Local, &ConnectionOptions::default()).unwrap();
        cache.store("k", &record).unwrap();

        let mut out = Record {
            id: 0,
            score: 0,
            label: String::new(),
            tags: Vec::new(),
            inner: Object::default(),
            attrs: BTreeMap::new(),
        };
        cache.load("k", &mut out).unwrap();
        prop_assert_eq!(out, record);
    }
}
