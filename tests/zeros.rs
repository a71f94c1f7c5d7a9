use countermap::CounterMap;
use std::collections::HashSet;

const ITERATIONS: usize = 100;

/// A key type with identity semantics, like a freshly allocated object.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
struct Token(usize);

#[test]
fn remove_all_zeros() {
    let map = CounterMap::new();
    let mut non_zero_keys = HashSet::new();
    for i in 0..ITERATIONS {
        let key = Token(i);
        let value = (i % 2) as i64;
        map.put(key, value);
        if value != 0 {
            non_zero_keys.insert(key);
        }
    }
    assert_eq!(map.len(), ITERATIONS);
    assert!(map.as_map().values().any(|&v| v == 0));

    map.remove_all_zeros();
    assert!(!map.as_map().values().any(|&v| v == 0));
    assert_eq!(map.len(), ITERATIONS / 2);
    assert_eq!(map.keys().collect::<HashSet<_>>(), non_zero_keys);
    for key in &non_zero_keys {
        assert_eq!(map.get(key), 1);
    }
}

#[test]
fn remove_all_zeros_empty() {
    let map = CounterMap::<Token>::new();
    map.remove_all_zeros();
    assert_eq!(map.len(), 0);
}

#[test]
fn remove_all_zeros_only_zero() {
    let map = CounterMap::new();
    let key = Token(0);
    for _ in 0..ITERATIONS {
        map.put(key, 0);
    }
    assert_eq!(map.len(), 1);

    map.remove_all_zeros();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
}

#[test]
fn remove_all_zeros_keeps_negative() {
    let map = CounterMap::new();
    map.put(Token(0), -1);
    map.put(Token(1), 0);
    map.put(Token(2), i64::MIN);

    map.remove_all_zeros();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&Token(0)), -1);
    assert_eq!(map.get(&Token(2)), i64::MIN);
}

#[test]
fn remove_all_zeros_after_arithmetic() {
    let map = CounterMap::new();
    for i in 0..ITERATIONS {
        map.add_and_get(Token(i), i as i64);
        map.add_and_get(Token(i), -(i as i64));
    }
    // driving a counter to zero does not remove it
    assert_eq!(map.len(), ITERATIONS);
    assert_eq!(map.sum(), 0);

    map.remove_all_zeros();
    assert!(map.is_empty());
}

#[test]
fn snapshot_round_trip() {
    let map = CounterMap::new();
    for i in 0..ITERATIONS {
        map.put(Token(i), (i % 3) as i64 - 1);
    }

    let snapshot = map.as_map();
    let rebuilt: CounterMap<Token> = snapshot.clone().into_iter().collect();
    assert_eq!(rebuilt.as_map(), snapshot);
    assert_eq!(rebuilt, map);
}
