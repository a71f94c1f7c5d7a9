use countermap::{CounterMap, DefaultHashBuilder};
use std::hash::{BuildHasher, BuildHasherDefault, Hasher};

#[derive(Default)]
pub struct ZeroHasher;

#[derive(Clone, Default)]
pub struct ZeroHashBuilder;

impl Hasher for ZeroHasher {
    fn finish(&self) -> u64 {
        0
    }
    fn write(&mut self, _: &[u8]) {}
}

impl BuildHasher for ZeroHashBuilder {
    type Hasher = ZeroHasher;

    fn build_hasher(&self) -> ZeroHasher {
        ZeroHasher
    }
}

#[allow(dead_code)]
fn check<S: BuildHasher + Clone + Default>() {
    let range = if cfg!(miri) { 0..16 } else { 0..1000 };
    let map = CounterMap::<i32, S>::default();
    for i in range.clone() {
        map.put(i, i as i64);
    }

    assert!(!map.contains_key(&i32::min_value()));
    assert!(!map.contains_key(&(range.start - 1)));
    for i in range.clone() {
        assert!(map.contains_key(&i));
        assert_eq!(map.get(&i), i as i64);
    }
    assert!(!map.contains_key(&range.end));
    assert!(!map.contains_key(&i32::max_value()));

    for i in range.clone() {
        if i % 2 == 0 {
            map.put(i, 0);
        }
    }
    map.remove_all_zeros();
    assert_eq!(map.len(), range.len() / 2);
    for i in range.clone() {
        assert_eq!(map.contains_key(&i), i % 2 == 1);
    }
}

#[test]
fn test_default_hasher() {
    check::<DefaultHashBuilder>();
}

#[test]
fn test_zero_hasher() {
    check::<BuildHasherDefault<ZeroHasher>>();
}

#[test]
fn test_max_hasher() {
    #[derive(Default)]
    struct MaxHasher;

    impl Hasher for MaxHasher {
        fn finish(&self) -> u64 {
            u64::max_value()
        }
        fn write(&mut self, _: &[u8]) {}
    }

    check::<BuildHasherDefault<MaxHasher>>();
}
