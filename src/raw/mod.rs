use crate::cell::Cell;
use parking_lot::RwLock;
use std::collections::HashMap;

const USIZE_BITS: usize = core::mem::size_of::<usize>() * 8;

/// The number of hash bits the inner maps reserve for their control bytes.
///
/// The inner `HashMap`s pick buckets from the low bits of a hash and tag each slot with its top
/// seven bits, so shards are chosen from the bits just below the tag. Otherwise every key within
/// a shard would share its bucket bits (or its tag) and the inner maps would degrade.
const TAG_BITS: usize = 7;

pub(crate) type Shard<K, S> = RwLock<HashMap<K, Cell, S>>;

#[derive(Debug)]
pub(crate) struct Table<K, S> {
    shards: Box<[Shard<K, S>]>,

    /// `USIZE_BITS - log2(shards.len())`
    shift: usize,
}

impl<K, S> Table<K, S> {
    /// Allocates `n` shards that together have room for `capacity` entries.
    ///
    /// `n` must be a power of two greater than one.
    pub(crate) fn new(n: usize, capacity: usize, hash_builder: &S) -> Self
    where
        S: Clone,
    {
        assert!(n.is_power_of_two() && n > 1);
        let per_shard = capacity / n + usize::from(capacity % n != 0);
        let shards: Vec<_> = (0..n)
            .map(|_| {
                RwLock::new(HashMap::with_capacity_and_hasher(
                    per_shard,
                    hash_builder.clone(),
                ))
            })
            .collect();

        log::trace!("allocated counter table with {} shards", n);
        Self {
            shards: shards.into_boxed_slice(),
            shift: USIZE_BITS - n.trailing_zeros() as usize,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    pub(crate) fn shards(&self) -> &[Shard<K, S>] {
        &self.shards
    }

    #[inline]
    pub(crate) fn shard(&self, i: usize) -> &Shard<K, S> {
        &self.shards[i]
    }

    #[inline]
    pub(crate) fn shardi(&self, hash: u64) -> usize {
        ((hash as usize) << TAG_BITS) >> self.shift
    }
}
