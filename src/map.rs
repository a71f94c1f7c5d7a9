use crate::cell::Cell;
use crate::iter::*;
use crate::raw::*;
use parking_lot::RwLockUpgradableReadGuard;
use std::borrow::Borrow;
use std::collections::hash_map::{self, HashMap};
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FromIterator;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};

/// The number of shards allocated per physical CPU.
///
/// More shards lower the chance that two threads creating or removing distinct keys contend on
/// the same lock, at the cost of a slightly more expensive [`CounterMap::len`].
const SHARDS_PER_CPU: usize = 4;

static NCPU_INITIALIZER: Once = Once::new();
static NCPU: AtomicUsize = AtomicUsize::new(0);

/// A concurrent map from keys to `i64` counters.
///
/// A key that has no entry reads as `0`. Entries are created by the first write to a key, and
/// only ever disappear through an explicit removal: [`remove`](CounterMap::remove),
/// [`remove_value`](CounterMap::remove_value), [`remove_if_zero`](CounterMap::remove_if_zero),
/// [`remove_all_zeros`](CounterMap::remove_all_zeros), [`retain`](CounterMap::retain) or
/// [`clear`](CounterMap::clear). In particular, a counter that is driven to zero stays in the map
/// until it is removed.
///
/// All operations on a single key are linearizable. Aggregate operations
/// ([`len`](CounterMap::len), [`sum`](CounterMap::sum), [`as_map`](CounterMap::as_map), iteration)
/// visit the map one shard at a time and are only weakly consistent. For more information, see
/// the [notes in the crate-level documentation].
///
/// [notes in the crate-level documentation]: index.html#consistency
pub struct CounterMap<K, S = crate::DefaultHashBuilder> {
    table: Table<K, S>,
    build_hasher: S,
}

/// The error type for the [`CounterMap::try_insert`] method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TryInsertError {
    /// The current value of the counter.
    pub current: i64,
    /// The value that [`CounterMap::try_insert`] failed to insert.
    pub not_inserted: i64,
}

impl Display for TryInsertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Insert of \"{}\" failed as key was already present with value \"{}\"",
            self.not_inserted, self.current
        )
    }
}

impl Error for TryInsertError {
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl<K> CounterMap<K, crate::DefaultHashBuilder> {
    /// Creates an empty `CounterMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    /// let map: CounterMap<&str> = CounterMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `CounterMap` with room for at least `capacity` counters.
    ///
    /// The room is divided evenly between the map's shards, so a skewed key distribution may
    /// still cause some shards to grow before `capacity` is reached.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, crate::DefaultHashBuilder::default())
    }
}

impl<K, S> Default for CounterMap<K, S>
where
    S: Default + Clone,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S> CounterMap<K, S>
where
    S: Clone,
{
    /// Creates an empty map which will use `hash_builder` to hash keys.
    ///
    /// Warning: `hash_builder` is normally randomly generated, and is designed to
    /// allow the map to be resistant to attacks that cause many collisions and
    /// very poor performance. Setting it manually using this
    /// function can expose a DoS attack vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::{CounterMap, DefaultHashBuilder};
    ///
    /// let map = CounterMap::with_hasher(DefaultHashBuilder::default());
    /// map.increment_and_get(1);
    /// assert_eq!(map.get(&1), 1);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty map with room for at least `capacity` counters, using `hash_builder` to
    /// hash the keys.
    ///
    /// If `capacity` is 0, the call will not allocate any counter storage.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: Table::new(shard_amount(), capacity, &hash_builder),
            build_hasher: hash_builder,
        }
    }
}

impl<K, S> CounterMap<K, S> {
    /// Returns the number of counters in the map, including those that are zero.
    ///
    /// Each shard is counted under its own lock, so concurrent insertions and removals may or may
    /// not be reflected in the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.put("a", 1);
    /// map.put("b", 0);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.table.shards().iter().map(|shard| shard.read().len()).sum()
    }

    /// Returns `true` if the map holds no counters. Otherwise returns `false`.
    pub fn is_empty(&self) -> bool {
        self.table.shards().iter().all(|shard| shard.read().is_empty())
    }

    /// Returns the sum of all counters in the map, wrapping on overflow.
    ///
    /// Every counter is read atomically, but the map as a whole is not: updates that happen while
    /// the sum is being computed may or may not be included.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.add_and_get("a", 40);
    /// map.add_and_get("b", 2);
    /// assert_eq!(map.sum(), 42);
    /// ```
    pub fn sum(&self) -> i64 {
        let mut sum = 0i64;
        self.for_each_entry(|_, value| sum = sum.wrapping_add(value));
        sum
    }

    /// An iterator visiting all key-value pairs in arbitrary order.
    ///
    /// The iterator copies out one shard at a time and does not hold any lock between calls to
    /// `next`. The iterator element type is `(K, i64)`.
    pub fn iter(&self) -> Iter<'_, K, S>
    where
        K: Clone,
    {
        Iter {
            shards: ShardIter::new(&self.table),
        }
    }

    /// An iterator visiting all keys in arbitrary order.
    ///
    /// The iterator element type is `K`.
    pub fn keys(&self) -> Keys<'_, K, S>
    where
        K: Clone,
    {
        Keys {
            shards: ShardIter::new(&self.table),
        }
    }

    /// Copies the current contents of the map into a [`std::collections::HashMap`].
    ///
    /// Counters that are present but zero are included.
    pub fn as_map(&self) -> HashMap<K, i64, S>
    where
        K: Clone + Hash + Eq,
        S: BuildHasher + Clone,
    {
        let mut snapshot = HashMap::with_hasher(self.build_hasher.clone());
        self.for_each_entry(|key, value| {
            snapshot.insert(key.clone(), value);
        });
        snapshot
    }

    /// Removes all counters from the map.
    ///
    /// Shards are cleared one after the other, so counters inserted concurrently may survive.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.put(1, 5);
    /// map.put(2, 0);
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&self) {
        let mut removed = 0;
        for shard in self.table.shards() {
            let mut cells = shard.write();
            removed += cells.len();
            cells.clear();
        }
        log::trace!("cleared {} counters", removed);
    }

    /// Calls `f` on every entry while holding the entry's shard lock.
    ///
    /// `f` must not block or access any `CounterMap`. Anything else should go through
    /// [`CounterMap::iter`], which releases each lock before yielding.
    fn for_each_entry<F>(&self, mut f: F)
    where
        F: FnMut(&K, i64),
    {
        for shard in self.table.shards() {
            let cells = shard.read();
            for (key, cell) in cells.iter() {
                f(key, cell.load());
            }
        }
    }
}

impl<K, S> CounterMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        let mut h = self.build_hasher.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    fn shard<Q: ?Sized + Hash>(&self, key: &Q) -> &Shard<K, S> {
        self.table.shard(self.table.shardi(self.hash(key)))
    }

    /// Runs `f` against the cell for `key`, creating it at zero first if it is absent.
    ///
    /// `f` runs while the cell's shard is locked, and must not access the map.
    fn with_cell<F, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(&Cell) -> R,
    {
        let shard = self.shard(&key);
        {
            let cells = shard.read();
            if let Some(cell) = cells.get(&key) {
                return f(cell);
            }
        }

        // the key was absent when we looked. another thread may create it before we get the write
        // lock, in which case we operate on their cell instead.
        let mut cells = shard.write();
        let cell: &Cell = cells.entry(key).or_default();
        f(cell)
    }

    /// Returns the value of the counter for `key`, or 0 if there is none.
    ///
    /// Reading a key never creates an entry for it.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`] and [`Eq`] on the
    /// borrowed form *must* match those for the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::<String>::new();
    /// assert_eq!(map.get("a"), 0);
    /// assert!(!map.contains_key("a"));
    /// map.put("a".to_string(), 3);
    /// assert_eq!(map.get("a"), 3);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> i64
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).read().get(key).map_or(0, Cell::load)
    }

    /// Returns `true` if the map holds a counter for `key`, even if that counter is zero.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`] and [`Eq`] on the
    /// borrowed form *must* match those for the key type.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).read().contains_key(key)
    }

    /// Sets the counter for `key` to `value` and returns its previous value.
    ///
    /// Returns 0 if there was no counter for `key`. The counter is kept even if `value` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// assert_eq!(map.put(37, 1), 0);
    /// assert_eq!(map.put(37, 0), 1);
    /// assert!(map.contains_key(&37));
    /// ```
    pub fn put(&self, key: K, value: i64) -> i64 {
        self.with_cell(key, |cell| cell.swap(value))
    }

    /// Sets each counter yielded by `iter` as if by [`CounterMap::put`].
    ///
    /// Every individual `put` is atomic, the batch as a whole is not.
    pub fn put_all<I>(&self, iter: I)
    where
        I: IntoIterator<Item = (K, i64)>,
    {
        for (key, value) in iter {
            self.put(key, value);
        }
    }

    /// Returns `None` if `value` was stored, or the counter's current value if it was not.
    fn put_if_absent_internal(&self, key: K, value: i64) -> Option<i64> {
        // a counter at zero is indistinguishable from a missing one, so it is taken over too
        let take_over = |cell: &Cell| match cell.compare_exchange(0, value) {
            Ok(_) => None,
            Err(current) => Some(current),
        };

        let shard = self.shard(&key);
        {
            let cells = shard.read();
            if let Some(cell) = cells.get(&key) {
                return take_over(cell);
            }
        }

        let mut cells = shard.write();
        match cells.entry(key) {
            hash_map::Entry::Occupied(e) => take_over(e.get()),
            hash_map::Entry::Vacant(e) => {
                e.insert(Cell::new(value));
                None
            }
        }
    }

    /// Sets the counter for `key` to `value` if it is absent or zero.
    ///
    /// Returns the counter's value before the call, which is 0 exactly when `value` was stored.
    /// If several threads race to initialize the same key, exactly one of them stores its value,
    /// and the others observe it.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// assert_eq!(map.put_if_absent("a", 7), 0);
    /// assert_eq!(map.put_if_absent("a", 9), 7);
    /// assert_eq!(map.get("a"), 7);
    /// ```
    pub fn put_if_absent(&self, key: K, value: i64) -> i64 {
        self.put_if_absent_internal(key, value).unwrap_or(0)
    }

    /// Inserts a counter for `key` with `value` if there is no nonzero counter for it yet.
    ///
    /// Behaves like [`CounterMap::put_if_absent`], but reports an existing nonzero counter as an
    /// error.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// assert!(map.try_insert(37, 1).is_ok());
    ///
    /// let err = map.try_insert(37, 2).unwrap_err();
    /// assert_eq!(err.current, 1);
    /// assert_eq!(err.not_inserted, 2);
    /// ```
    pub fn try_insert(&self, key: K, value: i64) -> Result<(), TryInsertError> {
        match self.put_if_absent_internal(key, value) {
            None => Ok(()),
            Some(current) => Err(TryInsertError {
                current,
                not_inserted: value,
            }),
        }
    }

    /// Adds one to the counter for `key` and returns the new value.
    pub fn increment_and_get(&self, key: K) -> i64 {
        self.add_and_get(key, 1)
    }

    /// Subtracts one from the counter for `key` and returns the new value.
    pub fn decrement_and_get(&self, key: K) -> i64 {
        self.add_and_get(key, -1)
    }

    /// Adds one to the counter for `key` and returns the old value.
    pub fn get_and_increment(&self, key: K) -> i64 {
        self.get_and_add(key, 1)
    }

    /// Subtracts one from the counter for `key` and returns the old value.
    pub fn get_and_decrement(&self, key: K) -> i64 {
        self.get_and_add(key, -1)
    }

    /// Adds `delta` to the counter for `key` and returns the new value.
    ///
    /// A missing counter is created at zero first. The addition wraps on overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// assert_eq!(map.add_and_get("a", 5), 5);
    /// assert_eq!(map.add_and_get("a", -5), 0);
    /// assert!(map.contains_key("a"));
    /// ```
    pub fn add_and_get(&self, key: K, delta: i64) -> i64 {
        self.get_and_add(key, delta).wrapping_add(delta)
    }

    /// Adds `delta` to the counter for `key` and returns the old value.
    ///
    /// A missing counter is created at zero first. The addition wraps on overflow.
    pub fn get_and_add(&self, key: K, delta: i64) -> i64 {
        self.with_cell(key, |cell| cell.fetch_add(delta))
    }

    /// Replaces the counter for `key` with the result of `updater` and returns the new value.
    ///
    /// `updater` is given the current value (0 for a missing counter). It may be called more than
    /// once if the counter is modified concurrently, so it should be free of side effects. It runs
    /// while the counter's shard is locked, and must not access this map.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.put("a", 21);
    /// assert_eq!(map.update_and_get("a", |v| v * 2), 42);
    /// ```
    pub fn update_and_get<F>(&self, key: K, updater: F) -> i64
    where
        F: FnMut(i64) -> i64,
    {
        self.with_cell(key, |cell| cell.update(updater)).1
    }

    /// Replaces the counter for `key` with the result of `updater` and returns the old value.
    ///
    /// See [`CounterMap::update_and_get`] for the requirements on `updater`.
    pub fn get_and_update<F>(&self, key: K, updater: F) -> i64
    where
        F: FnMut(i64) -> i64,
    {
        self.with_cell(key, |cell| cell.update(updater)).0
    }

    /// Combines the counter for `key` with `x` using `accumulator` and returns the new value.
    ///
    /// `accumulator` is called as `accumulator(current, x)`. See [`CounterMap::update_and_get`]
    /// for the requirements on it.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.put("max", 3);
    /// assert_eq!(map.accumulate_and_get("max", 10, i64::max), 10);
    /// assert_eq!(map.accumulate_and_get("max", 4, i64::max), 10);
    /// ```
    pub fn accumulate_and_get<F>(&self, key: K, x: i64, mut accumulator: F) -> i64
    where
        F: FnMut(i64, i64) -> i64,
    {
        self.update_and_get(key, |current| accumulator(current, x))
    }

    /// Combines the counter for `key` with `x` using `accumulator` and returns the old value.
    ///
    /// See [`CounterMap::accumulate_and_get`].
    pub fn get_and_accumulate<F>(&self, key: K, x: i64, mut accumulator: F) -> i64
    where
        F: FnMut(i64, i64) -> i64,
    {
        self.get_and_update(key, |current| accumulator(current, x))
    }

    /// Sets the counter for `key` to `new` if it currently holds `expected`.
    ///
    /// Returns whether the counter was changed. A missing counter holds 0 for the purpose of this
    /// comparison, so `replace(key, 0, new)` on a missing key inserts a counter with `new`.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// assert!(!map.replace("a", 1, 2));
    /// assert!(map.replace("a", 0, 2));
    /// assert!(map.replace("a", 2, 0));
    /// assert!(map.contains_key("a"));
    /// ```
    pub fn replace(&self, key: K, expected: i64, new: i64) -> bool {
        let shard = self.shard(&key);
        {
            let cells = shard.read();
            if let Some(cell) = cells.get(&key) {
                return cell.compare_exchange(expected, new).is_ok();
            }
        }
        if expected != 0 {
            return false;
        }

        let mut cells = shard.write();
        match cells.entry(key) {
            hash_map::Entry::Occupied(e) => e.get().compare_exchange(expected, new).is_ok(),
            hash_map::Entry::Vacant(e) => {
                e.insert(Cell::new(new));
                true
            }
        }
    }

    /// Removes the counter for `key` and returns its value, or 0 if there was none.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`] and [`Eq`] on the
    /// borrowed form *must* match those for the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.put(1, 10);
    /// assert_eq!(map.remove(&1), 10);
    /// assert_eq!(map.remove(&1), 0);
    /// ```
    pub fn remove<Q>(&self, key: &Q) -> i64
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key)
            .write()
            .remove(key)
            .map_or(0, |cell| cell.load())
    }

    /// Removes the counter for `key` if it currently holds `expected`.
    ///
    /// Returns whether a counter was removed. A missing key is never removed, even when `expected`
    /// is 0.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`] and [`Eq`] on the
    /// borrowed form *must* match those for the key type.
    pub fn remove_value<Q>(&self, key: &Q, expected: i64) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let shard = self.shard(key);
        if shard.read().get(key).map_or(true, |cell| cell.load() != expected) {
            return false;
        }

        // writers of this counter hold the read lock, so its value cannot change under us.
        let mut cells = shard.write();
        if cells.get(key).map_or(false, |cell| cell.load() == expected) {
            cells.remove(key);
            true
        } else {
            false
        }
    }

    /// Removes the counter for `key` if it is currently zero.
    ///
    /// A concurrent update that moves the counter away from zero before the removal takes effect
    /// keeps the counter in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    /// map.increment_and_get("a");
    /// assert!(!map.remove_if_zero("a"));
    /// map.decrement_and_get("a");
    /// assert!(map.remove_if_zero("a"));
    /// assert!(!map.contains_key("a"));
    /// ```
    pub fn remove_if_zero<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_value(key, 0)
    }

    /// Removes every counter that is zero.
    ///
    /// Each counter is only removed if it is still zero at the moment of its removal. A counter
    /// that is concurrently moved away from zero survives. Counters inserted while the map is
    /// being scanned may or may not be visited.
    pub fn remove_all_zeros(&self) {
        let removed = self.retain_internal(|_, value| value != 0);
        log::trace!("removed {} zero counters", removed);
    }

    /// Retains only the counters specified by the predicate.
    ///
    /// In other words, remove all counters for which `f(&key, value)` returns `false`. The
    /// decision to remove a counter is made on its value at the moment of removal, so a counter
    /// that is concurrently modified is judged by its new value.
    ///
    /// `f` runs while a shard is locked, and must not access this map. Every counter is first
    /// checked under a lock that still admits updates, and the counters of a shard that holds
    /// anything to remove are checked again once updates are locked out. `f` may therefore be
    /// called more than once for the same counter, possibly with different values, and should be
    /// free of side effects.
    ///
    /// # Examples
    ///
    /// ```
    /// use countermap::CounterMap;
    ///
    /// let map = CounterMap::new();
    ///
    /// for i in 0..8 {
    ///     map.put(i, i * 10);
    /// }
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, i64) -> bool,
    {
        let removed = self.retain_internal(f);
        log::trace!("retain removed {} counters", removed);
    }

    fn retain_internal<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&K, i64) -> bool,
    {
        let mut removed = 0;
        for shard in self.table.shards() {
            // upgradable reads coexist with the read locks held by counter updates.
            let cells = shard.upgradable_read();
            if cells.iter().all(|(key, cell)| f(key, cell.load())) {
                continue;
            }

            let mut cells = RwLockUpgradableReadGuard::upgrade(cells);
            let before = cells.len();
            cells.retain(|key, cell| f(key, cell.load()));
            removed += before - cells.len();
        }
        removed
    }
}

impl<K, S> PartialEq for CounterMap<K, S>
where
    K: Clone + Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }

        // never look up `other` while a shard of `self` is locked
        self.iter().all(|(key, value)| {
            other.shard(&key).read().get(&key).map(Cell::load) == Some(value)
        })
    }
}

impl<K, S> Eq for CounterMap<K, S>
where
    K: Clone + Hash + Eq,
    S: BuildHasher,
{
}

impl<K, S> fmt::Debug for CounterMap<K, S>
where
    K: Clone + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, S> Extend<(K, i64)> for &CounterMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, i64)>>(&mut self, iter: T) {
        (*self).put_all(iter);
    }
}

impl<K, S> Extend<(K, i64)> for CounterMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, i64)>>(&mut self, iter: T) {
        self.put_all(iter);
    }
}

impl<'a, K, S> Extend<(&'a K, &'a i64)> for &CounterMap<K, S>
where
    K: Copy + Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (&'a K, &'a i64)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K, S> FromIterator<(K, i64)> for CounterMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let map = Self::with_capacity_and_hasher(lower, S::default());
        map.put_all(iter);
        map
    }
}

impl<'a, K, S> FromIterator<(&'a K, &'a i64)> for CounterMap<K, S>
where
    K: Copy + Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<T: IntoIterator<Item = (&'a K, &'a i64)>>(iter: T) -> Self {
        Self::from_iter(iter.into_iter().map(|(&k, &v)| (k, v)))
    }
}

impl<K, S> Clone for CounterMap<K, S>
where
    K: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> CounterMap<K, S> {
        let cloned_map = Self::with_capacity_and_hasher(self.len(), self.build_hasher.clone());
        cloned_map.put_all(self.iter());
        cloned_map
    }
}

/// Returns the number of shards to give each new table.
#[inline]
fn shard_amount() -> usize {
    (num_cpus() * SHARDS_PER_CPU).next_power_of_two().max(2)
}

#[cfg(not(miri))]
#[inline]
/// Returns the number of physical CPUs in the machine (_O(1)_).
fn num_cpus() -> usize {
    NCPU_INITIALIZER.call_once(|| NCPU.store(num_cpus::get_physical(), Ordering::Relaxed));
    NCPU.load(Ordering::Relaxed)
}

#[cfg(miri)]
#[inline]
const fn num_cpus() -> usize {
    1
}
