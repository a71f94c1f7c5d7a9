//! A concurrent map from keys to atomically updated `i64` counters.
//!
//! [`CounterMap`] is meant for the common "count things from many threads" pattern: request
//! counters keyed by route, reference counts keyed by id, histograms keyed by bucket. Every
//! counter can be read, added to, compared-and-set and removed atomically, and operations on
//! different keys do not serialize behind a single lock.
//!
//! ```
//! use countermap::CounterMap;
//! use std::sync::Arc;
//!
//! let hits = Arc::new(CounterMap::<&str>::new());
//! let threads: Vec<_> = (0..4)
//!     .map(|_| {
//!         let hits = Arc::clone(&hits);
//!         std::thread::spawn(move || {
//!             for _ in 0..100 {
//!                 hits.increment_and_get("/index.html");
//!             }
//!         })
//!     })
//!     .collect();
//! for t in threads {
//!     t.join().unwrap();
//! }
//! assert_eq!(hits.get("/index.html"), 400);
//! ```
//!
//! # Missing keys and zero
//!
//! A key that is not in the map reads as `0`, and reading never inserts anything. Writing to a
//! key creates its counter, and that counter stays in the map even once it is driven back to
//! zero: [`CounterMap::contains_key`] tells a zero counter apart from a missing one. Counters are
//! only removed explicitly, with [`CounterMap::remove`], [`CounterMap::remove_value`],
//! [`CounterMap::remove_if_zero`], [`CounterMap::remove_all_zeros`], [`CounterMap::retain`] or
//! [`CounterMap::clear`].
//!
//! Comparisons against `0` treat a missing counter as zero where that creates something
//! ([`CounterMap::replace`], [`CounterMap::put_if_absent`]), but never where it would remove
//! something: `remove_value(&key, 0)` on a missing key returns `false`.
//!
//! # Consistency
//!
//! Operations on a single key are linearizable. In particular, removing a counter because it is
//! zero never races with an increment of that counter: either the increment happens first and
//! the counter is kept, or the removal happens first and the increment recreates the counter.
//! No update is ever lost.
//!
//! Operations that look at the whole map ([`CounterMap::len`], [`CounterMap::is_empty`],
//! [`CounterMap::sum`], [`CounterMap::as_map`], iteration, [`CounterMap::remove_all_zeros`] and
//! [`CounterMap::clear`]) visit the map one shard at a time. They reflect every change that
//! finished before they started, but changes that happen concurrently may or may not be seen.
//!
//! # Implementation notes
//!
//! The map is split into a fixed number of shards, chosen from the number of CPUs on the machine.
//! Each shard is a regular [`std::collections::HashMap`] from key to an atomic cell, guarded by a
//! reader-writer lock. Updating an existing counter only takes the read lock of its shard and then
//! uses atomic instructions on the cell, so many threads may update counters in the same shard at
//! once. Creating or removing a counter takes the write lock of its shard. Since every update
//! holds the read lock, a removal can inspect a counter's value knowing that nobody is changing
//! it.
//!
//! Functions passed to [`CounterMap::update_and_get`] and friends, and to [`CounterMap::retain`],
//! run while a shard lock is held. They should be short, and must not call back into the same map.
//!
//! # Features
//!
//! - `serde`: implements `Serialize` and `Deserialize` for [`CounterMap`], as a map from key to
//!   `i64`.
//! - `rayon`: implements `ParallelExtend` and `FromParallelIterator` for [`CounterMap`].
#![deny(
    missing_docs,
    missing_debug_implementations,
    unreachable_pub,
    rustdoc::broken_intra_doc_links
)]
#![warn(rust_2018_idioms)]

mod cell;
mod map;
mod raw;

#[cfg(feature = "rayon")]
mod rayon_impls;

#[cfg(feature = "serde")]
mod serde_impls;

/// Iterator types.
pub mod iter;

pub use map::{CounterMap, TryInsertError};

/// Default hasher for [`CounterMap`].
pub type DefaultHashBuilder = ahash::RandomState;
