mod traverser;
pub(crate) use traverser::ShardIter;

/// An iterator over a map's counters.
///
/// See [`CounterMap::iter`](crate::CounterMap::iter) for details.
#[derive(Debug)]
pub struct Iter<'m, K, S> {
    pub(crate) shards: ShardIter<'m, K, S>,
}

impl<'m, K, S> Iterator for Iter<'m, K, S>
where
    K: Clone,
{
    type Item = (K, i64);
    fn next(&mut self) -> Option<Self::Item> {
        self.shards.next()
    }
}

/// An iterator over a map's keys.
///
/// See [`CounterMap::keys`](crate::CounterMap::keys) for details.
#[derive(Debug)]
pub struct Keys<'m, K, S> {
    pub(crate) shards: ShardIter<'m, K, S>,
}

impl<'m, K, S> Iterator for Keys<'m, K, S>
where
    K: Clone,
{
    type Item = K;
    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = self.shards.next()?;
        Some(key)
    }
}
