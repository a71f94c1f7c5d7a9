use crate::raw::Table;

/// Walks a table one shard at a time.
///
/// The entries of a shard are copied out while its read lock is held, and handed out after the
/// lock has been released. Entries inserted into a shard after it was copied are not seen, and
/// entries removed after it was copied are still yielded.
#[derive(Debug)]
pub(crate) struct ShardIter<'m, K, S> {
    table: &'m Table<K, S>,

    /// Index of the shard to copy next
    index: usize,

    /// What is left of the last shard copied
    buffer: std::vec::IntoIter<(K, i64)>,
}

impl<'m, K, S> ShardIter<'m, K, S> {
    pub(crate) fn new(table: &'m Table<K, S>) -> Self {
        Self {
            table,
            index: 0,
            buffer: Vec::new().into_iter(),
        }
    }
}

impl<'m, K, S> Iterator for ShardIter<'m, K, S>
where
    K: Clone,
{
    type Item = (K, i64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.buffer.next() {
                return Some(entry);
            }

            if self.index == self.table.len() {
                return None;
            }

            let cells = self.table.shard(self.index).read();
            self.index += 1;
            self.buffer = cells
                .iter()
                .map(|(key, cell)| (key.clone(), cell.load()))
                .collect::<Vec<_>>()
                .into_iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultHashBuilder;

    #[test]
    fn iter_empty() {
        let table = Table::<usize, _>::new(4, 0, &DefaultHashBuilder::default());
        assert_eq!(ShardIter::new(&table).count(), 0);
    }

    #[test]
    fn iter_skips_empty_shards() {
        let table = Table::<usize, _>::new(8, 0, &DefaultHashBuilder::default());
        table.shard(3).write().insert(1, crate::cell::Cell::new(10));
        table.shard(7).write().insert(2, crate::cell::Cell::new(20));

        let mut entries: Vec<_> = ShardIter::new(&table).collect();
        entries.sort_unstable();
        assert_eq!(entries, vec![(1, 10), (2, 20)]);
    }
}
