use crate::CounterMap;
use rayon::iter::{FromParallelIterator, IntoParallelIterator, ParallelExtend, ParallelIterator};
use std::hash::{BuildHasher, Hash};

impl<K, S> ParallelExtend<(K, i64)> for CounterMap<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: BuildHasher + Send + Sync,
{
    // This is of limited use due to the `&mut self` parameter. See the impl for `&CounterMap`.
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, i64)>,
    {
        (&*self).par_extend(par_iter);
    }
}

impl<K, S> ParallelExtend<(K, i64)> for &CounterMap<K, S>
where
    K: Hash + Eq + Send + Sync,
    S: BuildHasher + Send + Sync,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, i64)>,
    {
        let map: &CounterMap<K, S> = self;
        par_iter.into_par_iter().for_each(|(key, value)| {
            map.put(key, value);
        });
    }
}

impl<K> FromParallelIterator<(K, i64)> for CounterMap<K, crate::DefaultHashBuilder>
where
    K: Hash + Eq + Send + Sync,
{
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = (K, i64)>,
    {
        let mut created_map = CounterMap::new();
        created_map.par_extend(par_iter);
        created_map
    }
}

#[cfg(test)]
mod test {
    use crate::CounterMap;
    use rayon::iter::{
        FromParallelIterator, IntoParallelIterator, ParallelExtend, ParallelIterator,
    };

    #[test]
    fn parallel_extend_by_nothing() {
        let to_extend_with: Vec<(i32, i64)> = Vec::new();

        let mut map = CounterMap::new();
        map.put(1, 2);
        map.put(3, 4);

        map.par_extend(to_extend_with.into_par_iter());

        assert_eq!(map.len(), 2);

        assert_eq!(map.get(&1), 2);
        assert_eq!(map.get(&3), 4);
    }

    #[test]
    fn parallel_extend_by_a_bunch() {
        let mut to_extend_with = Vec::new();
        for i in 0..100 {
            to_extend_with.push((i + 100, i * 10));
        }

        let mut map = CounterMap::new();
        map.put(1, 2);
        map.put(3, 4);

        map.par_extend(to_extend_with.into_par_iter());
        assert_eq!(map.len(), 102);

        assert_eq!(map.get(&1), 2);
        assert_eq!(map.get(&3), 4);
        assert_eq!(map.get(&100), 0);
        assert!(map.contains_key(&100));
        assert_eq!(map.get(&199), 990);
    }

    #[test]
    fn parallel_extend_shared() {
        let map = CounterMap::new();
        (&map).par_extend((0..100i64).into_par_iter().map(|i| (i, i)));
        assert_eq!(map.len(), 100);
        assert_eq!(map.sum(), 4950);
    }

    #[test]
    fn from_empty_parallel_iter() {
        let to_create_from: Vec<(i32, i64)> = Vec::new();
        let created_map: CounterMap<i32> = CounterMap::from_par_iter(to_create_from.into_par_iter());
        assert_eq!(created_map.len(), 0);
    }

    #[test]
    fn from_large_parallel_iter() {
        let mut to_create_from: Vec<(i32, i64)> = Vec::new();
        for i in 0..100 {
            to_create_from.push((i + 100, i as i64 * 10));
        }
        let created_map: CounterMap<i32> = CounterMap::from_par_iter(to_create_from.into_par_iter());
        assert_eq!(created_map.len(), 100);

        assert_eq!(created_map.get(&100), 0);
        assert_eq!(created_map.get(&199), 990);
    }
}
