use std::sync::atomic::{AtomicI64, Ordering};

/// The atomic storage behind a single counter.
///
/// A `Cell` is only ever reached through the shard that owns it, and every mutation happens while
/// that shard is at least read-locked. This is what lets removal (which takes the write lock)
/// decide on a cell's value without racing against a concurrent update.
#[derive(Debug, Default)]
pub(crate) struct Cell(AtomicI64);

impl Cell {
    pub(crate) fn new(value: i64) -> Self {
        Self(AtomicI64::new(value))
    }

    #[inline]
    pub(crate) fn load(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn swap(&self, value: i64) -> i64 {
        self.0.swap(value, Ordering::SeqCst)
    }

    /// Adds `delta`, wrapping on overflow, and returns the previous value.
    #[inline]
    pub(crate) fn fetch_add(&self, delta: i64) -> i64 {
        self.0.fetch_add(delta, Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn compare_exchange(&self, current: i64, new: i64) -> Result<i64, i64> {
        self.0
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
    }

    /// Applies `f` until it is stored without interference and returns `(old, new)`.
    ///
    /// `f` may run several times if other threads update the cell concurrently.
    pub(crate) fn update<F>(&self, mut f: F) -> (i64, i64)
    where
        F: FnMut(i64) -> i64,
    {
        let mut current = self.load();
        loop {
            let new = f(current);
            match self.compare_exchange(current, new) {
                Ok(_) => break (current, new),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Clone for Cell {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::Cell;

    #[test]
    fn fetch_add_wraps() {
        let cell = Cell::new(i64::MAX);
        assert_eq!(cell.fetch_add(1), i64::MAX);
        assert_eq!(cell.load(), i64::MIN);
    }

    #[test]
    fn compare_exchange_mismatch() {
        let cell = Cell::new(3);
        assert_eq!(cell.compare_exchange(4, 5), Err(3));
        assert_eq!(cell.compare_exchange(3, 5), Ok(3));
        assert_eq!(cell.load(), 5);
    }

    #[test]
    fn update_returns_both() {
        let cell = Cell::new(6);
        assert_eq!(cell.update(|v| v * 7), (6, 42));
        assert_eq!(cell.swap(0), 42);
    }

    #[test]
    fn update_concurrent() {
        let cell = std::sync::Arc::new(Cell::default());
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let cell = cell.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        cell.update(|v| v + 2);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(cell.load(), 8000);
    }
}
