//! Lossy transposition cache for tree statistics.
//!
//! One entry per bucket, indexed by `hash % size`. A store simply replaces
//! whatever the bucket held, so colliding positions evict each other. That
//! loses information but never corrupts it: a lookup only hands back an
//! entry whose full hash matches.

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, Default)]
struct CacheEntry {
    hash: u64,
    visits: u32,
    black_wins: f64,
}

/// Fixed-size visit/win cache shared by all search threads.
pub struct TranspositionCache {
    buckets: Mutex<Vec<CacheEntry>>,
}

impl TranspositionCache {
    /// # Panics
    /// If `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "transposition cache needs at least one bucket");
        TranspositionCache {
            buckets: Mutex::new(vec![CacheEntry::default(); size]),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.buckets.lock().fill(CacheEntry::default());
    }

    /// Store the statistics of a node, replacing the bucket's entry.
    pub fn update(&self, hash: u64, visits: u32, black_wins: f64) {
        let mut buckets = self.buckets.lock();
        let index = (hash % buckets.len() as u64) as usize;
        buckets[index] = CacheEntry {
            hash,
            visits,
            black_wins,
        };
    }

    /// Overwrite `visits`/`black_wins` with the cached entry for `hash` if
    /// it has strictly more visits. Returns true when it did.
    pub fn sync(&self, hash: u64, visits: &mut u32, black_wins: &mut f64) -> bool {
        let buckets = self.buckets.lock();
        let entry = buckets[(hash % buckets.len() as u64) as usize];
        if entry.hash != hash || entry.visits <= *visits {
            return false;
        }
        *visits = entry.visits;
        *black_wins = entry.black_wins;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_only_with_more_visits() {
        let cache = TranspositionCache::new(1024);
        cache.update(77, 10, 6.0);

        let (mut visits, mut wins) = (12, 3.0);
        assert!(!cache.sync(77, &mut visits, &mut wins));
        assert_eq!((visits, wins), (12, 3.0));

        let (mut visits, mut wins) = (4, 1.0);
        assert!(cache.sync(77, &mut visits, &mut wins));
        assert_eq!((visits, wins), (10, 6.0));
    }

    #[test]
    fn test_collision_evicts() {
        let cache = TranspositionCache::new(8);
        cache.update(3, 50, 25.0);
        cache.update(11, 5, 1.0);

        let (mut visits, mut wins) = (0, 0.0);
        assert!(!cache.sync(3, &mut visits, &mut wins));
        assert!(cache.sync(11, &mut visits, &mut wins));
        assert_eq!(visits, 5);
    }

    #[test]
    fn test_empty_bucket_never_matches() {
        let cache = TranspositionCache::new(4);
        let (mut visits, mut wins) = (0, 0.0);
        assert!(!cache.sync(0, &mut visits, &mut wins));
        cache.update(2, 9, 9.0);
        cache.clear();
        assert!(!cache.sync(2, &mut visits, &mut wins));
        assert_eq!(cache.len(), 4);
    }
}
