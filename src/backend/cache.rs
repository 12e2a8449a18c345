//! Bounded LRU of decoded batches.
//!
//! Batch objects never change once written, so entries are never invalidated;
//! they only fall out when capacity is reached.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::codec::LedgerCloseMetaBatch;

pub(crate) struct BatchCache {
    /// Batches by the first ledger their file covers
    batches: Mutex<LruCache<u32, Arc<LedgerCloseMetaBatch>>>,
}

impl BatchCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            batches: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, batch_start: u32) -> Option<Arc<LedgerCloseMetaBatch>> {
        self.batches.lock().get(&batch_start).cloned()
    }

    pub fn insert(&self, batch_start: u32, batch: Arc<LedgerCloseMetaBatch>) {
        self.batches.lock().put(batch_start, batch);
    }

    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::LedgerCloseMeta;

    fn batch(start: u32) -> Arc<LedgerCloseMetaBatch> {
        Arc::new(LedgerCloseMetaBatch {
            start_sequence: start,
            end_sequence: start,
            ledger_close_metas: vec![LedgerCloseMeta::new(start.to_string())],
        })
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = BatchCache::new(NonZeroUsize::new(2).unwrap());
        cache.insert(0, batch(0));
        cache.insert(10, batch(10));

        // Touch 0 so 10 becomes the eviction candidate
        assert!(cache.get(0).is_some());
        cache.insert(20, batch(20));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(0).is_some());
        assert!(cache.get(10).is_none());
        assert!(cache.get(20).is_some());
    }

    #[test]
    fn test_shares_batches() {
        let cache = BatchCache::new(NonZeroUsize::new(1).unwrap());
        let original = batch(5);
        cache.insert(5, original.clone());

        let cached = cache.get(5).unwrap();
        assert!(Arc::ptr_eq(&original, &cached));
        assert_eq!(cache.len(), 1);
    }
}
