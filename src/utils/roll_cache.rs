use std::time::Duration;

use moka::future::Cache;

use crate::utils::roll_index::normalize;

/// roll number -> internal record id. Ids are immutable and records are
/// never deleted, so entries need TTL only to bound memory, not for
/// correctness; a miss always falls back to the store's secondary index.
pub struct RollCache {
    cache: Cache<String, u64>,
}

impl RollCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(Duration::from_secs(86400)) // 24h TTL
                .build(),
        }
    }

    pub async fn remember(&self, roll: &str, id: u64) {
        self.cache.insert(normalize(roll), id).await;
    }

    pub async fn lookup(&self, roll: &str) -> Option<u64> {
        self.cache.get(&normalize(roll)).await
    }

    pub async fn forget(&self, roll: &str) {
        self.cache.invalidate(&normalize(roll)).await;
    }

    /// Batch-prime the cache, awaiting insertions concurrently.
    pub async fn remember_batch(&self, entries: &[(String, u64)]) {
        let futures: Vec<_> = entries
            .iter()
            .map(|(roll, id)| self.cache.insert(normalize(roll), *id))
            .collect();

        futures::future::join_all(futures).await;
    }
}

impl Default for RollCache {
    fn default() -> Self {
        Self::new()
    }
}
