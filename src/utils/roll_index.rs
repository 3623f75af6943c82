use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use autoscale_cuckoo_filter::CuckooFilter;
use uuid::Uuid;

/// Expected capacity and false-positive rate.
/// Tune these based on real roster sizes.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
pub fn normalize(roll: &str) -> String {
    roll.trim().to_lowercase()
}

/// Handle for a successful reservation. Drop it to commit; hand it back to
/// `release` to roll the reservation back after a failed create.
#[derive(Debug)]
pub struct ReservationToken {
    key: String,
    id: Uuid,
}

impl ReservationToken {
    pub fn roll(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Uniqueness index over roll numbers: a cuckoo filter for fast negative
/// answers in front of the authoritative reservation set. Rebuilt from the
/// record store at startup, never persisted on its own.
///
/// `reserve` is the insert-if-absent that closes the check-then-create
/// race: two concurrent creates for the same roll can never both get a
/// token.
pub struct RollIndex {
    filter: RwLock<CuckooFilter<String>>,
    reserved: Mutex<HashSet<String>>,
}

impl RollIndex {
    pub fn new() -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            reserved: Mutex::new(HashSet::new()),
        }
    }

    /// Check if a roll number might be taken (false positives possible).
    pub fn might_exist(&self, roll: &str) -> bool {
        let key = normalize(roll);
        self.filter
            .read()
            .expect("roll filter poisoned")
            .contains(&key)
    }

    /// Authoritative membership check against the reservation set.
    pub fn is_reserved(&self, roll: &str) -> bool {
        let key = normalize(roll);
        self.reserved
            .lock()
            .expect("roll index poisoned")
            .contains(&key)
    }

    /// Atomically claim a roll number. `None` means it is already taken.
    pub fn reserve(&self, roll: &str) -> Option<ReservationToken> {
        let key = normalize(roll);
        let mut reserved = self.reserved.lock().expect("roll index poisoned");

        if !reserved.insert(key.clone()) {
            return None;
        }

        self.filter
            .write()
            .expect("roll filter poisoned")
            .add(&key);

        Some(ReservationToken {
            key,
            id: Uuid::new_v4(),
        })
    }

    /// Roll back a reservation after a failed create.
    pub fn release(&self, token: ReservationToken) {
        let mut reserved = self.reserved.lock().expect("roll index poisoned");
        reserved.remove(&token.key);
        self.filter
            .write()
            .expect("roll filter poisoned")
            .remove(&token.key);
    }

    /// Rebuild the index from the store's rolls in one pass, returning the
    /// number of entries loaded.
    pub fn rebuild<'a>(&self, rolls: impl IntoIterator<Item = &'a str>) -> usize {
        let mut reserved = self.reserved.lock().expect("roll index poisoned");
        let mut filter = self.filter.write().expect("roll filter poisoned");

        let mut total = 0usize;
        for roll in rolls {
            let key = normalize(roll);
            if reserved.insert(key.clone()) {
                filter.add(&key);
            }
            total += 1;
        }

        log::info!("Roll index rebuild complete: {} rolls", total);
        total
    }
}

impl Default for RollIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_is_insert_if_absent() {
        let index = RollIndex::new();
        let token = index.reserve("42").expect("first reservation");
        assert!(index.reserve("42").is_none());
        assert!(index.reserve(" 42 ").is_none(), "normalized form collides");

        index.release(token);
        assert!(index.reserve("42").is_some());
    }

    #[test]
    fn filter_tracks_reservations() {
        let index = RollIndex::new();
        assert!(!index.might_exist("7"));
        let token = index.reserve("7").unwrap();
        assert!(index.might_exist("7"));
        index.release(token);
        assert!(!index.might_exist("7"));
    }

    #[test]
    fn rebuild_deduplicates() {
        let index = RollIndex::new();
        let loaded = index.rebuild(["1", "2", "2", "3"]);
        assert_eq!(loaded, 4);
        assert!(index.reserve("2").is_none());
        assert!(index.reserve("4").is_some());
    }

    #[test]
    fn concurrent_reserves_have_one_winner() {
        use std::sync::Arc;

        let index = Arc::new(RollIndex::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || index.reserve("99").is_some())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
