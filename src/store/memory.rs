use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::student::{NewStudent, StudentRecord};
use crate::store::{RecordStore, StoreError};
use crate::utils::roll_index::normalize;

/// In-memory record store: primary map keyed by id (BTreeMap over a
/// monotonic sequence, so iteration order is creation order) plus a
/// secondary unique index roll -> id.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

struct Inner {
    records: BTreeMap<u64, StudentRecord>,
    by_roll: HashMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                by_roll: HashMap::new(),
            }),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn create(&self, new: NewStudent) -> Result<StudentRecord, StoreError> {
        let key = normalize(&new.roll_number);
        let mut inner = self.inner.write().expect("memory store poisoned");

        if inner.by_roll.contains_key(&key) {
            return Err(StoreError::DuplicateKey);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = StudentRecord {
            id,
            roll_number: new.roll_number,
            name: new.name,
            email: new.email,
            phone: new.phone,
            checkin_time: None,
            checkout_time: None,
            version: 0,
        };

        inner.by_roll.insert(key, id);
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    fn get(&self, id: u64) -> Result<StudentRecord, StoreError> {
        let inner = self.inner.read().expect("memory store poisoned");
        inner.records.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn get_by_roll(&self, roll: &str) -> Result<StudentRecord, StoreError> {
        let inner = self.inner.read().expect("memory store poisoned");
        let id = inner.by_roll.get(roll).copied().ok_or(StoreError::NotFound)?;
        inner.records.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn update(&self, record: &StudentRecord) -> Result<StudentRecord, StoreError> {
        let mut inner = self.inner.write().expect("memory store poisoned");
        let stored = inner
            .records
            .get_mut(&record.id)
            .ok_or(StoreError::NotFound)?;

        if stored.version != record.version {
            return Err(StoreError::Conflict {
                stored: stored.version,
                supplied: record.version,
            });
        }

        // id and roll_number are immutable; keep the stored values.
        stored.name = record.name.clone();
        stored.email = record.email.clone();
        stored.phone = record.phone.clone();
        stored.checkin_time = record.checkin_time;
        stored.checkout_time = record.checkout_time;
        stored.version += 1;

        Ok(stored.clone())
    }

    fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let inner = self.inner.read().expect("memory store poisoned");
        Ok(inner.records.values().cloned().collect())
    }
}
