use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::model::student::{NewStudent, StudentRecord};
use crate::store::{RecordStore, StoreError};
use crate::utils::roll_cache::RollCache;
use crate::utils::roll_index::{RollIndex, normalize};

const CACHE_WARMUP_BATCH: usize = 250;

/// Owns the record lifecycle. Holds no record copies of its own: every
/// command re-reads through the store and writes back, so the store stays
/// the single source of truth. Safe under concurrent callers; writes to
/// the same record are serialized through the store's version check.
pub struct AttendanceEngine<S: RecordStore> {
    store: Arc<S>,
    rolls: RollIndex,
    resolve_cache: RollCache,
    write_retries: u32,
}

impl<S: RecordStore> AttendanceEngine<S> {
    /// Builds the engine and rebuilds the roll index from the store.
    pub fn new(store: Arc<S>, write_retries: u32) -> Result<Self, EngineError> {
        let rolls = RollIndex::new();
        let records = store.list_all()?;
        rolls.rebuild(records.iter().map(|r| r.roll_number.as_str()));

        Ok(Self {
            store,
            rolls,
            resolve_cache: RollCache::new(),
            write_retries,
        })
    }

    /// Registers a new student with both timestamps unset.
    ///
    /// The roll number is claimed in the index before the store create, so
    /// two concurrent creates for the same roll cannot both succeed; a
    /// failed create always releases the claim.
    pub async fn create_student(&self, new: NewStudent) -> Result<StudentRecord, EngineError> {
        validate(&new)?;

        let token = self
            .rolls
            .reserve(&new.roll_number)
            .ok_or_else(|| EngineError::DuplicateStudent {
                roll: new.roll_number.clone(),
            })?;

        debug!(roll = %token.roll(), reservation = %token.id(), "Roll number reserved");

        match self.store.create(new) {
            Ok(record) => {
                self.resolve_cache
                    .remember(&record.roll_number, record.id)
                    .await;
                info!(id = record.id, roll = %record.roll_number, "Student created");
                Ok(record)
            }
            Err(StoreError::DuplicateKey) => {
                // Index and store disagree; trust the store and roll back.
                let roll = token.roll().to_string();
                warn!(roll = %roll, "Store rejected roll the index thought was free");
                self.rolls.release(token);
                Err(EngineError::DuplicateStudent { roll })
            }
            Err(e) => {
                self.rolls.release(token);
                Err(EngineError::Store(e))
            }
        }
    }

    /// Stamps `checkin_time = now()` unconditionally.
    ///
    /// Deliberately permissive: re-check-in overwrites the old stamp and a
    /// departed student becomes present again without the checkout stamp
    /// being cleared. Matches the product's current behavior; tightening
    /// needs a product decision first.
    pub async fn check_in(&self, roll: &str) -> Result<StudentRecord, EngineError> {
        let record = self.resolve(roll).await?;
        self.check_in_by_id(record.id).await
    }

    /// Stamps `checkout_time = now()` unconditionally, even when the
    /// student never checked in. Same permissive policy as `check_in`.
    pub async fn check_out(&self, roll: &str) -> Result<StudentRecord, EngineError> {
        let record = self.resolve(roll).await?;
        self.check_out_by_id(record.id).await
    }

    pub async fn check_in_by_id(&self, id: u64) -> Result<StudentRecord, EngineError> {
        let updated = self.apply(id, |r| r.checkin_time = Some(Utc::now()))?;
        info!(id, roll = %updated.roll_number, "Checked in");
        Ok(updated)
    }

    pub async fn check_out_by_id(&self, id: u64) -> Result<StudentRecord, EngineError> {
        let updated = self.apply(id, |r| r.checkout_time = Some(Utc::now()))?;
        info!(id, roll = %updated.roll_number, "Checked out");
        Ok(updated)
    }

    /// true => the roll number can still be registered. Three-tier check:
    /// filter fast-negative, cache fast-positive, reservation set as the
    /// authority. Covers in-flight reservations, so a roll mid-create
    /// already reads as taken.
    pub async fn is_roll_available(&self, roll: &str) -> bool {
        let key = normalize(roll);

        if !self.rolls.might_exist(&key) {
            return true;
        }

        if self.resolve_cache.lookup(&key).await.is_some() {
            return false;
        }

        // The reservation set is the authority; it supersets the store's
        // rolls (rebuilt at startup, claimed before every create).
        !self.rolls.is_reserved(&key)
    }

    /// Full roster, creation order.
    pub fn list_all(&self) -> Result<Vec<StudentRecord>, EngineError> {
        Ok(self.store.list_all()?)
    }

    /// Present = checked in and not yet checked out, over the same
    /// snapshot a `list_all` at this instant would see.
    pub fn list_present(&self) -> Result<Vec<StudentRecord>, EngineError> {
        let mut records = self.store.list_all()?;
        records.retain(|r| r.is_present());
        Ok(records)
    }

    /// Prime the roll -> id cache from the store, in batches.
    pub async fn warm_roll_cache(&self) -> anyhow::Result<()> {
        let records = self.store.list_all().map_err(anyhow::Error::from)?;

        let mut total = 0usize;
        for chunk in records.chunks(CACHE_WARMUP_BATCH) {
            let batch: Vec<_> = chunk
                .iter()
                .map(|r| (r.roll_number.clone(), r.id))
                .collect();
            self.resolve_cache.remember_batch(&batch).await;
            total += batch.len();
        }

        log::info!("Roll cache warmup complete: {} students", total);
        Ok(())
    }

    /// Resolve a roll number to the current record, cache first.
    async fn resolve(&self, roll: &str) -> Result<StudentRecord, EngineError> {
        let key = normalize(roll);

        if let Some(id) = self.resolve_cache.lookup(&key).await {
            match self.store.get(id) {
                Ok(record) => return Ok(record),
                // Stale cache entry; fall through to the index lookup.
                Err(StoreError::NotFound) => self.resolve_cache.forget(&key).await,
                Err(e) => return Err(EngineError::Store(e)),
            }
        }

        match self.store.get_by_roll(&key) {
            Ok(record) => {
                self.resolve_cache.remember(&key, record.id).await;
                Ok(record)
            }
            Err(StoreError::NotFound) => Err(EngineError::NotFound),
            Err(e) => Err(EngineError::Store(e)),
        }
    }

    /// Read-modify-write with bounded retry on version conflicts. A lost
    /// race means someone else's write landed; re-read and re-stamp.
    fn apply<F>(&self, id: u64, stamp: F) -> Result<StudentRecord, EngineError>
    where
        F: Fn(&mut StudentRecord),
    {
        let mut attempt = 0u32;
        loop {
            let mut record = self.store.get(id).map_err(EngineError::from)?;
            stamp(&mut record);

            match self.store.update(&record) {
                Ok(updated) => return Ok(updated),
                Err(StoreError::Conflict { stored, supplied }) if attempt < self.write_retries => {
                    attempt += 1;
                    debug!(id, stored, supplied, attempt, "Write conflict, retrying");
                }
                Err(e @ StoreError::Conflict { .. }) => {
                    warn!(id, retries = self.write_retries, "Write conflict retries exhausted");
                    return Err(EngineError::Store(e));
                }
                Err(e) => return Err(EngineError::from(e)),
            }
        }
    }
}

fn validate(new: &NewStudent) -> Result<(), EngineError> {
    // Non-empty after trim is the whole contract; email/phone formats are
    // not checked (open question recorded in DESIGN.md).
    let fields: [(&'static str, &str); 4] = [
        ("roll_number", &new.roll_number),
        ("name", &new.name),
        ("email", &new.email),
        ("phone", &new.phone),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(EngineError::Validation { field });
        }
    }
    Ok(())
}
