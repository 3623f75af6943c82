use derive_more::Display;

use crate::model::student::{NewStudent, StudentRecord};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum StoreError {
    #[display(fmt = "record not found")]
    NotFound,
    #[display(fmt = "duplicate roll number")]
    DuplicateKey,
    #[display(fmt = "stale write: stored version {} != supplied version {}", stored, supplied)]
    Conflict { stored: u64, supplied: u64 },
    #[display(fmt = "storage backend failure: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

/// Keyed storage of attendance records. The shipped implementation is
/// in-memory; a database-backed one slots in behind the same contract.
///
/// `update` is compare-and-swap on the record's `version`: callers pass
/// back the snapshot they read, and a `Conflict` means someone else wrote
/// in between. Read-modify-write serialization is built on that.
pub trait RecordStore: Send + Sync + 'static {
    /// Assigns the id (monotonic, so creation order == id order) and
    /// starts the version at 0. Fails `DuplicateKey` when the secondary
    /// unique index on the roll number already holds the key.
    fn create(&self, new: NewStudent) -> Result<StudentRecord, StoreError>;

    fn get(&self, id: u64) -> Result<StudentRecord, StoreError>;

    /// Lookup through the secondary unique index. Expects a normalized key.
    fn get_by_roll(&self, roll: &str) -> Result<StudentRecord, StoreError>;

    /// Version-checked write-back. On success the stored version is bumped
    /// and the stored record returned. `id` and `roll_number` are
    /// immutable; whatever the caller put in those fields is ignored in
    /// favor of the stored values.
    fn update(&self, record: &StudentRecord) -> Result<StudentRecord, StoreError>;

    /// Snapshot of all records in creation order.
    fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError>;
}
