pub mod api;
pub mod config;
pub mod docs;
pub mod engine;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;
pub mod utils;

pub use engine::AttendanceEngine;
pub use error::EngineError;
pub use model::student::{AttendanceStatus, NewStudent, StudentRecord};
pub use store::{MemoryStore, RecordStore, StoreError};
