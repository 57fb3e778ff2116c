//! Repository Module
//!
//! Data access layer for the server.

pub mod record;

pub use record::{PgRecordStore, RecordStore, StoreError};
