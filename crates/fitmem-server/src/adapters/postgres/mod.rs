//! PostgreSQL Repository Implementations

mod record_store;

pub use record_store::PgRecordStore;
