//! Service layer owning the record store.
//! - `RecordStore` is the narrow interface the HTTP layer calls into.
//! - `SeaOrmRecordStore` persists records through the `models` entity.

pub mod errors;
pub mod record;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
pub use record::{Record, RecordStore, SeaOrmRecordStore};
