pub mod domain;
pub mod store;

pub use domain::Record;
pub use store::{RecordStore, SeaOrmRecordStore};
