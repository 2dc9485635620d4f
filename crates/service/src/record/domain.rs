use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A payload stored under an (id, unlock key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub unlock_key: String,
    pub data: String,
}

impl Record {
    pub fn new(id: Uuid, unlock_key: impl Into<String>, data: impl Into<String>) -> Self {
        Self { id, unlock_key: unlock_key.into(), data: data.into() }
    }
}

/// Text form persisted in the `id` column.
pub(crate) fn id_key(id: Uuid) -> String {
    id.hyphenated().to_string()
}
