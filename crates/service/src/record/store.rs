use async_trait::async_trait;
use migration::MigratorTrait;
use sea_orm::{
    sea_query::OnConflict, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, Set,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::record;

use super::domain::{id_key, Record};
use crate::errors::ServiceError;

/// Durable mapping from (id, unlock key) to an opaque payload.
///
/// Implementations must be safe to share across request handlers without
/// external locking. Each operation is a single atomic statement against the
/// backing store; failures surface as [`ServiceError::Persistence`] and are
/// never retried here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the backing schema if it is missing. Safe to call on every startup.
    async fn initialize(&self) -> Result<(), ServiceError>;

    /// Create or fully replace the payload stored under `(record.id, record.unlock_key)`.
    async fn upsert(&self, record: &Record) -> Result<(), ServiceError>;

    /// Fetch the record for exactly `(id, unlock_key)`; `Ok(None)` when never written.
    async fn lookup(&self, id: Uuid, unlock_key: &str) -> Result<Option<Record>, ServiceError>;
}

/// SeaORM-backed store implementation.
#[derive(Clone)]
pub struct SeaOrmRecordStore {
    db: DatabaseConnection,
}

impl SeaOrmRecordStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &DatabaseConnection { &self.db }
}

#[async_trait]
impl RecordStore for SeaOrmRecordStore {
    async fn initialize(&self) -> Result<(), ServiceError> {
        if self.db.get_database_backend() == DatabaseBackend::Sqlite {
            self.db.execute_unprepared("PRAGMA journal_mode=WAL").await?;
        }
        migration::Migrator::up(&self.db, None).await?;
        info!("record store initialized");
        Ok(())
    }

    #[instrument(skip_all, fields(id = %rec.id))]
    async fn upsert(&self, rec: &Record) -> Result<(), ServiceError> {
        let am = record::ActiveModel {
            id: Set(id_key(rec.id)),
            unlock_key: Set(rec.unlock_key.clone()),
            data: Set(rec.data.clone()),
        };
        record::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([record::Column::Id, record::Column::UnlockKey])
                    .update_column(record::Column::Data)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        debug!(bytes = rec.data.len(), "record upserted");
        Ok(())
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn lookup(&self, id: Uuid, unlock_key: &str) -> Result<Option<Record>, ServiceError> {
        let found = record::Entity::find_by_id((id_key(id), unlock_key.to_owned()))
            .one(&self.db)
            .await?;
        debug!(hit = found.is_some(), "record lookup");
        Ok(found.map(|m| Record { id, unlock_key: m.unlock_key, data: m.data }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::temp_store;

    const SCENARIO_ID: &str = "f47ac10b-58cc-4372-a567-0e02b2c3d479";

    fn scenario_id() -> Uuid {
        Uuid::parse_str(SCENARIO_ID).unwrap()
    }

    #[tokio::test]
    async fn upsert_then_lookup_round_trips() {
        let (_dir, store) = temp_store().await;
        let rec = Record::new(Uuid::new_v4(), "s3cret", "{\"nested\": [1, 2, 3]}");
        store.upsert(&rec).await.unwrap();
        let got = store.lookup(rec.id, "s3cret").await.unwrap();
        assert_eq!(got, Some(rec));
    }

    #[tokio::test]
    async fn second_upsert_replaces_payload() {
        let (_dir, store) = temp_store().await;
        let id = Uuid::new_v4();
        store.upsert(&Record::new(id, "k", "p1")).await.unwrap();
        store.upsert(&Record::new(id, "k", "p2")).await.unwrap();
        let got = store.lookup(id, "k").await.unwrap().unwrap();
        assert_eq!(got.data, "p2");
    }

    #[tokio::test]
    async fn other_unlock_key_is_absent() {
        let (_dir, store) = temp_store().await;
        let id = Uuid::new_v4();
        store.upsert(&Record::new(id, "a", "X")).await.unwrap();
        assert_eq!(store.lookup(id, "b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unlock_keys_are_independent_records() {
        let (_dir, store) = temp_store().await;
        let id = Uuid::new_v4();
        store.upsert(&Record::new(id, "a", "X")).await.unwrap();
        store.upsert(&Record::new(id, "b", "Y")).await.unwrap();
        store.upsert(&Record::new(id, "a", "Z")).await.unwrap();
        assert_eq!(store.lookup(id, "a").await.unwrap().unwrap().data, "Z");
        assert_eq!(store.lookup(id, "b").await.unwrap().unwrap().data, "Y");
    }

    #[tokio::test]
    async fn never_written_pair_is_absent_not_error() {
        let (_dir, store) = temp_store().await;
        let got = store.lookup(Uuid::new_v4(), "").await;
        assert!(matches!(got, Ok(None)));
    }

    #[tokio::test]
    async fn initialize_twice_keeps_records() {
        let (_dir, store) = temp_store().await;
        let rec = Record::new(Uuid::new_v4(), "", "kept");
        store.upsert(&rec).await.unwrap();
        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        assert_eq!(store.lookup(rec.id, "").await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn empty_unlock_key_scenario() {
        let (_dir, store) = temp_store().await;
        store.upsert(&Record::new(scenario_id(), "", "hello")).await.unwrap();

        let got = store.lookup(scenario_id(), "").await.unwrap().unwrap();
        assert_eq!(got.id.to_string(), SCENARIO_ID);
        assert_eq!(got.unlock_key, "");
        assert_eq!(got.data, "hello");

        assert_eq!(store.lookup(scenario_id(), "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_payload_is_stored() {
        let (_dir, store) = temp_store().await;
        let rec = Record::new(Uuid::new_v4(), "k", "");
        store.upsert(&rec).await.unwrap();
        assert_eq!(store.lookup(rec.id, "k").await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn concurrent_upserts_leave_one_whole_payload() {
        let (_dir, store) = temp_store().await;
        let store = Arc::new(store);
        let id = Uuid::new_v4();
        let payloads: Vec<String> = (0..16).map(|i| format!("payload-{i}-{}", "x".repeat(i * 64))).collect();

        let mut handles = Vec::new();
        for p in payloads.clone() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.upsert(&Record::new(id, "shared", p)).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let got = store.lookup(id, "shared").await.unwrap().unwrap();
        assert!(payloads.contains(&got.data));
    }

    #[tokio::test]
    async fn concurrent_distinct_keys_are_all_visible() {
        let (_dir, store) = temp_store().await;
        let store: Arc<dyn RecordStore> = Arc::new(store);
        let ids: Vec<Uuid> = (0..12).map(|_| Uuid::new_v4()).collect();

        let mut handles = Vec::new();
        for id in ids.clone() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.upsert(&Record::new(id, "k", id.to_string())).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        for id in ids {
            let got = store.lookup(id, "k").await.unwrap().unwrap();
            assert_eq!(got.data, id.to_string());
        }
    }

    #[tokio::test]
    async fn closed_connection_is_persistence_error() {
        let (_dir, store) = temp_store().await;
        store.connection().clone().close().await.unwrap();
        let err = store.lookup(Uuid::new_v4(), "").await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }
}
