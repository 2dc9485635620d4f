use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::{db, record};

async fn temp_db(dir: &tempfile::TempDir) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("models.sqlite").display());
    let db = db::connect(&url).await.expect("connect");
    migration::Migrator::up(&db, None).await.expect("migrate up");
    db
}

#[tokio::test]
async fn connect_runs_simple_query() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;
    let row = db
        .query_one(sea_orm::Statement::from_string(
            db.get_database_backend(),
            "SELECT 1 AS test".to_string(),
        ))
        .await
        .unwrap()
        .expect("one row");
    let v: i32 = row.try_get("", "test").unwrap();
    assert_eq!(v, 1);
}

#[tokio::test]
async fn composite_key_distinguishes_unlock_keys() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;
    let id = "f47ac10b-58cc-4372-a567-0e02b2c3d479".to_string();

    for (key, data) in [("a", "first"), ("b", "second")] {
        record::ActiveModel {
            id: Set(id.clone()),
            unlock_key: Set(key.to_string()),
            data: Set(data.to_string()),
        }
        .insert(&db)
        .await
        .unwrap();
    }

    let a = record::Entity::find_by_id((id.clone(), "a".to_string())).one(&db).await.unwrap();
    let b = record::Entity::find_by_id((id.clone(), "b".to_string())).one(&db).await.unwrap();
    assert_eq!(a.map(|m| m.data).as_deref(), Some("first"));
    assert_eq!(b.map(|m| m.data).as_deref(), Some("second"));
}

#[tokio::test]
async fn duplicate_pair_violates_primary_key() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;
    let am = record::ActiveModel {
        id: Set("f47ac10b-58cc-4372-a567-0e02b2c3d479".into()),
        unlock_key: Set(String::new()),
        data: Set("x".into()),
    };
    am.clone().insert(&db).await.unwrap();
    assert!(am.insert(&db).await.is_err());
}
