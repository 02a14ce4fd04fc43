//! Repository Integration Tests
//!
//! Tests for SqliteEntityRepository with in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::domain::{DomainError, EntityType, ListQuery};
    use crate::repository::{init_db, EntityRepository, SqliteEntityRepository};
    use serde_json::{json, Map, Value};
    use std::path::PathBuf;

    async fn setup_test_db() -> SqliteEntityRepository {
        // Use in-memory database for tests
        let db_path = PathBuf::from(":memory:");
        let db_state = init_db(&db_path).await.expect("Failed to init test DB");
        SqliteEntityRepository::new(db_state.conn.clone())
    }

    fn goal_type() -> EntityType {
        EntityType::parse("Goal").unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_entity() {
        let repo = setup_test_db().await;

        let created = repo
            .create(&goal_type(), fields(json!({"title": "Sleep by 11", "milestones": ["No caffeine"]})))
            .await
            .expect("Failed to create");

        assert_eq!(created.id.as_str().len(), 32);
        assert_eq!(created.field("title"), Some(&json!("Sleep by 11")));
        assert!(created.field("created_date").unwrap().is_string());
        assert_eq!(created.field("created_date"), created.field("updated_date"));
    }

    #[tokio::test]
    async fn test_create_ignores_reserved_fields() {
        let repo = setup_test_db().await;

        let created = repo
            .create(&goal_type(), fields(json!({"id": "mine", "created_date": "1999", "title": "x"})))
            .await
            .unwrap();

        assert_ne!(created.id.as_str(), "mine");
        assert_ne!(created.field("created_date"), Some(&json!("1999")));
    }

    #[tokio::test]
    async fn test_get_entity() {
        let repo = setup_test_db().await;

        let created = repo.create(&goal_type(), fields(json!({"title": "Find me"}))).await.unwrap();
        let found = repo.get(&goal_type(), created.id.as_str()).await.expect("Get failed");
        assert_eq!(found.unwrap().field("title"), Some(&json!("Find me")));

        let other_type = EntityType::parse("MoodEntry").unwrap();
        assert!(repo.get(&other_type, created.id.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sorted_by_field() {
        let repo = setup_test_db().await;

        for (title, rank) in [("b", 2), ("c", 3), ("a", 1)] {
            repo.create(&goal_type(), fields(json!({"title": title, "rank": rank}))).await.unwrap();
        }

        let asc = repo.list(&goal_type(), &ListQuery::new(Some("rank"), None).unwrap()).await.unwrap();
        let titles: Vec<_> = asc.iter().map(|r| r.field("title").cloned().unwrap()).collect();
        assert_eq!(titles, vec![json!("a"), json!("b"), json!("c")]);

        let desc = repo
            .list(&goal_type(), &ListQuery::new(Some("-rank"), Some(2)).unwrap())
            .await
            .unwrap();
        assert_eq!(desc.len(), 2);
        assert_eq!(desc[0].field("title"), Some(&json!("c")));
    }

    #[tokio::test]
    async fn test_filter_by_fields() {
        let repo = setup_test_db().await;
        let mood = EntityType::parse("MoodEntry").unwrap();

        repo.create(&mood, fields(json!({"mood": "calm", "score": 7}))).await.unwrap();
        repo.create(&mood, fields(json!({"mood": "anxious", "score": 3}))).await.unwrap();
        repo.create(&mood, fields(json!({"mood": "calm", "score": 8}))).await.unwrap();

        let calm = repo
            .filter(&mood, &fields(json!({"mood": "calm"})), &ListQuery::new(Some("-score"), None).unwrap())
            .await
            .unwrap();
        assert_eq!(calm.len(), 2);
        assert_eq!(calm[0].field("score"), Some(&json!(8)));

        let none = repo
            .filter(&mood, &fields(json!({"mood": "calm", "score": 3})), &ListQuery::default())
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let repo = setup_test_db().await;

        let created = repo
            .create(&goal_type(), fields(json!({"title": "Original", "note": "keep", "old": 1})))
            .await
            .unwrap();

        let updated = repo
            .update(
                &goal_type(),
                created.id.as_str(),
                fields(json!({
                    "milestones": [{"title": "Walk", "completed": true}],
                    "progress": 100,
                    "old": null,
                })),
            )
            .await
            .expect("Update failed");

        assert_eq!(updated.field("title"), Some(&json!("Original")));
        assert_eq!(updated.field("note"), Some(&json!("keep")));
        assert_eq!(updated.field("progress"), Some(&json!(100)));
        assert!(updated.field("old").is_none());
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn test_update_missing_entity() {
        let repo = setup_test_db().await;
        let err = repo.update(&goal_type(), "missing", Map::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_entity() {
        let repo = setup_test_db().await;

        let created = repo.create(&goal_type(), fields(json!({"title": "To delete"}))).await.unwrap();
        repo.delete(&goal_type(), created.id.as_str()).await.expect("Delete failed");

        let found = repo.get(&goal_type(), created.id.as_str()).await.expect("Get failed");
        assert!(found.is_none());
        assert!(repo.delete(&goal_type(), created.id.as_str()).await.is_err());
    }

    #[tokio::test]
    async fn test_uninitialized_database() {
        let repo = SqliteEntityRepository::new(Default::default());
        let err = repo.list(&goal_type(), &ListQuery::default()).await.unwrap_err();
        assert_eq!(err, DomainError::Internal("Database not initialized".to_string()));
    }
}
