use super::*;

async fn memory_storage() -> Storage {
    Storage::new("sqlite::memory:").await.expect("db")
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = memory_storage().await;
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("backoffice_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn creates_and_finds_user() {
    let storage = memory_storage().await;
    let id = storage
        .create_user("alice", "alice@example.test")
        .await
        .expect("user");

    let user = storage.find_user(id).await.expect("query").expect("user");
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.test");
    assert!(!user.is_banned);

    let by_name = storage
        .find_user_by_username("alice")
        .await
        .expect("query")
        .expect("user");
    assert_eq!(by_name.id, id);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let storage = memory_storage().await;
    storage
        .create_user("alice", "alice@example.test")
        .await
        .expect("user");
    storage
        .create_user("alice", "other@example.test")
        .await
        .expect_err("unique username");
}

#[tokio::test]
async fn lists_users_in_insertion_order() {
    let storage = memory_storage().await;
    for name in ["carol", "alice", "bob"] {
        storage
            .create_user(name, &format!("{name}@example.test"))
            .await
            .expect("user");
    }

    let names: Vec<String> = storage
        .find_all()
        .await
        .expect("list")
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, ["carol", "alice", "bob"]);
}

#[tokio::test]
async fn update_ban_and_delete_report_missing_rows() {
    let storage = memory_storage().await;
    let id = storage
        .create_user("alice", "alice@example.test")
        .await
        .expect("user");

    assert!(storage
        .update_user(id, "alicia", "alicia@example.test")
        .await
        .expect("update"));
    assert!(storage.set_banned(id, true).await.expect("ban"));
    let user = storage.find_user(id).await.expect("query").expect("user");
    assert_eq!(user.username, "alicia");
    assert!(user.is_banned);

    assert!(storage.delete_user(id).await.expect("delete"));
    assert!(!storage.delete_user(id).await.expect("delete again"));
    assert!(!storage
        .update_user(id, "ghost", "ghost@example.test")
        .await
        .expect("update missing"));
    assert!(storage.find_user(id).await.expect("query").is_none());
}
