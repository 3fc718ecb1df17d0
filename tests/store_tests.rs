//! Integration tests for the storage layer: audited mutations, rollback on
//! conflict and bootstrap seeding.

use sea_orm::{Set, SqlErr};
use techtracker::config::SecurityConfig;
use techtracker::db::{AccountChanges, GuardedWrite, Store};
use techtracker::domain::Role;
use techtracker::domain::equipment::EquipmentDraft;
use techtracker::entities::equipment;
use techtracker::services::audit;

async fn open_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("techtracker-store-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open store")
}

fn fast_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        bootstrap_admin_password: Some("admin-password-1".to_string()),
        ..SecurityConfig::default()
    }
}

fn row(id: &str, inventory_number: &str) -> equipment::ActiveModel {
    equipment::ActiveModel {
        id: Set(id.to_string()),
        name: Set("HP EliteBook".to_string()),
        inventory_number: Set(inventory_number.to_string()),
        category: Set("Laptops".to_string()),
        location: Set("Office 101".to_string()),
        date_added: Set("2024-03-15".to_string()),
        created_at: Set("2024-03-15T09:00:00+00:00".to_string()),
        updated_at: Set("2024-03-15T09:00:00+00:00".to_string()),
        created_by: Set(Some("olena".to_string())),
        last_modified_by: Set(Some("olena".to_string())),
    }
}

fn draft(location: &str) -> EquipmentDraft {
    EquipmentDraft {
        name: "HP EliteBook".to_string(),
        inventory_number: "INV001".to_string(),
        category: "Laptops".to_string(),
        location: location.to_string(),
        date_added: "2024-03-15".to_string(),
    }
}

#[tokio::test]
async fn test_unique_violation_rolls_back_history() {
    let store = open_store().await;
    let repo = store.equipment();

    repo.create_audited(row("a", "INV001"), |r| {
        audit::created_entry(r, "olena", "2024-03-15T09:00:00+00:00")
    })
    .await
    .unwrap();

    let err = repo
        .create_audited(row("b", "INV001"), |r| {
            audit::created_entry(r, "olena", "2024-03-15T09:00:01+00:00")
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
    assert_eq!(store.list_equipment().await.unwrap().len(), 1);
    assert_eq!(store.list_history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_audited_skips_history_for_noop() {
    let store = open_store().await;
    let repo = store.equipment();

    repo.create_audited(row("a", "INV001"), |r| {
        audit::created_entry(r, "olena", "t0")
    })
    .await
    .unwrap();

    let (after, entry) = repo
        .update_audited("a", &draft("Office 101"), "taras", "t1", |before, after| {
            audit::updated_entry(before, after, "taras", "t1")
        })
        .await
        .unwrap()
        .unwrap();
    assert!(entry.is_none());
    assert_eq!(after.last_modified_by.as_deref(), Some("taras"));

    let (_, entry) = repo
        .update_audited("a", &draft("Office 102"), "taras", "t2", |before, after| {
            audit::updated_entry(before, after, "taras", "t2")
        })
        .await
        .unwrap()
        .unwrap();
    let entry = entry.unwrap();
    assert_eq!(entry.action, "Updated");
    assert_eq!(
        entry.details,
        "Updated: cabinet from \"Office 101\" to \"Office 102\"."
    );

    assert_eq!(store.history_for_equipment("a").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_and_delete_missing_row() {
    let store = open_store().await;
    let repo = store.equipment();

    let updated = repo
        .update_audited("missing", &draft("Office 101"), "taras", "t1", |_, _| None)
        .await
        .unwrap();
    assert!(updated.is_none());

    let deleted = repo
        .delete_audited("missing", |r| audit::deleted_entry(r, "taras", "t1"))
        .await
        .unwrap();
    assert!(deleted.is_none());
    assert!(store.list_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_audited_snapshots_row() {
    let store = open_store().await;
    let repo = store.equipment();

    repo.create_audited(row("a", "INV009"), |r| {
        audit::created_entry(r, "olena", "t0")
    })
    .await
    .unwrap();

    let (deleted, entry) = repo
        .delete_audited("a", |r| audit::deleted_entry(r, "olena", "t1"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(deleted.inventory_number, "INV009");
    assert_eq!(entry.equipment_inventory_number, "INV009");
    assert!(store.get_equipment("a").await.unwrap().is_none());

    let history = store.history_for_equipment("a").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, "Deleted");
}

#[tokio::test]
async fn test_bootstrap_admin_is_seeded_once() {
    let store = open_store().await;
    let security = fast_security();

    assert!(store.ensure_bootstrap_admin(&security).await.unwrap().is_none());
    let accounts = store.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].username, "admin");
    assert_eq!(accounts[0].role, "admin");

    store.ensure_bootstrap_admin(&security).await.unwrap();
    assert_eq!(store.list_accounts().await.unwrap().len(), 1);

    let verified = store
        .verify_user_password("admin", "admin-password-1")
        .await
        .unwrap();
    assert!(verified.is_some());
    assert!(
        store
            .verify_user_password("admin", "nope")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_generated_bootstrap_password_is_returned() {
    let store = open_store().await;
    let security = SecurityConfig {
        bootstrap_admin_password: None,
        ..fast_security()
    };

    let password = store
        .ensure_bootstrap_admin(&security)
        .await
        .unwrap()
        .expect("generated password");
    assert_eq!(password.len(), 24);
    assert!(
        store
            .verify_user_password("admin", &password)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_empty_database_url_is_rejected() {
    let err = Store::new("  ").await.err().unwrap();
    assert!(err.to_string().contains("DATABASE_URL"));
}

#[tokio::test]
async fn test_closed_store_fails_ping() {
    let store = open_store().await;
    let clone = store.clone();
    store.close().await.unwrap();
    assert!(clone.ping().await.is_err());
}


#[tokio::test]
async fn test_account_writes_skip_admin_rows() {
    let store = open_store().await;
    let account = store
        .create_account("olena", "not-a-real-hash".to_string(), Role::User, "IT")
        .await
        .unwrap();

    // Another admin promotes the account after a caller saw it as `user`.
    let promoted = store
        .update_account(
            &account.id,
            AccountChanges {
                role: Some(Role::Admin),
                ..AccountChanges::default()
            },
        )
        .await
        .unwrap();
    let GuardedWrite::Done(promoted) = promoted else {
        panic!("promotion should apply to a user row");
    };
    assert_eq!(promoted.role, "admin");

    assert_eq!(
        store.delete_account(&account.id).await.unwrap(),
        GuardedWrite::Protected
    );
    let demoted = store
        .update_account(
            &account.id,
            AccountChanges {
                role: Some(Role::User),
                ..AccountChanges::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(demoted, GuardedWrite::Protected));

    let stored = store.get_account(&account.id).await.unwrap().unwrap();
    assert_eq!(stored.role, "admin");

    assert_eq!(
        store.delete_account("missing").await.unwrap(),
        GuardedWrite::NotFound
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_audited_updates_all_commit() {
    let store = open_store().await;
    store
        .equipment()
        .create_audited(row("a", "INV001"), |r| audit::created_entry(r, "olena", "t0"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let stamp = format!("t{}", i + 1);
            store
                .equipment()
                .update_audited(
                    "a",
                    &draft(&format!("Office {}", 200 + i)),
                    "taras",
                    &stamp,
                    |before, after| audit::updated_entry(before, after, "taras", &stamp),
                )
                .await
        }));
    }

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.is_some());
    }

    let updated = store
        .history_for_equipment("a")
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == "Updated")
        .count();
    assert_eq!(updated, 8);
}
