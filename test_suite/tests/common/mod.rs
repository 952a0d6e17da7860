#![allow(dead_code)]

pub mod factories;
pub mod member;
pub mod role;

use sea_orm::{ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

/// Single-session pool: constraint toggles and in-memory databases both need
/// every statement on the same connection.
pub async fn connect(url: &str) -> DatabaseConnection {
    let mut options = ConnectOptions::new(url);
    options.max_connections(1).sqlx_logging(false);
    Database::connect(options).await.expect("failed to connect")
}

pub async fn setup_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:").await;
    create_schema(&db).await;
    db
}

pub async fn create_schema(db: &DatabaseConnection) {
    db.execute_unprepared(
        "CREATE TABLE IF NOT EXISTS roles (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL
        )",
    )
    .await
    .expect("failed to create roles table");
    db.execute_unprepared(
        "CREATE TABLE IF NOT EXISTS members (
            id BIGINT PRIMARY KEY,
            account TEXT NOT NULL,
            display_name TEXT NOT NULL,
            password TEXT NOT NULL,
            role_id BIGINT NOT NULL REFERENCES roles (id),
            is_deleted INTEGER NOT NULL DEFAULT 0
        )",
    )
    .await
    .expect("failed to create members table");
}

pub async fn insert_role(db: &DatabaseConnection, id: i64, name: &str) {
    use sea_orm::EntityTrait;
    let model = role::entity::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
    };
    role::entity::Entity::insert(model)
        .exec(db)
        .await
        .expect("failed to insert role");
}

pub async fn insert_member(db: &DatabaseConnection, id: i64, account: &str, role_id: i64) {
    use sea_orm::EntityTrait;
    let model = member::entity::ActiveModel {
        id: Set(id),
        account: Set(account.to_string()),
        display_name: Set(account.to_string()),
        password: Set(factories::hash_secret(factories::DEFAULT_SEED_PASSWORD)),
        role_id: Set(role_id),
        is_deleted: Set(0),
    };
    member::entity::Entity::insert(model)
        .exec(db)
        .await
        .expect("failed to insert member");
}
