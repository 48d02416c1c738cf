// Shared test helpers for database setup and record types.
//
// Used by the integration test files through `mod helpers;`.

use std::sync::Arc;

use rowmap::{FieldSpec, Identified, Record, Scannable, SqliteRunner};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Creates an in-memory pool seeded with the `users` table.
///
/// A single connection keeps every query on the same in-memory database.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    seed_users(&pool).await;
    pool
}

/// Creates a runner over a freshly seeded in-memory database.
#[allow(dead_code)]
pub async fn create_test_runner() -> SqliteRunner {
    SqliteRunner::new(Arc::new(create_test_pool().await))
}

/// Creates the `users` table with three rows; the last one has no email.
#[allow(dead_code)]
pub async fn seed_users(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            city TEXT,
            zip TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create users table");

    for (id, name, email, city, zip, active) in [
        (1, "Ada", Some("ada@example.com"), "London", "N1", 1),
        (2, "Grace", Some("grace@example.com"), "Arlington", "22201", 1),
        (3, "Linus", None, "Portland", "97201", 0),
    ] {
        sqlx::query(
            "INSERT INTO users (id, name, email, city, zip, active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, '2024-01-02 03:04:05')",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(city)
        .bind(zip)
        .bind(active)
        .execute(pool)
        .await
        .expect("Failed to insert user");
    }
}

/// Flat user record with an excluded field.
#[derive(Debug, Default, Clone, PartialEq)]
#[allow(dead_code)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    pub display: String,
}

impl Record for User {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("ID"),
            FieldSpec::new("Name"),
            FieldSpec::new("Email"),
            FieldSpec::tagged("Active", "active"),
            FieldSpec::tagged("Display", "-"),
        ]
    }

    fn slots(&mut self) -> Vec<&mut dyn Scannable> {
        vec![&mut self.id, &mut self.name, &mut self.email, &mut self.active]
    }
}

impl Identified for User {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Location fields promoted into [`Resident`].
#[derive(Debug, Default, Clone, PartialEq)]
#[allow(dead_code)]
pub struct Location {
    pub city: String,
    pub zip: String,
}

impl Record for Location {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("City"), FieldSpec::new("Zip")]
    }

    fn slots(&mut self) -> Vec<&mut dyn Scannable> {
        vec![&mut self.city, &mut self.zip]
    }
}

/// User record with an embedded location and a renamed column.
#[derive(Debug, Default, Clone, PartialEq)]
#[allow(dead_code)]
pub struct Resident {
    pub id: i64,
    pub full_name: String,
    pub location: Location,
    pub created_at: chrono::NaiveDateTime,
}

impl Record for Resident {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("ID"),
            FieldSpec::new("FullName").column("name"),
            FieldSpec::embedded::<Location>("Location"),
            FieldSpec::new("CreatedAt"),
        ]
    }

    fn slots(&mut self) -> Vec<&mut dyn Scannable> {
        let mut slots: Vec<&mut dyn Scannable> = vec![&mut self.id, &mut self.full_name];
        slots.extend(self.location.slots());
        slots.push(&mut self.created_at);
        slots
    }
}
