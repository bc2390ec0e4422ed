//! Common test infrastructure for database integration tests.

#![allow(dead_code)]

use keel_config::DatabaseConfig;
use keel_core::{Entity, SqlValue};
use keel_repository::{DatabasePool, DatabasePoolInterface};
use std::sync::Arc;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE books (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        pages INTEGER NOT NULL,
        isbn TEXT UNIQUE
    )
    "#,
    r#"
    CREATE TABLE readers (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE loans (
        id INTEGER PRIMARY KEY,
        book_id INTEGER,
        days_overdue INTEGER
    )
    "#,
];

/// Test database wrapper.
///
/// Each instance owns a private in-memory SQLite database. The pool is
/// capped at one connection so every session sees the same database.
pub struct TestDatabase {
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    /// Creates a fresh database with the test schema applied.
    pub async fn new() -> Self {
        let config = Self::config();
        let pool = DatabasePool::new(&config)
            .await
            .expect("Failed to open SQLite database");

        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(pool.inner())
                .await
                .expect("Failed to create schema");
        }

        Self {
            pool: Arc::new(pool),
        }
    }

    /// Returns the configuration used for the test pool.
    pub fn config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 600,
            log_queries: true,
        }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.pool)
    }

    /// Counts rows in `table` outside of any session.
    pub async fn row_count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.pool.inner())
            .await
            .expect("Failed to count rows")
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub pages: i64,
    pub isbn: Option<String>,
}

impl Book {
    pub fn new(id: i64, title: &str, pages: i64) -> Self {
        Self {
            id,
            title: title.to_string(),
            pages,
            isbn: None,
        }
    }

    pub fn with_isbn(mut self, isbn: &str) -> Self {
        self.isbn = Some(isbn.to_string());
        self
    }
}

impl Entity for Book {
    type Id = i64;
    const TABLE: &'static str = "books";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "title", "pages", "isbn"];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.title.clone().into(),
            self.pages.into(),
            self.isbn.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Reader {
    pub id: String,
    pub name: String,
}

impl Reader {
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
        }
    }
}

impl Entity for Reader {
    type Id = String;
    const TABLE: &'static str = "readers";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "name"];

    fn id(&self) -> String {
        self.id.clone()
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.clone().into(), self.name.clone().into()]
    }
}

/// Loan with nullable integer columns.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Loan {
    pub id: i64,
    pub book_id: Option<i64>,
    pub days_overdue: Option<i64>,
}

impl Entity for Loan {
    type Id = i64;
    const TABLE: &'static str = "loans";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "book_id", "days_overdue"];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.book_id.into(), self.days_overdue.into()]
    }
}
