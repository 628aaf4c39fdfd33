//! # pb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `pb-core` domain models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pb_core::error::{AppError, Result};
use pb_core::models::{HistoryEntry, Identity, Post, Reservation, User};
use pb_core::traits::{DomainRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

fn map_db_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return AppError::Conflict(db.message().to_string());
        }
    }
    AppError::Internal(err.to_string())
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists. WAL mode serializes concurrent writers at the engine
    /// level; foreign keys bind posts and history rows to their owner.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(map_db_err)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(map_db_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// An isolated in-memory database. The pool is pinned to a single
    /// connection: every pooled connection would otherwise get its own
    /// private `:memory:` database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(map_db_err)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(map_db_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Raw pool handle, for seeding and test assertions.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                FOREIGN KEY (author_id) REFERENCES users(id)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS history (
                visited_date TEXT NOT NULL,
                place TEXT NOT NULL,
                parking_spot INTEGER NOT NULL,
                spots_left INTEGER NOT NULL,
                rating INTEGER NOT NULL,
                customer_id INTEGER NOT NULL,
                FOREIGN KEY (customer_id) REFERENCES users(id)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        log::debug!("created user {username}");
        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        }))
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl DomainRepo for SqliteStore {
    /// The author column comes from the verified session identity, never
    /// from request data.
    async fn create_post(&self, author: &Identity, title: &str, body: &str) -> Result<Post> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO posts (created_at, title, body, author_id) VALUES (?, ?, ?, ?)",
        )
        .bind(created_at)
        .bind(title)
        .bind(body)
        .bind(author.user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(Post {
            id: result.last_insert_rowid(),
            created_at,
            title: title.to_string(),
            body: body.to_string(),
            author_id: author.user_id,
        })
    }

    async fn record_reservation(
        &self,
        customer: &Identity,
        reservation: Reservation,
    ) -> Result<()> {
        let visited_date = Utc::now();
        sqlx::query(
            "INSERT INTO history (visited_date, place, parking_spot, spots_left, rating, customer_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(visited_date)
        .bind(&reservation.place)
        .bind(reservation.parking_spot)
        .bind(reservation.spots_left)
        .bind(reservation.rating)
        .bind(customer.user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn history_for(&self, user_id: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            "SELECT visited_date, place, parking_spot, spots_left, rating, customer_id
             FROM history WHERE customer_id = ? ORDER BY visited_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| HistoryEntry {
                visited_date: row.get::<DateTime<Utc>, _>("visited_date"),
                place: row.get("place"),
                parking_spot: row.get("parking_spot"),
                spots_left: row.get("spots_left"),
                rating: row.get("rating"),
                customer_id: row.get("customer_id"),
            })
            .collect())
    }
}
