//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DocumentStore` port from the `core` crate. It maps the document layout
//! (index per user, card sub-collection per collection) onto PostgreSQL using `sqlx`.

use async_trait::async_trait;
use flashcards_core::domain::{CollectionEntry, CollectionIndex, StoredCard, UserId};
use flashcards_core::ports::{BatchOp, DocumentStore, PortError, PortResult, WriteBatch};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CollectionRecord {
    name: String,
}
impl CollectionRecord {
    fn to_domain(self) -> CollectionEntry {
        CollectionEntry { name: self.name }
    }
}

#[derive(FromRow)]
struct CardRecord {
    id: Uuid,
    front: String,
    back: String,
}
impl CardRecord {
    fn to_domain(self) -> StoredCard {
        StoredCard {
            id: self.id,
            front: self.front,
            back: self.back,
        }
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// Batch Application
//=========================================================================================

/// Applies one op inside the batch transaction.
async fn apply_op(tx: &mut Transaction<'_, Postgres>, op: BatchOp) -> PortResult<()> {
    match op {
        BatchOp::InsertIndexEntry { user_id, name } => {
            sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
                .bind(user_id.as_str())
                .execute(&mut **tx)
                .await
                .map_err(unexpected)?;

            let inserted = sqlx::query(
                "INSERT INTO collections (user_id, name) VALUES ($1, $2) ON CONFLICT (user_id, name) DO NOTHING",
            )
            .bind(user_id.as_str())
            .bind(&name)
            .execute(&mut **tx)
            .await
            .map_err(unexpected)?
            .rows_affected();

            if inserted == 0 {
                return Err(PortError::Conflict(name));
            }
        }
        BatchOp::RemoveIndexEntry { user_id, name } => {
            sqlx::query("DELETE FROM collections WHERE user_id = $1 AND name = $2")
                .bind(user_id.as_str())
                .bind(&name)
                .execute(&mut **tx)
                .await
                .map_err(unexpected)?;
        }
        BatchOp::SetCard {
            user_id,
            collection,
            card_id,
            card,
        } => {
            sqlx::query(
                "INSERT INTO cards (id, user_id, collection_name, front, back) VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (id) DO UPDATE SET front = EXCLUDED.front, back = EXCLUDED.back",
            )
            .bind(card_id)
            .bind(user_id.as_str())
            .bind(&collection)
            .bind(&card.front)
            .bind(&card.back)
            .execute(&mut **tx)
            .await
            .map_err(unexpected)?;
        }
        BatchOp::DeleteCard {
            user_id,
            collection,
            card_id,
        } => {
            sqlx::query("DELETE FROM cards WHERE id = $1 AND user_id = $2 AND collection_name = $3")
                .bind(card_id)
                .bind(user_id.as_str())
                .bind(&collection)
                .execute(&mut **tx)
                .await
                .map_err(unexpected)?;
        }
    }
    Ok(())
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for DbAdapter {
    async fn get_index(&self, user_id: &UserId) -> PortResult<Option<CollectionIndex>> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM users WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        if exists.is_none() {
            return Ok(None);
        }

        let records = sqlx::query_as::<_, CollectionRecord>(
            "SELECT name FROM collections WHERE user_id = $1 ORDER BY seq ASC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(Some(CollectionIndex {
            entries: records.into_iter().map(|r| r.to_domain()).collect(),
        }))
    }

    async fn create_index_if_absent(&self, user_id: &UserId) -> PortResult<bool> {
        let created =
            sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
                .bind(user_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(unexpected)?
                .rows_affected();
        Ok(created == 1)
    }

    async fn list_cards(&self, user_id: &UserId, collection: &str) -> PortResult<Vec<StoredCard>> {
        let records = sqlx::query_as::<_, CardRecord>(
            "SELECT id, front, back FROM cards WHERE user_id = $1 AND collection_name = $2 ORDER BY seq ASC",
        )
        .bind(user_id.as_str())
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn commit(&self, batch: WriteBatch) -> PortResult<()> {
        let op_count = batch.len();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Returning early drops `tx`, which rolls the whole batch back.
        for op in batch.into_ops() {
            apply_op(&mut tx, op).await?;
        }

        tx.commit().await.map_err(unexpected)?;
        debug!("Committed batch of {} ops", op_count);
        Ok(())
    }
}
