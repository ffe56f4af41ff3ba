use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::models::Feature;

/// Which rows a listing query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureFilter {
    #[default]
    All,
    Active,
}

/// SQLite-backed store for feature records.
///
/// Every write bumps a change counter; [`FeatureStore::observe`] re-runs its
/// query whenever the counter moves, so all subscribers share one latest
/// view of the table.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    pool: SqlitePool,
    changes: Arc<watch::Sender<u64>>,
}

#[derive(sqlx::FromRow)]
struct FeatureRow {
    id: String,
    title: String,
    description: String,
    is_active: bool,
    created_at: String,
    last_updated: i64,
}

impl From<FeatureRow> for Feature {
    fn from(row: FeatureRow) -> Self {
        Feature {
            id: row.id,
            title: row.title,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            last_updated: row.last_updated,
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

async fn upsert_row(
    conn: &mut SqliteConnection,
    feature: &Feature,
    last_updated: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO template_features (id, title, description, is_active, created_at, last_updated)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&feature.id)
    .bind(&feature.title)
    .bind(&feature.description)
    .bind(feature.is_active)
    .bind(&feature.created_at)
    .bind(last_updated)
    .execute(conn)
    .await?;
    Ok(())
}

impl FeatureStore {
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            pool,
            changes: Arc::new(changes),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lists records, most recently updated first.
    pub async fn list(&self, filter: FeatureFilter) -> Result<Vec<Feature>, StoreError> {
        // rowid breaks ties between writes in the same millisecond; REPLACE
        // assigns a fresh rowid so the newest write still sorts first.
        let rows: Vec<FeatureRow> = match filter {
            FeatureFilter::All => {
                sqlx::query_as(
                    "SELECT id, title, description, is_active, created_at, last_updated \
                     FROM template_features ORDER BY last_updated DESC, rowid DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
            FeatureFilter::Active => {
                sqlx::query_as(
                    "SELECT id, title, description, is_active, created_at, last_updated \
                     FROM template_features WHERE is_active = ? ORDER BY last_updated DESC, rowid DESC",
                )
                .bind(true)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Feature::from).collect())
    }

    /// Returns a stream that yields the current listing immediately and a
    /// fresh listing after every subsequent write.
    ///
    /// Writes that land while a listing is being read are coalesced into the
    /// next emission; no intermediate snapshots are buffered.
    pub fn observe(
        &self,
        filter: FeatureFilter,
    ) -> BoxStream<'static, Result<Vec<Feature>, StoreError>> {
        let store = self.clone();
        let changes = self.changes.subscribe();

        stream::unfold(
            (store, changes, true),
            move |(store, mut changes, first)| async move {
                if !first && changes.changed().await.is_err() {
                    return None;
                }
                changes.borrow_and_update();
                let snapshot = store.list(filter).await;
                Some((snapshot, (store, changes, false)))
            },
        )
        .boxed()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Feature>, StoreError> {
        let row: Option<FeatureRow> = sqlx::query_as(
            "SELECT id, title, description, is_active, created_at, last_updated \
             FROM template_features WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Feature::from))
    }

    /// Inserts a record, replacing any row with the same id.
    pub async fn insert(&self, feature: &Feature) -> Result<Feature, StoreError> {
        let last_updated = now_millis();
        let mut conn = self.pool.acquire().await?;
        upsert_row(&mut conn, feature, last_updated).await?;
        drop(conn);
        self.notify();

        Ok(Feature {
            last_updated,
            ..feature.clone()
        })
    }

    /// Updates an existing row.
    ///
    /// The row is rewritten rather than updated in place so it gets a fresh
    /// rowid and sorts ahead of rows written in the same millisecond.
    /// Returns [`StoreError::NotFound`] if no row has the record's id.
    pub async fn update(&self, feature: &Feature) -> Result<Feature, StoreError> {
        let last_updated = now_millis();
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM template_features WHERE id = ?")
            .bind(&feature.id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(feature.id.clone()));
        }

        upsert_row(&mut tx, feature, last_updated).await?;
        tx.commit().await?;
        self.notify();

        Ok(Feature {
            last_updated,
            ..feature.clone()
        })
    }

    /// Deletes a record. Returns whether a row was removed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM template_features WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.notify();
        }
        Ok(removed)
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM template_features")
            .execute(&self.pool)
            .await?;
        self.notify();
        Ok(result.rows_affected())
    }

    /// Replaces the whole table with `features` in a single transaction.
    ///
    /// Returns the number of rows stored.
    pub async fn replace_all(&self, features: &[Feature]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM template_features")
            .execute(&mut *tx)
            .await?;

        // Inserted in reverse so the incoming order survives the rowid tie-break.
        let last_updated = now_millis();
        for feature in features.iter().rev() {
            upsert_row(&mut tx, feature, last_updated).await?;
        }

        // Duplicate ids collapse into one row
        let (stored,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM template_features")
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        self.notify();

        Ok(stored as usize)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}
