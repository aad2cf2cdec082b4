use async_trait::async_trait;
use jiff::Timestamp;
use keyhole_core::{Collection, Identifier, MetadataRecord, MetadataStore, Result, StorageError};
use sqlx::{MySqlPool, Row};

const LINKS_DDL: &str = include_str!("../../ddl/mysql/links.sql");
const TEXTS_DDL: &str = include_str!("../../ddl/mysql/texts.sql");

/// MySQL implementation of the metadata store.
///
/// Each collection is its own table with `id` as primary key, so a duplicate
/// insert fails on the unique constraint instead of overwriting.
#[derive(Debug, Clone)]
pub struct MySqlMetadataStore {
    pool: MySqlPool,
}

impl MySqlMetadataStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the `links` and `texts` tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        for ddl in [LINKS_DDL, TEXTS_DDL] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl MetadataStore for MySqlMetadataStore {
    async fn insert(&self, collection: Collection, id: &Identifier, value: &str) -> Result<()> {
        let statement = format!(
            "INSERT INTO {} (id, {}, created_at) VALUES (?, ?, ?)",
            collection.name(),
            collection.field()
        );

        let result = sqlx::query(&statement)
            .bind(id.as_str())
            .bind(value)
            .bind(Timestamp::now().as_second())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(format!("{collection}/{id}")))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn fetch(
        &self,
        collection: Collection,
        id: &Identifier,
    ) -> Result<Option<MetadataRecord>> {
        let statement = format!(
            "SELECT {} AS value, created_at FROM {} WHERE id = ? LIMIT 1",
            collection.field(),
            collection.name()
        );

        let row = sqlx::query(&statement)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: Option<String> = row.try_get("value").map_err(map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

        Ok(Some(MetadataRecord {
            id: id.clone(),
            value,
            created_at: parse_created_at(created_at)?,
        }))
    }
}
