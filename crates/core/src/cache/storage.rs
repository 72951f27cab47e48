//! Named bucket operations.
//!
//! A bucket is a versioned collection of request/response pairs. Buckets are
//! only ever removed as a whole; entries inside them have no expiry.

use super::bucket::Cache;
use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Name and size of a stored bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BucketSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

/// Registry of every bucket in the database.
#[derive(Clone, Debug)]
pub struct CacheStorage {
    db: CacheDb,
}

impl CacheStorage {
    pub fn new(db: CacheDb) -> Self {
        Self { db }
    }

    /// Open the bucket with the given name, creating it if needed.
    pub async fn open(&self, name: &str) -> Result<Cache, Error> {
        let bucket = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)",
                    params![bucket, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Cache::new(self.db.clone(), name))
    }

    /// Whether a bucket with the given name exists.
    pub async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM buckets WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a bucket and every entry in it.
    ///
    /// Returns false if no bucket had that name.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM buckets WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Bucket names in creation order.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.db
            .conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM buckets ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every bucket with its entry count, in creation order.
    pub async fn summaries(&self) -> Result<Vec<BucketSummary>, Error> {
        self.db
            .conn
            .call(|conn| -> Result<Vec<BucketSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT b.name, b.created_at, COUNT(e.key_hash)
                     FROM buckets b LEFT JOIN entries e ON e.bucket = b.name
                     GROUP BY b.name
                     ORDER BY b.rowid",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(BucketSummary {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}
