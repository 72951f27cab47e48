//! Entry operations inside a single bucket.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::{Error, Request, Response};
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};

/// Handle to one named bucket.
///
/// Cheap to clone; every call is its own statement (or transaction for
/// [`Cache::put_all`]), so concurrent writers to the same request simply
/// overwrite each other.
#[derive(Clone, Debug)]
pub struct Cache {
    db: CacheDb,
    name: String,
}

/// Column values for one stored pair.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    response_url: String,
    status: i64,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: &Response) -> Result<Self, Error> {
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(format!("headers: {e}")))?;
        Ok(Self {
            key_hash: compute_cache_key(&request.method, request.url.as_str()),
            method: request.method.clone(),
            url: request.url.to_string(),
            response_url: response.url.clone(),
            status: i64::from(response.status),
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn upsert(&self, conn: &rusqlite::Connection, bucket: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT INTO entries (
                bucket, key_hash, method, url, response_url, status, headers_json, body, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(bucket, key_hash) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                response_url = excluded.response_url,
                status = excluded.status,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                bucket,
                &self.key_hash,
                &self.method,
                &self.url,
                &self.response_url,
                self.status,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

/// Run a query selecting `response_url, status, headers_json, body` and decode the first row.
fn read_entry<P: rusqlite::Params>(
    conn: &rusqlite::Connection, sql: &str, params: P,
) -> Result<Option<Response>, Error> {
    let mut stmt = conn.prepare(sql)?;
    let result = stmt.query_row(params, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Vec<u8>>(3)?,
        ))
    });

    let (url, status, headers_json, body) = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status} for {url}")))?;
    let headers: Vec<(String, String)> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("headers for {url}: {e}")))?;

    Ok(Some(Response { url, status, headers, body: Bytes::from(body) }))
}

impl Cache {
    pub(crate) fn new(db: CacheDb, name: &str) -> Self {
        Self { db, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored response for the request, if any.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        let bucket = self.name.clone();
        let key_hash = compute_cache_key(&request.method, request.url.as_str());
        self.db
            .conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                read_entry(
                    conn,
                    "SELECT response_url, status, headers_json, body
                     FROM entries WHERE bucket = ?1 AND key_hash = ?2",
                    params![bucket, key_hash],
                )
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response for the request, replacing any previous one.
    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        let bucket = self.name.clone();
        let row = EntryRow::new(request, response)?;
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> { row.upsert(conn, &bucket, &stored_at) })
            .await
            .map_err(Error::from)
    }

    /// Store every pair in one transaction; either all land or none do.
    pub async fn put_all(&self, pairs: &[(Request, Response)]) -> Result<usize, Error> {
        let bucket = self.name.clone();
        let rows = pairs
            .iter()
            .map(|(req, res)| EntryRow::new(req, res))
            .collect::<Result<Vec<_>, _>>()?;
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.upsert(&tx, &bucket, &stored_at)?;
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for the request. Returns false if none was stored.
    pub async fn delete_entry(&self, request: &Request) -> Result<bool, Error> {
        let bucket = self.name.clone();
        let key_hash = compute_cache_key(&request.method, request.url.as_str());
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE bucket = ?1 AND key_hash = ?2",
                    params![bucket, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs stored in this bucket, oldest first.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let bucket = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE bucket = ?1 ORDER BY stored_at, rowid")?;
                let urls = stmt
                    .query_map(params![bucket], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn len(&self) -> Result<u64, Error> {
        let bucket = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE bucket = ?1", params![bucket], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
