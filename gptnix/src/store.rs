//! Append-only conversation storage.
//!
//! A single SQLite connection behind a mutex. Records are inserted once and
//! read back per user; there is no update or delete path.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use miette::Diagnostic;
use rusqlite::{params, Connection, Row};
use shared::{Conversation, UserId};
use thiserror::Error;

use crate::schema;

#[derive(Error, Diagnostic, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    #[diagnostic(code(gptnix::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),
    #[error("database lock poisoned")]
    #[diagnostic(code(gptnix::store::poisoned))]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub id: i64,
    pub user_id: Option<UserId>,
    pub query: String,
    pub response: String,
    /// Milliseconds since the Unix epoch, assigned at write time.
    pub timestamp: i64,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        Self {
            query: record.query,
            response: record.response,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewConversation<'a> {
    pub user_id: Option<&'a UserId>,
    pub query: &'a str,
    pub response: &'a str,
}

#[derive(Clone)]
pub struct ConversationStore(Arc<Mutex<Connection>>);

fn record_from_row(row: &Row) -> rusqlite::Result<ConversationRecord> {
    Ok(ConversationRecord {
        id: row.get(0)?,
        user_id: row.get::<_, Option<String>>(1)?.map(UserId::new),
        query: row.get(2)?,
        response: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

impl ConversationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "conversation store opened");

        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        schema::setup_schema_v1(&conn)?;

        Ok(Self(Arc::new(Mutex::new(conn))))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.0.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    /// Appends a record, stamping it with the current time.
    pub fn insert(&self, new: NewConversation<'_>) -> Result<ConversationRecord, StoreError> {
        let timestamp = Utc::now().timestamp_millis();

        let id = self.with_conn(|conn| {
            let id = conn.query_row(
                "INSERT INTO conversations (user_id, query, response, timestamp)
                 VALUES (?, ?, ?, ?) returning id",
                params![new.user_id.map(UserId::as_str), new.query, new.response, timestamp],
                |row: &Row| -> Result<i64, _> { row.get(0) },
            )?;
            Ok(id)
        })?;

        Ok(ConversationRecord {
            id,
            user_id: new.user_id.cloned(),
            query: new.query.to_owned(),
            response: new.response.to_owned(),
            timestamp,
        })
    }

    /// Every record of `user_id`, oldest first. Anonymous callers get nothing.
    pub fn list_by_user(
        &self,
        user_id: Option<&UserId>,
    ) -> Result<Vec<ConversationRecord>, StoreError> {
        let Some(user_id) = user_id else {
            return Ok(vec![]);
        };

        self.with_conn(|conn| {
            let mut st = conn.prepare(
                "SELECT id, user_id, query, response, timestamp
                   FROM conversations
                  WHERE user_id = ?1
                  ORDER BY timestamp ASC, id ASC",
            )?;
            let records = st
                .query_map(params![user_id.as_str()], record_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(records)
        })
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| {
                row.get(0)
            })?;
            Ok(count)
        })
    }
}
