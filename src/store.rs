//! SQLite-backed event store.
//!
//! Events are owned by the wider ingestion system; this module only scans
//! for rows missing an embedding, assembles their text, and writes the
//! computed vector back with a single UPDATE inside an explicit
//! transaction.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::vectors::{decode_f32_le_blob, encode_f32_le_blob};

/// Storage dimension for event embeddings; shorter model outputs are
/// zero-padded before the write.
pub const STORED_EMBEDDING_DIM: usize = 768;

/// Delimiter between the text fields combined for embedding.
const TEXT_DELIMITER: &str = " | ";

/// Errors returned when operating on the event database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or query the database.
    #[error("Event database query failed: {0}")]
    Sql(#[from] rusqlite::Error),
    /// A stored field held malformed JSON.
    #[error("Event metadata parse failed: {0}")]
    Json(#[from] serde_json::Error),
    /// The requested event does not exist.
    #[error("Event {0} not found")]
    NotFound(String),
    /// A stored embedding blob was malformed.
    #[error("Embedding blob decode failed: {0}")]
    Blob(String),
}

/// Connection wrapper with the events schema applied.
pub struct EventStore {
    connection: Connection,
}

impl EventStore {
    /// Open the database addressed by `DATABASE_URL`; a `sqlite://` prefix
    /// is accepted and stripped.
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        let path = strip_sqlite_scheme(database_url);
        Self::from_connection(Connection::open(Path::new(path))?)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        let store = Self { connection };
        store.apply_schema()?;
        Ok(store)
    }

    fn apply_schema(&self) -> Result<(), StoreError> {
        self.connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                enhanced_headline TEXT,
                summary TEXT,
                primary_actors TEXT,
                location_name TEXT,
                conflict_type TEXT,
                embedding BLOB,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_created_at
                ON events (created_at);",
        )?;
        Ok(())
    }

    /// Direct access for callers that need to seed or inspect rows.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Ids of the newest events that still lack an embedding.
    pub fn find_missing_embeddings(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.connection.prepare(
            "SELECT id
             FROM events
             WHERE embedding IS NULL
             ORDER BY created_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Assemble the embedding text for an event: the five text fields
    /// joined with `" | "`, empty fields dropped, actor arrays flattened
    /// with spaces.
    pub fn load_event_text(&self, event_id: &str) -> Result<String, StoreError> {
        let mut stmt = self.connection.prepare(
            "SELECT enhanced_headline, summary, primary_actors, location_name, conflict_type
             FROM events
             WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![event_id], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .optional()?;
        let Some((headline, summary, actors, location, conflict)) = row else {
            return Err(StoreError::NotFound(event_id.to_string()));
        };
        let actors_text = match actors {
            Some(raw) if !raw.trim().is_empty() => {
                let names: Vec<String> = serde_json::from_str(&raw)?;
                names.join(" ")
            }
            _ => String::new(),
        };
        let parts = [
            headline.unwrap_or_default(),
            summary.unwrap_or_default(),
            actors_text,
            location.unwrap_or_default(),
            conflict.unwrap_or_default(),
        ];
        Ok(parts
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(TEXT_DELIMITER))
    }

    /// Write an embedding with a single UPDATE inside an explicit
    /// transaction; commit on success, rollback otherwise.
    pub fn store_embedding(
        &mut self,
        event_id: &str,
        embedding: &[f32],
    ) -> Result<(), StoreError> {
        let now = now_epoch_seconds();
        let blob = encode_f32_le_blob(embedding);
        let tx = self.connection.transaction()?;
        let updated = tx.execute(
            "UPDATE events
             SET embedding = ?1,
                 updated_at = ?2
             WHERE id = ?3",
            params![blob, now, event_id],
        )?;
        if updated == 0 {
            // Dropping the transaction rolls it back.
            return Err(StoreError::NotFound(event_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    /// Read back a stored embedding, if any.
    pub fn load_embedding(&self, event_id: &str) -> Result<Option<Vec<f32>>, StoreError> {
        let blob = self
            .connection
            .query_row(
                "SELECT embedding FROM events WHERE id = ?1",
                params![event_id],
                |row| row.get::<_, Option<Vec<u8>>>(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(event_id.to_string()))?;
        match blob {
            Some(bytes) => decode_f32_le_blob(&bytes)
                .map(Some)
                .map_err(StoreError::Blob),
            None => Ok(None),
        }
    }
}

fn strip_sqlite_scheme(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|time| time.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_event(store: &EventStore, id: &str, created_at: i64) {
        store
            .connection()
            .execute(
                "INSERT INTO events (
                    id, enhanced_headline, summary, primary_actors,
                    location_name, conflict_type, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id,
                    "Clashes reported near the border",
                    "Several units moved overnight",
                    r#"["Group A","Group B"]"#,
                    "Border region",
                    "armed_clash",
                    created_at,
                ],
            )
            .unwrap();
    }

    #[test]
    fn event_text_joins_fields_with_delimiter() {
        let store = EventStore::open_in_memory().unwrap();
        seed_event(&store, "e1", 100);
        let text = store.load_event_text("e1").unwrap();
        assert_eq!(
            text,
            "Clashes reported near the border | Several units moved overnight | \
             Group A Group B | Border region | armed_clash"
        );
    }

    #[test]
    fn event_text_skips_empty_fields() {
        let store = EventStore::open_in_memory().unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO events (id, enhanced_headline, summary, created_at, updated_at)
                 VALUES ('e2', 'Headline only', NULL, 10, 10)",
                [],
            )
            .unwrap();
        assert_eq!(store.load_event_text("e2").unwrap(), "Headline only");
    }

    #[test]
    fn missing_event_is_reported() {
        let store = EventStore::open_in_memory().unwrap();
        assert!(matches!(
            store.load_event_text("ghost"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn store_and_load_embedding_round_trip() {
        let mut store = EventStore::open_in_memory().unwrap();
        seed_event(&store, "e1", 100);
        let embedding = vec![0.5_f32; 8];
        store.store_embedding("e1", &embedding).unwrap();
        let loaded = store.load_embedding("e1").unwrap().unwrap();
        assert_eq!(loaded, embedding);
    }

    #[test]
    fn store_embedding_for_unknown_event_fails() {
        let mut store = EventStore::open_in_memory().unwrap();
        assert!(matches!(
            store.store_embedding("ghost", &[0.0]),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn missing_scan_returns_newest_first_and_respects_limit() {
        let mut store = EventStore::open_in_memory().unwrap();
        seed_event(&store, "old", 100);
        seed_event(&store, "mid", 200);
        seed_event(&store, "new", 300);
        store.store_embedding("mid", &[1.0]).unwrap();

        let missing = store.find_missing_embeddings(10).unwrap();
        assert_eq!(missing, vec!["new".to_string(), "old".to_string()]);
        let limited = store.find_missing_embeddings(1).unwrap();
        assert_eq!(limited, vec!["new".to_string()]);
    }

    #[test]
    fn database_url_scheme_is_stripped() {
        assert_eq!(strip_sqlite_scheme("sqlite:///tmp/x.db"), "/tmp/x.db");
        assert_eq!(strip_sqlite_scheme("/tmp/x.db"), "/tmp/x.db");
    }
}
