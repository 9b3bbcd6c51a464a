//! Raw record extraction from the Galaxy library database.
//!
//! Galaxy stores one `GamePieces` row per release key and piece type; the
//! piece types of interest here are `title`, `meta`, and `originalImages`.
//! Extraction runs a single outer-join query over those three logical
//! sub-tables and yields one [`RawRecord`] per title row. Blob columns are
//! semi-structured: the same logical field may be NULL, a bare string, or
//! a JSON document, so each is decoded into a [`BlobField`] before any
//! interpretation happens downstream.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, params};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalaxyError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unexpected Galaxy schema: no game piece type '{0}'")]
    MissingPieceType(String),
}

/// One blob-valued column from the vendor database.
///
/// The Galaxy client is not consistent about blob shapes, and rows written
/// by older client versions differ from current ones. Decoding probes the
/// shape explicitly instead of assuming one.
#[derive(Debug, Clone, PartialEq)]
pub enum BlobField {
    Absent,
    /// A bare (or JSON-quoted) string.
    Text(String),
    /// A JSON object or array.
    Json(Value),
}

impl BlobField {
    /// Decode an optional column value by probing its shape.
    pub fn from_column(value: Option<String>) -> Self {
        let Some(text) = value else {
            return Self::Absent;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Absent;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Null) => Self::Absent,
            Ok(Value::String(unquoted)) => Self::Text(unquoted),
            Ok(json @ (Value::Object(_) | Value::Array(_))) => Self::Json(json),
            // Numbers, booleans, and unparseable text are kept verbatim.
            _ => Self::Text(text),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The underlying JSON object, if this field holds one.
    pub fn as_object(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            Self::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// A string-valued key of the underlying JSON object.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.as_object()?.get(key)?.as_str()
    }
}

/// One raw per-title row from the vendor database, prior to classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Opaque vendor key, e.g. `epicgames_fn` or `gog_1207658924`.
    pub release_key: String,
    pub title: BlobField,
    pub metadata: BlobField,
    pub images: BlobField,
}

/// Open the Galaxy database read-only.
///
/// The file is WAL-journaled by the client, so a read-only connection sees
/// committed data without taking locks the writer cares about. The busy
/// timeout bounds how long a query may wait on the client's own writes.
pub(crate) fn open_readonly(path: &Path) -> Result<Connection, GalaxyError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "query_only", "ON")?;
    Ok(conn)
}

/// Extract every owned-title row from the Galaxy database at `path`.
///
/// Opens its own scoped connection. Rows that cannot be read are skipped
/// with a diagnostic; failure to open or query the database is returned as
/// an error for the caller to downgrade (the sync pass continues without
/// this source).
pub fn extract_library(path: &Path) -> Result<Vec<RawRecord>, GalaxyError> {
    let conn = open_readonly(path)?;

    let title_type = piece_type_id(&conn, "title")?;
    let meta_type = piece_type_id(&conn, "meta")?;
    let images_type = piece_type_id(&conn, "originalImages")?;

    let mut stmt = conn.prepare(
        "SELECT t.releaseKey, t.value, m.value, i.value
         FROM GamePieces t
         LEFT JOIN GamePieces m
             ON m.releaseKey = t.releaseKey AND m.gamePieceTypeId = ?2
         LEFT JOIN GamePieces i
             ON i.releaseKey = t.releaseKey AND i.gamePieceTypeId = ?3
         WHERE t.gamePieceTypeId = ?1
         ORDER BY t.releaseKey",
    )?;

    let rows = stmt.query_map(params![title_type, meta_type, images_type], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        match row {
            Ok((release_key, title, metadata, images)) => records.push(RawRecord {
                release_key,
                title: BlobField::from_column(title),
                metadata: BlobField::from_column(metadata),
                images: BlobField::from_column(images),
            }),
            Err(e) => log::warn!("skipping unreadable Galaxy row: {e}"),
        }
    }

    log::debug!(
        "extracted {} raw records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Resolve a `GamePieceTypes` name to its id.
fn piece_type_id(conn: &Connection, name: &str) -> Result<i64, GalaxyError> {
    let result = conn.query_row(
        "SELECT id FROM GamePieceTypes WHERE type = ?1",
        params![name],
        |row| row.get(0),
    );
    match result {
        Ok(id) => Ok(id),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(GalaxyError::MissingPieceType(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_field_probes_shapes() {
        assert_eq!(BlobField::from_column(None), BlobField::Absent);
        assert_eq!(BlobField::from_column(Some("".into())), BlobField::Absent);
        assert_eq!(BlobField::from_column(Some("null".into())), BlobField::Absent);
        assert_eq!(
            BlobField::from_column(Some("Beat Saber".into())),
            BlobField::Text("Beat Saber".into())
        );
        // JSON-quoted strings are unquoted.
        assert_eq!(
            BlobField::from_column(Some("\"Beat Saber\"".into())),
            BlobField::Text("Beat Saber".into())
        );
        let json = BlobField::from_column(Some(r#"{"title":"Beat Saber"}"#.into()));
        assert_eq!(json.str_field("title"), Some("Beat Saber"));
        // Malformed JSON is kept verbatim rather than dropped here; the
        // normalizer decides what to do with it.
        assert_eq!(
            BlobField::from_column(Some(r#"{"title": oops"#.into())),
            BlobField::Text(r#"{"title": oops"#.into())
        );
    }

    /// Build an on-disk Galaxy-shaped fixture database.
    fn fixture_db(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("galaxy-2.0.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE GamePieceTypes (id INTEGER PRIMARY KEY, type TEXT NOT NULL);
             CREATE TABLE GamePieces (
                 releaseKey TEXT NOT NULL,
                 gamePieceTypeId INTEGER NOT NULL,
                 value TEXT
             );
             INSERT INTO GamePieceTypes (id, type) VALUES
                 (1, 'title'), (2, 'meta'), (3, 'originalImages');",
        )
        .unwrap();
        path
    }

    fn insert_piece(path: &Path, release_key: &str, type_id: i64, value: Option<&str>) {
        let conn = Connection::open(path).unwrap();
        conn.execute(
            "INSERT INTO GamePieces (releaseKey, gamePieceTypeId, value) VALUES (?1, ?2, ?3)",
            params![release_key, type_id, value],
        )
        .unwrap();
    }

    #[test]
    fn extracts_joined_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixture_db(dir.path());
        insert_piece(&db, "gog_100", 1, Some(r#"{"title":"Gwent"}"#));
        insert_piece(&db, "gog_100", 2, Some(r#"{"summary":"Card battler"}"#));
        insert_piece(&db, "gog_100", 3, Some(r#"{"verticalCover":"https://x/cover.jpg"}"#));
        insert_piece(&db, "steam_200", 1, Some("Hades"));

        let records = extract_library(&db).unwrap();
        assert_eq!(records.len(), 2);

        let gwent = &records[0];
        assert_eq!(gwent.release_key, "gog_100");
        assert_eq!(gwent.title.str_field("title"), Some("Gwent"));
        assert_eq!(gwent.metadata.str_field("summary"), Some("Card battler"));
        assert_eq!(
            gwent.images.str_field("verticalCover"),
            Some("https://x/cover.jpg")
        );

        let hades = &records[1];
        assert_eq!(hades.title, BlobField::Text("Hades".into()));
        assert!(hades.metadata.is_absent());
        assert!(hades.images.is_absent());
    }

    #[test]
    fn empty_database_extracts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixture_db(dir.path());
        let records = extract_library(&db).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_piece_type_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("galaxy-2.0.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE GamePieceTypes (id INTEGER PRIMARY KEY, type TEXT NOT NULL);
             CREATE TABLE GamePieces (
                 releaseKey TEXT NOT NULL,
                 gamePieceTypeId INTEGER NOT NULL,
                 value TEXT
             );
             INSERT INTO GamePieceTypes (id, type) VALUES (1, 'title');",
        )
        .unwrap();
        drop(conn);

        let err = extract_library(&path).unwrap_err();
        assert!(matches!(err, GalaxyError::MissingPieceType(ref t) if t == "meta"));
    }

    #[test]
    fn unreadable_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-database.db");
        std::fs::write(&path, b"definitely not sqlite").unwrap();
        assert!(extract_library(&path).is_err());
    }
}
