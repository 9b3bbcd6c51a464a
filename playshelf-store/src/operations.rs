//! CRUD operations for the library store.

use playshelf_core::{NormalizedGame, Platform};
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Library game not found: id {0}")]
    NotFound(i64),
}

/// A persisted library row.
///
/// Carries everything a [`NormalizedGame`] does plus ownership and
/// bookkeeping columns. `manually_added` marks rows the user created by
/// hand; sync passes never touch those titles' identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGame {
    pub id: i64,
    pub user_id: String,
    pub platform: Platform,
    pub product_id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub genres: Vec<String>,
    pub playtime_minutes: Option<u32>,
    pub last_played: Option<i64>,
    pub manually_added: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

pub(crate) const GAME_COLUMNS: &str = "id, user_id, platform, product_id, title, cover_url,
    description, release_date, developer, publisher, genres,
    playtime_minutes, last_played, manually_added, created_at, updated_at";

pub(crate) fn row_to_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredGame> {
    let platform_str: String = row.get(2)?;
    let platform = platform_str.parse::<Platform>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let genres_json: String = row.get(10)?;
    let genres = serde_json::from_str(&genres_json).unwrap_or_default();
    let playtime: Option<i64> = row.get(11)?;
    Ok(StoredGame {
        id: row.get(0)?,
        user_id: row.get(1)?,
        platform,
        product_id: row.get(3)?,
        title: row.get(4)?,
        cover_url: row.get(5)?,
        description: row.get(6)?,
        release_date: row.get(7)?,
        developer: row.get(8)?,
        publisher: row.get(9)?,
        genres,
        playtime_minutes: playtime.and_then(|m| u32::try_from(m).ok()),
        last_played: row.get(12)?,
        manually_added: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// Insert a freshly extracted game. Returns the generated row id.
pub fn insert_game(
    conn: &Connection,
    user_id: &str,
    game: &NormalizedGame,
    manually_added: bool,
) -> Result<i64, StoreError> {
    let genres = serde_json::to_string(&game.genres)?;
    conn.execute(
        "INSERT INTO library_games (user_id, platform, product_id, title, cover_url,
             description, release_date, developer, publisher, genres,
             playtime_minutes, last_played, manually_added)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            user_id,
            game.platform.short_name(),
            game.product_id,
            game.title,
            game.cover_url,
            game.description,
            game.release_date,
            game.developer,
            game.publisher,
            genres,
            game.playtime_minutes,
            game.last_played,
            manually_added,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a game by its natural key.
pub fn find_game(
    conn: &Connection,
    user_id: &str,
    platform: Platform,
    product_id: &str,
) -> Result<Option<StoredGame>, StoreError> {
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM library_games
         WHERE user_id = ?1 AND platform = ?2 AND product_id = ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(
        params![user_id, platform.short_name(), product_id],
        row_to_game,
    );
    match result {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write every mutable column of an existing row.
///
/// The merge engine decides what the row should look like; this just
/// persists it and stamps `updated_at`.
pub fn update_game(conn: &Connection, game: &StoredGame) -> Result<(), StoreError> {
    let genres = serde_json::to_string(&game.genres)?;
    let changed = conn.execute(
        "UPDATE library_games SET
             title = ?2, cover_url = ?3, description = ?4, release_date = ?5,
             developer = ?6, publisher = ?7, genres = ?8,
             playtime_minutes = ?9, last_played = ?10,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            game.id,
            game.title,
            game.cover_url,
            game.description,
            game.release_date,
            game.developer,
            game.publisher,
            genres,
            game.playtime_minutes,
            game.last_played,
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(game.id));
    }
    Ok(())
}

/// Fill descriptive fields from an enrichment source.
///
/// Each field lands only where the stored value is still empty — a sync or
/// enrichment pass can never clobber data an earlier pass provided.
/// Returns `true` if any column changed.
pub fn update_game_enrichment(
    conn: &Connection,
    id: i64,
    description: Option<&str>,
    release_date: Option<&str>,
    developer: Option<&str>,
    publisher: Option<&str>,
    genres: Option<&[String]>,
) -> Result<bool, StoreError> {
    let mut changed = 0;

    if let Some(description) = description {
        changed += conn.execute(
            "UPDATE library_games SET description = ?2, updated_at = datetime('now')
             WHERE id = ?1 AND (description IS NULL OR description = '')",
            params![id, description],
        )?;
    }
    if let Some(release_date) = release_date {
        changed += conn.execute(
            "UPDATE library_games SET release_date = ?2, updated_at = datetime('now')
             WHERE id = ?1 AND (release_date IS NULL OR release_date = '')",
            params![id, release_date],
        )?;
    }
    if let Some(developer) = developer {
        changed += conn.execute(
            "UPDATE library_games SET developer = ?2, updated_at = datetime('now')
             WHERE id = ?1 AND (developer IS NULL OR developer = '')",
            params![id, developer],
        )?;
    }
    if let Some(publisher) = publisher {
        changed += conn.execute(
            "UPDATE library_games SET publisher = ?2, updated_at = datetime('now')
             WHERE id = ?1 AND (publisher IS NULL OR publisher = '')",
            params![id, publisher],
        )?;
    }
    if let Some(genres) = genres {
        let encoded = serde_json::to_string(genres)?;
        changed += conn.execute(
            "UPDATE library_games SET genres = ?2, updated_at = datetime('now')
             WHERE id = ?1 AND genres = '[]'",
            params![id, encoded],
        )?;
    }

    Ok(changed > 0)
}

/// One recorded sync pass.
#[derive(Debug, Clone)]
pub struct SyncLogEntry {
    pub user_id: String,
    pub source: String,
    pub synced_at: String,
    pub games_seen: u32,
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub needs_enrichment: u32,
}

/// Insert a sync log entry. Returns the generated ID.
pub fn insert_sync_log(conn: &Connection, entry: &SyncLogEntry) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO sync_log (user_id, source, synced_at, games_seen,
             created, updated, unchanged, needs_enrichment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.user_id,
            entry.source,
            entry.synced_at,
            entry.games_seen,
            entry.created,
            entry.updated,
            entry.unchanged,
            entry.needs_enrichment,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
