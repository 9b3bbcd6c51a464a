//! Read queries for the library store.

use rusqlite::{Connection, params};

use crate::operations::{GAME_COLUMNS, StoreError, StoredGame, row_to_game};

/// List a user's full library, ordered by title.
pub fn list_library(conn: &Connection, user_id: &str) -> Result<Vec<StoredGame>, StoreError> {
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM library_games
         WHERE user_id = ?1
         ORDER BY title COLLATE NOCASE, platform"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Games still waiting on the external enrichment collaborator.
pub fn games_needing_enrichment(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<StoredGame>, StoreError> {
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM library_games
         WHERE user_id = ?1 AND (description IS NULL OR description = '')
         ORDER BY platform, product_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Headline numbers for a user's library.
#[derive(Debug, Default, PartialEq)]
pub struct LibraryStats {
    pub total: u32,
    /// `(platform short name, count)`, ordered by count descending.
    pub by_platform: Vec<(String, u32)>,
    pub total_playtime_minutes: u64,
}

/// Compute per-platform counts and total recorded playtime.
pub fn library_stats(conn: &Connection, user_id: &str) -> Result<LibraryStats, StoreError> {
    let mut stats = LibraryStats::default();

    let mut stmt = conn.prepare(
        "SELECT platform, COUNT(*) FROM library_games
         WHERE user_id = ?1
         GROUP BY platform
         ORDER BY COUNT(*) DESC, platform",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
    })?;
    for row in rows {
        let (platform, count) = row?;
        stats.total += count;
        stats.by_platform.push((platform, count));
    }

    stats.total_playtime_minutes = conn.query_row(
        "SELECT COALESCE(SUM(playtime_minutes), 0) FROM library_games WHERE user_id = ?1",
        params![user_id],
        |row| row.get::<_, i64>(0),
    )? as u64;

    Ok(stats)
}

/// A recorded sync pass, most recent first.
#[derive(Debug, Clone)]
pub struct SyncLogRow {
    pub id: i64,
    pub user_id: String,
    pub source: String,
    pub synced_at: String,
    pub games_seen: u32,
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub needs_enrichment: u32,
}

/// List recorded sync passes for a user, newest first.
pub fn list_sync_logs(conn: &Connection, user_id: &str) -> Result<Vec<SyncLogRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, source, synced_at, games_seen,
                created, updated, unchanged, needs_enrichment
         FROM sync_log WHERE user_id = ?1
         ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok(SyncLogRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            source: row.get(2)?,
            synced_at: row.get(3)?,
            games_seen: row.get(4)?,
            created: row.get(5)?,
            updated: row.get(6)?,
            unchanged: row.get(7)?,
            needs_enrichment: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
