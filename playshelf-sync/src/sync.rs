//! The sync orchestrator: one user's locate → extract → classify →
//! normalize → correlate → merge pass, run to completion.
//!
//! Every failure short of a store write degrades to "fewer games found".
//! A missing or unreadable vendor database yields the mock catalog (when
//! enabled) or an empty report; a readable database with no games is a
//! valid empty library and triggers no fallback.

use std::collections::HashMap;
use std::path::PathBuf;

use playshelf_store::{StoreError, SyncLogEntry, operations};
use rusqlite::Connection;
use thiserror::Error;

use playshelf_core::NormalizedGame;
use playshelf_galaxy::{default_install_paths, extract_library, locate_database, read_game_times};

use crate::classify::classify;
use crate::correlate::apply_game_times;
use crate::merge::{MergeError, merge_batch};
use crate::mock::mock_catalog;
use crate::normalize::normalize_batch;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Options for one sync pass.
pub struct SyncOptions {
    /// Owner of the library slice being synced.
    pub user_id: String,
    /// Explicit database path or directory; falls back to the well-known
    /// install locations when unset.
    pub database: Option<PathBuf>,
    /// Serve the demo catalog when no real source is obtainable.
    pub mock_fallback: bool,
}

impl SyncOptions {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            database: None,
            mock_fallback: false,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Where a sync pass's games came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSource {
    /// A real vendor database was read and merged.
    Database(PathBuf),
    /// Degraded mode: the fixed demo catalog, not persisted.
    MockCatalog,
    /// No source and no fallback; the report is empty.
    Unavailable,
}

/// Counters from one sync pass.
#[derive(Debug, Default, PartialEq)]
pub struct SyncStats {
    pub extracted: usize,
    pub dropped_unparsed: usize,
    pub dropped_utility: usize,
    pub duplicates: usize,
    pub playtime_matched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub needs_enrichment: usize,
}

/// Result of one sync pass.
#[derive(Debug)]
pub struct SyncReport {
    /// The normalized batch, in extraction order.
    pub games: Vec<NormalizedGame>,
    /// Library ids awaiting the external enrichment collaborator.
    pub needs_enrichment: Vec<String>,
    pub stats: SyncStats,
    pub source: SyncSource,
}

/// Run a full Galaxy sync pass for one user.
///
/// Sequential per user; callers may run independent users concurrently
/// since every store row is scoped by `user_id`. Only a store write
/// failure is fatal.
pub fn sync_galaxy_library(
    store: &Connection,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let Some(path) = locate_database(options.database.as_deref(), &default_install_paths()) else {
        log::info!("no readable Galaxy database found");
        return Ok(degraded_report(options));
    };

    let records = match extract_library(&path) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Galaxy extraction failed ({e}); continuing without this source");
            return Ok(degraded_report(options));
        }
    };

    let mut stats = SyncStats {
        extracted: records.len(),
        ..SyncStats::default()
    };

    let classified: Vec<_> = records.into_iter().map(classify).collect();
    let (mut games, normalize_stats) = normalize_batch(classified);
    stats.dropped_unparsed = normalize_stats.dropped_unparsed;
    stats.dropped_utility = normalize_stats.dropped_utility;
    stats.duplicates = normalize_stats.duplicates;

    let times = match read_game_times(&path) {
        Ok(times) => times,
        Err(e) => {
            log::warn!("could not read Galaxy playtime statistics: {e}");
            HashMap::new()
        }
    };
    stats.playtime_matched = apply_game_times(&mut games, &times);

    let outcome = merge_batch(store, &options.user_id, &games)?;
    stats.inserted = outcome.stats.inserted;
    stats.updated = outcome.stats.updated;
    stats.unchanged = outcome.stats.unchanged;
    stats.needs_enrichment = outcome.needs_enrichment.len();

    operations::insert_sync_log(
        store,
        &SyncLogEntry {
            user_id: options.user_id.clone(),
            source: "gog-galaxy".into(),
            synced_at: chrono::Utc::now().to_rfc3339(),
            games_seen: stats.extracted as u32,
            created: stats.inserted as u32,
            updated: stats.updated as u32,
            unchanged: stats.unchanged as u32,
            needs_enrichment: stats.needs_enrichment as u32,
        },
    )?;

    log::info!(
        "Galaxy sync for '{}': {} games ({} new, {} updated, {} unchanged, {} awaiting enrichment)",
        options.user_id,
        games.len(),
        stats.inserted,
        stats.updated,
        stats.unchanged,
        stats.needs_enrichment,
    );

    Ok(SyncReport {
        games,
        needs_enrichment: outcome.needs_enrichment,
        stats,
        source: SyncSource::Database(path),
    })
}

/// The report for a pass with no usable vendor source.
fn degraded_report(options: &SyncOptions) -> SyncReport {
    if options.mock_fallback {
        let games = mock_catalog();
        log::info!("serving {} demo titles in degraded mode", games.len());
        SyncReport {
            games,
            needs_enrichment: Vec::new(),
            stats: SyncStats::default(),
            source: SyncSource::MockCatalog,
        }
    } else {
        SyncReport {
            games: Vec::new(),
            needs_enrichment: Vec::new(),
            stats: SyncStats::default(),
            source: SyncSource::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playshelf_core::Platform;
    use playshelf_store::{list_library, list_sync_logs, open_memory};
    use rusqlite::params;
    use std::path::Path;

    /// Build a Galaxy-shaped vendor database on disk.
    fn vendor_db(dir: &Path) -> PathBuf {
        let path = dir.join("galaxy-2.0.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE GamePieceTypes (id INTEGER PRIMARY KEY, type TEXT NOT NULL);
             CREATE TABLE GamePieces (
                 releaseKey TEXT NOT NULL,
                 gamePieceTypeId INTEGER NOT NULL,
                 value TEXT
             );
             CREATE TABLE GameTimes (
                 releaseKey TEXT NOT NULL,
                 minutesInGame INTEGER,
                 lastSessionEnd INTEGER
             );
             INSERT INTO GamePieceTypes (id, type) VALUES
                 (1, 'title'), (2, 'meta'), (3, 'originalImages');",
        )
        .unwrap();
        path
    }

    fn add_piece(path: &Path, key: &str, type_id: i64, value: &str) {
        let conn = Connection::open(path).unwrap();
        conn.execute(
            "INSERT INTO GamePieces (releaseKey, gamePieceTypeId, value) VALUES (?1, ?2, ?3)",
            params![key, type_id, value],
        )
        .unwrap();
    }

    fn add_time(path: &Path, key: &str, minutes: i64, last: Option<i64>) {
        let conn = Connection::open(path).unwrap();
        conn.execute(
            "INSERT INTO GameTimes (releaseKey, minutesInGame, lastSessionEnd) VALUES (?1, ?2, ?3)",
            params![key, minutes, last],
        )
        .unwrap();
    }

    fn options_for(db: &Path) -> SyncOptions {
        SyncOptions {
            user_id: "alice".into(),
            database: Some(db.to_path_buf()),
            mock_fallback: false,
        }
    }

    #[test]
    fn full_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let db = vendor_db(dir.path());

        // A native title with full metadata and images.
        add_piece(&db, "gog_100", 1, r#"{"title":"Gwent"}"#);
        add_piece(
            &db,
            "gog_100",
            2,
            r#"{"summary":"Card battler","developers":["CD PROJEKT RED"]}"#,
        );
        add_piece(&db, "gog_100", 3, r#"{"verticalCover":"https://x/gwent.jpg"}"#);
        // A foreign title whose statistics key uses the other convention.
        add_piece(&db, "epicgames_abc123", 1, "Alan Wake");
        add_time(&db, "epic_abc123", 412, Some(1700000000));
        // A vendor utility entry and an unparsed row: both dropped.
        add_piece(&db, "gog_900", 1, "Game Overlay");
        add_piece(&db, "limbo_key", 1, "limbo_key");

        let store = open_memory().unwrap();
        let report = sync_galaxy_library(&store, &options_for(&db)).unwrap();

        assert_eq!(report.source, SyncSource::Database(db.clone()));
        assert_eq!(report.stats.extracted, 4);
        assert_eq!(report.stats.dropped_utility, 1);
        assert_eq!(report.stats.dropped_unparsed, 1);
        assert_eq!(report.stats.inserted, 2);
        assert_eq!(report.stats.playtime_matched, 1);

        let library = list_library(&store, "alice").unwrap();
        assert_eq!(library.len(), 2);
        let alan = library
            .iter()
            .find(|g| g.platform == Platform::EpicGames)
            .unwrap();
        assert_eq!(alan.product_id, "abc123");
        assert_eq!(alan.playtime_minutes, Some(412));
        assert_eq!(alan.last_played, Some(1700000000));
        // No description extracted yet — flagged for enrichment.
        assert!(report.needs_enrichment.contains(&"epic:abc123".to_string()));
        // Gwent had a summary, so it is not flagged.
        assert!(!report.needs_enrichment.contains(&"gog:100".to_string()));

        let logs = list_sync_logs(&store, "alice").unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].games_seen, 4);
        assert_eq!(logs[0].created, 2);
    }

    #[test]
    fn second_sync_of_unchanged_database_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let db = vendor_db(dir.path());
        add_piece(&db, "gog_100", 1, r#"{"title":"Gwent"}"#);
        add_piece(&db, "steam_42", 1, "Recettear");

        let store = open_memory().unwrap();
        let options = options_for(&db);

        let first = sync_galaxy_library(&store, &options).unwrap();
        assert_eq!(first.stats.inserted, 2);

        let before = list_library(&store, "alice").unwrap();
        let second = sync_galaxy_library(&store, &options).unwrap();
        assert_eq!(second.stats.inserted, 0);
        assert_eq!(second.stats.updated, 0);
        assert_eq!(second.stats.unchanged, 2);
        assert_eq!(list_library(&store, "alice").unwrap(), before);
    }

    #[test]
    fn empty_database_is_a_valid_empty_library_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let db = vendor_db(dir.path());
        // Statistics exist, but no owned titles.
        add_time(&db, "epic_orphan", 120, None);

        let store = open_memory().unwrap();
        let mut options = options_for(&db);
        options.mock_fallback = true;

        let report = sync_galaxy_library(&store, &options).unwrap();
        assert_eq!(report.source, SyncSource::Database(db));
        assert!(report.games.is_empty());
        assert!(list_library(&store, "alice").unwrap().is_empty());
    }

    #[test]
    fn unreadable_database_falls_back_to_mock() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("galaxy-2.0.db");
        std::fs::write(&garbage, b"not an sqlite file").unwrap();

        let store = open_memory().unwrap();
        let mut options = options_for(&garbage);
        options.mock_fallback = true;

        let report = sync_galaxy_library(&store, &options).unwrap();
        assert_eq!(report.source, SyncSource::MockCatalog);
        assert!(!report.games.is_empty());
        // Demo output is never persisted.
        assert!(list_library(&store, "alice").unwrap().is_empty());
        assert!(list_sync_logs(&store, "alice").unwrap().is_empty());
    }

    #[test]
    fn missing_database_without_fallback_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_memory().unwrap();
        let options = SyncOptions {
            user_id: "alice".into(),
            database: Some(dir.path().join("nope.db")),
            mock_fallback: false,
        };

        let report = sync_galaxy_library(&store, &options).unwrap();
        assert_eq!(report.source, SyncSource::Unavailable);
        assert!(report.games.is_empty());
        assert!(report.needs_enrichment.is_empty());
    }
}
