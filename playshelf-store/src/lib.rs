//! SQLite persistence layer for the unified game library.
//!
//! Provides schema creation, CRUD operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature). All rows are
//! scoped by `user_id`; independent users never contend.

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    StoreError, StoredGame, SyncLogEntry, find_game, insert_game, insert_sync_log, update_game,
    update_game_enrichment,
};
pub use queries::{
    LibraryStats, SyncLogRow, games_needing_enrichment, library_stats, list_library,
    list_sync_logs,
};
pub use schema::{open_database, open_memory};
