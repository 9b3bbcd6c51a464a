//! Additive merge of an extracted batch into the persisted library.
//!
//! Volatile fields (title, cover, playtime, last played) follow the fresh
//! batch; descriptive fields only fill gaps, so enrichment done by earlier
//! passes survives a sync that lacks that data. Rows whose merged image is
//! identical to what is stored are not written at all; a repeated sync of
//! an unchanged vendor database performs no writes.

use playshelf_core::NormalizedGame;
use playshelf_store::{StoreError, StoredGame, operations};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Default, PartialEq)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Result of merging one batch.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub stats: MergeStats,
    /// Library ids whose description is still empty after the merge,
    /// to be handed to the external enrichment collaborator.
    pub needs_enrichment: Vec<String>,
}

/// Merge a batch for one user inside a single transaction.
///
/// Persistence failure rolls back and propagates: a half-written library
/// is worse than a stale one.
pub fn merge_batch(
    conn: &Connection,
    user_id: &str,
    games: &[NormalizedGame],
) -> Result<MergeOutcome, MergeError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match merge_all(conn, user_id, games) {
        Ok(outcome) => {
            conn.execute_batch("COMMIT")?;
            Ok(outcome)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

fn merge_all(
    conn: &Connection,
    user_id: &str,
    games: &[NormalizedGame],
) -> Result<MergeOutcome, MergeError> {
    let mut outcome = MergeOutcome::default();

    for game in games {
        match operations::find_game(conn, user_id, game.platform, &game.product_id)? {
            None => {
                operations::insert_game(conn, user_id, game, false)?;
                outcome.stats.inserted += 1;
                if is_empty(game.description.as_deref()) {
                    outcome.needs_enrichment.push(game.id.clone());
                }
            }
            Some(existing) => {
                let merged = merge_into(&existing, game);
                if merged == existing {
                    outcome.stats.unchanged += 1;
                } else {
                    operations::update_game(conn, &merged)?;
                    outcome.stats.updated += 1;
                }
                if is_empty(merged.description.as_deref()) {
                    outcome.needs_enrichment.push(game.id.clone());
                }
            }
        }
    }

    Ok(outcome)
}

/// Overlay a fresh extraction onto a stored row.
///
/// Title always follows the batch. The optional volatile fields follow the
/// batch when it has a value and otherwise keep what is stored (a vendor
/// database that temporarily lost its statistics table must not erase
/// recorded playtime). Descriptive fields fill only where still empty.
fn merge_into(existing: &StoredGame, fresh: &NormalizedGame) -> StoredGame {
    let mut merged = existing.clone();

    merged.title = fresh.title.clone();
    merged.cover_url = fresh.cover_url.clone().or_else(|| existing.cover_url.clone());
    merged.playtime_minutes = fresh.playtime_minutes.or(existing.playtime_minutes);
    merged.last_played = fresh.last_played.or(existing.last_played);

    merged.description = fill_empty(&existing.description, &fresh.description);
    merged.release_date = fill_empty(&existing.release_date, &fresh.release_date);
    merged.developer = fill_empty(&existing.developer, &fresh.developer);
    merged.publisher = fill_empty(&existing.publisher, &fresh.publisher);
    if merged.genres.is_empty() {
        merged.genres = fresh.genres.clone();
    }

    merged
}

/// Keep the stored value unless it is empty; fill from the batch otherwise.
fn fill_empty(existing: &Option<String>, fresh: &Option<String>) -> Option<String> {
    match existing {
        Some(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => fresh.clone(),
    }
}

fn is_empty(value: Option<&str>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}
