//! Playtime statistics from the Galaxy `GameTimes` table.
//!
//! The statistics table is keyed by its own per-storefront prefix
//! convention, which differs from the release-key convention used by
//! `GamePieces`. Matching against library records happens downstream; this
//! module only reads the raw keyed entries.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;

use crate::extract::{GalaxyError, open_readonly};

/// One statistics row: minutes played and the end of the last session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaytimeEntry {
    /// Key in the statistics table's own prefix convention.
    pub raw_key: String,
    pub minutes: u32,
    /// Epoch seconds, when the client recorded a session end.
    pub last_played: Option<i64>,
}

/// Read the statistics table into a key → entry map.
///
/// Only positive playtimes are kept. An absent `GameTimes` table is normal
/// (fresh installs never wrote one) and yields an empty map; rows that
/// cannot be read are skipped.
pub fn read_game_times(path: &Path) -> Result<HashMap<String, PlaytimeEntry>, GalaxyError> {
    let conn = open_readonly(path)?;

    let has_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='GameTimes')",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        log::debug!("Galaxy database has no GameTimes table");
        return Ok(HashMap::new());
    }

    let mut stmt =
        conn.prepare("SELECT releaseKey, minutesInGame, lastSessionEnd FROM GameTimes")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, Option<i64>>(2)?,
        ))
    })?;

    let mut times = HashMap::new();
    for row in rows {
        match row {
            Ok((raw_key, Some(minutes), last_played)) if minutes > 0 => {
                let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
                times.insert(
                    raw_key.clone(),
                    PlaytimeEntry {
                        raw_key,
                        minutes,
                        last_played,
                    },
                );
            }
            Ok(_) => {}
            Err(e) => log::warn!("skipping unreadable GameTimes row: {e}"),
        }
    }
    Ok(times)
}
