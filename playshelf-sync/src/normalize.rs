//! Title filtering and normalization.
//!
//! Turns classified records into [`NormalizedGame`]s, dropping rows that
//! are not real games: parse failures surface as titles equal to their own
//! release key, and the Galaxy client stores a few of its own utility
//! entries alongside actual titles.

use std::collections::HashSet;

use playshelf_core::{NormalizedGame, Platform};
use playshelf_galaxy::BlobField;
use serde_json::Value;

use crate::classify::ClassifiedRecord;

/// Vendor-internal utility entries that are not games
/// (case-insensitive substring match against the resolved title).
pub const UTILITY_DENYLIST: &[&str] = &[
    "galaxy client",
    "galaxy updater",
    "game overlay",
    "redistributable",
];

/// Image-blob fields holding a usable cover, in preference order.
const COVER_FIELDS: &[&str] = &["verticalCover", "squareIcon", "background"];

#[derive(Debug, Default, PartialEq)]
pub struct NormalizeStats {
    pub accepted: usize,
    /// Title missing or equal to the release key.
    pub dropped_unparsed: usize,
    /// Matched the vendor-utility deny list.
    pub dropped_utility: usize,
    /// Same `(platform, product_id)` as an earlier record in this pass.
    pub duplicates: usize,
}

/// Normalize a classified batch, suppressing duplicates within the pass.
///
/// The first record accepted for a `(platform, product_id)` pair wins;
/// later ones are discarded.
pub fn normalize_batch(records: Vec<ClassifiedRecord>) -> (Vec<NormalizedGame>, NormalizeStats) {
    let mut stats = NormalizeStats::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut games = Vec::new();

    for record in records {
        let Some(game) = normalize_record(&record, &mut stats) else {
            continue;
        };
        if !seen.insert(game.id.clone()) {
            log::debug!("duplicate library entry {} from {}", game.id, record.raw.release_key);
            stats.duplicates += 1;
            continue;
        }
        stats.accepted += 1;
        games.push(game);
    }

    (games, stats)
}

/// Normalize a single record, or `None` when it should be dropped.
fn normalize_record(
    record: &ClassifiedRecord,
    stats: &mut NormalizeStats,
) -> Option<NormalizedGame> {
    let title = resolve_title(record);
    if title.is_empty() || title == record.raw.release_key {
        log::debug!("dropping unparsed entry '{}'", record.raw.release_key);
        stats.dropped_unparsed += 1;
        return None;
    }
    let lower = title.to_lowercase();
    if UTILITY_DENYLIST.iter().any(|entry| lower.contains(entry)) {
        log::debug!("dropping vendor utility entry '{title}'");
        stats.dropped_utility += 1;
        return None;
    }

    let mut game = NormalizedGame::new(record.platform, record.product_id.clone(), title);
    game.cover_url = resolve_cover(record);

    if let Some(meta) = record.raw.metadata.as_object() {
        game.description = non_empty(meta.get("summary").and_then(Value::as_str));
        game.release_date = resolve_release_date(meta.get("releaseDate"));
        game.developer = join_names(meta.get("developers"));
        game.publisher = join_names(meta.get("publishers"));
        game.genres = string_list(meta.get("genres"));
    }

    Some(game)
}

/// Resolve a display title: dedicated title blob, then the metadata blob,
/// then the release key as a last resort.
fn resolve_title(record: &ClassifiedRecord) -> String {
    let raw = &record.raw;
    let from_title_blob = match &raw.title {
        BlobField::Text(text) => Some(text.clone()),
        blob => blob.str_field("title").map(str::to_string),
    };
    from_title_blob
        .or_else(|| raw.metadata.str_field("title").map(str::to_string))
        .unwrap_or_else(|| raw.release_key.clone())
        .trim()
        .to_string()
}

/// Pick a cover URL from the images blob, or synthesize the GOG CDN URL.
///
/// Foreign storefronts never get a fabricated URL; their CDNs are not
/// addressable by product id.
fn resolve_cover(record: &ClassifiedRecord) -> Option<String> {
    for field in COVER_FIELDS {
        if let Some(url) = record.raw.images.str_field(field) {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }
    }
    if record.platform == Platform::Gog {
        return Some(format!(
            "https://images.gog.com/{}_glx_vertical_cover.jpg",
            record.product_id
        ));
    }
    None
}

/// Galaxy writes release dates as either epoch seconds or a date string.
fn resolve_release_date(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Number(n)) => {
            let secs = n.as_i64()?;
            let date = chrono::DateTime::from_timestamp(secs, 0)?;
            Some(date.format("%Y-%m-%d").to_string())
        }
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Join a name list (or accept a single string) into one display value.
fn join_names(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Array(items)) => {
            let names: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .collect();
            if names.is_empty() {
                None
            } else {
                Some(names.join(", "))
            }
        }
        Some(Value::String(s)) => non_empty(Some(s)),
        _ => None,
    }
}

/// A deduplicated string list, preserving first-seen order.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
