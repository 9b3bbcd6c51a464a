//! Correlate playtime statistics with normalized games.
//!
//! The statistics table keys titles by its own storefront abbreviations,
//! which differ from the release-key prefixes the classifier saw
//! (`epic_abc123` in statistics vs `epicgames_abc123` in release keys).
//! Lookup therefore tries the bare product id first, then re-derives the
//! statistics key from the platform's statistics prefix.

use std::collections::HashMap;

use playshelf_core::NormalizedGame;
use playshelf_galaxy::PlaytimeEntry;

/// Attach playtime to every game with a matching statistics entry.
///
/// Games without a match keep `playtime_minutes` unset; playtime is never
/// inferred. Returns the number of games matched.
pub fn apply_game_times(
    games: &mut [NormalizedGame],
    times: &HashMap<String, PlaytimeEntry>,
) -> usize {
    if times.is_empty() {
        return 0;
    }
    let mut matched = 0;
    for game in games.iter_mut() {
        let entry = times.get(&game.product_id).or_else(|| {
            if game.platform.is_native() {
                return None;
            }
            let stats_key = format!("{}_{}", game.platform.stats_key_prefix(), game.product_id);
            times.get(&stats_key)
        });
        if let Some(entry) = entry {
            game.playtime_minutes = Some(entry.minutes);
            game.last_played = entry.last_played;
            matched += 1;
        }
    }
    matched
}
