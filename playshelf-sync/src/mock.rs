//! Fixed demo catalog for degraded mode.
//!
//! Served when no Galaxy installation can be read at all, so the rest of
//! the application has something to render. Never merged into a real
//! library.

use playshelf_core::{NormalizedGame, Platform};

/// Titles, product ids, and blurbs for the demo catalog.
const MOCK_TITLES: &[(&str, &str, &str, &str, &str)] = &[
    (
        "1207664663",
        "The Witcher 3: Wild Hunt",
        "Geralt of Rivia hunts monsters and a missing daughter across a war-torn continent.",
        "CD PROJEKT RED",
        "2015-05-19",
    ),
    (
        "1423049311",
        "Cyberpunk 2077",
        "A mercenary's shot at immortality in the megacity of Night City.",
        "CD PROJEKT RED",
        "2020-12-10",
    ),
    (
        "1584823040",
        "Disco Elysium - The Final Cut",
        "An amnesiac detective pieces a murder and himself back together.",
        "ZA/UM",
        "2019-10-15",
    ),
    (
        "1456460669",
        "Divinity: Original Sin 2",
        "Godwoken rivals cooperate, betray, and ascend in Rivellon.",
        "Larian Studios",
        "2017-09-14",
    ),
    (
        "1207658930",
        "Heroes of Might and Magic 3",
        "Turn-based conquest over Erathia's castles, creatures, and artifacts.",
        "New World Computing",
        "1999-02-28",
    ),
];

/// A small fixed catalog of plausible GOG titles. Pure; no I/O.
pub fn mock_catalog() -> Vec<NormalizedGame> {
    MOCK_TITLES
        .iter()
        .map(|&(product_id, title, summary, studio, released)| {
            let mut game = NormalizedGame::new(Platform::Gog, product_id, title);
            game.cover_url = Some(format!(
                "https://images.gog.com/{product_id}_glx_vertical_cover.jpg"
            ));
            game.description = Some(summary.to_string());
            game.developer = Some(studio.to_string());
            game.publisher = Some(studio.to_string());
            game.release_date = Some(released.to_string());
            game
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_fixed_and_native() {
        let catalog = mock_catalog();
        assert_eq!(catalog, mock_catalog());
        assert!(!catalog.is_empty());
        for game in &catalog {
            assert_eq!(game.platform, Platform::Gog);
            assert!(!game.title.is_empty());
            assert!(game.description.is_some());
            assert_eq!(game.playtime_minutes, None);
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = mock_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|g| g.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }
}
