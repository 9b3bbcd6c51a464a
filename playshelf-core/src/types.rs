//! Data model types shared across the playshelf crates.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A fully normalized library entry, the unit handed to persistence.
///
/// Produced once per `(platform, product_id)` pair by the sync pipeline.
/// Descriptive fields are best-effort: the Galaxy metadata blob often lacks
/// them, in which case the record is flagged for external enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedGame {
    /// Stable library id, `{platform}:{product_id}`.
    pub id: String,
    pub platform: Platform,
    /// Platform-local product identifier, derived from the release key or
    /// the metadata blob. May differ from the vendor's release key.
    pub product_id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    /// ISO `YYYY-MM-DD` where the vendor supplied a usable date.
    pub release_date: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub genres: Vec<String>,
    pub playtime_minutes: Option<u32>,
    /// End of the last recorded play session, epoch seconds.
    pub last_played: Option<i64>,
}

impl NormalizedGame {
    /// Compute the stable library id for a platform/product pair.
    pub fn library_id(platform: Platform, product_id: &str) -> String {
        format!("{}:{}", platform.short_name(), product_id)
    }

    /// A bare record with only identity and title; everything else unset.
    pub fn new(platform: Platform, product_id: impl Into<String>, title: impl Into<String>) -> Self {
        let product_id = product_id.into();
        Self {
            id: Self::library_id(platform, &product_id),
            platform,
            product_id,
            title: title.into(),
            cover_url: None,
            description: None,
            release_date: None,
            developer: None,
            publisher: None,
            genres: Vec::new(),
            playtime_minutes: None,
            last_played: None,
        }
    }
}
