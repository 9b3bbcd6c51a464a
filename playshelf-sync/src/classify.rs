//! Storefront classification for raw Galaxy records.
//!
//! A single Galaxy database holds titles imported from several storefronts.
//! Which one a row belongs to is decided by a two-tier heuristic: the
//! metadata blob's free-text platform/source hints first, the release-key
//! prefix second, the vendor's native storefront as the default. Metadata
//! hints always outrank prefix hints. Classification is a pure function of
//! the record's own fields.

use playshelf_core::Platform;
use playshelf_galaxy::RawRecord;
use serde_json::{Map, Value};

/// A raw record with its owning storefront and platform-local product id
/// resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub raw: RawRecord,
    pub platform: Platform,
    /// Platform-local id: the release key with any recognized prefix
    /// stripped, or the metadata's own product id when present.
    pub product_id: String,
}

/// Decide the owning storefront and product id for one raw record.
pub fn classify(raw: RawRecord) -> ClassifiedRecord {
    // Tier 1: metadata hints.
    if let Some(meta) = raw.metadata.as_object() {
        if let Some(platform) = hint_platform(meta) {
            let product_id = meta_product_id(meta)
                .unwrap_or_else(|| derived_product_id(&raw.release_key));
            return ClassifiedRecord {
                raw,
                platform,
                product_id,
            };
        }
    }

    // Tier 2: release-key prefix.
    if let Some((platform, product_id)) = split_release_key(&raw.release_key) {
        return ClassifiedRecord {
            raw,
            platform,
            product_id,
        };
    }

    // Default: the vendor's native storefront, full key as product id.
    let product_id = raw.release_key.clone();
    ClassifiedRecord {
        raw,
        platform: Platform::Gog,
        product_id,
    }
}

/// Probe the metadata's platform hint, then its source hint.
fn hint_platform(meta: &Map<String, Value>) -> Option<Platform> {
    for key in ["platform", "source"] {
        if let Some(platform) = meta.get(key).and_then(Value::as_str).and_then(Platform::from_hint)
        {
            return Some(platform);
        }
    }
    None
}

/// The metadata's own product id, tolerating string and numeric encodings.
fn meta_product_id(meta: &Map<String, Value>) -> Option<String> {
    match meta.get("productId") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Split a release key into a recognized platform prefix and the remainder.
fn split_release_key(key: &str) -> Option<(Platform, String)> {
    let (prefix, rest) = key.split_once('_')?;
    if rest.is_empty() {
        return None;
    }
    let platform = Platform::from_release_key_prefix(&prefix.to_lowercase())?;
    Some((platform, rest.to_string()))
}

/// Product id for a metadata-classified record without an explicit id:
/// strip a recognized prefix if one exists, otherwise keep the whole key.
fn derived_product_id(key: &str) -> String {
    split_release_key(key)
        .map(|(_, rest)| rest)
        .unwrap_or_else(|| key.to_string())
}
