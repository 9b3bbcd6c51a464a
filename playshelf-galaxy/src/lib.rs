//! Read-only access to the GOG Galaxy 2.0 client database.
//!
//! The Galaxy client keeps an SQLite store of every owned title, its own
//! and those imported from connected storefronts alike, as JSON blobs
//! keyed by opaque release keys. This crate locates that database, extracts raw
//! per-title records, and reads the playtime statistics table. It never
//! writes to the vendor file, and every call opens and closes its own
//! connection so the running client is never blocked.

pub mod extract;
pub mod locate;
pub mod playtime;

pub use extract::{BlobField, GalaxyError, RawRecord, extract_library};
pub use locate::{GALAXY_DB_FILENAME, default_install_paths, locate_database};
pub use playtime::{PlaytimeEntry, read_game_times};
