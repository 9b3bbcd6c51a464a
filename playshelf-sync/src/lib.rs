//! ETL pipeline turning raw Galaxy records into the unified library.
//!
//! This crate owns the interpretation logic: deciding which storefront a
//! vendor row really belongs to, normalizing titles and covers, correlating
//! playtime across the vendor's two key conventions, and merging batches
//! into the persisted store without destroying earlier enrichment.

pub mod classify;
pub mod correlate;
pub mod merge;
pub mod mock;
pub mod normalize;
pub mod sync;

pub use classify::{ClassifiedRecord, classify};
pub use correlate::apply_game_times;
pub use merge::{MergeError, MergeOutcome, MergeStats, merge_batch};
pub use mock::mock_catalog;
pub use normalize::{NormalizeStats, normalize_batch};
pub use sync::{SyncError, SyncOptions, SyncReport, SyncSource, SyncStats, sync_galaxy_library};
