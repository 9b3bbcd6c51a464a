//! Shared identity and model types for the playshelf library engine.
//!
//! This crate defines which storefronts the engine understands and the
//! normalized game record every other crate trades in. It performs no I/O.

pub mod platform;
pub mod types;

pub use platform::{Platform, PlatformParseError};
pub use types::NormalizedGame;
