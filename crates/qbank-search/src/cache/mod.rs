//! cache module
//!
//! Persists the inverted index as one JSON document and reloads it when the
//! corpus fingerprint still matches.

pub mod fingerprint;
pub mod store;

pub use fingerprint::{CACHE_VERSION, Fingerprint};
pub use store::{CacheDocument, IndexCache};
