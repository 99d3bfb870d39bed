//! Track catalog adapter
//!
//! Resolves a catalog URL (single track, album, or playlist) to a lazy
//! stream of normalized contestant records. The trait seam exists so
//! tests can substitute a stub and so a missing credential set degrades
//! to a clearly-reported disabled catalog instead of a startup failure.

use async_trait::async_trait;

use soundclash_common::models::Contestant;
use soundclash_common::{Error, Result};

pub mod spotify;

pub use spotify::SpotifyCatalog;

/// External track-metadata source.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Resolve one URL to zero or more contestants. A failed or empty
    /// lookup is `CatalogUnavailable`; callers treat it as "zero tracks
    /// found" per URL, never aborting a multi-URL import.
    async fn lookup(&self, url: &str) -> Result<Vec<Contestant>>;
}

/// Catalog stand-in used when no credentials are configured.
pub struct DisabledCatalog;

#[async_trait]
impl TrackCatalog for DisabledCatalog {
    async fn lookup(&self, _url: &str) -> Result<Vec<Contestant>> {
        Err(Error::CatalogUnavailable(
            "track catalog is disabled (no Spotify credentials configured)".to_string(),
        ))
    }
}
