//! Yard backends
//!
//! A yard is where tarballs live. Two backends exist:
//! - Local directory: tarballs are plain files under a root directory
//! - S3: tarballs are objects under an `s3://bucket/prefix/`, driven through
//!   the AWS CLI

mod factory;
mod local;
mod s3;
pub mod transport;

pub use factory::{create_yard, YardKind, YardSpec};
pub use local::LocalYard;
pub use s3::{parse_listing, Listing, S3Yard};
pub use transport::{AwsCli, S3Transport};

use crate::error::ScrapyardResult;
use crate::key::Locator;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Entries untouched for longer than this are crushed
pub const RETENTION_DAYS: u64 = 20;

/// Retention window as a duration
pub fn retention() -> Duration {
    Duration::from_secs(RETENTION_DAYS * 24 * 60 * 60)
}

/// A committed tarball in a yard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Where the entry lives in the yard
    pub locator: Locator,
    /// Local file holding the tarball (a staged copy for remote yards)
    pub path: PathBuf,
    /// Last modification time reported by the yard
    pub modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

/// Storage operations shared by every yard
///
/// Search patterns and locators are produced by [`crate::key::to_path`]
/// against [`YardBackend::root`].
#[async_trait]
pub trait YardBackend: Send + Sync {
    /// Make sure the yard is usable, creating it if needed
    async fn init(&self) -> ScrapyardResult<()>;

    /// Root that keys are joined onto
    fn root(&self) -> &str;

    /// Local directory where tarballs are staged before commit or after fetch
    fn stage(&self) -> &Path;

    /// Local file a tarball for `destination` should be packed into
    fn staging_path(&self, destination: &Locator) -> PathBuf {
        self.stage().join(destination.base_name())
    }

    /// Newest entry of the first pattern that matches anything
    async fn search(&self, patterns: &[Locator]) -> ScrapyardResult<Option<CacheEntry>>;

    /// Publish a packed tarball at `destination`, replacing any entry there
    async fn commit(&self, archive: &Path, destination: &Locator) -> ScrapyardResult<CacheEntry>;

    /// Remove the given entries, returning how many existed
    async fn delete(&self, locators: &[Locator]) -> ScrapyardResult<usize>;

    /// Remove every entry older than `max_age`
    async fn evict(&self, max_age: Duration) -> ScrapyardResult<Vec<Locator>>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
