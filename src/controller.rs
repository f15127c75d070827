//! The four yard operations
//!
//! A [`Scrapyard`] wraps one initialized backend. Opening it performs the
//! backend's existence/creation check exactly once; every operation after
//! that resolves keys, talks to the backend and packs or unpacks tarballs.

use crate::archive;
use crate::error::{ScrapyardError, ScrapyardResult};
use crate::key::{archive_suffix, to_path, KeyTemplate, Locator, SEARCH_SUFFIX};
use crate::yard::{retention, CacheEntry, YardBackend};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// An entry was found and unpacked
    Hit(CacheEntry),
    /// No key matched any entry
    Miss,
}

impl SearchOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// An initialized yard ready to serve one operation
pub struct Scrapyard {
    yard: Box<dyn YardBackend>,
    suffix: String,
}

impl Scrapyard {
    /// Initialize `yard` and wrap it
    pub async fn open(yard: Box<dyn YardBackend>, extension: &str) -> ScrapyardResult<Self> {
        yard.init().await?;
        Ok(Self {
            yard,
            suffix: archive_suffix(extension),
        })
    }

    pub fn yard(&self) -> &dyn YardBackend {
        &*self.yard
    }

    fn locators(&self, keys: &[KeyTemplate], suffix: &str) -> Vec<Locator> {
        keys.iter()
            .map(|key| {
                let locator = to_path(self.yard.root(), &key.resolve(), suffix);
                debug!("Key {} -> {}", key, locator);
                locator
            })
            .collect()
    }

    /// Unpack the newest entry of the first matching key into `into`
    pub async fn search(
        &self,
        keys: &[KeyTemplate],
        paths: &[PathBuf],
        into: &Path,
    ) -> ScrapyardResult<SearchOutcome> {
        info!("Searching for {}", join(keys));
        let patterns = self.locators(keys, SEARCH_SUFFIX);

        let Some(entry) = self.yard.search(&patterns).await? else {
            info!("Unable to find key(s): {}", join(keys));
            return Ok(SearchOutcome::Miss);
        };

        info!("Found scrap in {}", entry.locator);
        let source = entry.path.clone();
        let paths = paths.to_vec();
        let into = into.to_path_buf();
        blocking(move || archive::restore(&source, &paths, &into)).await?;

        Ok(SearchOutcome::Hit(entry))
    }

    /// Pack `paths` under the first key
    pub async fn store(&self, keys: &[KeyTemplate], paths: &[PathBuf]) -> ScrapyardResult<CacheEntry> {
        let key = keys
            .first()
            .ok_or_else(|| ScrapyardError::User("store requires at least one key".to_string()))?;
        if paths.is_empty() {
            return Err(ScrapyardError::User(
                "store requires at least one path".to_string(),
            ));
        }

        info!("Storing {}", key);
        let destination = to_path(self.yard.root(), &key.resolve(), &self.suffix);
        let staged = self.yard.staging_path(&destination);

        let packed = staged.clone();
        let paths = paths.to_vec();
        blocking(move || archive::save(&paths, &packed)).await?;

        let entry = self.yard.commit(&staged, &destination).await?;
        info!("Stored scrap at {}", entry.locator);
        Ok(entry)
    }

    /// Delete the exact entry of every key
    pub async fn junk(&self, keys: &[KeyTemplate]) -> ScrapyardResult<usize> {
        info!("Junking {}", join(keys));
        let locators = self.locators(keys, &self.suffix);
        self.yard.delete(&locators).await
    }

    /// Evict every entry past the retention window
    pub async fn crush(&self) -> ScrapyardResult<Vec<Locator>> {
        let crushed = self.yard.evict(retention()).await?;
        info!("Crushed {} scrap(s)", crushed.len());
        Ok(crushed)
    }
}

fn join(keys: &[KeyTemplate]) -> String {
    keys.iter()
        .map(KeyTemplate::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

async fn blocking<T, F>(f: F) -> ScrapyardResult<T>
where
    F: FnOnce() -> ScrapyardResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScrapyardError::Internal(format!("archive task failed: {}", e)))?
}
