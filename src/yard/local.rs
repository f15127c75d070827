//! Yard backed by a local directory

use crate::error::{ScrapyardError, ScrapyardResult};
use crate::key::{Locator, SEARCH_SUFFIX};
use crate::yard::{CacheEntry, YardBackend};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info, warn};

/// Tarballs stored as plain files under a root directory
pub struct LocalYard {
    path: PathBuf,
    root: String,
}

impl LocalYard {
    /// Create a yard rooted at `path` (not touched until [`YardBackend::init`])
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = path.to_string_lossy().into_owned();
        Self { path, root }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl ToString) -> ScrapyardError {
        ScrapyardError::backend(self.root.clone(), reason)
    }

    async fn entry(&self, path: PathBuf) -> ScrapyardResult<CacheEntry> {
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| ScrapyardError::io(format!("reading {}", path.display()), e))?;
        let modified = meta
            .modified()
            .map_err(|e| ScrapyardError::io(format!("reading mtime of {}", path.display()), e))?;

        Ok(CacheEntry {
            locator: Locator::new(path.to_string_lossy()),
            modified: DateTime::<Utc>::from(modified),
            size: meta.len(),
            path,
        })
    }

    /// Files matching a search locator, paired with their mtime
    ///
    /// Hidden files (in-flight temp tarballs) never match.
    async fn glob(&self, pattern: &Locator) -> ScrapyardResult<Vec<(PathBuf, SystemTime)>> {
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        let paths: Vec<PathBuf> = glob::glob_with(&search_glob(pattern), options)
            .map_err(|e| ScrapyardError::YardInvalid {
                yard: self.root.clone(),
                reason: format!("bad search pattern {}: {}", pattern, e),
            })?
            .filter_map(Result::ok)
            .collect();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let Ok(meta) = fs::metadata(&path).await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            if let Ok(modified) = meta.modified() {
                files.push((path, modified));
            }
        }

        Ok(files)
    }
}

/// Glob for a search locator: everything but the trailing wildcard is literal
fn search_glob(pattern: &Locator) -> String {
    match pattern.as_str().strip_suffix(SEARCH_SUFFIX) {
        Some(literal) => format!("{}{}", Pattern::escape(literal), SEARCH_SUFFIX),
        None => Pattern::escape(pattern.as_str()),
    }
}

#[async_trait]
impl YardBackend for LocalYard {
    async fn init(&self) -> ScrapyardResult<()> {
        match fs::metadata(&self.path).await {
            Ok(meta) if meta.is_dir() => {
                info!("Scrapyard: {}", self.path.display());
                Ok(())
            }
            Ok(_) => Err(self.unavailable("not a directory")),
            Err(_) => {
                info!("Scrapyard: {} (creating)", self.path.display());
                fs::create_dir_all(&self.path)
                    .await
                    .map_err(|e| self.unavailable(e))
            }
        }
    }

    fn root(&self) -> &str {
        &self.root
    }

    fn stage(&self) -> &Path {
        &self.path
    }

    /// Tarballs are packed straight into the yard
    fn staging_path(&self, destination: &Locator) -> PathBuf {
        destination.as_path().to_path_buf()
    }

    async fn search(&self, patterns: &[Locator]) -> ScrapyardResult<Option<CacheEntry>> {
        for pattern in patterns {
            let matches = self.glob(pattern).await?;
            debug!(
                "Scanning {} -> {:?}",
                pattern,
                matches.iter().map(|(p, _)| p.display().to_string()).collect::<Vec<_>>()
            );

            if let Some((path, _)) = matches.into_iter().max_by_key(|(_, modified)| *modified) {
                return self.entry(path).await.map(Some);
            }
        }

        Ok(None)
    }

    async fn commit(&self, archive: &Path, destination: &Locator) -> ScrapyardResult<CacheEntry> {
        let target = destination.as_path();
        if archive != target {
            fs::rename(archive, target)
                .await
                .map_err(|e| self.unavailable(format!("moving into {}: {}", destination, e)))?;
        }
        self.entry(target.to_path_buf()).await
    }

    async fn delete(&self, locators: &[Locator]) -> ScrapyardResult<usize> {
        let mut removed = 0;

        for locator in locators {
            let path = locator.as_path();
            if !fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false) {
                debug!("Nothing to junk at {}", locator);
                continue;
            }

            fs::remove_file(path)
                .await
                .map_err(|e| self.unavailable(format!("removing {}: {}", locator, e)))?;
            info!("Junked: {}", locator);
            removed += 1;
        }

        Ok(removed)
    }

    async fn evict(&self, max_age: Duration) -> ScrapyardResult<Vec<Locator>> {
        info!("Crushing the yard to scrap!");
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut entries = fs::read_dir(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;
        let mut crushed = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(|e| self.unavailable(e))? {
            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());

            if modified >= cutoff {
                debug!(
                    "Keeping: {} at {}",
                    path.display(),
                    DateTime::<Utc>::from(modified).format("%Y-%m-%d %H:%M:%S")
                );
                continue;
            }

            info!("Crushing: {}", path.display());
            let result = if meta.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            result.map_err(|e| self.unavailable(format!("removing {}: {}", path.display(), e)))?;
            crushed.push(Locator::new(path.to_string_lossy()));
        }

        Ok(crushed)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
