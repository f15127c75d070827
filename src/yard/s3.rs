//! Yard backed by an S3 bucket prefix
//!
//! Entries are found by listing the prefix once and matching object names by
//! prefix. Matches are copied into a local staging directory before they are
//! unpacked.

use crate::error::{ScrapyardError, ScrapyardResult};
use crate::key::Locator;
use crate::yard::transport::S3Transport;
use crate::yard::{CacheEntry, YardBackend};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::fs;
use tracing::{debug, info, warn};

const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One object line of an `aws s3 ls` listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub modified: NaiveDateTime,
    pub size: u64,
    pub name: String,
}

/// Parse `YYYY-MM-DD HH:MM:SS <size> <name>`
pub fn parse_listing(line: &str) -> Option<Listing> {
    let line = line.trim();
    let (date, rest) = line.split_once(' ')?;
    let (time, rest) = rest.trim_start().split_once(' ')?;
    let (size, name) = rest.trim_start().split_once(char::is_whitespace)?;
    let name = name.trim_start();

    if name.is_empty() {
        return None;
    }

    Some(Listing {
        modified: NaiveDateTime::parse_from_str(&format!("{} {}", date, time), LISTING_TIME_FORMAT)
            .ok()?,
        size: size.parse().ok()?,
        name: name.to_string(),
    })
}

/// Tarballs stored as objects under `s3://bucket/prefix/`
pub struct S3Yard {
    bucket: String,
    transport: Box<dyn S3Transport>,
    stage: PathBuf,
    // Owns the staging directory when none was configured
    _scratch: Option<TempDir>,
}

impl S3Yard {
    /// Create a yard for `bucket`, staging into `staging_dir` or a fresh
    /// temporary directory
    pub fn new(
        bucket: impl Into<String>,
        transport: Box<dyn S3Transport>,
        staging_dir: Option<PathBuf>,
    ) -> ScrapyardResult<Self> {
        let mut bucket = bucket.into();
        if !bucket.ends_with('/') {
            bucket.push('/');
        }

        let (stage, scratch) = match staging_dir {
            Some(dir) => (dir, None),
            None => {
                let scratch = tempfile::Builder::new()
                    .prefix("scrapyard-")
                    .tempdir()
                    .map_err(|e| ScrapyardError::io("creating staging directory", e))?;
                (scratch.path().to_path_buf(), Some(scratch))
            }
        };

        Ok(Self {
            bucket,
            transport,
            stage,
            _scratch: scratch,
        })
    }

    fn remote(&self, name: &str) -> String {
        format!("{}{}", self.bucket, name)
    }

    async fn list(&self) -> ScrapyardResult<Vec<Listing>> {
        let raw = self.transport.list(&self.bucket).await?;

        Ok(raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = parse_listing(line);
                if parsed.is_none() {
                    if line.trim_start().starts_with("PRE ") {
                        debug!("Skipping prefix {}", line.trim());
                    } else {
                        warn!("Unable to parse {}", line);
                    }
                }
                parsed
            })
            .collect())
    }

    /// Copy an object into the staging directory
    async fn fetch(&self, listing: &Listing) -> ScrapyardResult<CacheEntry> {
        let remote = self.remote(&listing.name);
        let local = self.stage.join(&listing.name);
        info!("Fetching {}", remote);

        self.transport
            .copy(&remote, &local.to_string_lossy())
            .await?;

        Ok(CacheEntry {
            locator: Locator::new(remote),
            path: local,
            modified: listing.modified.and_utc(),
            size: listing.size,
        })
    }
}

#[async_trait]
impl YardBackend for S3Yard {
    async fn init(&self) -> ScrapyardResult<()> {
        info!("Scrapyard: {}", self.bucket);
        fs::create_dir_all(&self.stage).await.map_err(|e| {
            ScrapyardError::io(format!("creating staging directory {}", self.stage.display()), e)
        })
    }

    fn root(&self) -> &str {
        &self.bucket
    }

    fn stage(&self) -> &Path {
        &self.stage
    }

    async fn search(&self, patterns: &[Locator]) -> ScrapyardResult<Option<CacheEntry>> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let files = self.list().await?;

        for pattern in patterns {
            let prefix = pattern.base_name().replace('*', "");
            let matches: Vec<&Listing> = files
                .iter()
                .filter(|f| f.name.starts_with(&prefix))
                .collect();
            debug!(
                "Scanning {} -> {:?}",
                pattern,
                matches.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()
            );

            if let Some(needle) = matches.into_iter().max_by_key(|f| f.modified) {
                return self.fetch(needle).await.map(Some);
            }
        }

        Ok(None)
    }

    async fn commit(&self, archive: &Path, destination: &Locator) -> ScrapyardResult<CacheEntry> {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| destination.base_name().to_string());
        let remote = self.remote(&name);
        info!("Uploading {} to {}", archive.display(), remote);

        self.transport
            .copy(&archive.to_string_lossy(), &remote)
            .await?;

        let size = fs::metadata(archive)
            .await
            .map(|m| m.len())
            .map_err(|e| ScrapyardError::io(format!("reading {}", archive.display()), e))?;

        Ok(CacheEntry {
            locator: Locator::new(remote),
            path: archive.to_path_buf(),
            modified: Utc::now(),
            size,
        })
    }

    async fn delete(&self, locators: &[Locator]) -> ScrapyardResult<usize> {
        if locators.is_empty() {
            return Ok(0);
        }

        let files = self.list().await?;
        let mut removed = 0;

        for locator in locators {
            let name = locator.base_name();
            if !files.iter().any(|f| f.name == name) {
                debug!("Nothing to junk at {}", self.remote(name));
                continue;
            }

            let remote = self.remote(name);
            self.transport.remove(&remote).await?;
            info!("Junked: {}", remote);
            removed += 1;
        }

        Ok(removed)
    }

    async fn evict(&self, _max_age: Duration) -> ScrapyardResult<Vec<Locator>> {
        warn!(
            "Crushing is not supported for S3 yards, {} left untouched",
            self.bucket
        );
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
