//! Yard factory
//!
//! Chooses the backend from the yard location: `s3://` URIs go to S3,
//! everything else is a local directory.

use crate::config::schema::S3Config;
use crate::error::{ScrapyardError, ScrapyardResult};
use crate::yard::local::LocalYard;
use crate::yard::s3::S3Yard;
use crate::yard::transport::AwsCli;
use crate::yard::YardBackend;
use std::path::{Path, PathBuf};

const S3_SCHEME: &str = "s3://";

/// Backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YardKind {
    /// Directory on the local filesystem
    Local,
    /// `s3://bucket/prefix/` driven through the AWS CLI
    S3,
}

impl YardKind {
    /// Infer the backend from a yard location
    pub fn detect(location: &str) -> Self {
        if location.starts_with(S3_SCHEME) {
            YardKind::S3
        } else {
            YardKind::Local
        }
    }

    /// Get a human-readable backend name
    pub fn name(&self) -> &'static str {
        match self {
            YardKind::Local => "local",
            YardKind::S3 => "s3",
        }
    }
}

/// Where a yard lives and which backend serves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YardSpec {
    pub kind: YardKind,
    pub root: String,
}

impl YardSpec {
    /// Parse a `-y/--yard` value
    ///
    /// Local roots are made absolute against the current directory and a
    /// leading `~` is expanded to the home directory.
    pub fn parse(location: &str) -> ScrapyardResult<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ScrapyardError::YardInvalid {
                yard: location.to_string(),
                reason: "empty location".to_string(),
            });
        }

        match YardKind::detect(location) {
            YardKind::S3 => {
                if location.len() == S3_SCHEME.len() {
                    return Err(ScrapyardError::YardInvalid {
                        yard: location.to_string(),
                        reason: "missing bucket name".to_string(),
                    });
                }
                Ok(Self {
                    kind: YardKind::S3,
                    root: location.to_string(),
                })
            }
            YardKind::Local => {
                let path = expand_local(location)?;
                Ok(Self {
                    kind: YardKind::Local,
                    root: path.to_string_lossy().into_owned(),
                })
            }
        }
    }
}

fn expand_local(location: &str) -> ScrapyardResult<PathBuf> {
    let path = match location.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => dirs::home_dir()
            .ok_or_else(|| ScrapyardError::YardInvalid {
                yard: location.to_string(),
                reason: "cannot determine home directory".to_string(),
            })?
            .join(rest.trim_start_matches('/')),
        _ => PathBuf::from(location),
    };

    std::path::absolute(Path::new(&path))
        .map_err(|e| ScrapyardError::io(format!("resolving yard {}", location), e))
}

/// Create the backend serving `spec`
///
/// # Arguments
/// * `spec` - Parsed yard location
/// * `s3` - Settings for the S3 backend (ignored for local yards)
pub fn create_yard(spec: &YardSpec, s3: &S3Config) -> ScrapyardResult<Box<dyn YardBackend>> {
    match spec.kind {
        YardKind::Local => Ok(Box::new(LocalYard::new(&spec.root))),
        YardKind::S3 => Ok(Box::new(S3Yard::new(
            spec.root.clone(),
            Box::new(AwsCli::new(s3.command.clone())),
            s3.staging_dir.clone(),
        )?)),
    }
}
