//! File checksums embedded into cache keys

use crate::error::{ScrapyardError, ScrapyardResult};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io;
use std::path::Path;

/// Lowercase hex SHA-1 of a file's contents
pub fn sha1_file(path: &Path) -> ScrapyardResult<String> {
    let mut file = File::open(path).map_err(|e| {
        ScrapyardError::io(format!("opening checksum file {}", path.display()), e)
    })?;

    let mut hasher = Sha1::new();
    io::copy(&mut file, &mut hasher).map_err(|e| {
        ScrapyardError::io(format!("reading checksum file {}", path.display()), e)
    })?;

    Ok(hex::encode(hasher.finalize()))
}
