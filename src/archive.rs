//! Gzip tarball packing and unpacking
//!
//! A stored entry is a single `.tgz` holding every requested path under its
//! relative name. Packing goes through a temp file in the destination
//! directory and is renamed into place only once complete, so readers never
//! observe a half-written tarball.

use crate::error::{ScrapyardError, ScrapyardResult};
use filetime::FileTime;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, Builder};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Name a path is stored under
///
/// Root and `.` components are dropped, and so is everything up to the last
/// `..`, leaving a name that cannot escape the directory it is unpacked into.
fn archive_name(path: &Path) -> PathBuf {
    let mut name = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => name.push(part),
            Component::ParentDir => name.clear(),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }
    name
}

/// Total size of the regular files under `path`
fn disk_usage(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| entry.metadata().ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}

/// Pack `paths` into a gzip tarball at `destination`
///
/// Replaces any existing file at `destination` atomically and stamps it with
/// the current time. Returns the tarball size in bytes.
pub fn save(paths: &[PathBuf], destination: &Path) -> ScrapyardResult<u64> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|e| ScrapyardError::io(format!("creating {}", parent.display()), e))?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| ScrapyardError::io(format!("creating temp file in {}", parent.display()), e))?;
    debug!("Packing {} path(s) into {}", paths.len(), temp.path().display());

    {
        let encoder = GzEncoder::new(temp.as_file_mut(), Compression::default());
        let mut builder = Builder::new(encoder);
        builder.follow_symlinks(false);

        for path in paths {
            append(&mut builder, path)?;
        }

        let pack_error = |e: std::io::Error| ScrapyardError::ArchiveCreate {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        };
        let encoder = builder.into_inner().map_err(pack_error)?;
        encoder.finish().map_err(pack_error)?.flush().map_err(pack_error)?;
    }

    temp.persist(destination).map_err(|e| {
        ScrapyardError::io(format!("moving tarball to {}", destination.display()), e.error)
    })?;

    filetime::set_file_mtime(destination, FileTime::now()).map_err(|e| {
        ScrapyardError::io(format!("touching {}", destination.display()), e)
    })?;

    let size = fs::metadata(destination)
        .map_err(|e| ScrapyardError::io(format!("reading {}", destination.display()), e))?
        .len();
    info!("Packed {} ({})", destination.display(), format_bytes(size));

    Ok(size)
}

fn append<W: Write>(builder: &mut Builder<W>, path: &Path) -> ScrapyardResult<()> {
    let meta = fs::symlink_metadata(path)
        .map_err(|_| ScrapyardError::PathNotFound(path.to_path_buf()))?;
    let name = archive_name(path);
    debug!("Adding {} as {}", path.display(), name.display());

    let result = if meta.is_dir() {
        builder.append_dir_all(&name, path)
    } else {
        builder.append_path_with_name(path, &name)
    };

    result.map_err(|e| ScrapyardError::ArchiveCreate {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Unpack the tarball at `source` into `into`
///
/// `paths` are only used to report what was restored.
pub fn restore(source: &Path, paths: &[PathBuf], into: &Path) -> ScrapyardResult<()> {
    let corrupt = |reason: String| ScrapyardError::ArchiveCorrupt {
        path: source.to_path_buf(),
        reason,
    };

    let file = File::open(source).map_err(|e| corrupt(e.to_string()))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    debug!("Unpacking {} into {}", source.display(), into.display());
    archive.unpack(into).map_err(|e| corrupt(e.to_string()))?;

    for path in paths {
        let restored = into.join(archive_name(path));
        if restored.exists() {
            info!(
                "Restored {} ({})",
                path.display(),
                format_bytes(disk_usage(&restored))
            );
        } else {
            warn!("{} was not present in {}", path.display(), source.display());
        }
    }

    Ok(())
}
