use std::{fs, io::Write, path::{Path, PathBuf}};

use anyhow::{anyhow, bail, Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("[common::fs] Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("[common::fs] Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Error unless the directory already exists.
pub(crate) fn require_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("[common::fs] Directory does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("[common::fs] Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Extracts the given `.zip` file to the target directory.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)
        .map_err(|e| anyhow!("[common::fs] failed to open {:?}: {}", zip_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| anyhow!("[common::fs] failed to read zip archive {:?}: {}", zip_path, e))?;

    archive.extract(dest_dir)
        .map_err(|e| anyhow!("[common::fs] failed to extract {:?} to {:?}: {}", zip_path, dest_dir, e))?;

    Ok(())
}

/// First file below `dir` (depth-first, sorted by name) with the given extension.
pub(crate) fn find_with_extension(dir: &Path, extension: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension)))
}

/// Hex-encoded SHA-256 of a byte buffer.
pub(crate) fn sha256_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Write `bytes` to `path` through a temporary file in the same directory, then rename into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => bail!("[common::fs] No parent directory for {}", path.display()),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("[common::fs] Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("[common::fs] Failed to write temporary file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| anyhow!("[common::fs] Failed to move temporary file to {}: {}", path.display(), e.error))?;
    Ok(())
}
