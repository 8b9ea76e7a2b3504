use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Reads stdin, stopping one byte past `max` so the identifier can still
/// report the input as too large.
pub(crate) fn read_stdin(max: usize) -> Result<Vec<u8>> {
    read_limited(io::stdin().lock(), max)
}

fn read_limited(reader: impl Read, max: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader
        .take((max as u64).saturating_add(1))
        .read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Expands `paths` into the files to inspect. Directories are walked
/// recursively and their entries sorted, so output order is stable.
/// Symlinked directories below a given path are not followed.
pub(crate) fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        walk(path, &mut files)?;
    }
    Ok(files)
}

fn walk(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !path.is_dir() {
        // Missing files are reported when they are identified.
        files.push(path.to_path_buf());
        return Ok(());
    }
    let mut entries = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    for entry in entries {
        let linked_dir = fs::symlink_metadata(&entry)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
            && entry.is_dir();
        if linked_dir {
            debug!(path = %entry.display(), "skipping symlinked directory");
            continue;
        }
        walk(&entry, files)?;
    }
    Ok(())
}
