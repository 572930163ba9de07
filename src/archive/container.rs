use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::CompressionMethod;

use super::ArchiveError;

pub const CONTAINER_EXTENSION: &str = "zip";

/// Deflate at maximum level
const COMPRESSION_LEVEL: i32 = 9;

/// A finished container on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveContainer {
    pub path: PathBuf,
    pub entries: usize,
}

impl ArchiveContainer {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One entry to place in a container, stored under its base name
#[derive(Debug, Clone)]
pub enum ContainerEntry {
    /// Copy a file from disk
    File(PathBuf),
    /// Write in-memory contents
    Bytes { name: String, data: Vec<u8> },
}

impl ContainerEntry {
    fn entry_name(&self) -> Result<String, ArchiveError> {
        match self {
            ContainerEntry::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| ArchiveError::Missing(path.clone())),
            ContainerEntry::Bytes { name, .. } => Ok(name.clone()),
        }
    }
}

/// Write `entries` into a new container at `out_path`.
///
/// The container is assembled in a temp file beside `out_path` and only moved
/// into place once complete, so a failure never leaves a truncated container.
pub fn write_container(out_path: &Path, entries: &[ContainerEntry]) -> Result<(), ArchiveError> {
    let dir = out_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let tmp = tempfile::Builder::new()
        .prefix(".bundle-")
        .suffix(".part")
        .tempfile_in(dir)?;

    let mut zip = zip::ZipWriter::new(tmp.reopen()?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for entry in entries {
        zip.start_file(entry.entry_name()?, options)?;
        match entry {
            ContainerEntry::File(path) => {
                let mut src = File::open(path).map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => ArchiveError::Missing(path.clone()),
                    _ => ArchiveError::Io(e),
                })?;
                io::copy(&mut src, &mut zip)?;
            }
            ContainerEntry::Bytes { data, .. } => {
                zip.write_all(data)?;
            }
        }
    }

    let mut file = zip.finish()?;
    file.flush()?;
    file.sync_all()?;
    drop(file);

    tmp.persist_noclobber(out_path)
        .map_err(|e| ArchiveError::Io(e.error))?;
    Ok(())
}
